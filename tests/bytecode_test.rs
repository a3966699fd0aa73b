// Copyright 2025 Queryengine Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bytecode Program Tests
//!
//! Compiled programs verify, disassemble, and keep their meaning through
//! peephole fusion.

use queryengine::executor::expression::{BytecodeCompiler, ExprVM, Op, Program};
use queryengine::executor::{ArithmeticOp, CompareOp, Expr};
use queryengine::{row, DataType, Error, Row, Value};

fn foo() -> Expr {
    Expr::column(0, "foo", DataType::Double)
}

fn bar() -> Expr {
    Expr::column(1, "bar", DataType::Integer)
}

fn compile(expr: &Expr, peephole: bool) -> Program {
    BytecodeCompiler::new()
        .with_peephole(peephole)
        .compile_program(expr)
        .expect("Failed to compile")
}

fn run(program: &Program, rows: &[Row]) -> Vec<Value> {
    let mut vm = ExprVM::new();
    rows.iter().map(|row| vm.execute(program, row)).collect()
}

#[test]
fn test_scenario_expression_program() {
    // foo + 10 * CAST(bar AS DOUBLE)
    let expr = Expr::arithmetic(
        ArithmeticOp::Add,
        foo(),
        Expr::arithmetic(
            ArithmeticOp::Mul,
            Expr::literal(10.0),
            Expr::cast(bar(), DataType::Double),
        ),
    );
    let plain = compile(&expr, false);
    assert_eq!(
        plain.ops(),
        &[
            Op::LoadColumn(0),
            Op::LoadConst(Value::double(10.0)),
            Op::LoadColumn(1),
            Op::IntToDouble,
            Op::MulDouble,
            Op::AddDouble,
        ]
    );
    assert_eq!(plain.max_stack_depth(), 3);
    assert!(plain.null_short_circuit());

    let fused = compile(&expr, true);
    assert_eq!(
        fused.ops(),
        &[
            Op::LoadColumn(0),
            Op::LoadConst(Value::double(10.0)),
            Op::LoadColumnAsDouble(1),
            Op::MulDouble,
            Op::AddDouble,
        ]
    );
    fused.verify().expect("Failed to verify");

    let rows = vec![row![1.0, 2i64], row![3.0, 4i64], row![None::<f64>, 1i64]];
    let expected = vec![Value::double(21.0), Value::double(43.0), Value::Null];
    assert_eq!(run(&plain, &rows), expected);
    assert_eq!(run(&fused, &rows), expected);
}

#[test]
fn test_constant_operand_fusion() {
    let expr = Expr::arithmetic(
        ArithmeticOp::Sub,
        Expr::arithmetic(ArithmeticOp::Mul, bar(), Expr::literal(3i64)),
        Expr::literal(1i64),
    );
    let fused = compile(&expr, true);
    assert_eq!(
        fused.ops(),
        &[Op::LoadColumn(1), Op::MulConstInt(3), Op::SubConstInt(1)]
    );
    assert_eq!(fused.max_stack_depth(), 1);

    let rows = vec![row![0.0, 5i64], row![0.0, None::<i64>]];
    assert_eq!(run(&fused, &rows), vec![Value::integer(14), Value::Null]);
    assert_eq!(run(&compile(&expr, false), &rows), run(&fused, &rows));
}

#[test]
fn test_fusion_respects_jump_targets() {
    // IF(foo > 0.0, foo + 1.5, CAST(bar AS DOUBLE))
    let expr = Expr::If {
        condition: Box::new(Expr::compare(CompareOp::Gt, foo(), Expr::literal(0.0))),
        then: Box::new(Expr::arithmetic(ArithmeticOp::Add, foo(), Expr::literal(1.5))),
        otherwise: Box::new(Expr::cast(bar(), DataType::Double)),
        data_type: DataType::Double,
    };
    let plain = compile(&expr, false);
    let fused = compile(&expr, true);
    assert!(fused.len() < plain.len());
    fused.verify().expect("Failed to verify");

    let rows = vec![
        row![2.0, 7i64],
        row![-2.0, 7i64],
        row![None::<f64>, 7i64],
        row![-1.0, None::<i64>],
    ];
    let expected = vec![
        Value::double(3.5),
        Value::double(7.0),
        Value::Null,
        Value::Null,
    ];
    assert_eq!(run(&plain, &rows), expected);
    assert_eq!(run(&fused, &rows), expected);
}

#[test]
fn test_logic_is_not_null_strict() {
    // NULL OR TRUE is TRUE, so the program must not short-circuit on NULL
    let expr = Expr::Or(
        Box::new(Expr::compare(CompareOp::Gt, foo(), Expr::literal(0.0))),
        Box::new(Expr::compare(
            CompareOp::Eq,
            bar(),
            Expr::literal(1i64),
        )),
    );
    let program = compile(&expr, true);
    assert!(!program.null_short_circuit());
    assert_eq!(
        run(&program, &[row![None::<f64>, 1i64], row![None::<f64>, 2i64]]),
        vec![Value::Boolean(true), Value::Null]
    );
}

#[test]
fn test_disassemble() {
    let expr = Expr::compare(CompareOp::Le, foo(), Expr::literal(2.5));
    let text = compile(&expr, true).disassemble();
    assert_eq!(
        text,
        "0000: LoadColumn(0)\n0001: LoadConst(2.5)\n0002: CmpDouble(<=)\n"
    );
}

#[test]
fn test_constant_program() {
    let program = Program::constant(Value::text("x"));
    program.verify().expect("Failed to verify");
    assert_eq!(run(&program, &[Row::new()]), vec![Value::text("x")]);
    assert!(Program::constant(Value::Null).null_short_circuit());
}

#[test]
fn test_verify_rejects_malformed_programs() {
    let malformed = [
        Program::new(vec![], 0, false),
        Program::new(vec![Op::AddInt], 2, false),
        Program::new(vec![Op::LoadNull, Op::LoadNull], 2, false),
        Program::new(vec![Op::LoadColumn(0)], 0, false),
        Program::new(vec![Op::LoadNull, Op::Jump(9)], 1, false),
        Program::new(
            vec![
                Op::LoadConst(Value::Boolean(true)),
                Op::Branch {
                    if_false: 4,
                    if_null: 4,
                },
                Op::LoadNull,
                Op::LoadNull,
            ],
            2,
            false,
        ),
    ];
    for program in malformed {
        assert!(
            matches!(program.verify(), Err(Error::InvalidArgument(_))),
            "{:?}",
            program
        );
    }
}

#[test]
fn test_aggregate_is_not_compilable() {
    let expr = Expr::Aggregate {
        name: "SUM".to_string(),
        arg: Box::new(foo()),
        data_type: DataType::Double,
    };
    assert!(matches!(
        BytecodeCompiler::new().compile_program(&expr),
        Err(Error::InvalidAggregate(_))
    ));
}
