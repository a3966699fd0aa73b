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

//! Expression to bytecode compiler
//!
//! Post-order walk over a resolved [`Expr`]. Operand types are known at
//! compile time, so every arithmetic and comparison is emitted in its typed
//! form and widening appears as an explicit `IntToDouble`.
//!
//! Control flow layout:
//!
//! ```text
//! a AND b:   <a> And(end) <b> AndFinalize end:
//! a OR b:    <a> Or(end)  <b> OrFinalize  end:
//! IF(c,x,y): <c> Branch(else, null) <x> Jump(end)
//!            else: <y> Jump(end)
//!            null: LoadNull
//!            end:
//! ```

use std::sync::Arc;

use super::ops::Op;
use super::program::{Program, ProgramBuilder};
use super::vm::ExprVM;
use super::{CompiledExpression, ExecutionMode, ExpressionCompiler};
use crate::core::{DataType, Error, Result, Row, Value};
use crate::executor::expr::{ArithmeticOp, Expr};

/// Placeholder jump target, patched once the real target is known
const UNPATCHED: u16 = u16::MAX;

/// Compiles expressions to [`Program`]s
#[derive(Debug, Clone, Copy)]
pub struct BytecodeCompiler {
    peephole: bool,
}

impl BytecodeCompiler {
    /// Create a compiler with peephole fusion enabled
    pub fn new() -> Self {
        Self { peephole: true }
    }

    /// Enable or disable peephole fusion
    pub fn with_peephole(mut self, enabled: bool) -> Self {
        self.peephole = enabled;
        self
    }

    /// Compile an expression into a verified program
    pub fn compile_program(&self, expr: &Expr) -> Result<Program> {
        let mut builder = ProgramBuilder::new();
        emit_expr(&mut builder, expr)?;

        let mut program = builder.build(expr.is_null_strict());
        if self.peephole {
            program = program.optimize();
        }
        program.verify()?;

        tracing::trace!(
            expr = %expr,
            ops = program.len(),
            max_stack_depth = program.max_stack_depth(),
            "compiled bytecode program\n{}",
            program.disassemble()
        );
        Ok(program)
    }
}

impl Default for BytecodeCompiler {
    fn default() -> Self {
        Self::new()
    }
}

fn emit_expr(b: &mut ProgramBuilder, expr: &Expr) -> Result<()> {
    match expr {
        Expr::Column { index, name, .. } => {
            let idx = u16::try_from(*index).map_err(|_| {
                Error::InvalidArgument(format!("column '{}' index {} out of range", name, index))
            })?;
            b.emit(Op::LoadColumn(idx));
        }

        Expr::Literal { value, .. } => {
            if value.is_null() {
                b.emit(Op::LoadNull);
            } else {
                b.emit(Op::LoadConst(value.clone()));
            }
        }

        Expr::Arithmetic {
            op,
            left,
            right,
            data_type,
        } => {
            emit_expr(b, left)?;
            emit_expr(b, right)?;
            b.emit(arithmetic_op(*op, *data_type)?);
        }

        Expr::Negate { expr, data_type } => {
            emit_expr(b, expr)?;
            b.emit(match data_type {
                DataType::Integer => Op::NegInt,
                DataType::Double => Op::NegDouble,
                other => {
                    return Err(Error::TypeMismatch(format!("cannot negate {}", other)));
                }
            });
        }

        Expr::Compare { op, left, right } => {
            let data_type = left.data_type();
            if right.data_type() != data_type {
                return Err(Error::TypeMismatch(format!(
                    "cannot compare {} with {}",
                    data_type,
                    right.data_type()
                )));
            }
            emit_expr(b, left)?;
            emit_expr(b, right)?;
            b.emit(match data_type {
                DataType::Integer => Op::CmpInt(*op),
                DataType::Double => Op::CmpDouble(*op),
                DataType::Boolean => Op::CmpBool(*op),
                DataType::Text => Op::CmpText(*op),
            });
        }

        Expr::And(left, right) => {
            emit_expr(b, left)?;
            let jump = b.position();
            b.emit(Op::And(UNPATCHED));
            emit_expr(b, right)?;
            b.emit(Op::AndFinalize);
            let end = b.position();
            b.patch_jump(jump, UNPATCHED, end)?;
        }

        Expr::Or(left, right) => {
            emit_expr(b, left)?;
            let jump = b.position();
            b.emit(Op::Or(UNPATCHED));
            emit_expr(b, right)?;
            b.emit(Op::OrFinalize);
            let end = b.position();
            b.patch_jump(jump, UNPATCHED, end)?;
        }

        Expr::Not(inner) => {
            emit_expr(b, inner)?;
            b.emit(Op::Not);
        }

        Expr::If {
            condition,
            then,
            otherwise,
            ..
        } => {
            emit_expr(b, condition)?;
            let branch = b.position();
            b.emit(Op::Branch {
                if_false: UNPATCHED,
                if_null: UNPATCHED - 1,
            });
            let base = b.depth();

            emit_expr(b, then)?;
            let then_jump = b.position();
            b.emit(Op::Jump(UNPATCHED));

            b.set_depth(base);
            let else_start = b.position();
            emit_expr(b, otherwise)?;
            let else_jump = b.position();
            b.emit(Op::Jump(UNPATCHED));

            b.set_depth(base);
            let null_start = b.position();
            b.emit(Op::LoadNull);

            let end = b.position();
            b.patch_jump(branch, UNPATCHED, else_start)?;
            b.patch_jump(branch, UNPATCHED - 1, null_start)?;
            b.patch_jump(then_jump, UNPATCHED, end)?;
            b.patch_jump(else_jump, UNPATCHED, end)?;
        }

        Expr::Cast { expr: inner, to } => {
            let from = inner.data_type();
            emit_expr(b, inner)?;
            match (from, to) {
                (f, t) if f == *t => {}
                (DataType::Integer, DataType::Double) => b.emit(Op::IntToDouble),
                (f, t) => {
                    return Err(Error::TypeMismatch(format!("cannot cast {} to {}", f, t)));
                }
            }
        }

        Expr::Aggregate { name, .. } => {
            return Err(Error::InvalidAggregate(format!(
                "{} is not allowed in a scalar expression",
                name
            )));
        }
    }
    Ok(())
}

fn arithmetic_op(op: ArithmeticOp, data_type: DataType) -> Result<Op> {
    Ok(match (data_type, op) {
        (DataType::Integer, ArithmeticOp::Add) => Op::AddInt,
        (DataType::Integer, ArithmeticOp::Sub) => Op::SubInt,
        (DataType::Integer, ArithmeticOp::Mul) => Op::MulInt,
        (DataType::Integer, ArithmeticOp::Div) => Op::DivInt,
        (DataType::Integer, ArithmeticOp::Mod) => Op::ModInt,
        (DataType::Double, ArithmeticOp::Add) => Op::AddDouble,
        (DataType::Double, ArithmeticOp::Sub) => Op::SubDouble,
        (DataType::Double, ArithmeticOp::Mul) => Op::MulDouble,
        (DataType::Double, ArithmeticOp::Div) => Op::DivDouble,
        (DataType::Double, ArithmeticOp::Mod) => Op::ModDouble,
        (other, op) => {
            return Err(Error::TypeMismatch(format!(
                "operator {} is not defined for {}",
                op.symbol(),
                other
            )));
        }
    })
}

/// A program bound to its own VM
pub struct CompiledProgram {
    program: Arc<Program>,
    vm: ExprVM,
}

impl CompiledProgram {
    /// Bind a shared program to a fresh VM
    pub fn new(program: Arc<Program>) -> Self {
        let vm = ExprVM::with_capacity(program.max_stack_depth());
        Self { program, vm }
    }

    /// The underlying program
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }
}

impl CompiledExpression for CompiledProgram {
    #[inline]
    fn evaluate(&mut self, row: &Row) -> Value {
        self.vm.execute(&self.program, row)
    }
}

impl ExpressionCompiler for BytecodeCompiler {
    type Compiled = CompiledProgram;

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::BytecodeCompiler
    }

    fn compile(&self, expr: &Expr) -> Result<CompiledProgram> {
        let program = self.compile_program(expr)?;
        Ok(CompiledProgram::new(Arc::new(program)))
    }
}
