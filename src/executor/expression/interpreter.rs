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

//! Tree-walking interpreter
//!
//! The reference strategy: every row walks the whole tree and dispatches on
//! node kind and value type. The other strategies must agree with it.

use super::{CompiledExpression, ExecutionMode, ExpressionCompiler};
use crate::core::{DataType, Error, Result, Row, Value};
use crate::executor::expr::{and3, bool_value, int_to_double, negate, or3, Expr};

/// Evaluate an expression against a row
pub fn evaluate(expr: &Expr, row: &Row) -> Value {
    match expr {
        Expr::Column { index, .. } => row.get(*index).cloned().unwrap_or_default(),

        Expr::Literal { value, .. } => value.clone(),

        Expr::Arithmetic {
            op, left, right, ..
        } => {
            let l = evaluate(left, row);
            if l.is_null() {
                return Value::Null;
            }
            op.apply(&l, &evaluate(right, row))
        }

        Expr::Negate { expr, .. } => negate(&evaluate(expr, row)),

        Expr::Compare { op, left, right } => {
            let l = evaluate(left, row);
            if l.is_null() {
                return Value::Null;
            }
            op.apply(&l, &evaluate(right, row))
        }

        Expr::And(left, right) => {
            let l = evaluate(left, row).as_bool();
            if l == Some(false) {
                return Value::Boolean(false);
            }
            bool_value(and3(l, evaluate(right, row).as_bool()))
        }

        Expr::Or(left, right) => {
            let l = evaluate(left, row).as_bool();
            if l == Some(true) {
                return Value::Boolean(true);
            }
            bool_value(or3(l, evaluate(right, row).as_bool()))
        }

        Expr::Not(inner) => match evaluate(inner, row) {
            Value::Boolean(b) => Value::Boolean(!b),
            _ => Value::Null,
        },

        Expr::If {
            condition,
            then,
            otherwise,
            ..
        } => match evaluate(condition, row).as_bool() {
            Some(true) => evaluate(then, row),
            Some(false) => evaluate(otherwise, row),
            None => Value::Null,
        },

        Expr::Cast { expr, to } => {
            let value = evaluate(expr, row);
            match to {
                DataType::Double => int_to_double(&value),
                _ => value,
            }
        }

        // Rejected by InterpretedExpr::new
        Expr::Aggregate { .. } => Value::Null,
    }
}

/// Checks that a tree contains only nodes the interpreter can evaluate
fn check(expr: &Expr) -> Result<()> {
    match expr {
        Expr::Aggregate { name, .. } => Err(Error::InvalidAggregate(format!(
            "{} is not allowed in a scalar expression",
            name
        ))),
        Expr::Cast { expr: inner, to } => {
            let from = inner.data_type();
            if from != *to && !from.widens_to(*to) {
                return Err(Error::TypeMismatch(format!(
                    "cannot cast {} to {}",
                    from, to
                )));
            }
            check(inner)
        }
        other => other.children().into_iter().try_for_each(check),
    }
}

/// An expression evaluated by walking its tree
#[derive(Debug, Clone)]
pub struct InterpretedExpr {
    expr: Expr,
}

impl InterpretedExpr {
    /// Wrap a resolved expression
    pub fn new(expr: Expr) -> Result<Self> {
        check(&expr)?;
        Ok(Self { expr })
    }

    /// The wrapped expression
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl CompiledExpression for InterpretedExpr {
    #[inline]
    fn evaluate(&mut self, row: &Row) -> Value {
        evaluate(&self.expr, row)
    }
}

/// The interpreter "compiler": keeps the tree as is
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

impl ExpressionCompiler for Interpreter {
    type Compiled = InterpretedExpr;

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Interpreter
    }

    fn compile(&self, expr: &Expr) -> Result<InterpretedExpr> {
        InterpretedExpr::new(expr.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::expr::{ArithmeticOp, CompareOp};
    use crate::row;

    #[test]
    fn test_scenario_expression() {
        // foo + 10.0 * bar
        let expr = Expr::arithmetic(
            ArithmeticOp::Add,
            Expr::column(0, "foo", DataType::Double),
            Expr::arithmetic(
                ArithmeticOp::Mul,
                Expr::literal(10.0),
                Expr::column(1, "bar", DataType::Double),
            ),
        );
        assert_eq!(evaluate(&expr, &row![1.0, 2.0]), Value::double(21.0));
        assert_eq!(evaluate(&expr, &row![3.0, 4.0]), Value::double(43.0));
        assert_eq!(evaluate(&expr, &row![None::<f64>, 4.0]), Value::Null);
        assert_eq!(evaluate(&expr, &row![3.0, None::<f64>]), Value::Null);
    }

    #[test]
    fn test_if_null_condition() {
        let expr = Expr::If {
            condition: Box::new(Expr::compare(
                CompareOp::Gt,
                Expr::column(0, "x", DataType::Integer),
                Expr::literal(0i64),
            )),
            then: Box::new(Expr::literal("pos")),
            otherwise: Box::new(Expr::literal("non-pos")),
            data_type: DataType::Text,
        };
        assert_eq!(evaluate(&expr, &row![5i64]), Value::text("pos"));
        assert_eq!(evaluate(&expr, &row![-5i64]), Value::text("non-pos"));
        assert_eq!(evaluate(&expr, &row![None::<i64>]), Value::Null);
    }

    #[test]
    fn test_compile_rejects_aggregate() {
        let expr = Expr::arithmetic(
            ArithmeticOp::Add,
            Expr::literal(1.0),
            Expr::Aggregate {
                name: "SUM".to_string(),
                arg: Box::new(Expr::column(0, "foo", DataType::Double)),
                data_type: DataType::Double,
            },
        );
        assert!(matches!(
            Interpreter.compile(&expr),
            Err(Error::InvalidAggregate(_))
        ));
    }
}
