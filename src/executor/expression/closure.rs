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

//! Closure compiler
//!
//! Compiles an [`Expr`] once into a tree of boxed closures. Node kind,
//! operator and operand type are resolved here, each into its own
//! monomorphized closure, so evaluation only checks for NULL.
//!
//! Binary nodes whose operands are plain columns or literals get
//! dedicated closures that read the row directly instead of calling
//! a child closure.

use super::{CompiledExpression, ExecutionMode, ExpressionCompiler};
use crate::core::{DataType, Error, Result, Row, Value};
use crate::executor::expr::{and3, bool_value, or3, ArithmeticOp, CompareOp, Expr};

/// A compiled row evaluator
pub type EvalFn = Box<dyn Fn(&Row) -> Value + Send + Sync>;

/// Scalar payloads that closures operate on unboxed
trait Scalar: Copy + Send + Sync + 'static {
    fn extract(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
}

impl Scalar for i64 {
    #[inline(always)]
    fn extract(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl Scalar for f64 {
    #[inline(always)]
    fn extract(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl Scalar for bool {
    #[inline(always)]
    fn extract(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

/// Shape of a binary operand, decided at compile time
enum Operand<T> {
    Column(usize),
    Const(T),
    Null,
    Dynamic(EvalFn),
}

impl<T: Scalar> Operand<T> {
    fn into_fn(self) -> EvalFn {
        match self {
            Operand::Column(idx) => column(idx),
            Operand::Const(c) => constant(c.into_value()),
            Operand::Null => constant(Value::Null),
            Operand::Dynamic(f) => f,
        }
    }
}

fn column(idx: usize) -> EvalFn {
    Box::new(move |row| row.get(idx).cloned().unwrap_or_default())
}

fn constant(value: Value) -> EvalFn {
    Box::new(move |_| value.clone())
}

/// Builds a binary closure specialized for the operand shapes.
/// `kernel` only sees non-NULL operands.
fn binary<T, K>(left: Operand<T>, right: Operand<T>, kernel: K) -> EvalFn
where
    T: Scalar,
    K: Fn(T, T) -> Value + Send + Sync + 'static,
{
    match (left, right) {
        (Operand::Null, _) | (_, Operand::Null) => constant(Value::Null),

        (Operand::Column(l), Operand::Column(r)) => Box::new(move |row| {
            match (
                row.get(l).and_then(T::extract),
                row.get(r).and_then(T::extract),
            ) {
                (Some(a), Some(b)) => kernel(a, b),
                _ => Value::Null,
            }
        }),

        (Operand::Column(l), Operand::Const(c)) => {
            Box::new(move |row| match row.get(l).and_then(T::extract) {
                Some(a) => kernel(a, c),
                None => Value::Null,
            })
        }

        (Operand::Const(c), Operand::Column(r)) => {
            Box::new(move |row| match row.get(r).and_then(T::extract) {
                Some(b) => kernel(c, b),
                None => Value::Null,
            })
        }

        (Operand::Const(a), Operand::Const(b)) => constant(kernel(a, b)),

        (Operand::Dynamic(l), Operand::Const(c)) => {
            Box::new(move |row| match T::extract(&l(row)) {
                Some(a) => kernel(a, c),
                None => Value::Null,
            })
        }

        (left, right) => {
            let l = left.into_fn();
            let r = right.into_fn();
            Box::new(move |row| {
                let Some(a) = T::extract(&l(row)) else {
                    return Value::Null;
                };
                match T::extract(&r(row)) {
                    Some(b) => kernel(a, b),
                    None => Value::Null,
                }
            })
        }
    }
}

/// Dispatches an arithmetic operator to a monomorphized closure
macro_rules! arithmetic_closure {
    ($op:expr, $l:expr, $r:expr, int) => {
        match $op {
            ArithmeticOp::Add => binary::<i64, _>($l, $r, |a, b| int_result(ArithmeticOp::Add.eval_int(a, b))),
            ArithmeticOp::Sub => binary::<i64, _>($l, $r, |a, b| int_result(ArithmeticOp::Sub.eval_int(a, b))),
            ArithmeticOp::Mul => binary::<i64, _>($l, $r, |a, b| int_result(ArithmeticOp::Mul.eval_int(a, b))),
            ArithmeticOp::Div => binary::<i64, _>($l, $r, |a, b| int_result(ArithmeticOp::Div.eval_int(a, b))),
            ArithmeticOp::Mod => binary::<i64, _>($l, $r, |a, b| int_result(ArithmeticOp::Mod.eval_int(a, b))),
        }
    };
    ($op:expr, $l:expr, $r:expr, double) => {
        match $op {
            ArithmeticOp::Add => binary::<f64, _>($l, $r, |a, b| Value::Double(a + b)),
            ArithmeticOp::Sub => binary::<f64, _>($l, $r, |a, b| Value::Double(a - b)),
            ArithmeticOp::Mul => binary::<f64, _>($l, $r, |a, b| Value::Double(a * b)),
            ArithmeticOp::Div => binary::<f64, _>($l, $r, |a, b| Value::Double(a / b)),
            ArithmeticOp::Mod => binary::<f64, _>($l, $r, |a, b| Value::Double(a % b)),
        }
    };
}

/// Dispatches a comparison operator to a monomorphized closure
macro_rules! compare_closure {
    ($ty:ty, $op:expr, $l:expr, $r:expr) => {
        match $op {
            CompareOp::Eq => binary::<$ty, _>($l, $r, |a, b| Value::Boolean(CompareOp::Eq.eval(&a, &b))),
            CompareOp::Ne => binary::<$ty, _>($l, $r, |a, b| Value::Boolean(CompareOp::Ne.eval(&a, &b))),
            CompareOp::Lt => binary::<$ty, _>($l, $r, |a, b| Value::Boolean(CompareOp::Lt.eval(&a, &b))),
            CompareOp::Le => binary::<$ty, _>($l, $r, |a, b| Value::Boolean(CompareOp::Le.eval(&a, &b))),
            CompareOp::Gt => binary::<$ty, _>($l, $r, |a, b| Value::Boolean(CompareOp::Gt.eval(&a, &b))),
            CompareOp::Ge => binary::<$ty, _>($l, $r, |a, b| Value::Boolean(CompareOp::Ge.eval(&a, &b))),
        }
    };
}

#[inline(always)]
fn int_result(v: Option<i64>) -> Value {
    v.map_or(Value::Null, Value::Integer)
}

/// Compiles expressions into closures
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosureCompiler;

impl ClosureCompiler {
    /// Compile an expression into a row evaluator
    pub fn compile_fn(&self, expr: &Expr) -> Result<EvalFn> {
        let compiled: EvalFn = match expr {
            Expr::Column { index, .. } => column(*index),

            Expr::Literal { value, .. } => constant(value.clone()),

            Expr::Arithmetic {
                op,
                left,
                right,
                data_type,
            } => match data_type {
                DataType::Integer => {
                    let (l, r) = (self.operand(left)?, self.operand(right)?);
                    arithmetic_closure!(op, l, r, int)
                }
                DataType::Double => {
                    let (l, r) = (self.operand(left)?, self.operand(right)?);
                    arithmetic_closure!(op, l, r, double)
                }
                other => {
                    return Err(Error::TypeMismatch(format!(
                        "operator {} is not defined for {}",
                        op.symbol(),
                        other
                    )));
                }
            },

            Expr::Negate { expr, data_type } => {
                let inner = self.compile_fn(expr)?;
                match data_type {
                    DataType::Integer => Box::new(move |row| match inner(row) {
                        Value::Integer(v) => Value::Integer(v.wrapping_neg()),
                        _ => Value::Null,
                    }),
                    DataType::Double => Box::new(move |row| match inner(row) {
                        Value::Double(v) => Value::Double(-v),
                        _ => Value::Null,
                    }),
                    other => {
                        return Err(Error::TypeMismatch(format!("cannot negate {}", other)));
                    }
                }
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
                match data_type {
                    DataType::Integer => {
                        let (l, r) = (self.operand::<i64>(left)?, self.operand(right)?);
                        compare_closure!(i64, op, l, r)
                    }
                    DataType::Double => {
                        let (l, r) = (self.operand::<f64>(left)?, self.operand(right)?);
                        compare_closure!(f64, op, l, r)
                    }
                    DataType::Boolean => {
                        let (l, r) = (self.operand::<bool>(left)?, self.operand(right)?);
                        compare_closure!(bool, op, l, r)
                    }
                    DataType::Text => self.compile_text_compare(*op, left, right)?,
                }
            }

            Expr::And(left, right) => {
                let l = self.compile_fn(left)?;
                let r = self.compile_fn(right)?;
                Box::new(move |row| {
                    let a = l(row).as_bool();
                    if a == Some(false) {
                        return Value::Boolean(false);
                    }
                    bool_value(and3(a, r(row).as_bool()))
                })
            }

            Expr::Or(left, right) => {
                let l = self.compile_fn(left)?;
                let r = self.compile_fn(right)?;
                Box::new(move |row| {
                    let a = l(row).as_bool();
                    if a == Some(true) {
                        return Value::Boolean(true);
                    }
                    bool_value(or3(a, r(row).as_bool()))
                })
            }

            Expr::Not(inner) => {
                let inner = self.compile_fn(inner)?;
                Box::new(move |row| match inner(row) {
                    Value::Boolean(b) => Value::Boolean(!b),
                    _ => Value::Null,
                })
            }

            Expr::If {
                condition,
                then,
                otherwise,
                ..
            } => {
                let c = self.compile_fn(condition)?;
                let t = self.compile_fn(then)?;
                let e = self.compile_fn(otherwise)?;
                Box::new(move |row| match c(row) {
                    Value::Boolean(true) => t(row),
                    Value::Boolean(false) => e(row),
                    _ => Value::Null,
                })
            }

            Expr::Cast { expr: inner, to } => {
                let from = inner.data_type();
                match (from, to) {
                    (f, t) if f == *t => self.compile_fn(inner)?,
                    (DataType::Integer, DataType::Double) => match inner.as_ref() {
                        Expr::Column { index, .. } => {
                            let idx = *index;
                            Box::new(move |row| match row.get(idx) {
                                Some(Value::Integer(v)) => Value::Double(*v as f64),
                                _ => Value::Null,
                            })
                        }
                        _ => {
                            let f = self.compile_fn(inner)?;
                            Box::new(move |row| match f(row) {
                                Value::Integer(v) => Value::Double(v as f64),
                                _ => Value::Null,
                            })
                        }
                    },
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
        };
        Ok(compiled)
    }

    /// Classify a binary operand
    fn operand<T: Scalar>(&self, expr: &Expr) -> Result<Operand<T>> {
        Ok(match expr {
            Expr::Column { index, .. } => Operand::Column(*index),
            Expr::Literal { value, .. } => match T::extract(value) {
                Some(c) => Operand::Const(c),
                None => Operand::Null,
            },
            other => Operand::Dynamic(self.compile_fn(other)?),
        })
    }

    fn compile_text_compare(&self, op: CompareOp, left: &Expr, right: &Expr) -> Result<EvalFn> {
        let l = self.compile_fn(left)?;
        let r = self.compile_fn(right)?;
        macro_rules! text_cmp {
            ($cmp:expr) => {
                Box::new(move |row: &Row| match (l(row), r(row)) {
                    (Value::Text(a), Value::Text(b)) => Value::Boolean($cmp.eval(&*a, &*b)),
                    _ => Value::Null,
                }) as EvalFn
            };
        }
        Ok(match op {
            CompareOp::Eq => text_cmp!(CompareOp::Eq),
            CompareOp::Ne => text_cmp!(CompareOp::Ne),
            CompareOp::Lt => text_cmp!(CompareOp::Lt),
            CompareOp::Le => text_cmp!(CompareOp::Le),
            CompareOp::Gt => text_cmp!(CompareOp::Gt),
            CompareOp::Ge => text_cmp!(CompareOp::Ge),
        })
    }
}

/// A compiled closure tree
pub struct CompiledClosure {
    f: EvalFn,
}

impl CompiledClosure {
    /// Wrap a row evaluator
    pub fn new(f: EvalFn) -> Self {
        Self { f }
    }
}

impl CompiledExpression for CompiledClosure {
    #[inline]
    fn evaluate(&mut self, row: &Row) -> Value {
        (self.f)(row)
    }
}

impl ExpressionCompiler for ClosureCompiler {
    type Compiled = CompiledClosure;

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::ClosureCompiler
    }

    fn compile(&self, expr: &Expr) -> Result<CompiledClosure> {
        tracing::trace!(expr = %expr, "compiling closure tree");
        self.compile_fn(expr).map(CompiledClosure::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn compile(expr: &Expr) -> EvalFn {
        ClosureCompiler.compile_fn(expr).unwrap()
    }

    #[test]
    fn test_column_const_specializations() {
        let c = || Expr::column(0, "x", DataType::Integer);
        let col_const = compile(&Expr::arithmetic(ArithmeticOp::Sub, c(), Expr::literal(3i64)));
        let const_col = compile(&Expr::arithmetic(ArithmeticOp::Sub, Expr::literal(3i64), c()));
        assert_eq!(col_const(&row![10i64]), Value::integer(7));
        assert_eq!(const_col(&row![10i64]), Value::integer(-7));
        assert_eq!(col_const(&row![None::<i64>]), Value::Null);
    }

    #[test]
    fn test_constant_folding_of_literal_operands() {
        let f = compile(&Expr::arithmetic(
            ArithmeticOp::Mul,
            Expr::literal(6.0),
            Expr::literal(7.0),
        ));
        assert_eq!(f(&Row::new()), Value::double(42.0));

        let null = compile(&Expr::arithmetic(
            ArithmeticOp::Add,
            Expr::column(0, "x", DataType::Double),
            Expr::typed_null(DataType::Double),
        ));
        assert_eq!(null(&row![1.0]), Value::Null);
    }

    #[test]
    fn test_division_by_zero_is_null() {
        let f = compile(&Expr::arithmetic(
            ArithmeticOp::Div,
            Expr::column(0, "x", DataType::Integer),
            Expr::column(1, "y", DataType::Integer),
        ));
        assert_eq!(f(&row![7i64, 2i64]), Value::integer(3));
        assert_eq!(f(&row![7i64, 0i64]), Value::Null);
    }

    #[test]
    fn test_text_comparison() {
        let f = compile(&Expr::compare(
            CompareOp::Lt,
            Expr::column(0, "s", DataType::Text),
            Expr::literal("m"),
        ));
        assert_eq!(f(&row!["a"]), Value::boolean(true));
        assert_eq!(f(&row!["z"]), Value::boolean(false));
        assert_eq!(f(&row![None::<&str>]), Value::Null);
    }

    #[test]
    fn test_widening_cast_of_column() {
        let f = compile(&Expr::cast(
            Expr::column(0, "i", DataType::Integer),
            DataType::Double,
        ));
        assert_eq!(f(&row![4i64]), Value::double(4.0));
        assert_eq!(f(&row![None::<i64>]), Value::Null);
    }
}
