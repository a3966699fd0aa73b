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

//! Resolved, typed expression tree
//!
//! This is the form every evaluator back end consumes. Column references are
//! positional, every node carries its result type and implicit widening has
//! already been made explicit as [`Expr::Cast`] nodes by the resolver.
//!
//! The scalar kernels ([`ArithmeticOp::eval_int`], [`ArithmeticOp::eval_double`],
//! [`CompareOp::eval`], [`and3`], [`or3`]) are shared by the interpreter,
//! the closure compiler and the VM so the three strategies cannot drift apart.

use std::fmt;

use crate::core::{DataType, Result, Value};

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    /// SQL symbol of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
        }
    }

    /// Integer kernel. Overflow wraps; division or modulo by zero is NULL.
    #[inline(always)]
    pub fn eval_int(self, a: i64, b: i64) -> Option<i64> {
        match self {
            ArithmeticOp::Add => Some(a.wrapping_add(b)),
            ArithmeticOp::Sub => Some(a.wrapping_sub(b)),
            ArithmeticOp::Mul => Some(a.wrapping_mul(b)),
            ArithmeticOp::Div => (b != 0).then(|| a.wrapping_div(b)),
            ArithmeticOp::Mod => (b != 0).then(|| a.wrapping_rem(b)),
        }
    }

    /// Double kernel. IEEE-754 semantics, non-finite results propagate.
    #[inline(always)]
    pub fn eval_double(self, a: f64, b: f64) -> f64 {
        match self {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Sub => a - b,
            ArithmeticOp::Mul => a * b,
            ArithmeticOp::Div => a / b,
            ArithmeticOp::Mod => a % b,
        }
    }

    /// Applies the operator to two values of the same numeric type.
    ///
    /// Any NULL operand, or mismatched operand types, yields NULL.
    #[inline]
    pub fn apply(self, a: &Value, b: &Value) -> Value {
        match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => {
                self.eval_int(*x, *y).map_or(Value::Null, Value::Integer)
            }
            (Value::Double(x), Value::Double(y)) => Value::Double(self.eval_double(*x, *y)),
            _ => Value::Null,
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// SQL symbol of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Comparison kernel. For doubles NaN compares unequal to everything.
    #[inline(always)]
    pub fn eval<T: PartialOrd + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        }
    }

    /// Applies the comparison to two values of the same type.
    ///
    /// Any NULL operand, or mismatched operand types, yields NULL.
    #[inline]
    pub fn apply(self, a: &Value, b: &Value) -> Value {
        let result = match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => self.eval(x, y),
            (Value::Double(x), Value::Double(y)) => self.eval(x, y),
            (Value::Boolean(x), Value::Boolean(y)) => self.eval(x, y),
            (Value::Text(x), Value::Text(y)) => self.eval(&**x, &**y),
            _ => return Value::Null,
        };
        Value::Boolean(result)
    }
}

/// Three-valued AND: FALSE dominates NULL
#[inline(always)]
pub fn and3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

/// Three-valued OR: TRUE dominates NULL
#[inline(always)]
pub fn or3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

/// Converts a three-valued boolean into a value
#[inline(always)]
pub fn bool_value(b: Option<bool>) -> Value {
    b.map_or(Value::Null, Value::Boolean)
}

/// Widens an INTEGER value to DOUBLE; NULL stays NULL
#[inline(always)]
pub fn int_to_double(value: &Value) -> Value {
    match value {
        Value::Integer(v) => Value::Double(*v as f64),
        Value::Double(v) => Value::Double(*v),
        _ => Value::Null,
    }
}

/// Arithmetic negation; NULL stays NULL
#[inline(always)]
pub fn negate(value: &Value) -> Value {
    match value {
        Value::Integer(v) => Value::Integer(v.wrapping_neg()),
        Value::Double(v) => Value::Double(-v),
        _ => Value::Null,
    }
}

/// A resolved, typed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Positional reference into the input row
    Column {
        index: usize,
        name: String,
        data_type: DataType,
    },

    /// Constant value
    Literal { value: Value, data_type: DataType },

    /// Arithmetic over two operands of the same numeric type
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
        data_type: DataType,
    },

    /// Unary minus
    Negate { expr: Box<Expr>, data_type: DataType },

    /// Comparison of two operands of the same type, BOOLEAN result
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Three-valued AND
    And(Box<Expr>, Box<Expr>),

    /// Three-valued OR
    Or(Box<Expr>, Box<Expr>),

    /// Logical negation
    Not(Box<Expr>),

    /// IF(cond, then, else); a NULL condition yields NULL
    If {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
        data_type: DataType,
    },

    /// Implicit widening inserted by type resolution (INTEGER -> DOUBLE)
    Cast { expr: Box<Expr>, to: DataType },

    /// Aggregate call; only valid as input to the aggregate planner
    Aggregate {
        name: String,
        arg: Box<Expr>,
        data_type: DataType,
    },
}

impl Expr {
    /// Column reference
    pub fn column(index: usize, name: impl Into<String>, data_type: DataType) -> Expr {
        Expr::Column {
            index,
            name: name.into(),
            data_type,
        }
    }

    /// Literal; the type is taken from the value. A bare NULL is typed
    /// INTEGER, use [`Expr::typed_null`] for anything else.
    pub fn literal(value: impl Into<Value>) -> Expr {
        let value = value.into();
        let data_type = value.data_type().unwrap_or(DataType::Integer);
        Expr::Literal { value, data_type }
    }

    /// NULL literal of the given type
    pub fn typed_null(data_type: DataType) -> Expr {
        Expr::Literal {
            value: Value::Null,
            data_type,
        }
    }

    /// Arithmetic node; the result type is the left operand's type.
    ///
    /// Both operands must already have the same numeric type. The resolver
    /// inserts the widening casts; the kernels never convert.
    pub fn arithmetic(op: ArithmeticOp, left: Expr, right: Expr) -> Expr {
        let data_type = left.data_type();
        debug_assert_eq!(
            data_type,
            right.data_type(),
            "arithmetic operands must be unified before building {}",
            op.symbol()
        );
        Expr::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
            data_type,
        }
    }

    /// Comparison node
    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Widening cast
    pub fn cast(expr: Expr, to: DataType) -> Expr {
        Expr::Cast {
            expr: Box::new(expr),
            to,
        }
    }

    /// Result type of the expression
    pub fn data_type(&self) -> DataType {
        match self {
            Expr::Column { data_type, .. }
            | Expr::Literal { data_type, .. }
            | Expr::Arithmetic { data_type, .. }
            | Expr::Negate { data_type, .. }
            | Expr::If { data_type, .. }
            | Expr::Aggregate { data_type, .. } => *data_type,
            Expr::Compare { .. } | Expr::And(..) | Expr::Or(..) | Expr::Not(_) => {
                DataType::Boolean
            }
            Expr::Cast { to, .. } => *to,
        }
    }

    /// Direct children of this node
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Column { .. } | Expr::Literal { .. } => vec![],
            Expr::Arithmetic { left, right, .. }
            | Expr::Compare { left, right, .. }
            | Expr::And(left, right)
            | Expr::Or(left, right) => vec![&**left, &**right],
            Expr::Negate { expr, .. } | Expr::Not(expr) | Expr::Cast { expr, .. } => vec![&**expr],
            Expr::If {
                condition,
                then,
                otherwise,
                ..
            } => vec![&**condition, &**then, &**otherwise],
            Expr::Aggregate { arg, .. } => vec![&**arg],
        }
    }

    /// Number of aggregate calls in the tree
    pub fn aggregate_count(&self) -> usize {
        match self {
            Expr::Aggregate { arg, .. } => 1 + arg.aggregate_count(),
            other => other.children().iter().map(|c| c.aggregate_count()).sum(),
        }
    }

    /// Returns true if NULL in any input always yields NULL (no AND/OR/IF)
    pub fn is_null_strict(&self) -> bool {
        match self {
            Expr::And(..) | Expr::Or(..) | Expr::If { .. } => false,
            other => other.children().iter().all(|c| c.is_null_strict()),
        }
    }

    /// Depth of the tree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|c| c.depth())
            .max()
            .unwrap_or(0)
    }

    /// Returns true if the tree reads any input column
    pub fn references_columns(&self) -> bool {
        match self {
            Expr::Column { .. } => true,
            other => other.children().iter().any(|c| c.references_columns()),
        }
    }

    /// Rebuild this node with every direct child replaced by `f(child)`
    pub fn try_map_children<F>(&self, mut f: F) -> Result<Expr>
    where
        F: FnMut(&Expr) -> Result<Expr>,
    {
        let mut map = |e: &Expr| f(e).map(Box::new);
        Ok(match self {
            Expr::Column { .. } | Expr::Literal { .. } => self.clone(),
            Expr::Arithmetic {
                op,
                left,
                right,
                data_type,
            } => Expr::Arithmetic {
                op: *op,
                left: map(&**left)?,
                right: map(&**right)?,
                data_type: *data_type,
            },
            Expr::Negate { expr, data_type } => Expr::Negate {
                expr: map(&**expr)?,
                data_type: *data_type,
            },
            Expr::Compare { op, left, right } => Expr::Compare {
                op: *op,
                left: map(&**left)?,
                right: map(&**right)?,
            },
            Expr::And(l, r) => Expr::And(map(&**l)?, map(&**r)?),
            Expr::Or(l, r) => Expr::Or(map(&**l)?, map(&**r)?),
            Expr::Not(e) => Expr::Not(map(&**e)?),
            Expr::If {
                condition,
                then,
                otherwise,
                data_type,
            } => Expr::If {
                condition: map(&**condition)?,
                then: map(&**then)?,
                otherwise: map(&**otherwise)?,
                data_type: *data_type,
            },
            Expr::Cast { expr, to } => Expr::Cast {
                expr: map(&**expr)?,
                to: *to,
            },
            Expr::Aggregate {
                name,
                arg,
                data_type,
            } => Expr::Aggregate {
                name: name.clone(),
                arg: map(&**arg)?,
                data_type: *data_type,
            },
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column { name, .. } => write!(f, "{}", name),
            Expr::Literal {
                value: Value::Text(s),
                ..
            } => write!(f, "'{}'", s),
            Expr::Literal { value, .. } => write!(f, "{}", value),
            Expr::Arithmetic {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Negate { expr, .. } => write!(f, "-{}", expr),
            Expr::Compare { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::And(l, r) => write!(f, "({} AND {})", l, r),
            Expr::Or(l, r) => write!(f, "({} OR {})", l, r),
            Expr::Not(e) => write!(f, "NOT {}", e),
            Expr::If {
                condition,
                then,
                otherwise,
                ..
            } => write!(f, "IF({}, {}, {})", condition, then, otherwise),
            Expr::Cast { expr, to } => write!(f, "CAST({} AS {})", expr, to),
            Expr::Aggregate { name, arg, .. } => write!(f, "{}({})", name, arg),
        }
    }
}
