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

//! Name resolution and type checking
//!
//! Turns untyped [`AstExpr`] trees into typed [`Expr`] trees:
//!
//! - identifiers become column references into the scan's pruned schema,
//!   which lists referenced fields in first-reference order
//! - function calls become aggregate calls, checked against the registry
//! - operand types are unified; INTEGER operands paired with DOUBLE get an
//!   explicit widening cast (folded into the literal for constants)

use super::expr::{ArithmeticOp, CompareOp, Expr};
use crate::core::{DataType, Error, Field, Result, Schema, Value};
use crate::functions::FunctionRegistry;
use crate::parser::{AstExpr, BinaryOperator, UnaryOperator};

/// Clause an expression appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    Where,
}

impl Clause {
    fn as_str(&self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::Where => "WHERE",
        }
    }
}

/// Resolves expressions against one table
pub struct Resolver<'a> {
    table: &'a Schema,
    functions: &'a FunctionRegistry,
    fields: Vec<Field>,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a Schema, functions: &'a FunctionRegistry) -> Self {
        Self {
            table,
            functions,
            fields: Vec::new(),
        }
    }

    /// Fields referenced so far, in first-reference order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    /// Resolve and type-check one expression
    pub fn resolve(&mut self, expr: &AstExpr, clause: Clause) -> Result<Expr> {
        self.resolve_expr(expr, clause, false)
    }

    /// Resolve a predicate; the result must be BOOLEAN
    pub fn resolve_predicate(&mut self, expr: &AstExpr, clause: Clause) -> Result<Expr> {
        let resolved = self.resolve(expr, clause)?;
        if resolved.data_type() != DataType::Boolean {
            return Err(Error::TypeMismatch(format!(
                "{} predicate must be BOOLEAN, got {}",
                clause.as_str(),
                resolved.data_type()
            )));
        }
        Ok(resolved)
    }

    fn lookup_column(&mut self, name: &str) -> Result<Expr> {
        if let Some(idx) = self.fields.iter().position(|f| f.name == name) {
            let field = &self.fields[idx];
            return Ok(Expr::column(idx, field.name.clone(), field.data_type));
        }
        let (_, field) = self
            .table
            .lookup(name)
            .ok_or_else(|| Error::UnresolvedColumn(name.to_string()))?;
        let field = field.clone();
        let idx = self.fields.len();
        let expr = Expr::column(idx, field.name.clone(), field.data_type);
        self.fields.push(field);
        Ok(expr)
    }

    fn resolve_expr(&mut self, expr: &AstExpr, clause: Clause, in_aggregate: bool) -> Result<Expr> {
        match expr {
            AstExpr::Identifier(name) => self.lookup_column(name),
            AstExpr::IntegerLiteral(v) => Ok(Expr::literal(*v)),
            AstExpr::FloatLiteral(v) => Ok(Expr::literal(*v)),
            AstExpr::BooleanLiteral(v) => Ok(Expr::literal(*v)),
            AstExpr::StringLiteral(s) => Ok(Expr::literal(s.as_str())),
            AstExpr::Wildcard => Err(Error::InvalidArgument(
                "'*' is only valid as the argument of COUNT".to_string(),
            )),
            AstExpr::Unary { op, expr } => {
                let operand = self.resolve_expr(expr, clause, in_aggregate)?;
                resolve_unary(*op, operand)
            }
            AstExpr::Binary { op, left, right } => {
                let left = self.resolve_expr(left, clause, in_aggregate)?;
                let right = self.resolve_expr(right, clause, in_aggregate)?;
                resolve_binary(*op, left, right)
            }
            AstExpr::If {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.resolve_expr(condition, clause, in_aggregate)?;
                if condition.data_type() != DataType::Boolean {
                    return Err(Error::TypeMismatch(format!(
                        "IF condition must be BOOLEAN, got {}",
                        condition.data_type()
                    )));
                }
                let then = self.resolve_expr(then, clause, in_aggregate)?;
                let otherwise = self.resolve_expr(otherwise, clause, in_aggregate)?;
                let (then, otherwise) = unify(then, otherwise, "IF")?;
                let data_type = then.data_type();
                Ok(Expr::If {
                    condition: Box::new(condition),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                    data_type,
                })
            }
            AstExpr::Function { name, args } => {
                self.resolve_aggregate(name, args, clause, in_aggregate)
            }
        }
    }

    fn resolve_aggregate(
        &mut self,
        name: &str,
        args: &[AstExpr],
        clause: Clause,
        in_aggregate: bool,
    ) -> Result<Expr> {
        let function = self
            .functions
            .get_aggregate(name)
            .ok_or_else(|| Error::UnsupportedAggregate(name.to_string()))?;
        let canonical = function.name();

        if clause == Clause::Where {
            return Err(Error::InvalidAggregate(format!(
                "aggregate {} is not allowed in {}",
                canonical,
                clause.as_str()
            )));
        }
        if in_aggregate {
            return Err(Error::InvalidAggregate(format!(
                "aggregate {} is nested inside another aggregate",
                canonical
            )));
        }

        let arg = match args {
            [AstExpr::Wildcard] if canonical == "COUNT" => Expr::literal(1i64),
            [arg] => self.resolve_expr(arg, clause, true)?,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "{} expects 1 argument, got {}",
                    canonical,
                    args.len()
                )))
            }
        };

        let input = arg.data_type();
        if !function.supports(input) {
            return Err(Error::UnsupportedAggregate(format!("{}({})", canonical, input)));
        }
        let data_type = function.return_type(input)?;
        Ok(Expr::Aggregate {
            name: canonical.to_string(),
            arg: Box::new(arg),
            data_type,
        })
    }
}

/// Widen `expr` to `target`; literals are converted in place
pub fn widen(expr: Expr, target: DataType) -> Expr {
    if expr.data_type() == target {
        return expr;
    }
    match expr {
        Expr::Literal {
            value: Value::Integer(v),
            data_type: DataType::Integer,
        } if target == DataType::Double => Expr::literal(v as f64),
        Expr::Literal {
            value: Value::Null,
            ..
        } => Expr::typed_null(target),
        other => Expr::cast(other, target),
    }
}

/// Bring two operands to their common type
fn unify(left: Expr, right: Expr, context: &str) -> Result<(Expr, Expr)> {
    let (lt, rt) = (left.data_type(), right.data_type());
    let target = DataType::common_type(lt, rt).ok_or_else(|| {
        Error::TypeMismatch(format!("cannot apply {} to {} and {}", context, lt, rt))
    })?;
    Ok((widen(left, target), widen(right, target)))
}

fn resolve_unary(op: UnaryOperator, operand: Expr) -> Result<Expr> {
    let data_type = operand.data_type();
    match op {
        UnaryOperator::Not => {
            if data_type != DataType::Boolean {
                return Err(Error::TypeMismatch(format!("cannot apply NOT to {}", data_type)));
            }
            Ok(Expr::Not(Box::new(operand)))
        }
        UnaryOperator::Plus | UnaryOperator::Minus if !data_type.is_numeric() => Err(
            Error::TypeMismatch(format!("cannot apply unary {} to {}", op, data_type)),
        ),
        UnaryOperator::Plus => Ok(operand),
        UnaryOperator::Minus => Ok(match operand {
            Expr::Literal {
                value: Value::Integer(v),
                ..
            } => Expr::literal(v.wrapping_neg()),
            Expr::Literal {
                value: Value::Double(v),
                ..
            } => Expr::literal(-v),
            other => Expr::Negate {
                expr: Box::new(other),
                data_type,
            },
        }),
    }
}

fn resolve_binary(op: BinaryOperator, left: Expr, right: Expr) -> Result<Expr> {
    let (lt, rt) = (left.data_type(), right.data_type());
    let arithmetic = match op {
        BinaryOperator::Add => Some(ArithmeticOp::Add),
        BinaryOperator::Sub => Some(ArithmeticOp::Sub),
        BinaryOperator::Mul => Some(ArithmeticOp::Mul),
        BinaryOperator::Div => Some(ArithmeticOp::Div),
        BinaryOperator::Mod => Some(ArithmeticOp::Mod),
        _ => None,
    };
    if let Some(arith) = arithmetic {
        if !lt.is_numeric() || !rt.is_numeric() {
            return Err(Error::TypeMismatch(format!(
                "cannot apply {} to {} and {}",
                op, lt, rt
            )));
        }
        let (left, right) = unify(left, right, op.symbol())?;
        return Ok(Expr::arithmetic(arith, left, right));
    }

    let compare = match op {
        BinaryOperator::Eq => Some(CompareOp::Eq),
        BinaryOperator::Ne => Some(CompareOp::Ne),
        BinaryOperator::Lt => Some(CompareOp::Lt),
        BinaryOperator::Le => Some(CompareOp::Le),
        BinaryOperator::Gt => Some(CompareOp::Gt),
        BinaryOperator::Ge => Some(CompareOp::Ge),
        _ => None,
    };
    if let Some(cmp) = compare {
        let (left, right) = unify(left, right, op.symbol())?;
        return Ok(Expr::compare(cmp, left, right));
    }

    if lt != DataType::Boolean || rt != DataType::Boolean {
        return Err(Error::TypeMismatch(format!(
            "cannot apply {} to {} and {}",
            op, lt, rt
        )));
    }
    let (left, right) = (Box::new(left), Box::new(right));
    Ok(match op {
        BinaryOperator::Or => Expr::Or(left, right),
        _ => Expr::And(left, right),
    })
}
