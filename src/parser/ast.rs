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

//! Abstract Syntax Tree for the supported SQL subset
//!
//! ```text
//! SELECT item [, item]* FROM table [WHERE expr] [ORDER BY ordinal [ASC]]
//! ```

use std::fmt;

/// A parsed SELECT query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Select list, in order
    pub select: Vec<SelectItem>,
    /// Source table name
    pub from: String,
    /// WHERE predicate
    pub filter: Option<AstExpr>,
    /// 1-based select-list ordinal to sort by
    pub order_by: Option<usize>,
}

/// One entry of the select list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: AstExpr,
    pub alias: Option<String>,
}

impl SelectItem {
    /// Output column name: the alias, else the rendered expression
    pub fn output_name(&self) -> String {
        match (&self.alias, &self.expr) {
            (Some(alias), _) => alias.clone(),
            (None, AstExpr::Identifier(name)) => name.clone(),
            (None, expr) => expr.to_string(),
        }
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Minus => write!(f, "-"),
            UnaryOperator::Plus => write!(f, "+"),
            UnaryOperator::Not => write!(f, "NOT "),
        }
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOperator {
    /// Map an operator token to its operator
    pub fn from_token(literal: &str) -> Option<BinaryOperator> {
        let op = match literal.to_ascii_uppercase().as_str() {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "=" => BinaryOperator::Eq,
            "<>" | "!=" => BinaryOperator::Ne,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::Le,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::Ge,
            "AND" => BinaryOperator::And,
            "OR" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Untyped expression as written in the query
#[derive(Debug, Clone, PartialEq)]
pub enum AstExpr {
    Identifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    BooleanLiteral(bool),
    StringLiteral(String),
    /// `*`, only valid as the argument of COUNT
    Wildcard,
    Unary {
        op: UnaryOperator,
        expr: Box<AstExpr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<AstExpr>,
        right: Box<AstExpr>,
    },
    Function {
        name: String,
        args: Vec<AstExpr>,
    },
    If {
        condition: Box<AstExpr>,
        then: Box<AstExpr>,
        otherwise: Box<AstExpr>,
    },
}

impl AstExpr {
    pub fn binary(op: BinaryOperator, left: AstExpr, right: AstExpr) -> AstExpr {
        AstExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, expr: AstExpr) -> AstExpr {
        AstExpr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn identifier(name: impl Into<String>) -> AstExpr {
        AstExpr::Identifier(name.into())
    }

    pub fn function(name: impl Into<String>, args: Vec<AstExpr>) -> AstExpr {
        AstExpr::Function {
            name: name.into(),
            args,
        }
    }

    // nested binary operands are parenthesized, the outermost is not
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstExpr::Binary { .. } => write!(f, "({})", self),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for AstExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstExpr::Identifier(name) => write!(f, "{}", name),
            AstExpr::IntegerLiteral(v) => write!(f, "{}", v),
            AstExpr::FloatLiteral(v) => write!(f, "{:?}", v),
            AstExpr::BooleanLiteral(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
            AstExpr::StringLiteral(s) => write!(f, "'{}'", s.replace('\'', "''")),
            AstExpr::Wildcard => write!(f, "*"),
            AstExpr::Unary { op, expr } => {
                write!(f, "{}", op)?;
                expr.fmt_operand(f)
            }
            AstExpr::Binary { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
            AstExpr::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            AstExpr::If {
                condition,
                then,
                otherwise,
            } => write!(f, "IF({}, {}, {})", condition, then, otherwise),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        for (i, item) in self.select.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item.expr)?;
            if let Some(alias) = &item.alias {
                write!(f, " AS {}", alias)?;
            }
        }
        write!(f, " FROM {}", self.from)?;
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {}", filter)?;
        }
        if let Some(ordinal) = self.order_by {
            write!(f, " ORDER BY {}", ordinal)?;
        }
        Ok(())
    }
}
