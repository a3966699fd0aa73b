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

//! SQL Parser
//!
//! Parses the single-table SELECT subset the engine executes:
//!
//! - [`Lexer`] - Tokenizer for SQL input
//! - [`Parser`] - Pratt parser that builds the AST from tokens
//! - [`ast`] - [`Query`] and [`AstExpr`]
//!
//! # Example
//!
//! ```
//! use queryengine::parser::parse_query;
//!
//! let query = parse_query("SELECT SUM(foo + 10 * bar) FROM t").unwrap();
//! assert_eq!(query.from, "t");
//! assert_eq!(query.select.len(), 1);
//! ```

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod precedence;
pub mod token;

pub use ast::{AstExpr, BinaryOperator, Query, SelectItem, UnaryOperator};
pub use lexer::Lexer;
pub use parser::Parser;
pub use precedence::Precedence;
pub use token::{Position, Token, TokenType};

use crate::core::Result;

/// Parse SQL text into a [`Query`]
pub fn parse_query(sql: &str) -> Result<Query> {
    let query = Parser::new(sql).parse_query()?;
    tracing::trace!(query = %query, "parsed query");
    Ok(query)
}
