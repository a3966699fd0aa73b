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

//! Token types for the SQL lexer

use std::fmt;

/// Position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Character offset, starting at 0
    pub offset: usize,
    /// Line number, starting at 1
    pub line: usize,
    /// Column number, starting at 1
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Kind of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Lexing failed; the literal holds the offending text
    Error,
    /// End of input
    Eof,
    /// Table, column or function name
    Identifier,
    /// Reserved word (SELECT, FROM, ...)
    Keyword,
    /// String literal ('hello')
    String,
    /// Integer number (123)
    Integer,
    /// Floating point number (123.45)
    Float,
    /// Operator (=, <, +, ...)
    Operator,
    /// Comma, semicolon, parentheses
    Punctuator,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Error => write!(f, "ERROR"),
            TokenType::Eof => write!(f, "EOF"),
            TokenType::Identifier => write!(f, "IDENTIFIER"),
            TokenType::Keyword => write!(f, "KEYWORD"),
            TokenType::String => write!(f, "STRING"),
            TokenType::Integer => write!(f, "INTEGER"),
            TokenType::Float => write!(f, "FLOAT"),
            TokenType::Operator => write!(f, "OPERATOR"),
            TokenType::Punctuator => write!(f, "PUNCTUATOR"),
        }
    }
}

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of the token
    pub token_type: TokenType,
    /// The literal text; unquoted for strings, upper case for keywords
    pub literal: String,
    /// The position in the source
    pub position: Position,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, literal: impl Into<String>, position: Position) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position,
        }
    }

    /// Create an EOF token
    pub fn eof(position: Position) -> Self {
        Self::new(TokenType::Eof, "", position)
    }

    /// Check if this is an EOF token
    pub fn is_eof(&self) -> bool {
        self.token_type == TokenType::Eof
    }

    /// Check if this is a keyword with the given value
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.literal.eq_ignore_ascii_case(keyword)
    }

    /// Check if this is an operator with the given value
    pub fn is_operator(&self, op: &str) -> bool {
        self.token_type == TokenType::Operator && self.literal == op
    }

    /// Check if this is a punctuator with the given value
    pub fn is_punctuator(&self, punct: &str) -> bool {
        self.token_type == TokenType::Punctuator && self.literal == punct
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::Eof => write!(f, "end of input"),
            TokenType::Keyword => write!(f, "{}", self.literal),
            _ => write!(f, "'{}'", self.literal),
        }
    }
}

/// SQL keywords (case-insensitive)
pub static KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "ORDER", "BY", "AS", "AND", "OR", "NOT", "TRUE", "FALSE", "IF",
    "ASC",
];

/// Operators, longest first so the lexer can match greedily
pub static OPERATORS: &[&str] = &[
    "<=", ">=", "<>", "!=", "=", "<", ">", "+", "-", "*", "/", "%",
];

/// Returns true if the word is a keyword
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Returns true if the character can start an operator
pub fn is_operator_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | '=' | '!' | '+' | '-' | '*' | '/' | '%')
}

/// Returns true if the character is a punctuator
pub fn is_punctuator(ch: char) -> bool {
    matches!(ch, ',' | ';' | '(' | ')')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert!(is_keyword("select"));
        assert!(is_keyword("Order"));
        assert!(!is_keyword("foo"));
        assert!(!is_keyword("sum"));
    }

    #[test]
    fn test_token_predicates() {
        let pos = Position::new(0, 1, 1);
        assert!(Token::new(TokenType::Keyword, "FROM", pos).is_keyword("from"));
        assert!(Token::new(TokenType::Operator, "<=", pos).is_operator("<="));
        assert!(Token::new(TokenType::Punctuator, "(", pos).is_punctuator("("));
        assert!(Token::eof(pos).is_eof());
    }
}
