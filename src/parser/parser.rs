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

//! SQL Parser - Pratt parser for the SELECT subset

use super::ast::{AstExpr, BinaryOperator, Query, SelectItem, UnaryOperator};
use super::lexer::Lexer;
use super::precedence::Precedence;
use super::token::{Token, TokenType};
use crate::core::{Error, Result};

/// SQL Parser using Pratt parsing algorithm
///
/// `cur_token` is always the next unconsumed token.
pub struct Parser {
    lexer: Lexer,
    pub(crate) cur_token: Token,
    pub(crate) peek_token: Token,
}

impl Parser {
    /// Create a new parser for the given input
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Parser {
            lexer,
            cur_token,
            peek_token,
        }
    }

    /// Parse one SELECT query, optionally terminated by a semicolon
    pub fn parse_query(&mut self) -> Result<Query> {
        self.expect_keyword("SELECT")?;

        let mut select = vec![self.parse_select_item()?];
        while self.cur_token.is_punctuator(",") {
            self.next_token();
            select.push(self.parse_select_item()?);
        }

        self.expect_keyword("FROM")?;
        let from = self.parse_name("table name")?;

        let filter = if self.cur_token.is_keyword("WHERE") {
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        let order_by = if self.cur_token.is_keyword("ORDER") {
            self.next_token();
            self.expect_keyword("BY")?;
            let ordinal = self.parse_ordinal()?;
            if self.cur_token.is_keyword("ASC") {
                self.next_token();
            }
            Some(ordinal)
        } else {
            None
        };

        if self.cur_token.is_punctuator(";") {
            self.next_token();
        }
        if !self.cur_token.is_eof() {
            return Err(self.unexpected("end of query"));
        }

        Ok(Query {
            select,
            from,
            filter,
            order_by,
        })
    }

    /// Parse an expression binding tighter than `precedence`
    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<AstExpr> {
        let mut left = self.parse_prefix_expression()?;

        while precedence < self.cur_precedence() {
            let token = self.advance();
            let op = BinaryOperator::from_token(&token.literal).ok_or_else(|| {
                Error::parse(format!("unknown operator {}", token), token.position.offset)
            })?;
            let right = self.parse_expression(Precedence::for_operator(&token.literal))?;
            left = AstExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    /// Consume the current token and return it
    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let peek = std::mem::replace(&mut self.peek_token, next);
        std::mem::replace(&mut self.cur_token, peek)
    }

    fn cur_precedence(&self) -> Precedence {
        match self.cur_token.token_type {
            TokenType::Operator => Precedence::for_operator(&self.cur_token.literal),
            TokenType::Keyword
                if self.cur_token.is_keyword("AND") || self.cur_token.is_keyword("OR") =>
            {
                Precedence::for_operator(&self.cur_token.literal)
            }
            _ => Precedence::Lowest,
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = &self.cur_token;
        let message = match token.token_type {
            TokenType::Error => token.literal.clone(),
            _ => format!("expected {}, found {}", expected, token),
        };
        Error::parse(message, token.position.offset)
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.cur_token.is_keyword(keyword) {
            self.next_token();
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect_punctuator(&mut self, punct: &str) -> Result<()> {
        if self.cur_token.is_punctuator(punct) {
            self.next_token();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", punct)))
        }
    }

    fn parse_name(&mut self, what: &str) -> Result<String> {
        if self.cur_token.token_type == TokenType::Identifier {
            Ok(self.advance().literal)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn parse_ordinal(&mut self) -> Result<usize> {
        if self.cur_token.token_type != TokenType::Integer {
            return Err(self.unexpected("select-list ordinal"));
        }
        let token = self.advance();
        token.literal.parse::<usize>().map_err(|_| {
            Error::parse(
                format!("invalid ordinal '{}'", token.literal),
                token.position.offset,
            )
        })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        let alias = if self.cur_token.is_keyword("AS") {
            self.next_token();
            Some(self.parse_name("alias")?)
        } else if self.cur_token.token_type == TokenType::Identifier {
            Some(self.advance().literal)
        } else {
            None
        };
        Ok(SelectItem { expr, alias })
    }

    fn parse_prefix_expression(&mut self) -> Result<AstExpr> {
        match self.cur_token.token_type {
            TokenType::Identifier => {
                let name = self.advance().literal;
                if self.cur_token.is_punctuator("(") {
                    let args = self.parse_call_arguments()?;
                    Ok(AstExpr::Function { name, args })
                } else {
                    Ok(AstExpr::Identifier(name))
                }
            }
            TokenType::Integer => {
                let token = self.advance();
                token.literal.parse::<i64>().map(AstExpr::IntegerLiteral).map_err(|_| {
                    Error::parse(
                        format!("integer literal {} out of range", token.literal),
                        token.position.offset,
                    )
                })
            }
            TokenType::Float => {
                let token = self.advance();
                token.literal.parse::<f64>().map(AstExpr::FloatLiteral).map_err(|_| {
                    Error::parse(
                        format!("invalid number {}", token.literal),
                        token.position.offset,
                    )
                })
            }
            TokenType::String => Ok(AstExpr::StringLiteral(self.advance().literal)),
            TokenType::Keyword => self.parse_keyword_expression(),
            TokenType::Operator
                if self.cur_token.is_operator("-") || self.cur_token.is_operator("+") =>
            {
                let op = if self.advance().literal == "-" {
                    UnaryOperator::Minus
                } else {
                    UnaryOperator::Plus
                };
                let expr = self.parse_expression(Precedence::Prefix)?;
                Ok(AstExpr::unary(op, expr))
            }
            TokenType::Punctuator if self.cur_token.is_punctuator("(") => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect_punctuator(")")?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_keyword_expression(&mut self) -> Result<AstExpr> {
        match self.cur_token.literal.as_str() {
            "TRUE" | "FALSE" => {
                let value = self.advance().literal == "TRUE";
                Ok(AstExpr::BooleanLiteral(value))
            }
            "NOT" => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Not)?;
                Ok(AstExpr::unary(UnaryOperator::Not, expr))
            }
            "IF" => {
                let position = self.advance().position.offset;
                let mut args = self.parse_call_arguments()?;
                if args.len() != 3 {
                    return Err(Error::parse(
                        format!("IF expects 3 arguments, got {}", args.len()),
                        position,
                    ));
                }
                let otherwise = args.pop();
                let then = args.pop();
                let condition = args.pop();
                match (condition, then, otherwise) {
                    (Some(condition), Some(then), Some(otherwise)) => Ok(AstExpr::If {
                        condition: Box::new(condition),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    }),
                    _ => Err(Error::parse("IF expects 3 arguments", position)),
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parses `( [arg [, arg]*] )`; a lone `*` becomes a wildcard argument
    fn parse_call_arguments(&mut self) -> Result<Vec<AstExpr>> {
        self.expect_punctuator("(")?;
        let mut args = Vec::new();
        if self.cur_token.is_punctuator(")") {
            self.next_token();
            return Ok(args);
        }
        if self.cur_token.is_operator("*") && self.peek_token.is_punctuator(")") {
            self.next_token();
            self.next_token();
            args.push(AstExpr::Wildcard);
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression(Precedence::Lowest)?);
            if self.cur_token.is_punctuator(",") {
                self.next_token();
                continue;
            }
            self.expect_punctuator(")")?;
            return Ok(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(sql: &str) -> AstExpr {
        Parser::new(sql)
            .parse_expression(Precedence::Lowest)
            .unwrap()
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(expr("foo + 10 * bar").to_string(), "foo + (10 * bar)");
        assert_eq!(expr("(foo + 10) * bar").to_string(), "(foo + 10) * bar");
        assert_eq!(expr("a - b - c").to_string(), "(a - b) - c");
        assert_eq!(expr("-a * b").to_string(), "-a * b");
    }

    #[test]
    fn test_logical_precedence() {
        assert_eq!(
            expr("a OR b AND NOT c").to_string(),
            "a OR (b AND NOT c)"
        );
        assert_eq!(expr("a < 1 = TRUE").to_string(), "(a < 1) = TRUE");
        assert_eq!(
            expr("x + 1 > y AND y <> 2").to_string(),
            "((x + 1) > y) AND (y <> 2)"
        );
    }

    #[test]
    fn test_functions() {
        assert_eq!(
            expr("count(*)"),
            AstExpr::function("count", vec![AstExpr::Wildcard])
        );
        assert_eq!(
            expr("IF(a > 0, 1, 2)").to_string(),
            "IF(a > 0, 1, 2)"
        );
        assert!(Parser::new("IF(a, 1)")
            .parse_expression(Precedence::Lowest)
            .is_err());
    }

    #[test]
    fn test_full_query() {
        let query = Parser::new("SELECT foo, SUM(bar) AS total FROM t WHERE bar > 0 ORDER BY 2;")
            .parse_query()
            .unwrap();
        assert_eq!(query.select.len(), 2);
        assert_eq!(query.select[1].alias.as_deref(), Some("total"));
        assert_eq!(query.from, "t");
        assert!(query.filter.is_some());
        assert_eq!(query.order_by, Some(2));
    }

    #[test]
    fn test_error_positions() {
        let err = Parser::new("SELECT foo bar baz FROM t").parse_query().unwrap_err();
        assert_eq!(
            err,
            Error::parse("expected FROM, found 'baz'", 15)
        );
        let err = Parser::new("SELECT 1 +").parse_query().unwrap_err();
        assert!(matches!(err, Error::Parse { position: 10, .. }));
        let err = Parser::new("SELECT foo FROM").parse_query().unwrap_err();
        assert!(matches!(err, Error::Parse { message, .. } if message.contains("table name")));
    }
}
