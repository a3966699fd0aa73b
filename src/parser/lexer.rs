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

//! SQL Lexer (Tokenizer)

use super::token::{
    is_keyword, is_operator_char, is_punctuator, Position, Token, TokenType, OPERATORS,
};

/// SQL Lexer for tokenizing input
pub struct Lexer {
    /// Input string
    input: Vec<char>,
    /// Current position in input (points to current char)
    position: usize,
    /// Current reading position in input (after current char)
    read_position: usize,
    /// Current character under examination
    ch: char,
    /// Current position tracking
    pos: Position,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            input: input.chars().collect(),
            position: 0,
            read_position: 0,
            ch: '\0',
            pos: Position::new(0, 1, 0),
        };
        lexer.read_char();
        lexer
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }

        if self.read_position >= self.input.len() {
            self.ch = '\0';
            self.position = self.input.len();
        } else {
            self.ch = self.input[self.read_position];
            self.position = self.read_position;
        }
        self.read_position += 1;
        self.pos.offset = self.position;
    }

    fn peek_char(&self) -> char {
        self.input.get(self.read_position).copied().unwrap_or('\0')
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let pos = self.pos;
        if self.at_end() {
            return Token::eof(pos);
        }

        match self.ch {
            '\'' => match self.read_string_literal() {
                Some(literal) => Token::new(TokenType::String, literal, pos),
                None => Token::new(TokenType::Error, "unterminated string literal", pos),
            },
            '"' => match self.read_quoted_identifier() {
                Some(literal) => Token::new(TokenType::Identifier, literal, pos),
                None => Token::new(TokenType::Error, "unterminated quoted identifier", pos),
            },
            c if c.is_ascii_digit() => self.read_number(pos),
            '.' if self.peek_char().is_ascii_digit() => self.read_number(pos),
            c if c.is_alphabetic() || c == '_' => {
                let word = self.read_identifier();
                if is_keyword(&word) {
                    Token::new(TokenType::Keyword, word.to_ascii_uppercase(), pos)
                } else {
                    Token::new(TokenType::Identifier, word, pos)
                }
            }
            c if is_operator_char(c) => self.read_operator(pos),
            c if is_punctuator(c) => {
                self.read_char();
                Token::new(TokenType::Punctuator, c.to_string(), pos)
            }
            c => {
                self.read_char();
                Token::new(TokenType::Error, format!("unexpected character '{}'", c), pos)
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while !self.at_end() && self.ch.is_whitespace() {
                self.read_char();
            }
            // -- line comment
            if self.ch == '-' && self.peek_char() == '-' {
                while !self.at_end() && self.ch != '\n' {
                    self.read_char();
                }
                continue;
            }
            break;
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while !self.at_end() && (self.ch.is_alphanumeric() || self.ch == '_') {
            self.read_char();
        }
        self.input[start..self.position].iter().collect()
    }

    fn read_number(&mut self, pos: Position) -> Token {
        let start = self.position;
        let mut is_float = false;
        while !self.at_end() && self.ch.is_ascii_digit() {
            self.read_char();
        }
        if self.ch == '.' {
            is_float = true;
            self.read_char();
            while !self.at_end() && self.ch.is_ascii_digit() {
                self.read_char();
            }
        }
        if matches!(self.ch, 'e' | 'E') {
            let sign = self.peek_char();
            let digit_follows = sign.is_ascii_digit()
                || (matches!(sign, '+' | '-')
                    && self
                        .input
                        .get(self.read_position + 1)
                        .is_some_and(|c| c.is_ascii_digit()));
            if digit_follows {
                is_float = true;
                self.read_char();
                if matches!(self.ch, '+' | '-') {
                    self.read_char();
                }
                while !self.at_end() && self.ch.is_ascii_digit() {
                    self.read_char();
                }
            }
        }
        let literal: String = self.input[start..self.position].iter().collect();
        let token_type = if is_float {
            TokenType::Float
        } else {
            TokenType::Integer
        };
        Token::new(token_type, literal, pos)
    }

    /// Reads a single-quoted string; '' is an escaped quote
    fn read_string_literal(&mut self) -> Option<String> {
        let mut value = String::new();
        self.read_char();
        loop {
            if self.at_end() {
                return None;
            }
            if self.ch == '\'' {
                if self.peek_char() == '\'' {
                    value.push('\'');
                    self.read_char();
                    self.read_char();
                    continue;
                }
                self.read_char();
                return Some(value);
            }
            value.push(self.ch);
            self.read_char();
        }
    }

    fn read_quoted_identifier(&mut self) -> Option<String> {
        let mut value = String::new();
        self.read_char();
        while !self.at_end() {
            if self.ch == '"' {
                self.read_char();
                return Some(value);
            }
            value.push(self.ch);
            self.read_char();
        }
        None
    }

    fn read_operator(&mut self, pos: Position) -> Token {
        let two: String = [self.ch, self.peek_char()].iter().collect();
        for op in OPERATORS {
            if op.len() == 2 && *op == two {
                self.read_char();
                self.read_char();
                return Token::new(TokenType::Operator, *op, pos);
            }
        }
        let ch = self.ch;
        self.read_char();
        if ch == '!' {
            return Token::new(TokenType::Error, "unexpected character '!'", pos);
        }
        Token::new(TokenType::Operator, ch.to_string(), pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<(TokenType, String)> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.is_eof() {
                break;
            }
            out.push((token.token_type, token.literal));
        }
        out
    }

    #[test]
    fn test_select_statement() {
        let toks = tokens("select SUM(foo + 10*bar) from t");
        let types: Vec<TokenType> = toks.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Keyword,
                TokenType::Identifier,
                TokenType::Punctuator,
                TokenType::Identifier,
                TokenType::Operator,
                TokenType::Integer,
                TokenType::Operator,
                TokenType::Identifier,
                TokenType::Punctuator,
                TokenType::Keyword,
                TokenType::Identifier,
            ]
        );
        assert_eq!(toks[0].1, "SELECT");
        assert_eq!(toks[1].1, "SUM");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("1 2.5 .5 1e3 7"),
            vec![
                (TokenType::Integer, "1".to_string()),
                (TokenType::Float, "2.5".to_string()),
                (TokenType::Float, ".5".to_string()),
                (TokenType::Float, "1e3".to_string()),
                (TokenType::Integer, "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_strings_and_quoted_identifiers() {
        assert_eq!(
            tokens("'it''s' \"Mixed Case\""),
            vec![
                (TokenType::String, "it's".to_string()),
                (TokenType::Identifier, "Mixed Case".to_string()),
            ]
        );
        assert_eq!(tokens("'open")[0].0, TokenType::Error);
    }

    #[test]
    fn test_operators_and_comments() {
        let toks = tokens("a <= b -- trailing\n<> c != d");
        let ops: Vec<&str> = toks
            .iter()
            .filter(|(t, _)| *t == TokenType::Operator)
            .map(|(_, l)| l.as_str())
            .collect();
        assert_eq!(ops, vec!["<=", "<>", "!="]);
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new("SELECT\n  foo");
        let select = lexer.next_token();
        assert_eq!(select.position, Position::new(0, 1, 1));
        let foo = lexer.next_token();
        assert_eq!(foo.position, Position::new(9, 2, 3));
    }
}
