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

//! Operator precedence levels for the Pratt parser

/// Precedence levels (higher number = higher precedence)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Precedence {
    /// Lowest precedence
    #[default]
    Lowest = 1,
    /// Logical OR
    Or = 2,
    /// Logical AND
    And = 3,
    /// NOT operator
    Not = 4,
    /// Equality (=, <>, !=)
    Equals = 5,
    /// Ordering comparisons (<, >, <=, >=)
    LessGreater = 6,
    /// Addition and subtraction (+, -)
    Sum = 7,
    /// Multiplication and division (*, /, %)
    Product = 8,
    /// Prefix operators (-, +)
    Prefix = 9,
}

impl Precedence {
    /// Get precedence for an infix operator
    pub fn for_operator(op: &str) -> Precedence {
        match op.to_ascii_uppercase().as_str() {
            "OR" => Precedence::Or,
            "AND" => Precedence::And,
            "NOT" => Precedence::Not,
            "=" | "<>" | "!=" => Precedence::Equals,
            "<" | ">" | "<=" | ">=" => Precedence::LessGreater,
            "+" | "-" => Precedence::Sum,
            "*" | "/" | "%" => Precedence::Product,
            _ => Precedence::Lowest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(Precedence::Product > Precedence::Sum);
        assert!(Precedence::Sum > Precedence::LessGreater);
        assert!(Precedence::LessGreater > Precedence::Equals);
        assert!(Precedence::And > Precedence::Or);
        assert!(Precedence::Prefix > Precedence::Product);
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(Precedence::for_operator("+"), Precedence::Sum);
        assert_eq!(Precedence::for_operator("%"), Precedence::Product);
        assert_eq!(Precedence::for_operator("and"), Precedence::And);
        assert_eq!(Precedence::for_operator("OR"), Precedence::Or);
        assert_eq!(Precedence::for_operator("<>"), Precedence::Equals);
        assert_eq!(Precedence::for_operator(","), Precedence::Lowest);
    }
}
