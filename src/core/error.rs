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

//! Error types for the query engine
//!
//! Every planning-time failure is reported synchronously by the planner,
//! before an operator produces its first row. The only failures that can
//! surface while rows are being pulled are operator state violations.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the query engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Planning errors
    // =========================================================================
    /// The query references a table that is not registered
    #[error("table '{0}' not found")]
    UnknownTable(String),

    /// An expression references a column absent from the resolved schema
    #[error("column '{0}' not found")]
    UnresolvedColumn(String),

    /// The named aggregate function is not implemented
    #[error("unsupported aggregate function: {0}")]
    UnsupportedAggregate(String),

    /// Operand types of an operation cannot be unified by widening
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Aggregate used where it is not allowed (WHERE clause, nested aggregate)
    #[error("invalid aggregate: {0}")]
    InvalidAggregate(String),

    // =========================================================================
    // Execution errors
    // =========================================================================
    /// Operator lifecycle violation, e.g. next() before open()
    #[error("invalid operator state: {0}")]
    InvalidOperatorState(String),

    // =========================================================================
    // Input errors
    // =========================================================================
    /// SQL text could not be parsed
    #[error("parse error at offset {position}: {message}")]
    Parse { message: String, position: usize },

    /// Duplicate field name in a schema
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Invalid argument passed to an API
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create a parse error
    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        Error::Parse {
            message: message.into(),
            position,
        }
    }

    /// Create an operator state error
    pub fn invalid_state(operator: &str, message: &str) -> Self {
        Error::InvalidOperatorState(format!("{}: {}", operator, message))
    }

    /// Returns true if this error is raised while building a plan
    pub fn is_planning_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownTable(_)
                | Error::UnresolvedColumn(_)
                | Error::UnsupportedAggregate(_)
                | Error::TypeMismatch(_)
                | Error::InvalidAggregate(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::UnknownTable("trips".to_string()).to_string(),
            "table 'trips' not found"
        );
        assert_eq!(
            Error::UnresolvedColumn("foo".to_string()).to_string(),
            "column 'foo' not found"
        );
        assert_eq!(
            Error::parse("unexpected token", 7).to_string(),
            "parse error at offset 7: unexpected token"
        );
        assert_eq!(
            Error::invalid_state("Scan", "operator not open").to_string(),
            "invalid operator state: Scan: operator not open"
        );
    }

    #[test]
    fn test_planning_classification() {
        assert!(Error::UnsupportedAggregate("MEDIAN".into()).is_planning_error());
        assert!(Error::TypeMismatch("TEXT + DOUBLE".into()).is_planning_error());
        assert!(!Error::InvalidOperatorState("x".into()).is_planning_error());
        assert!(!Error::parse("x", 0).is_planning_error());
    }
}
