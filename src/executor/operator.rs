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

//! Volcano-style operator interface for pull-based query execution.
//!
//! ```text
//! ┌──────────────┐
//! │ Consumer     │ ← Pulls rows via next()
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Project      │ ← Evaluates compiled expressions per row
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Aggregate    │ ← Drains its child on the first next()
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Scan         │ ← Streams rows from a table
//! └──────────────┘
//! ```
//!
//! Every operator follows the same lifecycle, tracked by [`OperatorState`]:
//! `open()` once, `next()` until it yields `None`, `close()`. A closed
//! operator may be opened again and restarts from the beginning.

use crate::core::{Error, Field, Result, Row};

/// Volcano-style iterator interface for query operators.
///
/// # Thread Safety
///
/// Operators are `Send` so a tree can be moved to another thread,
/// but they are not `Sync`: they hold mutable execution state.
pub trait Operator: Send {
    /// Initialize the operator, opening children first.
    ///
    /// Fails with [`Error::InvalidOperatorState`] if already open.
    fn open(&mut self) -> Result<()>;

    /// Get the next row from this operator.
    ///
    /// Returns:
    /// - `Ok(Some(row))` - A row is available
    /// - `Ok(None)` - No more rows; repeated calls keep returning `None`
    /// - `Err(e)` - The operator is not open
    fn next(&mut self) -> Result<Option<Row>>;

    /// Close the operator and its children. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Output fields of this operator
    fn schema(&self) -> &[Field];

    /// Descriptive name (for logging and errors)
    fn name(&self) -> &str;
}

impl Operator for Box<dyn Operator> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn next(&mut self) -> Result<Option<Row>> {
        (**self).next()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn schema(&self) -> &[Field] {
        (**self).schema()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Lifecycle state of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorState {
    /// Constructed, never opened
    #[default]
    Created,
    /// Between open() and close()
    Open,
    /// Closed; may be reopened
    Closed,
}

impl OperatorState {
    /// Transition to `Open`
    pub fn open(&mut self, operator: &str) -> Result<()> {
        if *self == OperatorState::Open {
            return Err(Error::invalid_state(operator, "open() called on an open operator"));
        }
        *self = OperatorState::Open;
        Ok(())
    }

    /// Check that `next()` is allowed
    #[inline]
    pub fn check_next(&self, operator: &str) -> Result<()> {
        match self {
            OperatorState::Open => Ok(()),
            OperatorState::Created => Err(Error::invalid_state(
                operator,
                "next() called before open()",
            )),
            OperatorState::Closed => Err(Error::invalid_state(
                operator,
                "next() called after close()",
            )),
        }
    }

    /// Transition to `Closed`. Returns false if the operator was not open,
    /// in which case there is nothing to release.
    pub fn close(&mut self) -> bool {
        let was_open = *self == OperatorState::Open;
        if *self != OperatorState::Created {
            *self = OperatorState::Closed;
        }
        was_open
    }

    /// Returns true between open() and close()
    #[inline]
    pub fn is_open(&self) -> bool {
        *self == OperatorState::Open
    }
}

/// Operator that yields a fixed list of rows.
///
/// Used for pre-computed results and in tests.
pub struct MaterializedOperator {
    rows: Vec<Row>,
    schema: Vec<Field>,
    current_idx: usize,
    state: OperatorState,
}

impl MaterializedOperator {
    /// Create an operator from a vector of rows.
    pub fn new(rows: Vec<Row>, schema: Vec<Field>) -> Self {
        Self {
            rows,
            schema,
            current_idx: 0,
            state: OperatorState::Created,
        }
    }
}

impl Operator for MaterializedOperator {
    fn open(&mut self) -> Result<()> {
        self.state.open("Materialized")?;
        self.current_idx = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        self.state.check_next("Materialized")?;
        let Some(row) = self.rows.get(self.current_idx) else {
            return Ok(None);
        };
        self.current_idx += 1;
        Ok(Some(row.clone()))
    }

    fn close(&mut self) -> Result<()> {
        self.state.close();
        Ok(())
    }

    fn schema(&self) -> &[Field] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Materialized"
    }
}

/// Drives an operator through open/next/close, collecting every row.
///
/// The operator is closed even when `next()` fails.
pub fn collect(op: &mut dyn Operator) -> Result<Vec<Row>> {
    op.open()?;
    let mut rows = Vec::new();
    let drained = loop {
        match op.next() {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    let closed = op.close();
    drained?;
    closed?;
    Ok(rows)
}
