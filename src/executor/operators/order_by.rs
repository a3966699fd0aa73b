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

//! ORDER BY operator

use std::cmp::Ordering;

use crate::core::{Field, Result, Row};
use crate::executor::operator::{Operator, OperatorState};

/// Materializes its input and yields it sorted ascending on one column.
///
/// The sort is stable and NULLs sort first.
pub struct OrderByOperator {
    input: Box<dyn Operator>,
    column: usize,
    rows: Vec<Row>,
    position: usize,
    sorted: bool,
    state: OperatorState,
}

impl OrderByOperator {
    pub fn new(input: Box<dyn Operator>, column: usize) -> Self {
        Self {
            input,
            column,
            rows: Vec::new(),
            position: 0,
            sorted: false,
            state: OperatorState::Created,
        }
    }

    fn compare(column: usize, a: &Row, b: &Row) -> Ordering {
        match (a.get(column), b.get(column)) {
            (Some(x), Some(y)) => x.sort_cmp(y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Operator for OrderByOperator {
    fn open(&mut self) -> Result<()> {
        self.state.open("OrderBy")?;
        if let Err(e) = self.input.open() {
            self.state.close();
            return Err(e);
        }
        self.rows.clear();
        self.position = 0;
        self.sorted = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        self.state.check_next("OrderBy")?;
        if !self.sorted {
            while let Some(row) = self.input.next()? {
                self.rows.push(row);
            }
            let column = self.column;
            self.rows.sort_by(|a, b| Self::compare(column, a, b));
            self.sorted = true;
            tracing::trace!(rows = self.rows.len(), column, "order by materialized input");
        }

        let Some(row) = self.rows.get_mut(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(std::mem::take(row)))
    }

    fn close(&mut self) -> Result<()> {
        if self.state.close() {
            self.rows.clear();
            self.input.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[Field] {
        self.input.schema()
    }

    fn name(&self) -> &str {
        "OrderBy"
    }
}
