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

//! Projection operator

use crate::core::{Field, Result, Row};
use crate::executor::expression::CompiledExpression;
use crate::executor::operator::{Operator, OperatorState};

/// Evaluates one compiled expression per output column
pub struct ProjectOperator<E: CompiledExpression> {
    input: Box<dyn Operator>,
    exprs: Vec<E>,
    schema: Vec<Field>,
    state: OperatorState,
}

impl<E: CompiledExpression> ProjectOperator<E> {
    pub fn new(input: Box<dyn Operator>, exprs: Vec<E>, schema: Vec<Field>) -> Self {
        Self {
            input,
            exprs,
            schema,
            state: OperatorState::Created,
        }
    }
}

impl<E: CompiledExpression> Operator for ProjectOperator<E> {
    fn open(&mut self) -> Result<()> {
        self.state.open("Project")?;
        if let Err(e) = self.input.open() {
            self.state.close();
            return Err(e);
        }
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        self.state.check_next("Project")?;
        let Some(row) = self.input.next()? else {
            return Ok(None);
        };
        let mut out = Row::with_capacity(self.exprs.len());
        for expr in &mut self.exprs {
            out.push(expr.evaluate(&row));
        }
        Ok(Some(out))
    }

    fn close(&mut self) -> Result<()> {
        if self.state.close() {
            self.input.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[Field] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Project"
    }
}
