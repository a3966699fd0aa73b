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

//! Filter operator

use crate::core::{Field, Result, Row, Value};
use crate::executor::expression::CompiledExpression;
use crate::executor::operator::{Operator, OperatorState};

/// Yields the child rows whose predicate evaluates to TRUE.
///
/// FALSE and NULL both drop the row.
pub struct FilterOperator<E: CompiledExpression> {
    input: Box<dyn Operator>,
    predicate: E,
    state: OperatorState,
}

impl<E: CompiledExpression> FilterOperator<E> {
    pub fn new(input: Box<dyn Operator>, predicate: E) -> Self {
        Self {
            input,
            predicate,
            state: OperatorState::Created,
        }
    }
}

impl<E: CompiledExpression> Operator for FilterOperator<E> {
    fn open(&mut self) -> Result<()> {
        self.state.open("Filter")?;
        if let Err(e) = self.input.open() {
            self.state.close();
            return Err(e);
        }
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        self.state.check_next("Filter")?;
        while let Some(row) = self.input.next()? {
            if self.predicate.evaluate(&row) == Value::Boolean(true) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        if self.state.close() {
            self.input.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[Field] {
        self.input.schema()
    }

    fn name(&self) -> &str {
        "Filter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use crate::executor::expr::{CompareOp, Expr};
    use crate::executor::expression::{ExpressionCompiler, Interpreter};
    use crate::executor::operator::{collect, MaterializedOperator};
    use crate::row;

    #[test]
    fn test_filter_drops_false_and_null() {
        let input = MaterializedOperator::new(
            vec![row![1i64], row![None::<i64>], row![5i64], row![3i64]],
            vec![Field::new("x", DataType::Integer)],
        );
        let predicate = Interpreter
            .compile(&Expr::compare(
                CompareOp::Gt,
                Expr::column(0, "x", DataType::Integer),
                Expr::literal(2i64),
            ))
            .unwrap();
        let mut filter = FilterOperator::new(Box::new(input), predicate);
        assert_eq!(collect(&mut filter).unwrap(), vec![row![5i64], row![3i64]]);
        assert_eq!(filter.schema()[0].name, "x");
    }
}
