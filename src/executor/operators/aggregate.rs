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

//! Aggregate operator
//!
//! Drains its input on the first `next()` call, feeding accumulators, then
//! streams the finished rows. Output rows are `[group keys..., aggregates...]`.

use rustc_hash::FxHashMap;

use crate::core::{Field, Result, Row, Value};
use crate::executor::expression::CompiledExpression;
use crate::executor::operator::{Operator, OperatorState};
use crate::functions::{Accumulator, AccumulatorFactory};

/// Accumulator state of one group
struct GroupState {
    key: Vec<Value>,
    accumulators: Vec<Box<dyn Accumulator>>,
}

/// Global (no keys) or hash-grouped aggregation
///
/// Without group keys exactly one row is produced, even for empty input.
/// Groups are emitted in first-seen order; NULL is a valid key value.
pub struct AggregateOperator<E: CompiledExpression> {
    input: Box<dyn Operator>,
    group_by: Vec<E>,
    args: Vec<E>,
    factories: Vec<AccumulatorFactory>,
    schema: Vec<Field>,
    results: Vec<Row>,
    position: usize,
    drained: bool,
    state: OperatorState,
}

impl<E: CompiledExpression> AggregateOperator<E> {
    /// `args[i]` feeds the accumulators created by `factories[i]`
    pub fn new(
        input: Box<dyn Operator>,
        group_by: Vec<E>,
        args: Vec<E>,
        factories: Vec<AccumulatorFactory>,
        schema: Vec<Field>,
    ) -> Self {
        debug_assert_eq!(args.len(), factories.len());
        Self {
            input,
            group_by,
            args,
            factories,
            schema,
            results: Vec::new(),
            position: 0,
            drained: false,
            state: OperatorState::Created,
        }
    }

    fn new_accumulators(&self) -> Vec<Box<dyn Accumulator>> {
        self.factories.iter().map(|f| f.create()).collect()
    }

    #[inline]
    fn accumulate(args: &mut [E], accumulators: &mut [Box<dyn Accumulator>], row: &Row) {
        for (arg, acc) in args.iter_mut().zip(accumulators.iter_mut()) {
            let value = arg.evaluate(row);
            if !value.is_null() {
                acc.accumulate(&value);
            }
        }
    }

    fn finish(key: Vec<Value>, accumulators: Vec<Box<dyn Accumulator>>) -> Row {
        let mut values = key;
        values.extend(accumulators.into_iter().map(|acc| acc.finish()));
        Row::from_values(values)
    }

    fn drain_global(&mut self) -> Result<()> {
        let mut accumulators = self.new_accumulators();
        let mut rows = 0usize;
        while let Some(row) = self.input.next()? {
            Self::accumulate(&mut self.args, &mut accumulators, &row);
            rows += 1;
        }
        tracing::debug!(rows, aggregates = self.factories.len(), "global aggregate drained input");
        self.results.push(Self::finish(Vec::new(), accumulators));
        Ok(())
    }

    fn drain_grouped(&mut self) -> Result<()> {
        let mut index: FxHashMap<Vec<Value>, usize> = FxHashMap::default();
        let mut groups: Vec<GroupState> = Vec::new();
        let mut rows = 0usize;

        while let Some(row) = self.input.next()? {
            let key: Vec<Value> = self.group_by.iter_mut().map(|e| e.evaluate(&row)).collect();
            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = groups.len();
                    groups.push(GroupState {
                        key: key.clone(),
                        accumulators: self.new_accumulators(),
                    });
                    index.insert(key, slot);
                    slot
                }
            };
            Self::accumulate(&mut self.args, &mut groups[slot].accumulators, &row);
            rows += 1;
        }

        tracing::debug!(rows, groups = groups.len(), "grouped aggregate drained input");
        self.results = groups
            .into_iter()
            .map(|g| Self::finish(g.key, g.accumulators))
            .collect();
        Ok(())
    }
}

impl<E: CompiledExpression> Operator for AggregateOperator<E> {
    fn open(&mut self) -> Result<()> {
        self.state.open("Aggregate")?;
        if let Err(e) = self.input.open() {
            self.state.close();
            return Err(e);
        }
        self.results.clear();
        self.position = 0;
        self.drained = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        self.state.check_next("Aggregate")?;
        if !self.drained {
            if self.group_by.is_empty() {
                self.drain_global()?;
            } else {
                self.drain_grouped()?;
            }
            self.drained = true;
        }

        let Some(row) = self.results.get_mut(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(std::mem::take(row)))
    }

    fn close(&mut self) -> Result<()> {
        if self.state.close() {
            self.results.clear();
            self.input.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[Field] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Aggregate"
    }
}
