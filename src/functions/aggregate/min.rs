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

//! MIN aggregate function

use std::cmp::Ordering;

use crate::core::{DataType, Result, Value};
use crate::functions::{Accumulator, AggregateFunction};

/// MIN aggregate function
///
/// Smallest non-NULL value, or NULL when there is none.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinFunction;

impl AggregateFunction for MinFunction {
    fn name(&self) -> &'static str {
        "MIN"
    }

    fn return_type(&self, input: DataType) -> Result<DataType> {
        Ok(input)
    }

    fn create_accumulator(&self, _input: DataType) -> Box<dyn Accumulator> {
        Box::new(ExtremeAccumulator::new(Ordering::Less))
    }
}

/// Keeps the value that sorts first in `keep` direction.
/// Shared by MIN and MAX.
pub(super) struct ExtremeAccumulator {
    keep: Ordering,
    current: Option<Value>,
}

impl ExtremeAccumulator {
    pub(super) fn new(keep: Ordering) -> Self {
        Self {
            keep,
            current: None,
        }
    }
}

impl Accumulator for ExtremeAccumulator {
    #[inline]
    fn accumulate(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        match &self.current {
            Some(current) if value.sort_cmp(current) != self.keep => {}
            _ => self.current = Some(value.clone()),
        }
    }

    fn finish(self: Box<Self>) -> Value {
        self.current.unwrap_or_default()
    }
}
