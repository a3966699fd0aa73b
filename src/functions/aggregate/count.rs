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

//! COUNT aggregate function

use crate::core::{DataType, Result, Value};
use crate::functions::{Accumulator, AggregateFunction};

/// COUNT aggregate function
///
/// Counts non-NULL argument values. `COUNT(*)` is planned as a count of a
/// non-NULL constant and so counts rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountFunction;

impl AggregateFunction for CountFunction {
    fn name(&self) -> &'static str {
        "COUNT"
    }

    fn return_type(&self, _input: DataType) -> Result<DataType> {
        Ok(DataType::Integer)
    }

    fn create_accumulator(&self, _input: DataType) -> Box<dyn Accumulator> {
        Box::new(CountAccumulator { count: 0 })
    }
}

struct CountAccumulator {
    count: i64,
}

impl Accumulator for CountAccumulator {
    #[inline]
    fn accumulate(&mut self, value: &Value) {
        if !value.is_null() {
            self.count += 1;
        }
    }

    fn finish(self: Box<Self>) -> Value {
        Value::Integer(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count() {
        let mut acc = CountFunction.create_accumulator(DataType::Text);
        acc.accumulate(&Value::text("a"));
        acc.accumulate(&Value::Null);
        acc.accumulate(&Value::text("b"));
        assert_eq!(acc.finish(), Value::integer(2));
    }

    #[test]
    fn test_count_empty() {
        let acc = CountFunction.create_accumulator(DataType::Double);
        assert_eq!(acc.finish(), Value::integer(0));
    }
}
