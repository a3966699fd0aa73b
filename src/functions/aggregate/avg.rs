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

//! AVG aggregate function

use super::numeric_only;
use crate::core::{DataType, Result, Value};
use crate::functions::{Accumulator, AggregateFunction};

/// AVG aggregate function
///
/// Mean of all non-NULL values as DOUBLE, or NULL when there is none.
#[derive(Debug, Default, Clone, Copy)]
pub struct AvgFunction;

impl AggregateFunction for AvgFunction {
    fn name(&self) -> &'static str {
        "AVG"
    }

    fn return_type(&self, input: DataType) -> Result<DataType> {
        if input.is_numeric() {
            Ok(DataType::Double)
        } else {
            Err(numeric_only("AVG", input))
        }
    }

    fn create_accumulator(&self, _input: DataType) -> Box<dyn Accumulator> {
        Box::new(AvgAccumulator { sum: 0.0, count: 0 })
    }
}

struct AvgAccumulator {
    sum: f64,
    count: u64,
}

impl Accumulator for AvgAccumulator {
    #[inline]
    fn accumulate(&mut self, value: &Value) {
        if let Some(v) = value.as_f64() {
            self.sum += v;
            self.count += 1;
        }
    }

    fn finish(self: Box<Self>) -> Value {
        if self.count == 0 {
            Value::Null
        } else {
            Value::Double(self.sum / self.count as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avg_integers() {
        let mut acc = AvgFunction.create_accumulator(DataType::Integer);
        for v in [1, 2, 4] {
            acc.accumulate(&Value::integer(v));
        }
        let result = acc.finish().as_f64().unwrap();
        assert!((result - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_avg_empty_is_null() {
        let acc = AvgFunction.create_accumulator(DataType::Double);
        assert!(acc.finish().is_null());
    }

    #[test]
    fn test_avg_type() {
        assert_eq!(
            AvgFunction.return_type(DataType::Integer).unwrap(),
            DataType::Double
        );
        assert!(AvgFunction.return_type(DataType::Text).is_err());
    }
}
