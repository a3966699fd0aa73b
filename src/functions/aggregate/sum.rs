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

//! SUM aggregate function

use super::numeric_only;
use crate::core::{DataType, Result, Value};
use crate::functions::{Accumulator, AggregateFunction};

/// SUM aggregate function
///
/// Returns the sum of all non-NULL values, typed like its argument.
/// The sum of no values is NULL. Integer sums wrap on overflow.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumFunction;

impl AggregateFunction for SumFunction {
    fn name(&self) -> &'static str {
        "SUM"
    }

    fn return_type(&self, input: DataType) -> Result<DataType> {
        match input {
            DataType::Integer | DataType::Double => Ok(input),
            other => Err(numeric_only("SUM", other)),
        }
    }

    fn create_accumulator(&self, input: DataType) -> Box<dyn Accumulator> {
        match input {
            DataType::Integer => Box::new(IntegerSum::default()),
            _ => Box::new(DoubleSum::default()),
        }
    }
}

#[derive(Default)]
struct IntegerSum {
    sum: Option<i64>,
}

impl Accumulator for IntegerSum {
    #[inline]
    fn accumulate(&mut self, value: &Value) {
        if let Value::Integer(v) = value {
            self.sum = Some(self.sum.unwrap_or(0).wrapping_add(*v));
        }
    }

    fn finish(self: Box<Self>) -> Value {
        self.sum.map_or(Value::Null, Value::Integer)
    }
}

#[derive(Default)]
struct DoubleSum {
    sum: Option<f64>,
}

impl Accumulator for DoubleSum {
    #[inline]
    fn accumulate(&mut self, value: &Value) {
        if let Value::Double(v) = value {
            self.sum = Some(self.sum.unwrap_or(0.0) + v);
        }
    }

    fn finish(self: Box<Self>) -> Value {
        self.sum.map_or(Value::Null, Value::Double)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_of(input: DataType, values: &[Value]) -> Value {
        let mut acc = SumFunction.create_accumulator(input);
        for v in values {
            acc.accumulate(v);
        }
        acc.finish()
    }

    #[test]
    fn test_sum_doubles() {
        let values = [Value::double(1.0), Value::double(2.0), Value::double(3.0)];
        assert_eq!(sum_of(DataType::Double, &values), Value::double(6.0));
    }

    #[test]
    fn test_sum_integers() {
        let values = [Value::integer(-5), Value::integer(10), Value::integer(-3)];
        assert_eq!(sum_of(DataType::Integer, &values), Value::integer(2));
    }

    #[test]
    fn test_sum_empty_is_null() {
        assert_eq!(sum_of(DataType::Double, &[]), Value::Null);
        assert_eq!(sum_of(DataType::Integer, &[]), Value::Null);
    }

    #[test]
    fn test_sum_of_zeros_is_not_null() {
        assert_eq!(sum_of(DataType::Integer, &[Value::integer(0)]), Value::integer(0));
        assert_eq!(
            sum_of(DataType::Double, &[Value::double(-1.5), Value::double(1.5)]),
            Value::double(0.0)
        );
    }

    #[test]
    fn test_sum_wraps() {
        let values = [Value::integer(i64::MAX), Value::integer(1)];
        assert_eq!(sum_of(DataType::Integer, &values), Value::integer(i64::MIN));
    }

    #[test]
    fn test_sum_rejects_text() {
        assert!(SumFunction.return_type(DataType::Text).is_err());
        assert!(!SumFunction.supports(DataType::Boolean));
        assert_eq!(
            SumFunction.return_type(DataType::Integer).unwrap(),
            DataType::Integer
        );
    }
}
