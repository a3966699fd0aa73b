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

//! MAX aggregate function

use std::cmp::Ordering;

use super::min::ExtremeAccumulator;
use crate::core::{DataType, Result};
use crate::functions::{Accumulator, AggregateFunction};

/// MAX aggregate function
///
/// Largest non-NULL value, or NULL when there is none.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxFunction;

impl AggregateFunction for MaxFunction {
    fn name(&self) -> &'static str {
        "MAX"
    }

    fn return_type(&self, input: DataType) -> Result<DataType> {
        Ok(input)
    }

    fn create_accumulator(&self, _input: DataType) -> Box<dyn Accumulator> {
        Box::new(ExtremeAccumulator::new(Ordering::Greater))
    }
}
