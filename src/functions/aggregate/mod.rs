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

//! Aggregate Functions
//!
//! - [`SumFunction`] - SUM(column)
//! - [`CountFunction`] - COUNT(*) and COUNT(column)
//! - [`MinFunction`] - MIN(column)
//! - [`MaxFunction`] - MAX(column)
//! - [`AvgFunction`] - AVG(column)
//!
//! NULL arguments never reach an accumulator; the aggregate operator
//! filters them out.

mod avg;
mod count;
mod max;
mod min;
mod sum;

use std::fmt;
use std::sync::Arc;

pub use avg::AvgFunction;
pub use count::CountFunction;
pub use max::MaxFunction;
pub use min::MinFunction;
pub use sum::SumFunction;

use super::{Accumulator, AggregateFunction};
use crate::core::DataType;

/// Creates accumulators for one aggregate call site.
///
/// Built once during physical planning; the aggregate operator asks it for
/// fresh state for every group.
#[derive(Clone)]
pub struct AccumulatorFactory {
    function: Arc<dyn AggregateFunction>,
    input_type: DataType,
}

impl AccumulatorFactory {
    /// Bind a function to its argument type
    pub fn new(function: Arc<dyn AggregateFunction>, input_type: DataType) -> Self {
        Self {
            function,
            input_type,
        }
    }

    /// Fresh state for one group
    #[inline]
    pub fn create(&self) -> Box<dyn Accumulator> {
        self.function.create_accumulator(self.input_type)
    }

    /// Function name
    pub fn name(&self) -> &'static str {
        self.function.name()
    }

    /// Argument type
    pub fn input_type(&self) -> DataType {
        self.input_type
    }
}

impl fmt::Debug for AccumulatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function.name(), self.input_type)
    }
}

/// Error for a numeric-only aggregate applied to another type
pub(crate) fn numeric_only(name: &str, input: DataType) -> crate::core::Error {
    crate::core::Error::TypeMismatch(format!("{} requires a numeric argument, got {}", name, input))
}
