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

//! Aggregate function system
//!
//! - [`AggregateFunction`] - describes one aggregate: name, typing rule and
//!   how to create per-group state
//! - [`Accumulator`] - incremental aggregation state for one group
//! - [`FunctionRegistry`] - name lookup used by both planner stages

pub mod aggregate;
pub mod registry;

use crate::core::{DataType, Result, Value};

pub use aggregate::{
    AccumulatorFactory, AvgFunction, CountFunction, MaxFunction, MinFunction, SumFunction,
};
pub use registry::{global_registry, FunctionRegistry};

/// Incremental aggregation state.
///
/// Created fresh per group, fed with every non-NULL argument value and
/// drained exactly once by [`Accumulator::finish`].
pub trait Accumulator: Send {
    /// Fold one value into the state
    fn accumulate(&mut self, value: &Value);

    /// Produce the final value, consuming the state
    fn finish(self: Box<Self>) -> Value;
}

/// An aggregate function
pub trait AggregateFunction: Send + Sync {
    /// Canonical (upper-case) function name
    fn name(&self) -> &'static str;

    /// Result type for the given argument type.
    ///
    /// Fails with `TypeMismatch` when the argument type is not accepted.
    fn return_type(&self, input: DataType) -> Result<DataType>;

    /// Returns true if an accumulator exists for this argument type
    fn supports(&self, input: DataType) -> bool {
        self.return_type(input).is_ok()
    }

    /// Create fresh state for one group
    fn create_accumulator(&self, input: DataType) -> Box<dyn Accumulator>;
}
