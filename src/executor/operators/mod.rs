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

//! Query operators for streaming execution.
//!
//! Every operator implements the [`Operator`](super::operator::Operator)
//! lifecycle. The expression-bearing ones are generic over the compiled
//! expression type, so one physical tree uses exactly one strategy.
//!
//! - [`FilterOperator`] - keeps rows whose predicate is TRUE
//! - [`ProjectOperator`] - evaluates one expression per output column
//! - [`AggregateOperator`] - global and hash-grouped aggregation
//! - [`OrderByOperator`] - stable single-column sort
//!
//! Scans live with their tables in [`crate::storage`].

pub mod aggregate;
pub mod filter;
pub mod order_by;
pub mod project;

pub use aggregate::AggregateOperator;
pub use filter::FilterOperator;
pub use order_by::OrderByOperator;
pub use project::ProjectOperator;
