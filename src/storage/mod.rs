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

//! Storage module
//!
//! - [`Table`] - the data source contract: a schema plus a scan operator
//! - [`MemoryTable`] - immutable in-memory rows
//! - [`TableRegistry`] - name to table mapping shared by planner and engine

pub mod registry;
pub mod table;

pub use registry::TableRegistry;
pub use table::{MemoryTable, ScanOperator, Table};
