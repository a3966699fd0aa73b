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

//! Core types and definitions
//!
//! - [`DataType`] - column types and the implicit widening rule
//! - [`Value`] - runtime values, NULL included
//! - [`Row`] - a fixed-length collection of values
//! - [`Schema`] / [`Field`] - named, typed columns
//! - [`Error`] - the error taxonomy shared by planner and operators

pub mod error;
pub mod row;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use row::Row;
pub use schema::{Field, Schema, SchemaBuilder};
pub use types::DataType;
pub use value::Value;
