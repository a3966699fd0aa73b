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

//! Top-level engine API
//!
//! - [`Engine`] - table registration and query execution
//! - [`EngineConfig`] - execution mode and planner switches
//! - [`Rows`] - materialized results with their output columns

pub mod config;
pub mod engine;
pub mod rows;

pub use config::{EngineConfig, MODE_ENV_VAR};
pub use engine::Engine;
pub use rows::Rows;
