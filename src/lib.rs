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

//! # Queryengine - embeddable analytical query engine
//!
//! Queryengine executes single-table SQL aggregate queries over in-memory
//! tables. One logical plan can be executed with any of three expression
//! evaluation strategies:
//!
//! - **Interpreter** - walks the expression tree for every row
//! - **Closure compiler** - compiles once into composed, type-specialized closures
//! - **Bytecode compiler** - compiles once into a verified program for a small
//!   stack VM
//!
//! All strategies share one planner and one pull-based operator protocol
//! (`open` / `next` / `close`), and return identical results.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use queryengine::{row, DataType, Engine, ExecutionMode, MemoryTable, Schema, Value};
//!
//! let schema = Schema::builder()
//!     .field("foo", DataType::Double)
//!     .field("bar", DataType::Double)
//!     .build()
//!     .unwrap();
//! let table = MemoryTable::new("t", schema, vec![row![1.0, 2.0], row![2.0, 4.0]]).unwrap();
//!
//! let engine = Engine::new();
//! engine.register_table(Arc::new(table));
//!
//! for mode in ExecutionMode::ALL {
//!     let rows = engine.query_with_mode("SELECT SUM(foo) FROM t", mode).unwrap();
//!     assert_eq!(rows.get(0).unwrap()[0], Value::double(3.0));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - [`Engine`] facade and configuration
//! - [`core`] - Core types ([`DataType`], [`Value`], [`Row`], [`Schema`], [`Error`])
//! - [`parser`] - SQL parser
//! - [`executor`] - expressions, evaluator back ends, planner and operators
//! - [`functions`] - aggregate functions and accumulators
//! - [`storage`] - table contract, in-memory tables and the table registry

pub mod api;
pub mod core;
pub mod executor;
pub mod functions;
pub mod parser;
pub mod storage;

pub use core::{DataType, Error, Field, Result, Row, Schema, SchemaBuilder, Value};

pub use api::{Engine, EngineConfig, Rows};

pub use executor::{
    build_logical_plan, build_physical_plan, collect, CompiledExpression, ExecutionMode, Expr,
    ExpressionCompiler, LogicalPlan, Operator,
};

pub use functions::{
    Accumulator, AggregateFunction, AvgFunction, CountFunction, FunctionRegistry, MaxFunction,
    MinFunction, SumFunction,
};

pub use parser::{parse_query, Query};

pub use storage::{MemoryTable, Table, TableRegistry};
