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

//! Query executor
//!
//! ```text
//! Query (AST)
//!   ↓  resolve + type check + aggregate rewrite    (planner, resolve)
//! LogicalPlan
//!   ↓  compile expressions with one strategy       (planner, expression)
//! Box<dyn Operator>
//!   ↓  open / next* / close                        (operator, operators)
//! Rows
//! ```
//!
//! # Components
//!
//! - [`expr`] - typed expression tree and the shared scalar kernels
//! - [`expression`] - interpreter, closure compiler, bytecode compiler + VM
//! - [`logical`] - logical plan nodes
//! - [`operator`] / [`operators`] - the pull-based operator protocol
//! - [`planner`] - logical and physical planning

pub mod expr;
pub mod expression;
pub mod logical;
pub mod operator;
pub mod operators;
pub mod planner;
pub mod resolve;

pub use expr::{ArithmeticOp, CompareOp, Expr};
pub use expression::{
    BytecodeCompiler, ClosureCompiler, CompiledExpression, ExecutionMode, ExpressionCompiler,
    Interpreter,
};
pub use logical::{AggregateCall, LogicalPlan};
pub use operator::{collect, MaterializedOperator, Operator, OperatorState};
pub use planner::{
    build_logical_plan, build_logical_plan_with, build_physical_plan, build_physical_plan_with,
    lower, PlannerOptions,
};
