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

//! Expression evaluation strategies
//!
//! Three interchangeable back ends turn a resolved [`Expr`] into something
//! that can be evaluated against a row:
//!
//! ```text
//! Expr ──┬── Interpreter ──────► walks the tree on every row
//!        ├── ClosureCompiler ──► Box<dyn Fn(&Row) -> Value>
//!        └── BytecodeCompiler ─► Program ──► ExprVM
//! ```
//!
//! Each back end implements [`ExpressionCompiler`]. Operators are generic
//! over the [`CompiledExpression`] it produces, so one physical tree is
//! bound to exactly one strategy.

pub mod closure;
pub mod compiler;
pub mod interpreter;
pub mod ops;
pub mod program;
pub mod vm;


use std::fmt;
use std::str::FromStr;

use crate::core::{Error, Result, Row, Value};

use super::expr::Expr;

pub use closure::{ClosureCompiler, CompiledClosure};
pub use compiler::{BytecodeCompiler, CompiledProgram};
pub use interpreter::{InterpretedExpr, Interpreter};
pub use ops::Op;
pub use program::{Program, ProgramBuilder};
pub use vm::ExprVM;

/// Expression evaluation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// Tree-walking evaluation per row
    #[default]
    Interpreter,
    /// Compile once into composed closures
    ClosureCompiler,
    /// Compile once into bytecode for the stack VM
    BytecodeCompiler,
}

impl ExecutionMode {
    /// All modes, in declaration order
    pub const ALL: [ExecutionMode; 3] = [
        ExecutionMode::Interpreter,
        ExecutionMode::ClosureCompiler,
        ExecutionMode::BytecodeCompiler,
    ];

    /// Short name accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Interpreter => "interpreter",
            ExecutionMode::ClosureCompiler => "closure",
            ExecutionMode::BytecodeCompiler => "bytecode",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interpreter" | "interpreted" => Ok(ExecutionMode::Interpreter),
            "closure" | "closures" | "closure_compiler" => Ok(ExecutionMode::ClosureCompiler),
            "bytecode" | "vm" | "bytecode_compiler" => Ok(ExecutionMode::BytecodeCompiler),
            other => Err(Error::InvalidArgument(format!(
                "unknown execution mode '{}'",
                other
            ))),
        }
    }
}

/// An expression ready to be evaluated against rows.
///
/// Evaluation is total: type errors were ruled out during planning and
/// NULL is an ordinary result.
pub trait CompiledExpression: Send {
    /// Evaluate against one input row
    fn evaluate(&mut self, row: &Row) -> Value;
}

/// Capability implemented by every evaluation strategy
pub trait ExpressionCompiler {
    /// Artifact produced for one expression
    type Compiled: CompiledExpression + 'static;

    /// Mode this compiler implements
    fn mode(&self) -> ExecutionMode;

    /// Compile a resolved expression
    fn compile(&self, expr: &Expr) -> Result<Self::Compiled>;

    /// Compile a list of expressions
    fn compile_all(&self, exprs: &[Expr]) -> Result<Vec<Self::Compiled>> {
        exprs.iter().map(|e| self.compile(e)).collect()
    }
}

#[cfg(test)]
mod mode_tests {
    use super::*;

    #[test]
    fn test_mode_round_trip_names() {
        for mode in ExecutionMode::ALL {
            assert_eq!(mode.to_string().parse::<ExecutionMode>().unwrap(), mode);
        }
        assert_eq!(
            "VM".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::BytecodeCompiler
        );
        assert!(matches!(
            "jit".parse::<ExecutionMode>(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
