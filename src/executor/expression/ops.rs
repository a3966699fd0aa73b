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

//! Instruction set for the expression VM
//!
//! The instruction set is closed and fully typed: the compiler picks the
//! integer or double variant of every arithmetic and comparison, so the
//! dispatch loop never inspects operand types to decide what to do.
//!
//! Jump targets are absolute instruction indices. A target equal to the
//! program length means "end of program".

use std::fmt;

use crate::core::Value;
use crate::executor::expr::CompareOp;

/// A single VM instruction
#[derive(Clone, PartialEq)]
pub enum Op {
    // =========================================================================
    // LOAD OPERATIONS
    // =========================================================================
    /// Push a column value from the input row
    /// Stack: [] -> [value]
    LoadColumn(u16),

    /// Push a constant
    /// Stack: [] -> [value]
    LoadConst(Value),

    /// Push NULL
    /// Stack: [] -> [NULL]
    LoadNull,

    // =========================================================================
    // CONVERSION
    // =========================================================================
    /// Widen INTEGER to DOUBLE
    /// Stack: [int] -> [double]
    IntToDouble,

    // =========================================================================
    // ARITHMETIC
    // =========================================================================
    /// Stack: [a, b] -> [a + b]
    AddInt,
    /// Stack: [a, b] -> [a - b]
    SubInt,
    /// Stack: [a, b] -> [a * b]
    MulInt,
    /// Stack: [a, b] -> [a / b], NULL when b = 0
    DivInt,
    /// Stack: [a, b] -> [a % b], NULL when b = 0
    ModInt,
    AddDouble,
    SubDouble,
    MulDouble,
    DivDouble,
    ModDouble,

    /// Stack: [a] -> [-a]
    NegInt,
    NegDouble,

    // =========================================================================
    // COMPARISON
    // =========================================================================
    /// Stack: [a, b] -> [bool]
    CmpInt(CompareOp),
    CmpDouble(CompareOp),
    CmpBool(CompareOp),
    CmpText(CompareOp),

    // =========================================================================
    // LOGICAL OPERATIONS
    // =========================================================================
    /// Stack: [bool] -> [!bool]
    Not,

    /// Short-circuit AND: if top of stack is FALSE, jump to target
    /// leaving it as the result.
    /// Stack: [bool] -> [bool] (or jump)
    And(u16),

    /// Combine left and right operands of AND with three-valued logic
    /// Stack: [left, right] -> [bool]
    AndFinalize,

    /// Short-circuit OR: if top of stack is TRUE, jump to target
    /// Stack: [bool] -> [bool] (or jump)
    Or(u16),

    /// Stack: [left, right] -> [bool]
    OrFinalize,

    // =========================================================================
    // CONTROL FLOW
    // =========================================================================
    /// Pop a condition; fall through on TRUE, otherwise jump
    /// Stack: [bool] -> []
    Branch { if_false: u16, if_null: u16 },

    /// Unconditional jump
    Jump(u16),

    // =========================================================================
    // FUSED OPERATIONS (produced by the peephole pass)
    // =========================================================================
    /// LoadColumn + IntToDouble
    /// Stack: [] -> [double]
    LoadColumnAsDouble(u16),

    /// LoadConst(c) + AddDouble
    /// Stack: [a] -> [a + c]
    AddConstDouble(f64),
    SubConstDouble(f64),
    MulConstDouble(f64),

    /// LoadConst(c) + AddInt
    /// Stack: [a] -> [a + c]
    AddConstInt(i64),
    SubConstInt(i64),
    MulConstInt(i64),
}

impl Op {
    /// Number of values consumed and produced.
    ///
    /// And/Or inspect their operand without removing it, modeled as (1, 1).
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Op::LoadColumn(_) | Op::LoadConst(_) | Op::LoadNull | Op::LoadColumnAsDouble(_) => {
                (0, 1)
            }

            Op::IntToDouble
            | Op::NegInt
            | Op::NegDouble
            | Op::Not
            | Op::And(_)
            | Op::Or(_)
            | Op::AddConstDouble(_)
            | Op::SubConstDouble(_)
            | Op::MulConstDouble(_)
            | Op::AddConstInt(_)
            | Op::SubConstInt(_)
            | Op::MulConstInt(_) => (1, 1),

            Op::AddInt
            | Op::SubInt
            | Op::MulInt
            | Op::DivInt
            | Op::ModInt
            | Op::AddDouble
            | Op::SubDouble
            | Op::MulDouble
            | Op::DivDouble
            | Op::ModDouble
            | Op::CmpInt(_)
            | Op::CmpDouble(_)
            | Op::CmpBool(_)
            | Op::CmpText(_)
            | Op::AndFinalize
            | Op::OrFinalize => (2, 1),

            Op::Branch { .. } => (1, 0),
            Op::Jump(_) => (0, 0),
        }
    }

    /// Jump targets of this instruction, if any
    pub fn jump_targets(&self) -> [Option<u16>; 2] {
        match self {
            Op::And(t) | Op::Or(t) | Op::Jump(t) => [Some(*t), None],
            Op::Branch { if_false, if_null } => [Some(*if_false), Some(*if_null)],
            _ => [None, None],
        }
    }

    /// Returns true if execution never continues at the next instruction
    pub fn is_unconditional_jump(&self) -> bool {
        matches!(self, Op::Jump(_))
    }

    /// Mutable access to jump targets, for backpatching and relocation
    pub(crate) fn jump_targets_mut(&mut self) -> [Option<&mut u16>; 2] {
        match self {
            Op::And(t) | Op::Or(t) | Op::Jump(t) => [Some(t), None],
            Op::Branch { if_false, if_null } => [Some(if_false), Some(if_null)],
            _ => [None, None],
        }
    }
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::LoadColumn(idx) => write!(f, "LoadColumn({})", idx),
            Op::LoadConst(Value::Text(s)) => write!(f, "LoadConst('{}')", s),
            Op::LoadConst(v) => write!(f, "LoadConst({})", v),
            Op::LoadNull => write!(f, "LoadNull"),
            Op::IntToDouble => write!(f, "IntToDouble"),
            Op::AddInt => write!(f, "AddInt"),
            Op::SubInt => write!(f, "SubInt"),
            Op::MulInt => write!(f, "MulInt"),
            Op::DivInt => write!(f, "DivInt"),
            Op::ModInt => write!(f, "ModInt"),
            Op::AddDouble => write!(f, "AddDouble"),
            Op::SubDouble => write!(f, "SubDouble"),
            Op::MulDouble => write!(f, "MulDouble"),
            Op::DivDouble => write!(f, "DivDouble"),
            Op::ModDouble => write!(f, "ModDouble"),
            Op::NegInt => write!(f, "NegInt"),
            Op::NegDouble => write!(f, "NegDouble"),
            Op::CmpInt(op) => write!(f, "CmpInt({})", op.symbol()),
            Op::CmpDouble(op) => write!(f, "CmpDouble({})", op.symbol()),
            Op::CmpBool(op) => write!(f, "CmpBool({})", op.symbol()),
            Op::CmpText(op) => write!(f, "CmpText({})", op.symbol()),
            Op::Not => write!(f, "Not"),
            Op::And(target) => write!(f, "And(jump={})", target),
            Op::AndFinalize => write!(f, "AndFinalize"),
            Op::Or(target) => write!(f, "Or(jump={})", target),
            Op::OrFinalize => write!(f, "OrFinalize"),
            Op::Branch { if_false, if_null } => {
                write!(f, "Branch(false={}, null={})", if_false, if_null)
            }
            Op::Jump(target) => write!(f, "Jump({})", target),
            Op::LoadColumnAsDouble(idx) => write!(f, "LoadColumnAsDouble({})", idx),
            Op::AddConstDouble(c) => write!(f, "AddConstDouble({:?})", c),
            Op::SubConstDouble(c) => write!(f, "SubConstDouble({:?})", c),
            Op::MulConstDouble(c) => write!(f, "MulConstDouble({:?})", c),
            Op::AddConstInt(c) => write!(f, "AddConstInt({})", c),
            Op::SubConstInt(c) => write!(f, "SubConstInt({})", c),
            Op::MulConstInt(c) => write!(f, "MulConstInt({})", c),
        }
    }
}
