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

//! Compiled expression programs
//!
//! A [`Program`] is immutable once built and is shared between operators
//! through `Arc`. Every program carries the maximum stack depth it needs;
//! [`Program::verify`] proves that claim by walking every branch path.

use std::fmt;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::ops::Op;
use crate::core::{Error, Result, Value};

/// Compiled expression program
#[derive(Clone)]
pub struct Program {
    /// The operation sequence
    ops: Vec<Op>,

    /// Maximum stack depth needed (for pre-allocation)
    max_stack_depth: usize,

    /// Whether a NULL loaded anywhere makes the whole result NULL.
    /// Only true for programs without AND/OR/IF.
    null_short_circuit: bool,
}

impl Program {
    /// Create a program from raw parts. The depth is trusted; call
    /// [`Program::verify`] to check it.
    pub fn new(ops: Vec<Op>, max_stack_depth: usize, null_short_circuit: bool) -> Self {
        Self {
            ops,
            max_stack_depth,
            null_short_circuit,
        }
    }

    /// Create a program that returns a constant value
    pub fn constant(value: Value) -> Self {
        let strict = value.is_null();
        Self::new(vec![Op::LoadConst(value)], 1, strict)
    }

    /// Get the operations
    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Get max stack depth
    #[inline]
    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }

    /// Whether NULL loads short-circuit the program
    #[inline]
    pub fn null_short_circuit(&self) -> bool {
        self.null_short_circuit
    }

    /// Number of operations
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Statically check the program along every branch path:
    /// the stack never underflows nor exceeds the declared depth, all jump
    /// targets are in range, paths that meet agree on the depth, and exactly
    /// one value remains at the end.
    pub fn verify(&self) -> Result<()> {
        let required = Self::analyze(&self.ops)
            .map_err(|msg| Error::InvalidArgument(format!("malformed program: {}", msg)))?;
        if required > self.max_stack_depth {
            return Err(Error::InvalidArgument(format!(
                "malformed program: needs stack depth {}, declares {}",
                required, self.max_stack_depth
            )));
        }
        Ok(())
    }

    /// Abstract interpretation over stack depths. Returns the maximum depth
    /// reached on any path.
    fn analyze(ops: &[Op]) -> std::result::Result<usize, String> {
        if ops.is_empty() {
            return Err("empty program".to_string());
        }

        let end = ops.len();
        let mut depth_at: Vec<Option<usize>> = vec![None; end + 1];
        depth_at[0] = Some(0);
        let mut worklist = vec![0usize];
        let mut max_depth = 0usize;

        while let Some(pc) = worklist.pop() {
            if pc == end {
                continue;
            }
            let depth = depth_at[pc].unwrap_or(0);
            let op = &ops[pc];
            let (pops, pushes) = op.stack_effect();
            if depth < pops {
                return Err(format!("stack underflow at {:04} ({:?})", pc, op));
            }
            let after = depth - pops + pushes;
            max_depth = max_depth.max(after);

            let mut successors: SmallVec<[usize; 3]> = SmallVec::new();
            if !op.is_unconditional_jump() {
                successors.push(pc + 1);
            }
            successors.extend(op.jump_targets().into_iter().flatten().map(usize::from));

            for succ in successors {
                if succ > end {
                    return Err(format!("jump target {} out of range at {:04}", succ, pc));
                }
                match depth_at[succ] {
                    None => {
                        depth_at[succ] = Some(after);
                        worklist.push(succ);
                    }
                    Some(d) if d != after => {
                        return Err(format!(
                            "inconsistent stack depth at {:04}: {} vs {}",
                            succ, d, after
                        ));
                    }
                    Some(_) => {}
                }
            }
        }

        match depth_at[end] {
            Some(1) => Ok(max_depth),
            Some(d) => Err(format!("program ends with {} values on the stack", d)),
            None => Err("end of program is unreachable".to_string()),
        }
    }

    /// Disassemble the program for debugging
    pub fn disassemble(&self) -> String {
        let mut result = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            result.push_str(&format!("{:04}: {:?}\n", i, op));
        }
        result
    }

    /// Apply peephole optimizations and recompute the stack depth.
    pub fn optimize(mut self) -> Self {
        self.ops = Self::peephole_optimize(self.ops);
        if let Ok(depth) = Self::analyze(&self.ops) {
            self.max_stack_depth = depth;
        }
        self
    }

    /// Peephole optimizer: fuse common instruction patterns into single ops
    fn peephole_optimize(mut ops: Vec<Op>) -> Vec<Op> {
        if ops.len() < 2 {
            return ops;
        }

        // Fusing across a jump target would make a jump land inside
        // the fused instruction.
        let jump_targets: FxHashSet<usize> = ops
            .iter()
            .flat_map(|op| op.jump_targets())
            .flatten()
            .map(usize::from)
            .collect();

        let mut result = Vec::with_capacity(ops.len());
        // Map from old instruction position to new instruction position.
        // One extra slot for the end-of-program target.
        let mut position_map: Vec<usize> = Vec::with_capacity(ops.len() + 1);
        let mut i = 0;

        while i < ops.len() {
            let new_pos = result.len();

            if i + 1 < ops.len() && !jump_targets.contains(&(i + 1)) {
                let fused = match (&ops[i], &ops[i + 1]) {
                    // LoadColumn + IntToDouble → LoadColumnAsDouble
                    (Op::LoadColumn(idx), Op::IntToDouble) => Some(Op::LoadColumnAsDouble(*idx)),

                    // LoadConst + binary op → op with constant right operand
                    (Op::LoadConst(Value::Double(c)), Op::AddDouble) => {
                        Some(Op::AddConstDouble(*c))
                    }
                    (Op::LoadConst(Value::Double(c)), Op::SubDouble) => {
                        Some(Op::SubConstDouble(*c))
                    }
                    (Op::LoadConst(Value::Double(c)), Op::MulDouble) => {
                        Some(Op::MulConstDouble(*c))
                    }
                    (Op::LoadConst(Value::Integer(c)), Op::AddInt) => Some(Op::AddConstInt(*c)),
                    (Op::LoadConst(Value::Integer(c)), Op::SubInt) => Some(Op::SubConstInt(*c)),
                    (Op::LoadConst(Value::Integer(c)), Op::MulInt) => Some(Op::MulConstInt(*c)),
                    _ => None,
                };

                if let Some(fused_op) = fused {
                    result.push(fused_op);
                    position_map.push(new_pos);
                    position_map.push(new_pos);
                    i += 2;
                    continue;
                }
            }

            // No fusion, move the op
            result.push(std::mem::replace(&mut ops[i], Op::LoadNull));
            position_map.push(new_pos);
            i += 1;
        }
        position_map.push(result.len());

        if result.len() != ops.len() {
            Self::adjust_jump_targets(&mut result, &position_map);
        }

        result
    }

    /// Adjust jump targets after peephole optimization using the position map.
    fn adjust_jump_targets(ops: &mut [Op], position_map: &[usize]) {
        for op in ops.iter_mut() {
            for target in op.jump_targets_mut().into_iter().flatten() {
                if let Some(&new_target) = position_map.get(*target as usize) {
                    *target = new_target as u16;
                }
            }
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("ops_count", &self.ops.len())
            .field("max_stack_depth", &self.max_stack_depth)
            .field("null_short_circuit", &self.null_short_circuit)
            .finish()
    }
}

/// Builder for constructing programs.
///
/// Tracks the stack depth of the straight-line code emitted so far. Code
/// that starts at a jump target must restore the depth it is entered with
/// through [`ProgramBuilder::set_depth`].
pub struct ProgramBuilder {
    ops: Vec<Op>,
    depth: usize,
    max_depth: usize,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            ops: Vec::with_capacity(32),
            depth: 0,
            max_depth: 0,
        }
    }

    /// Emit an operation
    #[inline]
    pub fn emit(&mut self, op: Op) {
        let (pops, pushes) = op.stack_effect();
        self.depth = self.depth.saturating_sub(pops) + pushes;
        self.max_depth = self.max_depth.max(self.depth);
        self.ops.push(op);
    }

    /// Get current position (for jump targets)
    #[inline]
    pub fn position(&self) -> usize {
        self.ops.len()
    }

    /// Current stack depth
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Reset the tracked depth at a jump target
    #[inline]
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Patch every jump target of the instruction at `pos`
    /// that still holds `placeholder`.
    pub fn patch_jump(&mut self, pos: usize, placeholder: u16, target: usize) -> Result<()> {
        let target = u16::try_from(target)
            .map_err(|_| Error::InvalidArgument("expression too large to compile".to_string()))?;
        if let Some(op) = self.ops.get_mut(pos) {
            for t in op.jump_targets_mut().into_iter().flatten() {
                if *t == placeholder {
                    *t = target;
                }
            }
        }
        Ok(())
    }

    /// Build the final program
    pub fn build(self, null_short_circuit: bool) -> Program {
        Program::new(self.ops, self.max_depth, null_short_circuit)
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::expr::CompareOp;

    #[test]
    fn test_program_constant() {
        let program = Program::constant(Value::integer(42));
        assert_eq!(program.len(), 1);
        assert_eq!(program.max_stack_depth(), 1);
        assert!(program.verify().is_ok());
    }

    #[test]
    fn test_builder_tracks_depth() {
        let mut b = ProgramBuilder::new();
        b.emit(Op::LoadColumn(0));
        b.emit(Op::LoadColumn(1));
        b.emit(Op::LoadColumn(2));
        b.emit(Op::MulDouble);
        b.emit(Op::AddDouble);
        let program = b.build(true);
        assert_eq!(program.max_stack_depth(), 3);
        assert!(program.verify().is_ok());
    }

    #[test]
    fn test_verify_underflow() {
        let program = Program::new(vec![Op::LoadColumn(0), Op::AddInt], 2, true);
        let err = program.verify().unwrap_err();
        assert!(err.to_string().contains("underflow"), "{}", err);
    }

    #[test]
    fn test_verify_declared_depth_too_small() {
        let program = Program::new(
            vec![Op::LoadColumn(0), Op::LoadColumn(1), Op::AddInt],
            1,
            true,
        );
        assert!(program.verify().is_err());
    }

    #[test]
    fn test_verify_leftover_values() {
        let program = Program::new(vec![Op::LoadColumn(0), Op::LoadColumn(1)], 2, true);
        let err = program.verify().unwrap_err();
        assert!(err.to_string().contains("2 values"), "{}", err);
    }

    #[test]
    fn test_verify_jump_out_of_range() {
        let program = Program::new(vec![Op::LoadConst(Value::boolean(true)), Op::And(7)], 1, false);
        let err = program.verify().unwrap_err();
        assert!(err.to_string().contains("out of range"), "{}", err);
    }

    #[test]
    fn test_verify_inconsistent_merge() {
        // The jump path reaches the end with 1 value, the fall-through with 2
        let program = Program::new(
            vec![
                Op::LoadConst(Value::boolean(false)),
                Op::And(3),
                Op::LoadConst(Value::boolean(true)),
            ],
            2,
            false,
        );
        assert!(program.verify().is_err());
    }

    #[test]
    fn test_verify_if_program() {
        // IF(c0, 1, 2)
        let program = Program::new(
            vec![
                Op::LoadColumn(0),
                Op::Branch {
                    if_false: 4,
                    if_null: 6,
                },
                Op::LoadConst(Value::integer(1)),
                Op::Jump(7),
                Op::LoadConst(Value::integer(2)),
                Op::Jump(7),
                Op::LoadNull,
            ],
            1,
            false,
        );
        assert!(program.verify().is_ok());
    }

    #[test]
    fn test_peephole_column_as_double() {
        let program = Program::new(
            vec![Op::LoadColumn(3), Op::IntToDouble],
            1,
            true,
        )
        .optimize();
        assert_eq!(program.ops(), &[Op::LoadColumnAsDouble(3)]);
        assert!(program.verify().is_ok());
    }

    #[test]
    fn test_peephole_const_operand_lowers_depth() {
        let program = Program::new(
            vec![
                Op::LoadColumn(0),
                Op::LoadConst(Value::double(10.0)),
                Op::MulDouble,
            ],
            2,
            true,
        )
        .optimize();
        assert_eq!(program.ops(), &[Op::LoadColumn(0), Op::MulConstDouble(10.0)]);
        assert_eq!(program.max_stack_depth(), 1);
    }

    #[test]
    fn test_peephole_relocates_jumps() {
        // (c0 + 1 > 0) AND c1
        let program = Program::new(
            vec![
                Op::LoadColumn(0),
                Op::LoadConst(Value::integer(1)),
                Op::AddInt,
                Op::LoadConst(Value::integer(0)),
                Op::CmpInt(CompareOp::Gt),
                Op::And(8),
                Op::LoadColumn(1),
                Op::AndFinalize,
            ],
            2,
            false,
        )
        .optimize();

        assert_eq!(
            program.ops(),
            &[
                Op::LoadColumn(0),
                Op::AddConstInt(1),
                Op::LoadConst(Value::integer(0)),
                Op::CmpInt(CompareOp::Gt),
                Op::And(7),
                Op::LoadColumn(1),
                Op::AndFinalize,
            ]
        );
        assert!(program.verify().is_ok());
    }

    #[test]
    fn test_peephole_skips_jump_targets() {
        // The IntToDouble at 5 is a jump target and must not be fused
        let ops = vec![
            Op::LoadColumn(0),
            Op::Branch {
                if_false: 4,
                if_null: 4,
            },
            Op::LoadColumn(1),
            Op::Jump(5),
            Op::LoadColumn(2),
            Op::IntToDouble,
        ];
        let program = Program::new(ops.clone(), 1, false).optimize();
        assert_eq!(program.ops()[4..], ops[4..]);
    }
}
