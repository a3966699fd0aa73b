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

// Expression Virtual Machine
//
// The VM executes compiled Programs against row data.
// Design goals:
// - No allocation in the hot path for stacks up to STACK_INLINE_CAPACITY
// - One dispatch loop, no recursion
// - Reusable across rows (the stack is cleared per execution)

use smallvec::SmallVec;

use super::ops::Op;
use super::program::Program;
use crate::core::{Row, Value};
use crate::executor::expr::{and3, bool_value, or3, ArithmeticOp};

/// Stack capacity for inline storage (avoids heap allocation for simple expressions)
const STACK_INLINE_CAPACITY: usize = 16;

/// Pops two operands and pushes the integer kernel result
macro_rules! int_binary {
    ($stack:expr, $op:expr) => {{
        let b = $stack.pop().unwrap_or_default();
        let a = $stack.pop().unwrap_or_default();
        let result = match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => {
                $op.eval_int(x, y).map_or(Value::Null, Value::Integer)
            }
            _ => Value::Null,
        };
        $stack.push(result);
    }};
}

/// Pops two operands and pushes the double kernel result
macro_rules! double_binary {
    ($stack:expr, $op:expr) => {{
        let b = $stack.pop().unwrap_or_default();
        let a = $stack.pop().unwrap_or_default();
        let result = match (a, b) {
            (Value::Double(x), Value::Double(y)) => Value::Double($op.eval_double(x, y)),
            _ => Value::Null,
        };
        $stack.push(result);
    }};
}

/// Applies an in-place update to the top of the stack
macro_rules! update_top {
    ($stack:expr, $pattern:pat => $result:expr) => {{
        if let Some(top) = $stack.last_mut() {
            *top = match std::mem::take(top) {
                $pattern => $result,
                _ => Value::Null,
            };
        }
    }};
}

/// Pops two operands and pushes a typed comparison result
macro_rules! compare {
    ($stack:expr, $cmp:expr, $variant:ident) => {{
        let b = $stack.pop().unwrap_or_default();
        let a = $stack.pop().unwrap_or_default();
        let result = match (&a, &b) {
            (Value::$variant(x), Value::$variant(y)) => Value::Boolean($cmp.eval(x, y)),
            _ => Value::Null,
        };
        $stack.push(result);
    }};
}

/// Expression Virtual Machine
///
/// Executes compiled Programs against row data.
/// The VM is reusable - call execute() with different rows.
pub struct ExprVM {
    /// Evaluation stack (reused between executions)
    stack: SmallVec<[Value; STACK_INLINE_CAPACITY]>,
}

impl ExprVM {
    /// Create a new VM with default stack capacity
    pub fn new() -> Self {
        Self {
            stack: SmallVec::new(),
        }
    }

    /// Create a VM with specific stack capacity
    /// If capacity > 16, will spill to heap up front
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: SmallVec::with_capacity(capacity),
        }
    }

    /// Execute a program and return the result
    #[inline]
    pub fn execute(&mut self, program: &Program, row: &Row) -> Value {
        if self.stack.capacity() < program.max_stack_depth() {
            self.stack
                .reserve(program.max_stack_depth() - self.stack.len());
        }
        self.stack.clear();

        let ops = program.ops();
        let strict = program.null_short_circuit();
        let stack = &mut self.stack;
        let mut pc: usize = 0;

        while pc < ops.len() {
            match &ops[pc] {
                // =============================================================
                // LOAD OPERATIONS
                // =============================================================
                Op::LoadColumn(idx) => {
                    let value = row.get(*idx as usize).cloned().unwrap_or_default();
                    if strict && value.is_null() {
                        return Value::Null;
                    }
                    stack.push(value);
                    pc += 1;
                }

                Op::LoadColumnAsDouble(idx) => {
                    let value = match row.get(*idx as usize) {
                        Some(Value::Integer(v)) => Value::Double(*v as f64),
                        Some(Value::Double(v)) => Value::Double(*v),
                        _ => Value::Null,
                    };
                    if strict && value.is_null() {
                        return Value::Null;
                    }
                    stack.push(value);
                    pc += 1;
                }

                Op::LoadConst(value) => {
                    stack.push(value.clone());
                    pc += 1;
                }

                Op::LoadNull => {
                    if strict {
                        return Value::Null;
                    }
                    stack.push(Value::Null);
                    pc += 1;
                }

                // =============================================================
                // CONVERSION
                // =============================================================
                Op::IntToDouble => {
                    update_top!(stack, Value::Integer(v) => Value::Double(v as f64));
                    pc += 1;
                }

                // =============================================================
                // ARITHMETIC
                // =============================================================
                Op::AddInt => {
                    int_binary!(stack, ArithmeticOp::Add);
                    pc += 1;
                }
                Op::SubInt => {
                    int_binary!(stack, ArithmeticOp::Sub);
                    pc += 1;
                }
                Op::MulInt => {
                    int_binary!(stack, ArithmeticOp::Mul);
                    pc += 1;
                }
                Op::DivInt => {
                    int_binary!(stack, ArithmeticOp::Div);
                    pc += 1;
                }
                Op::ModInt => {
                    int_binary!(stack, ArithmeticOp::Mod);
                    pc += 1;
                }
                Op::AddDouble => {
                    double_binary!(stack, ArithmeticOp::Add);
                    pc += 1;
                }
                Op::SubDouble => {
                    double_binary!(stack, ArithmeticOp::Sub);
                    pc += 1;
                }
                Op::MulDouble => {
                    double_binary!(stack, ArithmeticOp::Mul);
                    pc += 1;
                }
                Op::DivDouble => {
                    double_binary!(stack, ArithmeticOp::Div);
                    pc += 1;
                }
                Op::ModDouble => {
                    double_binary!(stack, ArithmeticOp::Mod);
                    pc += 1;
                }

                Op::NegInt => {
                    update_top!(stack, Value::Integer(v) => Value::Integer(v.wrapping_neg()));
                    pc += 1;
                }
                Op::NegDouble => {
                    update_top!(stack, Value::Double(v) => Value::Double(-v));
                    pc += 1;
                }

                // Fused constant operand forms
                Op::AddConstDouble(c) => {
                    update_top!(stack, Value::Double(v) => Value::Double(v + c));
                    pc += 1;
                }
                Op::SubConstDouble(c) => {
                    update_top!(stack, Value::Double(v) => Value::Double(v - c));
                    pc += 1;
                }
                Op::MulConstDouble(c) => {
                    update_top!(stack, Value::Double(v) => Value::Double(v * c));
                    pc += 1;
                }
                Op::AddConstInt(c) => {
                    update_top!(stack, Value::Integer(v) => Value::Integer(v.wrapping_add(*c)));
                    pc += 1;
                }
                Op::SubConstInt(c) => {
                    update_top!(stack, Value::Integer(v) => Value::Integer(v.wrapping_sub(*c)));
                    pc += 1;
                }
                Op::MulConstInt(c) => {
                    update_top!(stack, Value::Integer(v) => Value::Integer(v.wrapping_mul(*c)));
                    pc += 1;
                }

                // =============================================================
                // COMPARISON
                // =============================================================
                Op::CmpInt(cmp) => {
                    compare!(stack, cmp, Integer);
                    pc += 1;
                }
                Op::CmpDouble(cmp) => {
                    compare!(stack, cmp, Double);
                    pc += 1;
                }
                Op::CmpBool(cmp) => {
                    compare!(stack, cmp, Boolean);
                    pc += 1;
                }
                Op::CmpText(cmp) => {
                    let b = stack.pop().unwrap_or_default();
                    let a = stack.pop().unwrap_or_default();
                    let result = match (&a, &b) {
                        (Value::Text(x), Value::Text(y)) => Value::Boolean(cmp.eval(&**x, &**y)),
                        _ => Value::Null,
                    };
                    stack.push(result);
                    pc += 1;
                }

                // =============================================================
                // LOGICAL OPERATIONS
                // =============================================================
                Op::Not => {
                    update_top!(stack, Value::Boolean(b) => Value::Boolean(!b));
                    pc += 1;
                }

                Op::And(target) => {
                    // FALSE decides the result; NULL still needs the right side
                    if matches!(stack.last(), Some(Value::Boolean(false))) {
                        pc = *target as usize;
                    } else {
                        pc += 1;
                    }
                }

                Op::Or(target) => {
                    if matches!(stack.last(), Some(Value::Boolean(true))) {
                        pc = *target as usize;
                    } else {
                        pc += 1;
                    }
                }

                Op::AndFinalize => {
                    let b = stack.pop().unwrap_or_default();
                    let a = stack.pop().unwrap_or_default();
                    stack.push(bool_value(and3(a.as_bool(), b.as_bool())));
                    pc += 1;
                }

                Op::OrFinalize => {
                    let b = stack.pop().unwrap_or_default();
                    let a = stack.pop().unwrap_or_default();
                    stack.push(bool_value(or3(a.as_bool(), b.as_bool())));
                    pc += 1;
                }

                // =============================================================
                // CONTROL FLOW
                // =============================================================
                Op::Branch { if_false, if_null } => {
                    pc = match stack.pop().unwrap_or_default() {
                        Value::Boolean(true) => pc + 1,
                        Value::Boolean(false) => *if_false as usize,
                        _ => *if_null as usize,
                    };
                }

                Op::Jump(target) => {
                    pc = *target as usize;
                }
            }
        }

        stack.pop().unwrap_or_default()
    }
}

impl Default for ExprVM {
    fn default() -> Self {
        Self::new()
    }
}
