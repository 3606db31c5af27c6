/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

use crate::ast::{Expression, Statement};

/// A basic block label.
///
/// Labels are dense integers assigned in emission order: the label of a
/// block is its index in the function's block list. Rendered as `"B<n>"`
/// in the output program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Label(pub u32);

impl Label {
    pub fn block_index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> String {
        format!("B{}", self.0)
    }
}

/// A slot in the generator's jump table.
///
/// A jump is emitted as an `Entry` carrying a `Target`; the slot is
/// written once when the destination becomes known, and the `GOTO` AST
/// is materialized at finalization. This keeps emit-site and
/// resolve-site decoupled without shared mutable AST nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target(pub(crate) usize);

/// One entry of a basic block.
pub enum Entry {
    /// A fully lowered statement: an assignment, a helper call, or
    /// `debugger`. Also used for verbatim `GOTO` statements carried over
    /// from already-lowered input.
    Statement(Statement),
    /// An unconditional jump, target patched at finalization.
    Jump(Target),
    /// A conditional jump `GOTO(test ? consequent : alternate)` over a
    /// reusable test expression.
    Branch {
        test: Expression,
        consequent: Target,
        alternate: Target,
    },
}

/// A labeled run of straight-line entries with at most one terminating
/// jump. A trailing non-terminated block falls through to the next block
/// in emission order.
pub struct BasicBlock {
    pub entries: Vec<Entry>,
    pub terminated: bool,
}

impl BasicBlock {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            terminated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BasicBlock {
    fn default() -> Self {
        Self::new()
    }
}
