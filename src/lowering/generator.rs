/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! The lowering context.
//!
//! One `Generator` per function body (and one for the top level). Owns
//! the block list, the jump table, the temporary register pool, the
//! scope variables, the label stack, and the pending-jump queues.
//! `leave()` finalizes the context into the output statement list.

use std::cell::RefCell;
use std::rc::Rc;

use super::basic_block::{BasicBlock, Entry, Label, Target};
use super::builders;
use super::{LoweringError, ERROR_REGISTER, RESULT_REGISTER};
use crate::ast::{Expression, ExpressionKind, LiteralValue, Statement};

// =============================================================================
// Temporary register pool
// =============================================================================

/// A temporary scope variable `$n` that returns itself to the
/// generator's free pool when the last clone is dropped.
///
/// Wraps `Rc<TempVarInner>`: cloning retains the temporary for another
/// enclosing operation, dropping releases one retention. A released name
/// may be handed out again immediately, so holders must not keep the
/// rendered name around after dropping the handle.
#[derive(Clone, Debug)]
pub struct TempVar {
    inner: Rc<TempVarInner>,
}

#[derive(Debug)]
struct TempVarInner {
    index: u32,
    free_pool: Rc<RefCell<Vec<u32>>>,
}

impl Drop for TempVarInner {
    fn drop(&mut self) {
        self.free_pool.borrow_mut().push(self.index);
    }
}

impl TempVar {
    pub fn name(&self) -> String {
        format!("${}", self.inner.index)
    }
}

// =============================================================================
// Lowered values
// =============================================================================

/// A reusable expression: safe to reference more than once without
/// re-evaluating side effects.
#[derive(Clone, Debug)]
pub enum Value {
    /// A named local: user variable, `__RESULT`, `__ERROR`, or the
    /// `undefined` sentinel.
    Name(String),
    /// A simple literal.
    Literal(LiteralValue),
    /// A live temporary holding a computed value.
    Temp(TempVar),
}

impl Value {
    pub fn to_expression(&self) -> Expression {
        match self {
            Value::Name(name) => builders::identifier(name),
            Value::Literal(value) => builders::literal(value.clone()),
            Value::Temp(temp) => builders::identifier(&temp.name()),
        }
    }

    fn is_name(&self, name: &str) -> bool {
        matches!(self, Value::Name(n) if n == name)
    }
}

/// Result of lowering an expression: either a reusable value, or a
/// simple composite (binary/unary over reusable operands, or a function
/// value) that must be consumed or bound to a temporary before anything
/// else is lowered.
pub enum Lowered {
    Value(Value),
    Composite(Expression),
}

// =============================================================================
// Label stack
// =============================================================================

/// A break/continue frame. Loops push one frame carrying the label names
/// of directly enclosing labeled statements plus anonymous membership;
/// switches and non-loop labeled statements push break-only frames.
pub struct LabelFrame {
    pub label_set: Vec<String>,
    pub continue_target: Option<Target>,
    pub allows_unlabeled_break: bool,
    /// Length of `pending_breaks` when this frame was pushed. The frame
    /// only resolves breaks enqueued during its own extent.
    break_watermark: usize,
}

pub struct PendingBreak {
    /// User label, or `""` for an unlabeled break.
    pub label: String,
    pub target: Target,
}

/// Restores a shadowed user variable (the `catch` parameter) on drop of
/// the saved temporary.
pub struct ShadowedVar {
    name: String,
    saved: TempVar,
}

// =============================================================================
// Scope variables
// =============================================================================

struct ScopeVariable {
    name: String,
    /// Deferred initializer: function declarations hoist to assignments
    /// prepended to the first block at finalization.
    init: Option<Expression>,
}

// =============================================================================
// Generator
// =============================================================================

pub struct Generator {
    // --- Basic block management ---
    blocks: Vec<BasicBlock>,

    // --- Jump table ---
    targets: Vec<Option<Label>>,

    // --- Scope variables ---
    scope_variables: Vec<ScopeVariable>,

    // --- Temporary register pool ---
    temp_count: u32,
    free_temps: Rc<RefCell<Vec<u32>>>,

    // --- Label stack ---
    label_stack: Vec<LabelFrame>,
    /// Label names collected from directly enclosing labeled statements,
    /// consumed by the next loop.
    pub(crate) pending_labels: Vec<String>,

    // --- Pending jump queues ---
    pub(crate) pending_breaks: Vec<PendingBreak>,
    pub(crate) pending_returns: Vec<Target>,
    pub(crate) pending_throws: Vec<Target>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        let mut gen = Self {
            blocks: vec![BasicBlock::new()],
            targets: Vec::new(),
            scope_variables: Vec::new(),
            temp_count: 0,
            free_temps: Rc::new(RefCell::new(Vec::new())),
            label_stack: Vec::new(),
            pending_labels: Vec::new(),
            pending_breaks: Vec::new(),
            pending_returns: Vec::new(),
            pending_throws: Vec::new(),
        };
        // Pre-declared in every scope; the uninitialized declaration is
        // what clears them at entry.
        gen.declare_variable(RESULT_REGISTER);
        gen.declare_variable(ERROR_REGISTER);
        gen
    }

    // --- Scope variables ---

    pub fn declare_variable(&mut self, name: &str) {
        if self.scope_variables.iter().any(|v| v.name == name) {
            return;
        }
        self.scope_variables.push(ScopeVariable {
            name: name.to_string(),
            init: None,
        });
    }

    /// Declare a variable with a deferred initializer (function
    /// declarations). A later declaration of the same name wins.
    pub fn declare_variable_with_init(&mut self, name: &str, init: Expression) {
        if let Some(existing) = self.scope_variables.iter_mut().find(|v| v.name == name) {
            existing.init = Some(init);
            return;
        }
        self.scope_variables.push(ScopeVariable {
            name: name.to_string(),
            init: Some(init),
        });
    }

    // --- Temporary register pool ---

    /// Allocate a temporary (or recycle a freed one). Always picks the
    /// lowest-numbered free temporary so allocation is deterministic
    /// regardless of drop order.
    pub fn allocate_temp(&mut self) -> TempVar {
        let index = {
            let mut pool = self.free_temps.borrow_mut();
            if pool.is_empty() {
                let index = self.temp_count;
                self.temp_count += 1;
                index
            } else {
                let min_position = pool
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, index)| **index)
                    .map(|(position, _)| position)
                    .unwrap();
                pool.remove(min_position)
            }
        };
        let temp = TempVar {
            inner: Rc::new(TempVarInner {
                index,
                free_pool: self.free_temps.clone(),
            }),
        };
        self.declare_variable(&temp.name());
        temp
    }

    /// Number of temporaries currently held by live handles. Statement
    /// handlers must leave this unchanged.
    pub fn locked_temp_count(&self) -> usize {
        self.temp_count as usize - self.free_temps.borrow().len()
    }

    /// Make a lowered expression reusable.
    ///
    /// Identifiers, literals and live temporaries are reusable as-is.
    /// `__RESULT` is forced into a fresh temporary (the next helper call
    /// clobbers it); composites are bound with an emitted assignment.
    pub fn use_temp_var(&mut self, lowered: Lowered) -> Value {
        match lowered {
            Lowered::Value(value) if value.is_name(RESULT_REGISTER) => {
                self.bind_to_temp(value.to_expression())
            }
            Lowered::Value(value) => value,
            Lowered::Composite(expression) => self.bind_to_temp(expression),
        }
    }

    fn bind_to_temp(&mut self, expression: Expression) -> Value {
        let temp = self.allocate_temp();
        self.emit(builders::assignment_statement(
            builders::identifier(&temp.name()),
            expression,
        ));
        Value::Temp(temp)
    }

    // --- Variable shadowing (catch parameter) ---

    /// Save `name`'s current value in a fresh temporary and assign
    /// `init` into it. `unshadow_variable` restores the saved value.
    pub fn shadow_variable(&mut self, name: &str, init: Expression) -> ShadowedVar {
        self.declare_variable(name);
        let saved = self.allocate_temp();
        self.emit(builders::assignment_statement(
            builders::identifier(&saved.name()),
            builders::identifier(name),
        ));
        self.emit(builders::assignment_statement(
            builders::identifier(name),
            init,
        ));
        ShadowedVar {
            name: name.to_string(),
            saved,
        }
    }

    pub fn unshadow_variable(&mut self, shadowed: ShadowedVar) {
        self.emit(builders::assignment_statement(
            builders::identifier(&shadowed.name),
            builders::identifier(&shadowed.saved.name()),
        ));
        // `shadowed.saved` drops here, releasing the temporary.
    }

    // --- Block writer ---

    fn current_block(&mut self) -> &mut BasicBlock {
        self.blocks.last_mut().expect("block list never empty")
    }

    fn current_label(&self) -> Label {
        Label((self.blocks.len() - 1) as u32)
    }

    /// The label of the next block to execute from here. Reuses the
    /// current block's label when it is still empty, so resolving two
    /// handles back-to-back lands them on the same block.
    pub fn open_block(&mut self) -> Label {
        if self.current_block().is_empty() {
            return self.current_label();
        }
        self.blocks.push(BasicBlock::new());
        self.current_label()
    }

    /// Append an entry to the current block.
    pub fn emit(&mut self, statement: Statement) {
        debug_assert!(!self.current_block().terminated);
        self.current_block().entries.push(Entry::Statement(statement));
    }

    /// `target = value;`, skipped when source and destination are the
    /// same identifier.
    pub fn emit_assignment(&mut self, name: &str, value: Expression) {
        if let ExpressionKind::Identifier(source) = &value.inner {
            if source == name {
                return;
            }
        }
        self.emit(builders::assignment_statement(
            builders::identifier(name),
            value,
        ));
    }

    fn terminate(&mut self, entry: Entry) {
        debug_assert!(!self.current_block().terminated);
        let block = self.current_block();
        block.entries.push(entry);
        block.terminated = true;
        // Every terminator is the last entry of its block; emission
        // continues in a fresh block.
        self.blocks.push(BasicBlock::new());
    }

    /// Emit an unconditional jump terminator.
    pub fn emit_jump(&mut self, target: Target) {
        self.terminate(Entry::Jump(target));
    }

    /// Emit a conditional jump terminator over a reusable test.
    pub fn emit_branch(&mut self, test: Expression, consequent: Target, alternate: Target) {
        self.terminate(Entry::Branch {
            test,
            consequent,
            alternate,
        });
    }

    /// Emit an already-materialized `GOTO` statement as a terminator
    /// (verbatim passthrough of lowered input).
    pub fn emit_goto_verbatim(&mut self, statement: Statement) {
        self.terminate(Entry::Statement(statement));
    }

    // --- Jump handles ---

    pub fn new_target(&mut self) -> Target {
        self.targets.push(None);
        Target(self.targets.len() - 1)
    }

    pub fn resolve_target(&mut self, target: Target, label: Label) -> Result<(), LoweringError> {
        let slot = &mut self.targets[target.0];
        if slot.is_some() {
            return Err(LoweringError::InvariantViolated(
                "jump target resolved twice".to_string(),
            ));
        }
        *slot = Some(label);
        Ok(())
    }

    /// Resolve a handle to "here": the next block to be opened.
    pub fn resolve_target_here(&mut self, target: Target) -> Result<Label, LoweringError> {
        let label = self.open_block();
        self.resolve_target(target, label)?;
        Ok(label)
    }

    /// A handle already resolved to the current position; jumps inserted
    /// through it later become back-edges.
    pub fn target_here(&mut self) -> Result<Target, LoweringError> {
        let target = self.new_target();
        self.resolve_target_here(target)?;
        Ok(target)
    }

    /// Insert an unconditional jump now; the caller resolves the
    /// returned handle once the destination is known.
    pub fn insert_pending_jump(&mut self) -> Target {
        let target = self.new_target();
        self.emit_jump(target);
        target
    }

    fn target_label(&self, target: Target) -> Result<Label, LoweringError> {
        self.targets[target.0].ok_or_else(|| {
            LoweringError::InvariantViolated("unresolved jump target at finalization".to_string())
        })
    }

    // --- Label stack ---

    pub fn push_label_frame(
        &mut self,
        label_set: Vec<String>,
        continue_target: Option<Target>,
        allows_unlabeled_break: bool,
    ) {
        self.label_stack.push(LabelFrame {
            label_set,
            continue_target,
            allows_unlabeled_break,
            break_watermark: self.pending_breaks.len(),
        });
    }

    /// Pop a frame, resolving every matching pending break enqueued
    /// during its extent to "here".
    pub fn pop_label_frame(&mut self) -> Result<(), LoweringError> {
        let frame = self.label_stack.pop().ok_or_else(|| {
            LoweringError::InvariantViolated("label stack underflow".to_string())
        })?;

        let mut matched = Vec::new();
        let mut remaining = Vec::new();
        for pending in self.pending_breaks.drain(frame.break_watermark..) {
            let is_match = if pending.label.is_empty() {
                frame.allows_unlabeled_break
            } else {
                frame.label_set.contains(&pending.label)
            };
            if is_match {
                matched.push(pending.target);
            } else {
                remaining.push(pending);
            }
        }
        self.pending_breaks.extend(remaining);

        if !matched.is_empty() {
            let label = self.open_block();
            for target in matched {
                self.resolve_target(target, label)?;
            }
        }
        Ok(())
    }

    /// Walk the label stack from the top; pick the first frame with a
    /// continue handle whose name matches (any such frame when the
    /// continue is unlabeled).
    pub fn find_continue_target(&self, label: Option<&str>) -> Option<Target> {
        for frame in self.label_stack.iter().rev() {
            let Some(target) = frame.continue_target else {
                continue;
            };
            match label {
                None => return Some(target),
                Some(name) if frame.label_set.iter().any(|l| l == name) => return Some(target),
                Some(_) => {}
            }
        }
        None
    }

    // --- Finalization ---

    /// Finalize the context: sanity-check balance invariants, resolve
    /// returns and throws to the function epilogue, hoist deferred
    /// function-declaration initializers, and materialize the prologue
    /// declaration plus the labeled block list.
    pub fn leave(mut self) -> Result<Vec<Statement>, LoweringError> {
        if self.locked_temp_count() != 0 {
            return Err(LoweringError::InvariantViolated(format!(
                "{} locked temporaries at finalization",
                self.locked_temp_count()
            )));
        }
        if !self.label_stack.is_empty() {
            return Err(LoweringError::InvariantViolated(
                "non-empty label stack at finalization".to_string(),
            ));
        }
        if !self.pending_breaks.is_empty() {
            return Err(LoweringError::InvariantViolated(
                "unresolved break at finalization".to_string(),
            ));
        }

        // The epilogue is the universal sink for returns and throws: a
        // caller inspects __ERROR to distinguish normal completion from
        // propagation, and __RESULT for the return value.
        if !self.pending_returns.is_empty() || !self.pending_throws.is_empty() {
            let epilogue = self.open_block();
            for target in std::mem::take(&mut self.pending_returns) {
                self.resolve_target(target, epilogue)?;
            }
            for target in std::mem::take(&mut self.pending_throws) {
                self.resolve_target(target, epilogue)?;
            }
        }

        // Function declarations become ordinary assignments prepended to
        // the first block, in declaration order.
        let mut initializers = Vec::new();
        for variable in &mut self.scope_variables {
            if let Some(init) = variable.init.take() {
                initializers.push(builders::assignment_statement(
                    builders::identifier(&variable.name),
                    init,
                ));
            }
        }
        for (position, statement) in initializers.into_iter().enumerate() {
            self.blocks[0]
                .entries
                .insert(position, Entry::Statement(statement));
        }

        // Materialize: one declaration listing every scope variable,
        // then the ordered labeled blocks.
        let names = self
            .scope_variables
            .iter()
            .map(|v| v.name.clone())
            .collect();
        let mut body = vec![builders::variable_declaration(names)];
        let blocks = std::mem::take(&mut self.blocks);
        for (index, block) in blocks.into_iter().enumerate() {
            let mut statements = Vec::with_capacity(block.entries.len());
            for entry in block.entries {
                statements.push(match entry {
                    Entry::Statement(statement) => statement,
                    Entry::Jump(target) => builders::goto_statement(self.target_label(target)?),
                    Entry::Branch {
                        test,
                        consequent,
                        alternate,
                    } => builders::goto_branch_statement(
                        test,
                        self.target_label(consequent)?,
                        self.target_label(alternate)?,
                    ),
                });
            }
            body.push(builders::labelled_block(Label(index as u32), statements));
        }
        Ok(body)
    }
}
