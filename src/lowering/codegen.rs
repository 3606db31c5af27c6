/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! The lowering tree walk.
//!
//! Expressions flow bottom-up, producing reusable values; statements
//! flow top-down, appending basic-block entries through the generator.
//! Every transfer of control is explicit: the walk emits no implicit
//! back-edges and no implicit fall-through across structured boundaries.

use super::builders;
use super::generator::{Generator, Lowered, Value};
use super::{
    LoweringError, CALL_HELPER, ERROR_REGISTER, GET_PROPERTY_HELPER, GOTO_HELPER,
    RESULT_REGISTER, SET_PROPERTY_HELPER, UNDEFINED,
};
use crate::ast::*;

// =============================================================================
// Statements
// =============================================================================

/// Lower one statement. The temporary pool must be balanced across every
/// statement handler; a leak here is a defect in a handler, not in the
/// input.
pub fn generate_statement(
    statement: &Statement,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    let locked_before = gen.locked_temp_count();
    generate_statement_inner(statement, gen)?;
    let locked_after = gen.locked_temp_count();
    if locked_after != locked_before {
        return Err(LoweringError::InvariantViolated(format!(
            "unbalanced temporaries around {}: {} locked before, {} after",
            statement.inner.name(),
            locked_before,
            locked_after
        )));
    }
    Ok(())
}

fn generate_statement_inner(
    statement: &Statement,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    match &statement.inner {
        StatementKind::Empty => Ok(()),

        StatementKind::Debugger => {
            gen.emit(builders::debugger_statement());
            Ok(())
        }

        StatementKind::Expression(expression) => generate_expression_statement(expression, gen),

        StatementKind::Block(children) => {
            for child in children {
                generate_statement(child, gen)?;
            }
            Ok(())
        }

        StatementKind::VariableDeclaration { declarations } => {
            for declarator in declarations {
                gen.declare_variable(&declarator.name);
                if let Some(init) = &declarator.init {
                    let lowered = generate_expression(init, gen)?;
                    store_lowered(gen, &declarator.name, lowered);
                }
            }
            Ok(())
        }

        StatementKind::FunctionDeclaration { name, function } => {
            // A function declaration is a var whose initializer is the
            // lowered function expression; the assignment is hoisted to
            // the top of the first block at finalization.
            let function_value = lower_function(function)?;
            gen.declare_variable_with_init(name, function_value);
            Ok(())
        }

        StatementKind::If {
            test,
            consequent,
            alternate,
        } => generate_if_statement(test, consequent, alternate.as_deref(), gen),

        StatementKind::While { test, body } => generate_while_statement(test, body, gen),

        StatementKind::DoWhile { body, test } => generate_do_while_statement(body, test, gen),

        StatementKind::For {
            init,
            test,
            update,
            body,
        } => generate_for_statement(init.as_ref(), test.as_deref(), update.as_deref(), body, gen),

        StatementKind::Switch {
            discriminant,
            cases,
        } => generate_switch_statement(discriminant, cases, gen),

        StatementKind::Labelled { label, body } => generate_labelled_statement(label, body, gen),

        StatementKind::Break { label } => {
            let target = gen.insert_pending_jump();
            gen.pending_breaks.push(super::generator::PendingBreak {
                label: label.clone().unwrap_or_default(),
                target,
            });
            Ok(())
        }

        StatementKind::Continue { label } => {
            match gen.find_continue_target(label.as_deref()) {
                Some(target) => {
                    gen.emit_jump(target);
                    Ok(())
                }
                None => Err(LoweringError::InvalidContinueLabel {
                    label: label.clone().unwrap_or_default(),
                }),
            }
        }

        StatementKind::Return(argument) => {
            if let Some(argument) = argument {
                let lowered = generate_expression(argument, gen)?;
                store_lowered(gen, RESULT_REGISTER, lowered);
            }
            let target = gen.insert_pending_jump();
            gen.pending_returns.push(target);
            Ok(())
        }

        StatementKind::Throw(argument) => {
            let lowered = generate_expression(argument, gen)?;
            store_lowered(gen, ERROR_REGISTER, lowered);
            let target = gen.insert_pending_jump();
            gen.pending_throws.push(target);
            Ok(())
        }

        StatementKind::Try {
            block,
            handler,
            finalizer,
        } => generate_try_statement(block, handler.as_ref(), finalizer.as_deref(), gen),

        StatementKind::ForIn { .. } | StatementKind::With { .. } => {
            Err(unsupported_statement(statement))
        }
    }
}

fn generate_expression_statement(
    expression: &Expression,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    // Already-lowered input passes through verbatim: GOTO is an opaque
    // terminator, and a bare helper call keeps the throw-check that
    // already follows it instead of growing a second one.
    if let Some(name) = call_helper_name(expression) {
        if name == GOTO_HELPER {
            gen.emit_goto_verbatim(builders::expression_statement(expression.clone()));
            return Ok(());
        }
        if super::is_foreign_helper(name) {
            gen.emit(builders::expression_statement(expression.clone()));
            return Ok(());
        }
    }

    // Lower and discard the result; a leftover pure composite vanishes.
    let lowered = generate_expression(expression, gen)?;
    drop(lowered);
    Ok(())
}

fn call_helper_name(expression: &Expression) -> Option<&str> {
    if let ExpressionKind::Call { callee, .. } = &expression.inner {
        if let ExpressionKind::Identifier(name) = &callee.inner {
            return Some(name);
        }
    }
    None
}

// =============================================================================
// If statement
// =============================================================================

fn generate_if_statement(
    test: &Expression,
    consequent: &Statement,
    alternate: Option<&Statement>,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    let reject = insert_branch_start(test, gen)?;
    generate_statement(consequent, gen)?;

    if let Some(alternate) = alternate {
        let fulfill = gen.insert_pending_jump();
        gen.resolve_target_here(reject)?;
        generate_statement(alternate, gen)?;
        gen.resolve_target_here(fulfill)?;
    } else {
        gen.resolve_target_here(reject)?;
    }
    Ok(())
}

// =============================================================================
// Loops
// =============================================================================

fn generate_while_statement(
    test: &Expression,
    body: &Statement,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    let start = gen.target_here()?;
    let reject = insert_branch_start(test, gen)?;

    let labels = std::mem::take(&mut gen.pending_labels);
    gen.push_label_frame(labels, Some(start), true);
    generate_statement(body, gen)?;
    gen.emit_jump(start);
    gen.resolve_target_here(reject)?;
    gen.pop_label_frame()
}

fn generate_do_while_statement(
    body: &Statement,
    test: &Expression,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    let body_target = gen.new_target();
    let exit = gen.new_target();
    gen.resolve_target_here(body_target)?;

    // NB: continue re-enters the body, not the test.
    let labels = std::mem::take(&mut gen.pending_labels);
    gen.push_label_frame(labels, Some(body_target), true);
    generate_statement(body, gen)?;

    let test_value = {
        let lowered = generate_expression(test, gen)?;
        gen.use_temp_var(lowered)
    };
    gen.emit_branch(test_value.to_expression(), body_target, exit);
    drop(test_value);

    gen.pop_label_frame()?;
    gen.resolve_target_here(exit)?;
    Ok(())
}

fn generate_for_statement(
    init: Option<&ForInit>,
    test: Option<&Expression>,
    update: Option<&Expression>,
    body: &Statement,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    match init {
        Some(ForInit::Declaration(declaration)) => generate_statement(declaration, gen)?,
        Some(ForInit::Expression(expression)) => {
            let lowered = generate_expression(expression, gen)?;
            drop(lowered);
        }
        None => {}
    }

    let start = gen.target_here()?;
    let reject = match test {
        Some(test) => Some(insert_branch_start(test, gen)?),
        None => None,
    };

    // Continues land on the update, then fall through the back-edge.
    let continue_target = gen.new_target();
    let labels = std::mem::take(&mut gen.pending_labels);
    gen.push_label_frame(labels, Some(continue_target), true);
    generate_statement(body, gen)?;

    gen.resolve_target_here(continue_target)?;
    if let Some(update) = update {
        let lowered = generate_expression(update, gen)?;
        drop(lowered);
    }
    gen.emit_jump(start);

    if let Some(reject) = reject {
        gen.resolve_target_here(reject)?;
    }
    gen.pop_label_frame()
}

// =============================================================================
// Labelled statement
// =============================================================================

fn is_loop_statement(statement: &Statement) -> bool {
    matches!(
        statement.inner,
        StatementKind::While { .. }
            | StatementKind::DoWhile { .. }
            | StatementKind::For { .. }
            | StatementKind::ForIn { .. }
    )
}

fn generate_labelled_statement(
    label: &str,
    body: &Statement,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    // A label starts a block boundary, so re-lowering a lowered program
    // keeps its block structure intact.
    gen.open_block();

    if is_loop_statement(body) {
        // The loop claims the name for its own frame; its back-edge
        // handle is the label's continue target.
        gen.pending_labels.push(label.to_string());
        generate_statement(body, gen)
    } else {
        gen.push_label_frame(vec![label.to_string()], None, false);
        generate_statement(body, gen)?;
        gen.pop_label_frame()
    }
}

// =============================================================================
// Switch statement
// =============================================================================

fn generate_switch_statement(
    discriminant: &Expression,
    cases: &[SwitchCase],
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    gen.push_label_frame(Vec::new(), None, true);

    let discriminant_value = {
        let lowered = generate_expression(discriminant, gen)?;
        gen.use_temp_var(lowered)
    };

    // Walk cases in order, threading `prev_leave`: the pending jump out
    // of the previous case's body that defines fall-through. The default
    // case's body is emitted after the walk, at the end of the chain of
    // failed tests; `default_entry`/`default_exit` splice it back into
    // the source-order fall-through chain.
    let mut prev_leave: Option<crate::lowering::basic_block::Target> = None;
    let mut default_index: Option<usize> = None;
    let mut default_entry = None;
    let mut default_exit = None;

    for (index, case) in cases.iter().enumerate() {
        let Some(test) = &case.test else {
            default_index = Some(index);
            default_entry = prev_leave.take();
            let exit = gen.new_target();
            default_exit = Some(exit);
            prev_leave = Some(exit);
            continue;
        };

        let test_value = {
            let lowered = generate_expression(test, gen)?;
            gen.use_temp_var(lowered)
        };
        let comparison = builders::binary(
            BinaryOp::StrictlyEquals,
            discriminant_value.to_expression(),
            test_value.to_expression(),
        );
        drop(test_value);
        let reject = branch_on(Lowered::Composite(comparison), gen)?;

        if let Some(enter) = prev_leave.take() {
            gen.resolve_target_here(enter)?;
        }
        for child in &case.body {
            generate_statement(child, gen)?;
        }
        prev_leave = Some(gen.insert_pending_jump());
        gen.resolve_target_here(reject)?;
    }

    if let Some(default_index) = default_index {
        // The chain of failed tests falls through to here, which is
        // where the default body begins.
        if let Some(enter) = default_entry {
            gen.resolve_target_here(enter)?;
        }
        for child in &cases[default_index].body {
            generate_statement(child, gen)?;
        }
        gen.emit_jump(default_exit.expect("default case has an exit handle"));
    }

    drop(discriminant_value);
    if let Some(leave) = prev_leave {
        gen.resolve_target_here(leave)?;
    }
    gen.pop_label_frame()
}

// =============================================================================
// Try statement
// =============================================================================

fn generate_try_statement(
    block: &Statement,
    handler: Option<&CatchClause>,
    finalizer: Option<&Statement>,
    gen: &mut Generator,
) -> Result<(), LoweringError> {
    let throw_watermark = gen.pending_throws.len();
    generate_statement(block, gen)?;

    if let Some(handler) = handler {
        // A catch whose try block cannot throw is dead and is skipped
        // entirely.
        if gen.pending_throws.len() > throw_watermark {
            let all_good = gen.insert_pending_jump();

            let caught: Vec<_> = gen.pending_throws.drain(throw_watermark..).collect();
            let landing_pad = gen.open_block();
            for target in caught {
                gen.resolve_target(target, landing_pad)?;
            }

            let shadowed =
                gen.shadow_variable(&handler.param, builders::identifier(ERROR_REGISTER));
            gen.emit_assignment(ERROR_REGISTER, builders::identifier(UNDEFINED));
            generate_statement(&handler.body, gen)?;
            gen.unshadow_variable(shadowed);

            gen.resolve_target_here(all_good)?;
        }
    }

    if let Some(finalizer) = finalizer {
        // The finalizer runs inline on the normal exit only; paths that
        // escape through pending throws or returns bypass it.
        generate_statement(finalizer, gen)?;
    }
    Ok(())
}

// =============================================================================
// Expressions
// =============================================================================

/// Lower an expression to a reusable value or a simple composite over
/// reusable operands. Anything that may diverge, throw, or have side
/// effects is channelled through the runtime helpers.
pub fn generate_expression(
    expression: &Expression,
    gen: &mut Generator,
) -> Result<Lowered, LoweringError> {
    match &expression.inner {
        ExpressionKind::Literal(value) => Ok(Lowered::Value(Value::Literal(value.clone()))),

        ExpressionKind::Identifier(name) => Ok(Lowered::Value(Value::Name(name.clone()))),

        ExpressionKind::Function(function) => Ok(Lowered::Composite(lower_function(function)?)),

        ExpressionKind::Member {
            object,
            property,
            computed,
        } => {
            let object_value = {
                let lowered = generate_expression(object, gen)?;
                gen.use_temp_var(lowered)
            };
            let key = lower_property_key(property, *computed, gen)?;
            let result = exec_foreign(GET_PROPERTY_HELPER, vec![object_value, key], gen)?;
            Ok(Lowered::Value(result))
        }

        ExpressionKind::Assignment { op, target, value } => {
            if !op.is_simple() {
                return Err(LoweringError::UnsupportedNode {
                    kind: format!("compound assignment '{}'", op.symbol()),
                    line: expression.range.start.line,
                    column: expression.range.start.column,
                });
            }
            generate_assignment_expression(target, value, gen)
        }

        ExpressionKind::Call { callee, arguments } => {
            generate_call_expression(callee, arguments, gen)
        }

        ExpressionKind::Unary { op, operand } => {
            let operand_value = {
                let lowered = generate_expression(operand, gen)?;
                gen.use_temp_var(lowered)
            };
            let composite = builders::unary(*op, operand_value.to_expression());
            drop(operand_value);
            Ok(Lowered::Composite(composite))
        }

        ExpressionKind::Binary { op, lhs, rhs } => {
            // Left then right, in source order.
            let lhs_value = {
                let lowered = generate_expression(lhs, gen)?;
                gen.use_temp_var(lowered)
            };
            let rhs_value = {
                let lowered = generate_expression(rhs, gen)?;
                gen.use_temp_var(lowered)
            };
            let composite = builders::binary(*op, lhs_value.to_expression(), rhs_value.to_expression());
            drop(lhs_value);
            drop(rhs_value);
            Ok(Lowered::Composite(composite))
        }

        ExpressionKind::New { .. }
        | ExpressionKind::Logical { .. }
        | ExpressionKind::Update { .. }
        | ExpressionKind::Conditional { .. }
        | ExpressionKind::Sequence(_)
        | ExpressionKind::Array(_)
        | ExpressionKind::Object(_)
        | ExpressionKind::This => Err(unsupported_expression(expression)),
    }
}

fn generate_assignment_expression(
    target: &Expression,
    value: &Expression,
    gen: &mut Generator,
) -> Result<Lowered, LoweringError> {
    match &target.inner {
        // The assignment itself denotes the assigned local, so it may be
        // used as an operand.
        ExpressionKind::Identifier(name) => {
            let lowered = generate_expression(value, gen)?;
            store_lowered(gen, name, lowered);
            Ok(Lowered::Value(Value::Name(name.clone())))
        }
        ExpressionKind::Member {
            object,
            property,
            computed,
        } => {
            let object_value = {
                let lowered = generate_expression(object, gen)?;
                gen.use_temp_var(lowered)
            };
            let key = lower_property_key(property, *computed, gen)?;
            let value_value = {
                let lowered = generate_expression(value, gen)?;
                gen.use_temp_var(lowered)
            };
            let result = exec_foreign(
                SET_PROPERTY_HELPER,
                vec![object_value, key, value_value],
                gen,
            )?;
            Ok(Lowered::Value(result))
        }
        _ => Err(unsupported_expression(target)),
    }
}

fn generate_call_expression(
    callee: &Expression,
    arguments: &[Expression],
    gen: &mut Generator,
) -> Result<Lowered, LoweringError> {
    match &callee.inner {
        // o.m(...): the receiver is evaluated exactly once, in source
        // order, and survives into the call as its `this`.
        ExpressionKind::Member {
            object,
            property,
            computed,
        } => {
            let this_value = {
                let lowered = generate_expression(object, gen)?;
                gen.use_temp_var(lowered)
            };
            let key = lower_property_key(property, *computed, gen)?;
            let callee_value =
                exec_foreign(GET_PROPERTY_HELPER, vec![this_value.clone(), key], gen)?;
            let callee_value = gen.use_temp_var(Lowered::Value(callee_value));

            let mut call_arguments = vec![callee_value, this_value];
            for argument in arguments {
                let lowered = generate_expression(argument, gen)?;
                call_arguments.push(gen.use_temp_var(lowered));
            }
            let result = exec_foreign(CALL_HELPER, call_arguments, gen)?;
            Ok(Lowered::Value(result))
        }
        _ => {
            let callee_value = {
                let lowered = generate_expression(callee, gen)?;
                gen.use_temp_var(lowered)
            };
            let mut call_arguments = vec![callee_value, Value::Name(UNDEFINED.to_string())];
            for argument in arguments {
                let lowered = generate_expression(argument, gen)?;
                call_arguments.push(gen.use_temp_var(lowered));
            }
            let result = exec_foreign(CALL_HELPER, call_arguments, gen)?;
            Ok(Lowered::Value(result))
        }
    }
}

/// The property key of a member access: the string literal of the name
/// in dot form, the lowered computed key otherwise.
fn lower_property_key(
    property: &Expression,
    computed: bool,
    gen: &mut Generator,
) -> Result<Value, LoweringError> {
    if computed {
        let lowered = generate_expression(property, gen)?;
        return Ok(gen.use_temp_var(lowered));
    }
    match &property.inner {
        ExpressionKind::Identifier(name) => {
            Ok(Value::Literal(LiteralValue::String(name.clone())))
        }
        _ => Err(unsupported_expression(property)),
    }
}

/// Lower a function body in a fresh context and return the reusable
/// function value. The body statement list is replaced by the block
/// list.
pub(crate) fn lower_function(function: &FunctionData) -> Result<Expression, LoweringError> {
    let mut inner = Generator::new();
    for statement in &function.body {
        generate_statement(statement, &mut inner)?;
    }
    let body = inner.leave()?;
    Ok(builders::function_expression(
        function.name.clone(),
        function.params.clone(),
        body,
    ))
}

// =============================================================================
// Helper calls
// =============================================================================

/// Emit `helper(arg0, arg1, …);` followed by the throw-check: a
/// conditional jump on `__ERROR` whose consequent joins the pending
/// throws (routed to the nearest catch landing pad, or the epilogue) and
/// whose alternate is the success continuation. The helper's result is
/// read from `__RESULT`.
fn exec_foreign(
    helper: &str,
    arguments: Vec<Value>,
    gen: &mut Generator,
) -> Result<Value, LoweringError> {
    let argument_expressions = arguments.iter().map(Value::to_expression).collect();
    gen.emit(builders::call_statement(helper, argument_expressions));
    drop(arguments);

    let throw_target = gen.new_target();
    let continue_target = gen.new_target();
    gen.emit_branch(
        builders::identifier(ERROR_REGISTER),
        throw_target,
        continue_target,
    );
    gen.pending_throws.push(throw_target);
    gen.resolve_target_here(continue_target)?;

    Ok(Value::Name(RESULT_REGISTER.to_string()))
}

// =============================================================================
// Support
// =============================================================================

/// Emit a conditional jump over `test`, resolve the consequent to the
/// fall-through path, and return the alternate for later resolution.
/// The forward-jump idiom of `if`/`while`/`for`/`switch`.
fn insert_branch_start(
    test: &Expression,
    gen: &mut Generator,
) -> Result<crate::lowering::basic_block::Target, LoweringError> {
    let lowered = generate_expression(test, gen)?;
    branch_on(lowered, gen)
}

fn branch_on(
    lowered: Lowered,
    gen: &mut Generator,
) -> Result<crate::lowering::basic_block::Target, LoweringError> {
    let test_value = gen.use_temp_var(lowered);
    let consequent = gen.new_target();
    let alternate = gen.new_target();
    gen.emit_branch(test_value.to_expression(), consequent, alternate);
    drop(test_value);
    gen.resolve_target_here(consequent)?;
    Ok(alternate)
}

/// `name = <lowered>;`, skipping self-assignments.
fn store_lowered(gen: &mut Generator, name: &str, lowered: Lowered) {
    match lowered {
        Lowered::Composite(expression) => gen.emit_assignment(name, expression),
        Lowered::Value(value) => {
            gen.emit_assignment(name, value.to_expression());
            drop(value);
        }
    }
}

fn unsupported_expression(expression: &Expression) -> LoweringError {
    LoweringError::UnsupportedNode {
        kind: expression.inner.name().to_string(),
        line: expression.range.start.line,
        column: expression.range.start.column,
    }
}

fn unsupported_statement(statement: &Statement) -> LoweringError {
    LoweringError::UnsupportedNode {
        kind: statement.inner.name().to_string(),
        line: statement.range.start.line,
        column: statement.range.start.column,
    }
}
