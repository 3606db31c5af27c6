/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Constructors for the output AST node shapes the emitter produces.
//!
//! Synthesized nodes carry an empty source range.

use crate::ast::*;
use crate::lowering::basic_block::Label;
use crate::lowering::GOTO_HELPER;

fn node<T>(inner: T) -> Node<T> {
    Node::new(SourceRange::synthetic(), inner)
}

pub fn identifier(name: &str) -> Expression {
    node(ExpressionKind::Identifier(name.to_string()))
}

pub fn string_literal(value: &str) -> Expression {
    node(ExpressionKind::Literal(LiteralValue::String(
        value.to_string(),
    )))
}

pub fn literal(value: LiteralValue) -> Expression {
    node(ExpressionKind::Literal(value))
}

pub fn unary(op: UnaryOp, operand: Expression) -> Expression {
    node(ExpressionKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
    node(ExpressionKind::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn function_expression(
    name: Option<String>,
    params: Vec<String>,
    body: Vec<Statement>,
) -> Expression {
    node(ExpressionKind::Function(Box::new(FunctionData {
        name,
        params,
        body,
    })))
}

pub fn expression_statement(expression: Expression) -> Statement {
    node(StatementKind::Expression(Box::new(expression)))
}

pub fn debugger_statement() -> Statement {
    node(StatementKind::Debugger)
}

/// `target = value;`
pub fn assignment_statement(target: Expression, value: Expression) -> Statement {
    expression_statement(node(ExpressionKind::Assignment {
        op: AssignmentOp::Assignment,
        target: Box::new(target),
        value: Box::new(value),
    }))
}

/// `helper(arg0, arg1, …);`
pub fn call_statement(helper: &str, arguments: Vec<Expression>) -> Statement {
    expression_statement(node(ExpressionKind::Call {
        callee: Box::new(identifier(helper)),
        arguments,
    }))
}

/// `GOTO("Bn");`
pub fn goto_statement(target: Label) -> Statement {
    call_statement(GOTO_HELPER, vec![string_literal(&target.name())])
}

/// `GOTO(test ? "Bi" : "Bj");`
pub fn goto_branch_statement(test: Expression, consequent: Label, alternate: Label) -> Statement {
    call_statement(
        GOTO_HELPER,
        vec![node(ExpressionKind::Conditional {
            test: Box::new(test),
            consequent: Box::new(string_literal(&consequent.name())),
            alternate: Box::new(string_literal(&alternate.name())),
        })],
    )
}

/// `Bn: { … }`
pub fn labelled_block(label: Label, body: Vec<Statement>) -> Statement {
    node(StatementKind::Labelled {
        label: label.name(),
        body: Box::new(node(StatementKind::Block(body))),
    })
}

/// `var a, b, c;` — the scope prologue, no initializers.
pub fn variable_declaration(names: Vec<String>) -> Statement {
    node(StatementKind::VariableDeclaration {
        declarations: names
            .into_iter()
            .map(|name| VariableDeclarator { name, init: None })
            .collect(),
    })
}
