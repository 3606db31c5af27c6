/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Rendering of the AST back to JavaScript source text.
//!
//! Two-space indentation, double-quoted strings, minimal
//! parenthesization driven by a precedence table.

use crate::ast::*;

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for statement in &program.body {
        out.push_str(&format_statement(statement, 0));
        out.push('\n');
    }
    out
}

fn indentation(indent: usize) -> String {
    "  ".repeat(indent)
}

// =============================================================================
// Statements
// =============================================================================

fn format_statement(statement: &Statement, indent: usize) -> String {
    let pad = indentation(indent);
    match &statement.inner {
        StatementKind::Empty => format!("{};", pad),
        StatementKind::Debugger => format!("{}debugger;", pad),

        StatementKind::Expression(expression) => {
            let text = format_expression(expression, 0);
            // A leading `function` or `{` would parse as a declaration
            // or block.
            let needs_parens = matches!(
                expression.inner,
                ExpressionKind::Function(_) | ExpressionKind::Object(_)
            );
            if needs_parens {
                format!("{}({});", pad, text)
            } else {
                format!("{}{};", pad, text)
            }
        }

        StatementKind::Block(children) => {
            if children.is_empty() {
                return format!("{}{{}}", pad);
            }
            let mut out = format!("{}{{\n", pad);
            for child in children {
                out.push_str(&format_statement(child, indent + 1));
                out.push('\n');
            }
            out.push_str(&format!("{}}}", pad));
            out
        }

        StatementKind::VariableDeclaration { declarations } => {
            format!("{}{};", pad, format_declarators(declarations))
        }

        StatementKind::FunctionDeclaration { function, .. } => {
            format!("{}{}", pad, format_function(function, indent))
        }

        StatementKind::If {
            test,
            consequent,
            alternate,
        } => {
            let mut out = format!("{}if ({})", pad, format_expression(test, 0));
            out.push_str(&format_body(consequent, indent));
            if let Some(alternate) = alternate {
                if body_is_block(consequent) {
                    out.push_str(" else");
                } else {
                    out.push_str(&format!("\n{}else", pad));
                }
                if matches!(alternate.inner, StatementKind::If { .. }) {
                    out.push(' ');
                    out.push_str(format_statement(alternate, indent).trim_start());
                } else {
                    out.push_str(&format_body(alternate, indent));
                }
            }
            out
        }

        StatementKind::While { test, body } => {
            let mut out = format!("{}while ({})", pad, format_expression(test, 0));
            out.push_str(&format_body(body, indent));
            out
        }

        StatementKind::DoWhile { body, test } => {
            let mut out = format!("{}do", pad);
            out.push_str(&format_body(body, indent));
            if body_is_block(body) {
                out.push_str(&format!(" while ({});", format_expression(test, 0)));
            } else {
                out.push_str(&format!("\n{}while ({});", pad, format_expression(test, 0)));
            }
            out
        }

        StatementKind::For {
            init,
            test,
            update,
            body,
        } => {
            let init_text = match init {
                Some(ForInit::Declaration(declaration)) => match &declaration.inner {
                    StatementKind::VariableDeclaration { declarations } => {
                        format_declarators(declarations)
                    }
                    _ => format_statement(declaration, 0),
                },
                Some(ForInit::Expression(expression)) => format_expression(expression, 0),
                None => String::new(),
            };
            let test_text = test
                .as_ref()
                .map(|e| format_expression(e, 0))
                .unwrap_or_default();
            let update_text = update
                .as_ref()
                .map(|e| format_expression(e, 0))
                .unwrap_or_default();
            let mut out = format!("{}for ({}; {}; {})", pad, init_text, test_text, update_text);
            out.push_str(&format_body(body, indent));
            out
        }

        StatementKind::ForIn {
            declaration,
            name,
            object,
            body,
        } => {
            let head = if *declaration {
                format!("var {}", name)
            } else {
                name.clone()
            };
            let mut out = format!(
                "{}for ({} in {})",
                pad,
                head,
                format_expression(object, 0)
            );
            out.push_str(&format_body(body, indent));
            out
        }

        StatementKind::Labelled { label, body } => {
            if body_is_block(body) {
                format!("{}{}: {}", pad, label, format_statement(body, indent).trim_start())
            } else {
                format!("{}{}:\n{}", pad, label, format_statement(body, indent + 1))
            }
        }

        StatementKind::Break { label } => match label {
            Some(label) => format!("{}break {};", pad, label),
            None => format!("{}break;", pad),
        },

        StatementKind::Continue { label } => match label {
            Some(label) => format!("{}continue {};", pad, label),
            None => format!("{}continue;", pad),
        },

        StatementKind::Return(argument) => match argument {
            Some(argument) => format!("{}return {};", pad, format_expression(argument, 0)),
            None => format!("{}return;", pad),
        },

        StatementKind::Throw(argument) => {
            format!("{}throw {};", pad, format_expression(argument, 0))
        }

        StatementKind::Switch {
            discriminant,
            cases,
        } => {
            let mut out = format!(
                "{}switch ({}) {{\n",
                pad,
                format_expression(discriminant, 0)
            );
            for case in cases {
                match &case.test {
                    Some(test) => {
                        out.push_str(&format!(
                            "{}case {}:\n",
                            indentation(indent + 1),
                            format_expression(test, 0)
                        ));
                    }
                    None => {
                        out.push_str(&format!("{}default:\n", indentation(indent + 1)));
                    }
                }
                for child in &case.body {
                    out.push_str(&format_statement(child, indent + 2));
                    out.push('\n');
                }
            }
            out.push_str(&format!("{}}}", pad));
            out
        }

        StatementKind::Try {
            block,
            handler,
            finalizer,
        } => {
            let mut out = format!("{}try ", pad);
            out.push_str(format_statement(block, indent).trim_start());
            if let Some(handler) = handler {
                out.push_str(&format!(" catch ({}) ", handler.param));
                out.push_str(format_statement(&handler.body, indent).trim_start());
            }
            if let Some(finalizer) = finalizer {
                out.push_str(" finally ");
                out.push_str(format_statement(finalizer, indent).trim_start());
            }
            out
        }

        StatementKind::With { object, body } => {
            let mut out = format!("{}with ({})", pad, format_expression(object, 0));
            out.push_str(&format_body(body, indent));
            out
        }
    }
}

fn body_is_block(statement: &Statement) -> bool {
    matches!(statement.inner, StatementKind::Block(_))
}

/// Body of a control statement: blocks stay on the same line, anything
/// else moves to the next line, indented.
fn format_body(body: &Statement, indent: usize) -> String {
    if body_is_block(body) {
        format!(" {}", format_statement(body, indent).trim_start())
    } else {
        format!("\n{}", format_statement(body, indent + 1))
    }
}

fn format_declarators(declarations: &[VariableDeclarator]) -> String {
    let parts: Vec<String> = declarations
        .iter()
        .map(|declarator| match &declarator.init {
            Some(init) => format!(
                "{} = {}",
                declarator.name,
                format_expression(init, PRECEDENCE_ASSIGNMENT)
            ),
            None => declarator.name.clone(),
        })
        .collect();
    format!("var {}", parts.join(", "))
}

fn format_function(function: &FunctionData, indent: usize) -> String {
    let name = function.name.as_deref().unwrap_or("");
    let separator = if name.is_empty() { "" } else { " " };
    let mut out = format!("function{}{}({}) {{", separator, name, function.params.join(", "));
    if function.body.is_empty() {
        out.push('}');
        return out;
    }
    out.push('\n');
    for statement in &function.body {
        out.push_str(&format_statement(statement, indent + 1));
        out.push('\n');
    }
    out.push_str(&format!("{}}}", indentation(indent)));
    out
}

// =============================================================================
// Expressions
// =============================================================================

const PRECEDENCE_SEQUENCE: u8 = 0;
const PRECEDENCE_ASSIGNMENT: u8 = 1;
const PRECEDENCE_CONDITIONAL: u8 = 2;
const PRECEDENCE_UNARY: u8 = 13;
const PRECEDENCE_POSTFIX: u8 = 14;
const PRECEDENCE_CALL: u8 = 15;
const PRECEDENCE_PRIMARY: u8 = 16;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::BitwiseOr => 5,
        BinaryOp::BitwiseXor => 6,
        BinaryOp::BitwiseAnd => 7,
        BinaryOp::LooselyEquals
        | BinaryOp::LooselyInequals
        | BinaryOp::StrictlyEquals
        | BinaryOp::StrictlyInequals => 8,
        BinaryOp::LessThan
        | BinaryOp::LessThanEquals
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanEquals
        | BinaryOp::In
        | BinaryOp::InstanceOf => 9,
        BinaryOp::LeftShift | BinaryOp::RightShift | BinaryOp::UnsignedRightShift => 10,
        BinaryOp::Addition | BinaryOp::Subtraction => 11,
        BinaryOp::Multiplication | BinaryOp::Division | BinaryOp::Modulo => 12,
    }
}

fn precedence(expression: &Expression) -> u8 {
    match &expression.inner {
        ExpressionKind::Sequence(_) => PRECEDENCE_SEQUENCE,
        ExpressionKind::Assignment { .. } => PRECEDENCE_ASSIGNMENT,
        ExpressionKind::Conditional { .. } => PRECEDENCE_CONDITIONAL,
        ExpressionKind::Logical { op, .. } => match op {
            LogicalOp::Or => 3,
            LogicalOp::And => 4,
        },
        ExpressionKind::Binary { op, .. } => binary_precedence(*op),
        ExpressionKind::Unary { .. } => PRECEDENCE_UNARY,
        ExpressionKind::Update { prefixed, .. } => {
            if *prefixed {
                PRECEDENCE_UNARY
            } else {
                PRECEDENCE_POSTFIX
            }
        }
        ExpressionKind::Call { .. } | ExpressionKind::New { .. } | ExpressionKind::Member { .. } => {
            PRECEDENCE_CALL
        }
        _ => PRECEDENCE_PRIMARY,
    }
}

/// Render `expression`, parenthesized if it binds looser than the
/// context requires.
fn format_expression(expression: &Expression, min_precedence: u8) -> String {
    let text = format_expression_inner(expression);
    if precedence(expression) < min_precedence {
        format!("({})", text)
    } else {
        text
    }
}

fn format_expression_inner(expression: &Expression) -> String {
    match &expression.inner {
        ExpressionKind::Literal(value) => format_literal(value),
        ExpressionKind::Identifier(name) => name.clone(),
        ExpressionKind::This => "this".to_string(),
        ExpressionKind::Function(function) => format_function(function, 0),

        ExpressionKind::Member {
            object,
            property,
            computed,
        } => {
            let object_text = format_expression(object, PRECEDENCE_CALL);
            if *computed {
                format!("{}[{}]", object_text, format_expression(property, 0))
            } else {
                format!("{}.{}", object_text, format_expression_inner(property))
            }
        }

        ExpressionKind::Assignment { op, target, value } => format!(
            "{} {} {}",
            format_expression(target, PRECEDENCE_CALL),
            op.symbol(),
            format_expression(value, PRECEDENCE_ASSIGNMENT)
        ),

        ExpressionKind::Call { callee, arguments } => {
            let arguments: Vec<String> = arguments
                .iter()
                .map(|argument| format_expression(argument, PRECEDENCE_ASSIGNMENT))
                .collect();
            format!(
                "{}({})",
                format_expression(callee, PRECEDENCE_CALL),
                arguments.join(", ")
            )
        }

        ExpressionKind::New { callee, arguments } => {
            let arguments: Vec<String> = arguments
                .iter()
                .map(|argument| format_expression(argument, PRECEDENCE_ASSIGNMENT))
                .collect();
            format!(
                "new {}({})",
                format_expression(callee, PRECEDENCE_CALL),
                arguments.join(", ")
            )
        }

        ExpressionKind::Unary { op, operand } => {
            let separator = if op.is_keyword() { " " } else { "" };
            format!(
                "{}{}{}",
                op.symbol(),
                separator,
                format_expression(operand, PRECEDENCE_UNARY)
            )
        }

        ExpressionKind::Binary { op, lhs, rhs } => {
            let own = binary_precedence(*op);
            format!(
                "{} {} {}",
                format_expression(lhs, own),
                op.symbol(),
                format_expression(rhs, own + 1)
            )
        }

        ExpressionKind::Logical { op, lhs, rhs } => {
            let own = precedence(expression);
            format!(
                "{} {} {}",
                format_expression(lhs, own),
                op.symbol(),
                format_expression(rhs, own + 1)
            )
        }

        ExpressionKind::Update {
            op,
            argument,
            prefixed,
        } => {
            if *prefixed {
                format!("{}{}", op.symbol(), format_expression(argument, PRECEDENCE_UNARY))
            } else {
                format!("{}{}", format_expression(argument, PRECEDENCE_CALL), op.symbol())
            }
        }

        ExpressionKind::Conditional {
            test,
            consequent,
            alternate,
        } => format!(
            "{} ? {} : {}",
            format_expression(test, PRECEDENCE_CONDITIONAL + 1),
            format_expression(consequent, PRECEDENCE_ASSIGNMENT),
            format_expression(alternate, PRECEDENCE_ASSIGNMENT)
        ),

        ExpressionKind::Sequence(expressions) => {
            let parts: Vec<String> = expressions
                .iter()
                .map(|e| format_expression(e, PRECEDENCE_ASSIGNMENT))
                .collect();
            parts.join(", ")
        }

        ExpressionKind::Array(elements) => {
            let parts: Vec<String> = elements
                .iter()
                .map(|e| format_expression(e, PRECEDENCE_ASSIGNMENT))
                .collect();
            format!("[{}]", parts.join(", "))
        }

        ExpressionKind::Object(properties) => {
            let parts: Vec<String> = properties
                .iter()
                .map(|property| {
                    let key = match &property.key {
                        PropertyKey::Identifier(name) => name.clone(),
                        PropertyKey::String(value) => quote_string(value),
                        PropertyKey::Number(value) => format_number(*value),
                    };
                    format!(
                        "{}: {}",
                        key,
                        format_expression(&property.value, PRECEDENCE_ASSIGNMENT)
                    )
                })
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
    }
}

fn format_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Number(value) => format_number(*value),
        LiteralValue::String(value) => quote_string(value),
        LiteralValue::Boolean(true) => "true".to_string(),
        LiteralValue::Boolean(false) => "false".to_string(),
        LiteralValue::Null => "null".to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    format!("{}", value)
}

fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
