/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Expression parsing: precedence climbing over the binary operator
//! table, with dedicated productions for unary, postfix, call/member
//! chains and primaries.

use crate::ast::*;
use crate::parser::{Parser, SyntaxError};
use crate::token::TokenType;

/// Binary/logical operator precedence, higher binds tighter.
/// `None` for tokens that are not binary operators.
fn binary_precedence(token_type: TokenType) -> Option<u8> {
    Some(match token_type {
        TokenType::DoublePipe => 1,
        TokenType::DoubleAmpersand => 2,
        TokenType::Pipe => 3,
        TokenType::Caret => 4,
        TokenType::Ampersand => 5,
        TokenType::EqualsEquals
        | TokenType::ExclamationMarkEquals
        | TokenType::EqualsEqualsEquals
        | TokenType::ExclamationMarkEqualsEquals => 6,
        TokenType::LessThan
        | TokenType::LessThanEquals
        | TokenType::GreaterThan
        | TokenType::GreaterThanEquals
        | TokenType::In
        | TokenType::Instanceof => 7,
        TokenType::ShiftLeft | TokenType::ShiftRight | TokenType::UnsignedShiftRight => 8,
        TokenType::Plus | TokenType::Minus => 9,
        TokenType::Asterisk | TokenType::Slash | TokenType::Percent => 10,
        _ => return None,
    })
}

fn binary_op(token_type: TokenType) -> BinaryOp {
    match token_type {
        TokenType::Pipe => BinaryOp::BitwiseOr,
        TokenType::Caret => BinaryOp::BitwiseXor,
        TokenType::Ampersand => BinaryOp::BitwiseAnd,
        TokenType::EqualsEquals => BinaryOp::LooselyEquals,
        TokenType::ExclamationMarkEquals => BinaryOp::LooselyInequals,
        TokenType::EqualsEqualsEquals => BinaryOp::StrictlyEquals,
        TokenType::ExclamationMarkEqualsEquals => BinaryOp::StrictlyInequals,
        TokenType::LessThan => BinaryOp::LessThan,
        TokenType::LessThanEquals => BinaryOp::LessThanEquals,
        TokenType::GreaterThan => BinaryOp::GreaterThan,
        TokenType::GreaterThanEquals => BinaryOp::GreaterThanEquals,
        TokenType::In => BinaryOp::In,
        TokenType::Instanceof => BinaryOp::InstanceOf,
        TokenType::ShiftLeft => BinaryOp::LeftShift,
        TokenType::ShiftRight => BinaryOp::RightShift,
        TokenType::UnsignedShiftRight => BinaryOp::UnsignedRightShift,
        TokenType::Plus => BinaryOp::Addition,
        TokenType::Minus => BinaryOp::Subtraction,
        TokenType::Asterisk => BinaryOp::Multiplication,
        TokenType::Slash => BinaryOp::Division,
        TokenType::Percent => BinaryOp::Modulo,
        _ => unreachable!("not a binary operator"),
    }
}

fn assignment_op(token_type: TokenType) -> Option<AssignmentOp> {
    Some(match token_type {
        TokenType::Equals => AssignmentOp::Assignment,
        TokenType::PlusEquals => AssignmentOp::AdditionAssignment,
        TokenType::MinusEquals => AssignmentOp::SubtractionAssignment,
        TokenType::AsteriskEquals => AssignmentOp::MultiplicationAssignment,
        TokenType::SlashEquals => AssignmentOp::DivisionAssignment,
        TokenType::PercentEquals => AssignmentOp::ModuloAssignment,
        TokenType::AmpersandEquals => AssignmentOp::BitwiseAndAssignment,
        TokenType::PipeEquals => AssignmentOp::BitwiseOrAssignment,
        TokenType::CaretEquals => AssignmentOp::BitwiseXorAssignment,
        TokenType::ShiftLeftEquals => AssignmentOp::LeftShiftAssignment,
        TokenType::ShiftRightEquals => AssignmentOp::RightShiftAssignment,
        TokenType::UnsignedShiftRightEquals => AssignmentOp::UnsignedRightShiftAssignment,
        _ => return None,
    })
}

fn is_valid_assignment_target(expression: &Expression) -> bool {
    matches!(
        expression.inner,
        ExpressionKind::Identifier(_) | ExpressionKind::Member { .. }
    )
}

impl Parser {
    /// Full expression, including the comma (sequence) operator.
    pub(crate) fn parse_expression_any(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        let first = self.parse_assignment_expression()?;
        if !self.match_token(TokenType::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.match_token(TokenType::Comma) {
            self.consume();
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(self.expression(start, ExpressionKind::Sequence(expressions)))
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        let lhs = self.parse_conditional_expression()?;

        let Some(op) = assignment_op(self.current_token_type()) else {
            return Ok(lhs);
        };
        if !is_valid_assignment_target(&lhs) {
            return Err(self.syntax_error("invalid left-hand side in assignment"));
        }
        self.consume();
        let rhs = self.parse_assignment_expression()?;
        Ok(self.expression(
            start,
            ExpressionKind::Assignment {
                op,
                target: Box::new(lhs),
                value: Box::new(rhs),
            },
        ))
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        let test = self.parse_binary_expression(0)?;
        if !self.match_token(TokenType::QuestionMark) {
            return Ok(test);
        }
        self.consume();
        // The consequent may contain `in` even inside a for head.
        let forbid_in = self.forbid_in;
        self.forbid_in = false;
        let consequent = self.parse_assignment_expression()?;
        self.forbid_in = forbid_in;
        self.consume_token(TokenType::Colon)?;
        let alternate = self.parse_assignment_expression()?;
        Ok(self.expression(
            start,
            ExpressionKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        ))
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> Result<Expression, SyntaxError> {
        let start = self.position();
        let mut lhs = self.parse_unary_expression()?;

        loop {
            let token_type = self.current_token_type();
            if token_type == TokenType::In && self.forbid_in {
                break;
            }
            let Some(precedence) = binary_precedence(token_type) else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            self.consume();
            let rhs = self.parse_binary_expression(precedence)?;
            lhs = match token_type {
                TokenType::DoubleAmpersand => self.expression(
                    start,
                    ExpressionKind::Logical {
                        op: LogicalOp::And,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                ),
                TokenType::DoublePipe => self.expression(
                    start,
                    ExpressionKind::Logical {
                        op: LogicalOp::Or,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                ),
                _ => self.expression(
                    start,
                    ExpressionKind::Binary {
                        op: binary_op(token_type),
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                ),
            };
        }
        Ok(lhs)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        let op = match self.current_token_type() {
            TokenType::ExclamationMark => Some(UnaryOp::Not),
            TokenType::Tilde => Some(UnaryOp::BitwiseNot),
            TokenType::Plus => Some(UnaryOp::Plus),
            TokenType::Minus => Some(UnaryOp::Minus),
            TokenType::Typeof => Some(UnaryOp::Typeof),
            TokenType::Void => Some(UnaryOp::Void),
            TokenType::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.consume();
            let operand = self.parse_unary_expression()?;
            return Ok(self.expression(
                start,
                ExpressionKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
            ));
        }

        if self.match_token(TokenType::PlusPlus) || self.match_token(TokenType::MinusMinus) {
            let op = if self.match_token(TokenType::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            self.consume();
            let argument = self.parse_unary_expression()?;
            return Ok(self.expression(
                start,
                ExpressionKind::Update {
                    op,
                    argument: Box::new(argument),
                    prefixed: true,
                },
            ));
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        let expression = self.parse_call_expression()?;

        // Postfix `++`/`--` is a restricted production: a line terminator
        // before the operator terminates the expression instead.
        if (self.match_token(TokenType::PlusPlus) || self.match_token(TokenType::MinusMinus))
            && !self.current().newline_before
        {
            let op = if self.match_token(TokenType::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            self.consume();
            return Ok(self.expression(
                start,
                ExpressionKind::Update {
                    op,
                    argument: Box::new(expression),
                    prefixed: false,
                },
            ));
        }
        Ok(expression)
    }

    fn parse_call_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        let mut expression = if self.match_token(TokenType::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            match self.current_token_type() {
                TokenType::Period => {
                    self.consume();
                    expression = self.parse_member_access(start, expression, false)?;
                }
                TokenType::BracketOpen => {
                    self.consume();
                    expression = self.parse_member_access(start, expression, true)?;
                }
                TokenType::ParenOpen => {
                    let arguments = self.parse_arguments()?;
                    expression = self.expression(
                        start,
                        ExpressionKind::Call {
                            callee: Box::new(expression),
                            arguments,
                        },
                    );
                }
                _ => break,
            }
        }
        Ok(expression)
    }

    fn parse_member_access(
        &mut self,
        start: crate::ast::Position,
        object: Expression,
        computed: bool,
    ) -> Result<Expression, SyntaxError> {
        let property = if computed {
            let forbid_in = self.forbid_in;
            self.forbid_in = false;
            let property = self.parse_expression_any()?;
            self.forbid_in = forbid_in;
            self.consume_token(TokenType::BracketClose)?;
            property
        } else {
            let name_start = self.position();
            if !self.current_token_type().is_identifier_name() {
                return Err(self.expected("property name"));
            }
            let token = self.consume();
            let name = if token.value.is_empty() {
                // Keyword tokens carry no decoded value; recover the
                // spelling from the token type name.
                token.token_type.name().to_lowercase()
            } else {
                token.value
            };
            self.expression(name_start, ExpressionKind::Identifier(name))
        };
        Ok(self.expression(
            start,
            ExpressionKind::Member {
                object: Box::new(object),
                property: Box::new(property),
                computed,
            },
        ))
    }

    fn parse_new_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::New)?;
        let mut callee = if self.match_token(TokenType::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        // Member accesses bind tighter than the `new` arguments.
        loop {
            match self.current_token_type() {
                TokenType::Period => {
                    self.consume();
                    callee = self.parse_member_access(start, callee, false)?;
                }
                TokenType::BracketOpen => {
                    self.consume();
                    callee = self.parse_member_access(start, callee, true)?;
                }
                _ => break,
            }
        }
        let arguments = if self.match_token(TokenType::ParenOpen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.expression(
            start,
            ExpressionKind::New {
                callee: Box::new(callee),
                arguments,
            },
        ))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, SyntaxError> {
        self.consume_token(TokenType::ParenOpen)?;
        let forbid_in = self.forbid_in;
        self.forbid_in = false;
        let mut arguments = Vec::new();
        while !self.match_token(TokenType::ParenClose) {
            arguments.push(self.parse_assignment_expression()?);
            if !self.match_token(TokenType::Comma) {
                break;
            }
            self.consume();
        }
        self.forbid_in = forbid_in;
        self.consume_token(TokenType::ParenClose)?;
        Ok(arguments)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        match self.current_token_type() {
            TokenType::NumericLiteral => {
                let token = self.consume();
                Ok(self.expression(
                    start,
                    ExpressionKind::Literal(LiteralValue::Number(token.number_value)),
                ))
            }
            TokenType::StringLiteral => {
                let token = self.consume();
                Ok(self.expression(
                    start,
                    ExpressionKind::Literal(LiteralValue::String(token.value)),
                ))
            }
            TokenType::BoolLiteral => {
                let token = self.consume();
                Ok(self.expression(
                    start,
                    ExpressionKind::Literal(LiteralValue::Boolean(token.value == "true")),
                ))
            }
            TokenType::NullLiteral => {
                self.consume();
                Ok(self.expression(start, ExpressionKind::Literal(LiteralValue::Null)))
            }
            TokenType::Identifier => {
                let token = self.consume();
                Ok(self.expression(start, ExpressionKind::Identifier(token.value)))
            }
            TokenType::This => {
                self.consume();
                Ok(self.expression(start, ExpressionKind::This))
            }
            TokenType::Function => {
                let function = self.parse_function(false)?;
                Ok(self.expression(start, ExpressionKind::Function(Box::new(function))))
            }
            TokenType::ParenOpen => {
                self.consume();
                let forbid_in = self.forbid_in;
                self.forbid_in = false;
                let expression = self.parse_expression_any()?;
                self.forbid_in = forbid_in;
                self.consume_token(TokenType::ParenClose)?;
                Ok(expression)
            }
            TokenType::BracketOpen => self.parse_array_literal(),
            TokenType::CurlyOpen => self.parse_object_literal(),
            _ => Err(self.expected("expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::BracketOpen)?;
        let mut elements = Vec::new();
        while !self.match_token(TokenType::BracketClose) {
            elements.push(self.parse_assignment_expression()?);
            if !self.match_token(TokenType::Comma) {
                break;
            }
            self.consume();
        }
        self.consume_token(TokenType::BracketClose)?;
        Ok(self.expression(start, ExpressionKind::Array(elements)))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::CurlyOpen)?;
        let mut properties = Vec::new();
        while !self.match_token(TokenType::CurlyClose) {
            let key = match self.current_token_type() {
                TokenType::StringLiteral => PropertyKey::String(self.consume().value),
                TokenType::NumericLiteral => PropertyKey::Number(self.consume().number_value),
                tt if tt.is_identifier_name() => {
                    let token = self.consume();
                    let name = if token.value.is_empty() {
                        token.token_type.name().to_lowercase()
                    } else {
                        token.value
                    };
                    PropertyKey::Identifier(name)
                }
                _ => return Err(self.expected("property key")),
            };
            self.consume_token(TokenType::Colon)?;
            let value = self.parse_assignment_expression()?;
            properties.push(ObjectProperty { key, value });
            if !self.match_token(TokenType::Comma) {
                break;
            }
            self.consume();
        }
        self.consume_token(TokenType::CurlyClose)?;
        Ok(self.expression(start, ExpressionKind::Object(properties)))
    }
}
