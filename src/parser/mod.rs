/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Recursive-descent parser for the ES5 subset.
//!
//! The parser is fail-fast: the first syntax error aborts with a
//! line/column diagnostic. Split by concern: statements in
//! `statements.rs`, expressions in `expressions.rs`.

mod expressions;
mod statements;

use thiserror::Error;

use crate::ast::{Expression, ExpressionKind, Position, Program, SourceRange, Statement, StatementKind};
use crate::lexer;
use crate::token::{Token, TokenType};

#[derive(Debug, Clone, Error)]
#[error("syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// Parse a complete program.
pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    let tokens = lexer::lex(source)?;
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Set while parsing a classic `for` head, where a top-level `in`
    /// would be ambiguous with the `for-in` form.
    pub(crate) forbid_in: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            forbid_in: false,
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut body = Vec::new();
        while !self.done() {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    // --- Token cursor ---

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn current_token_type(&self) -> TokenType {
        self.current().token_type
    }

    pub(crate) fn next_token(&self) -> &Token {
        let index = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(crate) fn done(&self) -> bool {
        self.current_token_type() == TokenType::Eof
    }

    pub(crate) fn match_token(&self, token_type: TokenType) -> bool {
        self.current_token_type() == token_type
    }

    pub(crate) fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    pub(crate) fn consume_token(&mut self, token_type: TokenType) -> Result<Token, SyntaxError> {
        if !self.match_token(token_type) {
            return Err(self.expected(token_type.name()));
        }
        Ok(self.consume())
    }

    // --- Diagnostics ---

    pub(crate) fn position(&self) -> Position {
        let token = self.current();
        Position {
            line: token.line,
            column: token.column,
        }
    }

    pub(crate) fn syntax_error(&self, message: impl Into<String>) -> SyntaxError {
        let token = self.current();
        SyntaxError {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    pub(crate) fn expected(&self, what: &str) -> SyntaxError {
        let found = self.current_token_type().name();
        self.syntax_error(format!("expected {}, found {}", what, found))
    }

    // --- Node construction ---

    pub(crate) fn range_from(&self, start: Position) -> SourceRange {
        SourceRange {
            start,
            end: self.position(),
        }
    }

    pub(crate) fn statement(&self, start: Position, kind: StatementKind) -> Statement {
        Statement::new(self.range_from(start), kind)
    }

    pub(crate) fn expression(&self, start: Position, kind: ExpressionKind) -> Expression {
        Expression::new(self.range_from(start), kind)
    }

    // --- Automatic semicolon insertion ---

    /// Consume a `;`, or insert one when the next token is preceded by a
    /// line terminator, is `}`, or is end-of-input.
    pub(crate) fn consume_or_insert_semicolon(&mut self) -> Result<(), SyntaxError> {
        if self.match_token(TokenType::Semicolon) {
            self.consume();
            return Ok(());
        }
        if self.current().newline_before || self.match_token(TokenType::CurlyClose) || self.done() {
            return Ok(());
        }
        Err(self.expected("';'"))
    }
}
