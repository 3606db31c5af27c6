/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Source-to-source lowering of structured JavaScript into labeled basic
//! blocks connected by explicit `GOTO`s.
//!
//! The pipeline is parse → lower → print. The lowered program is still a
//! program in the surface language, but uses only sequencing,
//! assignments to scalar locals, conditional and unconditional `GOTO`
//! pseudo-calls, and calls to a small set of runtime helpers
//! (`GET_PROPERTY`, `SET_PROPERTY`, `CALL`) for operations that may
//! throw. Suitable for coroutine-style reinterpretation,
//! instrumentation, or further rewriting.

pub mod ast;
pub mod lexer;
pub mod lowering;
pub mod parser;
pub mod printer;
pub mod token;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] parser::SyntaxError),

    #[error(transparent)]
    Lowering(#[from] lowering::LoweringError),
}

/// Parse a program, lower it, and render the lowered program back to
/// source text.
pub fn lower_source(source: &str) -> Result<String, CompileError> {
    let program = parser::parse(source)?;
    let lowered = lowering::lower_program(&program)?;
    Ok(printer::print_program(&lowered))
}
