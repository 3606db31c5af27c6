/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Lowering of structured programs into labeled basic blocks.
//!
//! The lowering engine walks the AST once, emitting basic blocks while
//! resolving forward jumps, threading an implicit error-return out of
//! every potentially-throwing operation, and recycling temporaries that
//! preserve evaluation order. The output is still a program in the
//! surface language: one `var` prologue plus `B0: { … }`, `B1: { … }`
//! labeled blocks connected by `GOTO` pseudo-calls.

pub mod basic_block;
pub mod builders;
pub mod codegen;
pub mod generator;

use thiserror::Error;

use crate::ast::Program;
use generator::Generator;

/// Per-function return value holder.
pub const RESULT_REGISTER: &str = "__RESULT";
/// Per-function pending exception register. Truthy after a helper call
/// means the callee threw.
pub const ERROR_REGISTER: &str = "__ERROR";
/// The designated sentinel identifier for "no value".
pub const UNDEFINED: &str = "undefined";

pub const GOTO_HELPER: &str = "GOTO";
pub const GET_PROPERTY_HELPER: &str = "GET_PROPERTY";
pub const SET_PROPERTY_HELPER: &str = "SET_PROPERTY";
pub const CALL_HELPER: &str = "CALL";

/// The helpers the lowering considers potentially-throwing. Calls to
/// these in already-lowered input are passed through verbatim.
pub fn is_foreign_helper(name: &str) -> bool {
    matches!(name, GET_PROPERTY_HELPER | SET_PROPERTY_HELPER | CALL_HELPER)
}

#[derive(Debug, Clone, Error)]
pub enum LoweringError {
    #[error("unsupported node kind {kind} at line {line}, column {column}")]
    UnsupportedNode {
        kind: String,
        line: u32,
        column: u32,
    },

    #[error("invalid continue label '{label}'")]
    InvalidContinueLabel { label: String },

    #[error("internal invariant violated: {0}")]
    InvariantViolated(String),
}

/// Lower a whole program. Function bodies are lowered recursively, each
/// in a fresh `Generator`.
pub fn lower_program(program: &Program) -> Result<Program, LoweringError> {
    let mut gen = Generator::new();
    for statement in &program.body {
        codegen::generate_statement(statement, &mut gen)?;
    }
    Ok(Program { body: gen.leave()? })
}
