/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "jsgoto")]
#[command(about = "Lowers structured JavaScript into labeled blocks and explicit GOTOs")]
struct Args {
    /// Path to the JavaScript source file to lower
    #[arg(default_value = "test.js")]
    input: PathBuf,

    /// Path to write the lowered program to (defaults to the input path
    /// with `.js` replaced by `.out.js`)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn default_output(input: &PathBuf) -> PathBuf {
    let mut output = input.clone();
    output.set_extension("out.js");
    output
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("reading '{}'", args.input.display()))?;

    let lowered = jsgoto::lower_source(&source)
        .with_context(|| format!("lowering '{}'", args.input.display()))?;

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    fs::write(&output, lowered).with_context(|| format!("writing '{}'", output.display()))?;
    Ok(())
}
