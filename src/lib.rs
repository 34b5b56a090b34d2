//! Crate root: wires together the front-end pipeline.
//!
//! The stages are small and composable:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `generator` walks the tokens with a recursive-descent grammar and emits
//!   stack-machine IR, one label per function.
//! - `escape` decodes string and char literal escapes for the generator.
//! - `scope` maps parameters and block-scoped locals to stack slots.
//! - `ir` holds the generated program and its string pool.
//! - `error` centralises the diagnostics sink and the crate-level error.
//! - `listing` renders tokens and IR as text.

pub mod error;
pub mod escape;
pub mod generator;
pub mod ir;
pub mod listing;
pub mod scope;
pub mod tokenizer;

use std::path::Path;

use snafu::ResultExt;

pub use error::{CompileError, CompileResult, Diagnostics};
pub use generator::IrGenerator;
pub use ir::{Instruction, IrInfo, IrOp, IrValue};
pub use tokenizer::{Token, TokenKind, tokenize};

/// Read a whole source file into a string.
pub fn read_source(path: &Path) -> CompileResult<String> {
  std::fs::read_to_string(path).context(error::ReadSourceSnafu { path })
}

/// Scan and generate `source`, failing if any diagnostics were recorded.
pub fn compile_source(source: &str, source_name: &str) -> CompileResult<IrInfo> {
  let tokens = tokenize(source);
  let mut generator = IrGenerator::new(source_name);
  let ir = generator.generate(tokens);
  generator.take_diagnostics().into_result(ir)
}

/// Same as `compile_source`, reading the source from `path` first.
pub fn compile_file(path: &Path) -> CompileResult<IrInfo> {
  let source = read_source(path)?;
  compile_source(&source, &path.display().to_string())
}
