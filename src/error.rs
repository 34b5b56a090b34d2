//! Shared error utilities used across the compilation pipeline.
//!
//! Two layers live here. `Diagnostics` is the non-aborting sink every stage
//! writes into: recording an entry never stops the pass, callers check
//! `has_errors` once the pass is over. `CompileError` is what the library
//! surface hands back when a whole pipeline run has to be abandoned.

use std::path::PathBuf;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// Label shown in diagnostics raised while no function is active.
pub const NO_LABEL: &str = "?";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("could not read '{}': {source}", path.display()))]
  ReadSource {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("generation failed with {count} error(s)\n{report}"))]
  Generation { count: usize, report: String },
}

/// One recorded error, kept structured so tests can inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub label: String,
  pub source_name: String,
  pub line: usize,
  pub message: String,
}

impl std::fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "[ERROR]: {}: {}:{}: {}",
      self.label, self.source_name, self.line, self.message
    )
  }
}

/// Accumulates formatted errors plus the "had errors" flag.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
  entries: Vec<Diagnostic>,
}

impl Diagnostics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record an error. Never fails and never aborts the caller.
  pub fn error(
    &mut self,
    label: Option<&str>,
    source_name: &str,
    line: usize,
    message: impl Into<String>,
  ) {
    let entry = Diagnostic {
      label: label.unwrap_or(NO_LABEL).to_string(),
      source_name: source_name.to_string(),
      line,
      message: message.into(),
    };
    tracing::trace!(%entry, "diagnostic recorded");
    self.entries.push(entry);
  }

  pub fn has_errors(&self) -> bool {
    !self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entries(&self) -> &[Diagnostic] {
    &self.entries
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  /// All entries as a single text block, one line each.
  pub fn report(&self) -> String {
    let mut out = String::new();
    for entry in &self.entries {
      out.push_str(&format!("{entry}\n"));
    }
    out
  }

  /// Convert a flagged pass into the crate-level error.
  pub fn into_result<T>(self, value: T) -> CompileResult<T> {
    if self.has_errors() {
      return GenerationSnafu {
        count: self.len(),
        report: self.report(),
      }
      .fail();
    }
    Ok(value)
  }
}
