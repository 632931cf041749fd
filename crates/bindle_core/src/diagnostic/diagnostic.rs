use std::fmt::Display;
use std::fmt::Formatter;

use derive_builder::Builder;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::CodeFrame;
use super::ErrorKind;

/// This is a user facing error for bindle.
///
/// Usually but not always this is linked to a source-code or config-file
/// location.
#[derive(Builder, Error, Debug, Deserialize, PartialEq, Serialize, Clone, Default)]
#[builder(default, setter(into))]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
  /// A summary user-facing message
  pub message: String,

  /// Coarse error classification used by callers to branch on failures
  pub kind: ErrorKind,

  /// Indicates where this diagnostic was emitted from
  pub origin: Option<String>,

  /// Name of the error (optional)
  pub name: Option<String>,

  /// A list of files with source-code highlights
  pub code_frames: Option<Vec<CodeFrame>>,

  /// Hints for the user
  pub hints: Option<Vec<String>>,

  /// URL for the user to refer to documentation
  #[serde(rename = "documentationURL")]
  pub documentation_url: Option<String>,
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.message)
  }
}

impl Diagnostic {
  pub fn name_matches<N: AsRef<str>>(&self, name: N) -> bool {
    self.name.as_ref().is_some_and(|n| n == name.as_ref())
  }
}

/// Error wrapper that carries a [`Diagnostic`] through `Result` chains
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DiagnosticError(pub Diagnostic);

impl DiagnosticError {
  pub fn diagnostic(&self) -> &Diagnostic {
    &self.0
  }
}

impl From<Diagnostic> for DiagnosticError {
  fn from(diagnostic: Diagnostic) -> Self {
    DiagnosticError(diagnostic)
  }
}

impl From<std::io::Error> for DiagnosticError {
  fn from(error: std::io::Error) -> Self {
    DiagnosticError(Diagnostic {
      message: error.to_string(),
      kind: ErrorKind::NotFound,
      ..Diagnostic::default()
    })
  }
}

/// Builds a [`DiagnosticError`] from a [`DiagnosticBuilder`] expression.
#[macro_export]
macro_rules! diagnostic_error {
  ($builder:expr) => {
    $crate::diagnostic::DiagnosticError::from(
      $builder
        .build()
        .expect("all diagnostic builder fields have defaults"),
    )
  };
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn builder_fills_defaults() {
    let diagnostic = DiagnosticBuilder::default()
      .kind(ErrorKind::InvalidConfig)
      .message("unexpected key")
      .build()
      .unwrap();

    assert_eq!(diagnostic.kind, ErrorKind::InvalidConfig);
    assert_eq!(diagnostic.message, "unexpected key");
    assert_eq!(diagnostic.code_frames, None);
  }

  #[test]
  fn macro_produces_an_error_with_the_message() {
    let error = diagnostic_error!(DiagnosticBuilder::default().message("boom"));
    assert_eq!(error.to_string(), "boom");
  }
}
