use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::CodeHighlight;

/// A file referenced by a diagnostic
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
  pub contents: String,
  pub path: PathBuf,
}

/// A file with source-code highlights
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFrame {
  pub code: String,
  pub file_path: PathBuf,
  pub code_highlights: Vec<CodeHighlight>,
}

impl From<File> for CodeFrame {
  fn from(file: File) -> Self {
    CodeFrame {
      code: file.contents,
      file_path: file.path,
      code_highlights: Vec::new(),
    }
  }
}
