use serde::Deserialize;
use serde::Serialize;

/// A highlighted position within a code frame
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeHighlight {
  pub line: usize,
  pub column: usize,
  pub message: Option<String>,
}

impl From<[usize; 2]> for CodeHighlight {
  fn from([line, column]: [usize; 2]) -> Self {
    CodeHighlight {
      line,
      column,
      message: None,
    }
  }
}
