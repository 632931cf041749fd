use serde::Deserialize;
use serde::Serialize;

/// Coarse classification of a [`super::Diagnostic`]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
  /// A referenced file or graph node could not be found
  NotFound,
  /// A file could not be parsed
  ParseError,
  /// Configuration failed schema validation
  InvalidConfig,
  /// A structural invariant of the graph was violated
  InvalidState,
  #[default]
  Unknown,
}
