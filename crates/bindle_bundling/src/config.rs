use std::path::Path;

use serde::Deserialize;

use bindle_core::diagnostic::{
  CodeFrame, CodeHighlight, DiagnosticBuilder, DiagnosticError, ErrorKind, File,
};
use bindle_core::diagnostic_error;

/// Resolved engine configuration.
///
/// All three knobs bound the shared-bundle optimizer: how many duplicated
/// copies justify extraction, how small an extraction is worth a request, and
/// how many bundles one bundle group may fan out to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartitionConfig {
  pub min_bundles: usize,
  pub min_bundle_size: u64,
  pub max_parallel_requests: usize,
}

/// Defaults tuned for HTTP/1 connection limits.
pub const HTTP1_DEFAULTS: PartitionConfig = PartitionConfig {
  min_bundles: 1,
  min_bundle_size: 30000,
  max_parallel_requests: 6,
};

/// Defaults tuned for HTTP/2 multiplexing.
pub const HTTP2_DEFAULTS: PartitionConfig = PartitionConfig {
  min_bundles: 1,
  min_bundle_size: 20000,
  max_parallel_requests: 25,
};

impl Default for PartitionConfig {
  fn default() -> Self {
    HTTP2_DEFAULTS
  }
}

/// The on-disk form of [`PartitionConfig`].
///
/// Only the http profile selector and the three numeric keys are accepted;
/// anything else fails schema validation before any bundling pass runs.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RawPartitionConfig {
  pub http: Option<u8>,
  pub min_bundles: Option<u64>,
  pub min_bundle_size: Option<u64>,
  pub max_parallel_requests: Option<u64>,
}

impl RawPartitionConfig {
  /// Applies profile defaults and explicit overrides.
  pub fn resolve(self, source: &Path) -> Result<PartitionConfig, DiagnosticError> {
    let base = match self.http {
      None | Some(2) => HTTP2_DEFAULTS,
      Some(1) => HTTP1_DEFAULTS,
      Some(other) => {
        return Err(diagnostic_error!(DiagnosticBuilder::default()
          .kind(ErrorKind::InvalidConfig)
          .message(format!(
            "Error validating {}: key path \"http\" must be 1 or 2, got {other}",
            source.display()
          ))));
      }
    };

    Ok(PartitionConfig {
      min_bundles: self
        .min_bundles
        .map(|value| value as usize)
        .unwrap_or(base.min_bundles),
      min_bundle_size: self.min_bundle_size.unwrap_or(base.min_bundle_size),
      max_parallel_requests: self
        .max_parallel_requests
        .map(|value| value as usize)
        .unwrap_or(base.max_parallel_requests),
    })
  }
}

/// Parses and schema-validates a JSON config.
///
/// Violations are fatal and reported with the offending file and the key
/// serde points at (unknown key, wrong type), plus a code frame at the error
/// position.
pub fn parse_partition_config(code: &str, path: &Path) -> Result<PartitionConfig, DiagnosticError> {
  let raw = serde_json::from_str::<RawPartitionConfig>(code).map_err(|error| {
    diagnostic_error!(DiagnosticBuilder::default()
      .kind(ErrorKind::InvalidConfig)
      .code_frames(vec![CodeFrame {
        code_highlights: vec![CodeHighlight::from([error.line(), error.column()])],
        ..CodeFrame::from(File {
          contents: code.to_string(),
          path: path.to_path_buf(),
        })
      }])
      .message(format!("Error validating {}: {error}", path.display())))
  })?;

  raw.resolve(path)
}

/// Reads a config file from disk and validates it.
pub fn load_partition_config(path: &Path) -> Result<PartitionConfig, DiagnosticError> {
  let code = std::fs::read_to_string(path)?;
  parse_partition_config(&code, path)
}
