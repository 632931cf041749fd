use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::hash::IdentifierHasher;

pub type EnvironmentRef = Arc<Environment>;

/// The environment the built code will run in
///
/// This influences how bundles are partitioned, for example whether output
/// can rely on parallel script loading.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
  /// The environment the output should run in
  pub context: EnvironmentContext,

  /// Whether this is a library build
  ///
  /// Treats the target as a library that would be published and consumed by
  /// another tool, rather than used directly in a browser or other target
  /// environment.
  ///
  pub is_library: bool,

  /// Determines what type of module to output
  pub output_format: OutputFormat,

  /// Determines whether the output should be optimised
  pub should_optimize: bool,

  /// Determines whether scope hoisting should be enabled
  pub should_scope_hoist: bool,

  pub source_type: SourceType,
}

pub fn create_environment_id(
  context: &EnvironmentContext,
  output_format: &OutputFormat,
  source_type: &SourceType,
  is_library: &bool,
  should_optimize: &bool,
  should_scope_hoist: &bool,
) -> String {
  let mut hasher = IdentifierHasher::new();
  context.hash(&mut hasher);
  output_format.hash(&mut hasher);
  source_type.hash(&mut hasher);
  is_library.hash(&mut hasher);
  should_optimize.hash(&mut hasher);
  should_scope_hoist.hash(&mut hasher);
  format!("{:016x}", hasher.finish())
}

impl Environment {
  pub fn id(&self) -> String {
    create_environment_id(
      &self.context,
      &self.output_format,
      &self.source_type,
      &self.is_library,
      &self.should_optimize,
      &self.should_scope_hoist,
    )
  }
}

/// The environment the output should run in
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentContext {
  #[default]
  Browser,
  Node,
  ServiceWorker,
  WebWorker,
}

impl EnvironmentContext {
  pub fn is_browser(&self) -> bool {
    matches!(
      self,
      EnvironmentContext::Browser
        | EnvironmentContext::ServiceWorker
        | EnvironmentContext::WebWorker
    )
  }
}

/// The JavaScript module format of the output
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  Commonjs,
  #[default]
  Esmodule,
  Global,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
  #[default]
  Module,
  Script,
}
