use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_repr::Deserialize_repr;
use serde_repr::Serialize_repr;

use crate::hash::IdentifierHasher;

use super::asset::AssetId;
use super::bundle::MaybeBundleBehavior;
use super::environment::Environment;
use super::target::Target;

#[allow(clippy::too_many_arguments)]
pub fn create_dependency_id(
  source_asset_id: Option<&AssetId>,
  specifier: &str,
  environment_id: &str,
  target: Option<&Target>,
  facet: Option<&str>,
  specifier_type: &SpecifierType,
  bundle_behavior: &MaybeBundleBehavior,
  priority: &Priority,
) -> String {
  let mut hasher = IdentifierHasher::new();

  source_asset_id.hash(&mut hasher);
  specifier.hash(&mut hasher);
  environment_id.hash(&mut hasher);
  target.hash(&mut hasher);
  facet.hash(&mut hasher);
  specifier_type.hash(&mut hasher);
  bundle_behavior.hash(&mut hasher);
  priority.hash(&mut hasher);

  format!("{:016x}", hasher.finish())
}

/// A dependency denotes a connection between two assets
#[derive(Hash, PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
  /// Controls the behavior of the bundle the resolved asset is placed into
  ///
  /// This option is used in combination with priority to determine when the
  /// bundle is loaded.
  ///
  pub bundle_behavior: MaybeBundleBehavior,

  /// The environment of the dependency
  pub env: Arc<Environment>,

  /// An optional tag enabling finer-grained code splitting
  ///
  /// Dependencies carrying a facet are partitioned once per distinct facet
  /// path reaching them, rather than only at type and load-priority
  /// boundaries.
  ///
  #[serde(default)]
  pub facet: Option<String>,

  /// Determines when the dependency should be loaded
  pub priority: Priority,

  /// The id of the asset with this dependency
  pub source_asset_id: Option<AssetId>,

  /// The import or export specifier that connects two assets together
  pub specifier: String,

  /// How the specifier should be interpreted
  pub specifier_type: SpecifierType,

  /// The target associated with an entry, if any
  #[serde(default)]
  pub target: Option<Box<Target>>,

  /// Whether the dependency is an entry
  pub is_entry: bool,
}

impl Dependency {
  pub fn id(&self) -> String {
    create_dependency_id(
      self.source_asset_id.as_ref(),
      &self.specifier,
      &self.env.id(),
      self.target.as_deref(),
      self.facet.as_deref(),
      &self.specifier_type,
      &self.bundle_behavior,
      &self.priority,
    )
  }

  pub fn entry(entry: String, target: Target) -> Dependency {
    Dependency {
      env: target.env.clone(),
      is_entry: true,
      specifier: entry,
      // By default entries are resolved as URLs relative to the project root
      specifier_type: SpecifierType::Url,
      target: Some(Box::new(target)),
      ..Dependency::default()
    }
  }

  pub fn new(specifier: String, env: Arc<Environment>) -> Dependency {
    Dependency {
      env,
      specifier,
      ..Dependency::default()
    }
  }
}

/// Determines when a dependency should load
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum Priority {
  /// Resolves the dependency synchronously, placing the resolved asset in the
  /// same bundle as the parent or another bundle that is already on the page
  #[default]
  Sync = 0,
  /// The dependency should be placed in a separate bundle that is loaded
  /// later
  Lazy = 1,
}

/// The type of the import specifier
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum SpecifierType {
  /// An ES Module specifier
  ///
  /// This is parsed as an URL, but bare specifiers are treated as
  /// node_modules.
  ///
  #[default]
  Esm = 0,

  /// A URL that works as in a browser
  ///
  /// Bare specifiers are treated as relative URLs.
  ///
  Url = 1,
}
