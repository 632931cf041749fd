use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_repr::Deserialize_repr;
use serde_repr::Serialize_repr;

use super::environment::Environment;
use super::file_type::FileType;
use super::target::Target;

/// Determines how a bundle behaves relative to the bundle that loads it
#[derive(Clone, Copy, Debug, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum BundleBehavior {
  /// The bundle's contents are inlined into the referencing bundle rather
  /// than written to a separate file
  Inline = 0,
  /// The bundle is isolated from its ancestors: nothing already loaded may be
  /// assumed available inside it
  Isolated = 1,
}

pub type MaybeBundleBehavior = Option<BundleBehavior>;

/// An output-loadable grouping of same-type assets with designated entry
/// assets.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
  /// The identity hash of the bundle, stable across builds
  pub id: String,

  /// A short id suitable for use in output file names
  pub public_id: Option<String>,

  /// The file type all assets in this bundle share
  #[serde(rename = "type")]
  pub bundle_type: FileType,

  /// The environment of the bundle
  pub env: Arc<Environment>,

  /// The key the bundle id was derived from
  ///
  /// For bundles created during partitioning this is the entry asset id; for
  /// shared bundles it is a content hash of the source bundle ids. Either way
  /// it keeps bundle identity stable across runs.
  ///
  pub unique_key: Option<String>,

  /// The ids of the assets this bundle is loaded for
  pub entry_asset_ids: Vec<String>,

  /// The first entry asset, used for naming the output file
  pub main_entry_id: Option<String>,

  /// Indicates that the output name should be stable over time, even when the
  /// content of the bundle changes
  pub needs_stable_name: Option<bool>,

  pub bundle_behavior: Option<BundleBehavior>,

  /// Whether the optimizer may extract duplicated assets out of this bundle
  pub is_splittable: Option<bool>,

  /// The final segment of the facet path the bundle was partitioned for, if
  /// any
  pub facet: Option<String>,

  /// The pipeline the bundle should be processed with when packaged
  pub pipeline: Option<String>,

  pub name: Option<String>,

  pub target: Target,
}
