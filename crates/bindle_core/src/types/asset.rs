use std::hash::Hash;
use std::hash::Hasher;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::bundle::MaybeBundleBehavior;
use super::environment::Environment;
use super::file_type::FileType;

pub type AssetId = String;

#[derive(Debug)]
pub struct CreateAssetIdParams<'a> {
  pub environment_id: &'a str,
  /// All paths should be normalized to a project relative string to generate
  /// a consistent hash.
  pub file_path: &'a str,
  pub file_type: &'a FileType,
  pub pipeline: Option<&'a str>,
}

pub fn create_asset_id(params: CreateAssetIdParams) -> String {
  let CreateAssetIdParams {
    environment_id,
    file_path,
    file_type,
    pipeline,
  } = params;

  let mut hasher = crate::hash::IdentifierHasher::default();

  environment_id.hash(&mut hasher);
  file_path.hash(&mut hasher);
  file_type.hash(&mut hasher);
  pipeline.hash(&mut hasher);

  format!("{:016x}", hasher.finish())
}

/// An asset is a file or part of a file that may represent any data type
/// including source code, binary data, etc.
///
/// Note that assets may exist in the file system or virtually.
///
#[derive(Default, PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
  /// The main identity hash for the asset. It is consistent for the entire
  /// build and between builds.
  pub id: AssetId,

  /// Controls which bundle the asset is placed into
  pub bundle_behavior: MaybeBundleBehavior,

  /// The environment of the asset
  pub env: Arc<Environment>,

  /// The file path to the asset
  pub file_path: PathBuf,

  /// The file type of the asset, which may change during transformation
  #[serde(rename = "type")]
  pub file_type: FileType,

  /// The pipeline the asset should be processed with when packaged
  pub pipeline: Option<String>,

  /// Statistics about the asset
  pub stats: AssetStats,

  /// Whether this asset can be omitted if none of its exports are being used
  pub side_effects: bool,

  /// Indicates if the asset is used as a bundle entry
  ///
  /// This controls whether a bundle can be split into multiple, or whether
  /// all of the dependencies must be placed in a single bundle.
  ///
  pub is_bundle_splittable: bool,
}

impl Asset {
  pub fn new(
    env: Arc<Environment>,
    file_path: PathBuf,
    pipeline: Option<String>,
    side_effects: bool,
    size: u32,
  ) -> Self {
    let file_type =
      FileType::from_extension(file_path.extension().and_then(|s| s.to_str()).unwrap_or(""));

    let id = create_asset_id(CreateAssetIdParams {
      environment_id: &env.id(),
      file_path: &file_path.to_string_lossy(),
      file_type: &file_type,
      pipeline: pipeline.as_deref(),
    });

    Self {
      env,
      file_path,
      file_type,
      id,
      is_bundle_splittable: true,
      pipeline,
      side_effects,
      stats: AssetStats { size, time: 0 },
      ..Asset::default()
    }
  }
}

/// Statistics that pertain to an asset
#[derive(PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
pub struct AssetStats {
  pub size: u32,
  pub time: u32,
}
