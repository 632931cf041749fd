use tracing::debug;
use tracing::instrument;

use bindle_core::bundle_graph::{BundleGraph, NodeId};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DedupStats {
  pub removed_assets: usize,
}

/// Removes assets from bundles where they remain reachable via another
/// bundle already guaranteed loaded.
///
/// Running it again on an already-deduplicated graph removes nothing.
pub struct Deduplicator;

impl Deduplicator {
  #[instrument(level = "debug", skip_all)]
  pub fn run(bundle_graph: &mut BundleGraph) -> DedupStats {
    let bundle_nodes: Vec<NodeId> = bundle_graph.bundles().map(|(node_id, _)| node_id).collect();
    let mut stats = DedupStats::default();

    for bundle_node in bundle_nodes {
      let Some(bundle) = bundle_graph.bundle(&bundle_node) else {
        continue;
      };
      let entry_asset_ids = bundle.entry_asset_ids.clone();
      let referenced = bundle_graph.referenced_bundles(&bundle_node);

      for asset_node in bundle_graph.assets_in_bundle(&bundle_node) {
        let Some(asset) = bundle_graph.asset(&asset_node) else {
          continue;
        };
        // A bundle always keeps its own entry assets.
        if entry_asset_ids.contains(&asset.id) {
          continue;
        }

        let shipped_elsewhere = referenced
          .iter()
          .any(|referenced| bundle_graph.bundle_contains_asset(referenced, &asset_node));

        if shipped_elsewhere && bundle_graph.remove_asset_from_bundle(&bundle_node, &asset_node) {
          stats.removed_assets += 1;
        }
      }
    }

    debug!(removed_assets = stats.removed_assets, "deduplicated bundles");

    stats
  }
}
