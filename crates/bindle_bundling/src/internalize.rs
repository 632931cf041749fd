use std::sync::Arc;

use tracing::debug;
use tracing::instrument;

use bindle_core::asset_graph::AssetGraph;
use bindle_core::bundle_graph::{BundleGraph, BundleGraphEdgeType, NodeId};
use bindle_core::types::{Dependency, Priority, SpecifierType};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InternalizeStats {
  pub internalized_dependencies: usize,
  pub removed_bundle_groups: usize,
}

/// Converts lazy dependencies into in-bundle references when every bundle
/// holding the dependency already ships the target asset, then prunes bundle
/// groups that were only reachable through the internalized edges.
pub struct AsyncInternalizer;

impl AsyncInternalizer {
  #[instrument(level = "debug", skip_all)]
  pub fn run(asset_graph: &AssetGraph, bundle_graph: &mut BundleGraph) -> InternalizeStats {
    let dependencies: Vec<(NodeId, Arc<Dependency>)> = bundle_graph
      .dependency_nodes()
      .map(|(node_id, dependency)| (node_id, dependency.clone()))
      .collect();

    let mut stats = InternalizeStats::default();
    let mut detached_groups: Vec<NodeId> = Vec::new();

    for (dep_node, dependency) in dependencies {
      if dependency.priority != Priority::Lazy
        || dependency.is_entry
        || dependency.specifier_type == SpecifierType::Url
      {
        continue;
      }

      // Dependencies the upstream graph skipped stay untouched.
      let excluded = asset_graph
        .get_node_id_by_content_key(&dependency.id())
        .is_some_and(|node_id| asset_graph.is_dependency_excluded(node_id));
      if excluded {
        continue;
      }

      // Unresolved async dependencies are non-fatal: leave them alone.
      let Some(asset_node) = bundle_graph.resolve_dependency_asset(&dep_node) else {
        debug!(
          specifier = %dependency.specifier,
          "skipping unresolved async dependency"
        );
        continue;
      };

      let containing = bundle_graph.bundles_containing_dependency(&dep_node);
      if containing.is_empty() {
        continue;
      }

      let available_everywhere = containing
        .iter()
        .all(|bundle_node| bundle_graph.is_asset_reachable_from_bundle(bundle_node, &asset_node));

      if !available_everywhere {
        continue;
      }

      for bundle_node in &containing {
        bundle_graph.internalize_async_dependency(bundle_node, &dep_node);
      }

      for group_node in bundle_graph.bundle_groups_triggered_by_dependency(&dep_node) {
        bundle_graph.remove_edge(&dep_node, &group_node, BundleGraphEdgeType::Null);
        if !detached_groups.contains(&group_node) {
          detached_groups.push(group_node);
        }
      }

      stats.internalized_dependencies += 1;
    }

    // Groups reached only through internalized edges are now orphans.
    for group_node in detached_groups {
      if bundle_graph
        .dependencies_triggering_bundle_group(&group_node)
        .is_empty()
      {
        bundle_graph.remove_bundle_group(&group_node);
        stats.removed_bundle_groups += 1;
      }
    }

    debug!(
      internalized = stats.internalized_dependencies,
      removed_bundle_groups = stats.removed_bundle_groups,
      "internalized async dependencies"
    );

    stats
  }
}
