use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

use tracing::debug;
use tracing::instrument;

use bindle_core::bundle_graph::{BundleGraph, BundleGraphEdgeType, NodeId};
use bindle_core::diagnostic::{DiagnosticBuilder, DiagnosticError, ErrorKind};
use bindle_core::diagnostic_error;
use bindle_core::hash::hash_string;
use bindle_core::types::Bundle;

use crate::config::PartitionConfig;

#[derive(Debug)]
struct SharedBundleCandidate {
  /// Source bundles, sorted by bundle id.
  source_bundles: Vec<NodeId>,
  assets: Vec<NodeId>,
  size: u64,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SharedBundleStats {
  pub candidates: usize,
  pub shared_bundles: usize,
  pub skipped_candidates: usize,
}

/// Finds asset subgraphs duplicated across bundles and, subject to size and
/// parallel-request budgets, extracts them into new shared bundles.
pub struct SharedBundleOptimizer;

impl SharedBundleOptimizer {
  #[instrument(level = "debug", skip_all)]
  pub fn run(
    bundle_graph: &mut BundleGraph,
    config: &PartitionConfig,
  ) -> Result<SharedBundleStats, DiagnosticError> {
    // Pass 1: collect candidates keyed by the sorted set of bundles that
    // duplicate an asset.
    let asset_nodes: Vec<NodeId> = bundle_graph.asset_nodes().map(|(node_id, _)| node_id).collect();

    let mut candidates: HashMap<String, SharedBundleCandidate> = HashMap::new();
    let mut candidate_order: Vec<String> = Vec::new();

    for asset_node in asset_nodes {
      let Some(asset) = bundle_graph.asset(&asset_node).cloned() else {
        continue;
      };

      let mut containing: Vec<(NodeId, String)> = bundle_graph
        .bundles_containing_asset(&asset_node)
        .into_iter()
        .filter_map(|bundle_node| {
          let bundle = bundle_graph.bundle(&bundle_node)?;
          let splittable = bundle.is_splittable == Some(true)
            && bundle.needs_stable_name != Some(true)
            && !bundle.entry_asset_ids.contains(&asset.id);
          splittable.then(|| (bundle_node, bundle.id.clone()))
        })
        .collect();

      if containing.len() <= config.min_bundles {
        continue;
      }

      containing.sort_by(|(_, a), (_, b)| a.cmp(b));
      let key = containing
        .iter()
        .map(|(_, id)| id.as_str())
        .collect::<Vec<_>>()
        .join(",");

      let candidate = match candidates.entry(key.clone()) {
        std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
        std::collections::hash_map::Entry::Vacant(entry) => {
          candidate_order.push(key);
          entry.insert(SharedBundleCandidate {
            source_bundles: containing.iter().map(|(node_id, _)| *node_id).collect(),
            assets: Vec::new(),
            size: 0,
          })
        }
      };

      // The first asset of a group stands in for extracting its whole
      // reachable subgraph; later assets only add their own size.
      let contribution = if candidate.assets.is_empty() {
        reachable_subgraph_size(bundle_graph, &asset_node)
      } else {
        u64::from(asset.stats.size)
      };

      candidate.assets.push(asset_node);
      candidate.size += contribution;
    }

    let collected = candidate_order.len();

    // Pass 2: drop undersized candidates, largest savings first.
    let mut selected: Vec<SharedBundleCandidate> = candidate_order
      .iter()
      .filter_map(|key| candidates.remove(key))
      .filter(|candidate| candidate.size >= config.min_bundle_size)
      .collect();
    selected.sort_by(|a, b| b.size.cmp(&a.size));

    // Pass 3: apply strictly in order. Eligibility is re-evaluated per
    // candidate because earlier extractions grow the affected bundle groups.
    let mut stats = SharedBundleStats {
      candidates: collected,
      ..SharedBundleStats::default()
    };

    for candidate in selected {
      let eligible: Vec<NodeId> = candidate
        .source_bundles
        .iter()
        .filter(|bundle_node| {
          bundle_graph
            .bundle_groups_containing_bundle(bundle_node)
            .iter()
            .all(|group_node| {
              bundle_graph.bundles_in_bundle_group(group_node).len()
                < config.max_parallel_requests
            })
        })
        .copied()
        .collect();

      if eligible.len() < 2 {
        debug!(
          sources = candidate.source_bundles.len(),
          eligible = eligible.len(),
          "skipping shared bundle candidate"
        );
        stats.skipped_candidates += 1;
        continue;
      }

      let source = bundle_graph.bundle(&eligible[0]).cloned().ok_or_else(|| {
        diagnostic_error!(DiagnosticBuilder::default()
          .kind(ErrorKind::NotFound)
          .message("Shared bundle source bundle is missing from the graph"))
      })?;

      let eligible_ids: Vec<String> = eligible
        .iter()
        .filter_map(|bundle_node| bundle_graph.bundle(bundle_node).map(|b| b.id.clone()))
        .collect();
      let unique_key = hash_string(eligible_ids.join(","));
      let bundle_id = hash_string(format!("bundle:{}:{}", unique_key, source.target.name));

      let shared_node = bundle_graph.add_bundle(Bundle {
        id: bundle_id,
        public_id: None,
        bundle_type: source.bundle_type.clone(),
        env: source.env.clone(),
        unique_key: Some(unique_key),
        entry_asset_ids: Vec::new(),
        main_entry_id: None,
        needs_stable_name: Some(false),
        bundle_behavior: None,
        is_splittable: Some(true),
        facet: None,
        pipeline: None,
        name: None,
        target: source.target.clone(),
      });

      for asset_node in &candidate.assets {
        bundle_graph.add_asset_to_bundle(&shared_node, asset_node);
        for source_node in &eligible {
          bundle_graph.create_bundle_reference(source_node, &shared_node);
          bundle_graph.remove_asset_from_bundle(source_node, asset_node);
        }
      }

      stats.shared_bundles += 1;
    }

    debug!(
      candidates = stats.candidates,
      shared_bundles = stats.shared_bundles,
      skipped = stats.skipped_candidates,
      "extracted shared bundles"
    );

    Ok(stats)
  }
}

/// Total size of the asset subgraph reachable from `asset_node` through the
/// structural edges copied from the asset graph.
fn reachable_subgraph_size(bundle_graph: &BundleGraph, asset_node: &NodeId) -> u64 {
  let mut visited: HashSet<NodeId> = HashSet::from([*asset_node]);
  let mut queue: VecDeque<NodeId> = VecDeque::from([*asset_node]);
  let mut size = 0u64;

  while let Some(node_id) = queue.pop_front() {
    if let Some(asset) = bundle_graph.asset(&node_id) {
      size += u64::from(asset.stats.size);
    }

    for child in bundle_graph.get_outgoing_neighbors_of_type(&node_id, BundleGraphEdgeType::Null) {
      let is_graph_node = bundle_graph.asset(&child).is_some()
        || bundle_graph.dependency(&child).is_some();
      if is_graph_node && visited.insert(child) {
        queue.push_back(child);
      }
    }
  }

  size
}
