pub mod config;
pub mod dedup;
pub mod facets;
pub mod internalize;
pub mod partition;
pub mod shared_bundles;

use tracing::debug;
use tracing::instrument;

use bindle_core::asset_graph::AssetGraph;
use bindle_core::bundle_graph::BundleGraph;

use crate::config::PartitionConfig;
use crate::dedup::Deduplicator;
use crate::facets::FacetCollector;
use crate::internalize::AsyncInternalizer;
use crate::partition::{FacetExclusion, Partitioner};
use crate::shared_bundles::SharedBundleOptimizer;

/// Bundler algorithms take an asset graph and assign assets/dependencies to
/// bundles.
///
/// Implementations are expected to mutate the provided `BundleGraph` to
/// create bundle and bundle group nodes, membership edges, reference edges
/// and internalized-dependency markers, leaving it ready for packaging.
pub trait Bundler {
  fn bundle(
    &self,
    asset_graph: &AssetGraph,
    bundle_graph: &mut BundleGraph,
  ) -> anyhow::Result<BundleStats>;
}

/// Summary stats from a bundling run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BundleStats {
  pub assets: usize,
  pub dependencies: usize,
  pub passes: usize,
  pub bundles: usize,
  pub bundle_groups: usize,
  pub shared_bundles: usize,
  pub internalized_dependencies: usize,
}

/// The default bundling algorithm.
///
/// Runs five passes strictly in order, each completing before the next
/// starts: facet collection, partitioning, shared bundle extraction,
/// deduplication, async internalization.
pub struct DefaultBundler {
  config: PartitionConfig,
  facet_exclusion: Option<FacetExclusion>,
}

impl DefaultBundler {
  pub fn new(config: PartitionConfig) -> Self {
    DefaultBundler {
      config,
      facet_exclusion: None,
    }
  }

  /// Installs a policy predicate excluding facet paths from partitioning.
  pub fn with_facet_exclusion(mut self, exclusion: FacetExclusion) -> Self {
    self.facet_exclusion = Some(exclusion);
    self
  }
}

impl Default for DefaultBundler {
  fn default() -> Self {
    DefaultBundler::new(PartitionConfig::default())
  }
}

impl std::fmt::Debug for DefaultBundler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DefaultBundler")
      .field("config", &self.config)
      .field("facet_exclusion", &self.facet_exclusion.is_some())
      .finish()
  }
}

impl Bundler for DefaultBundler {
  #[instrument(level = "debug", skip_all)]
  fn bundle(
    &self,
    asset_graph: &AssetGraph,
    bundle_graph: &mut BundleGraph,
  ) -> anyhow::Result<BundleStats> {
    let facets = FacetCollector::collect(asset_graph);

    let partitioner = match &self.facet_exclusion {
      Some(exclusion) => Partitioner::with_facet_exclusion(&**exclusion),
      None => Partitioner::new(),
    };
    let partition = partitioner.run(asset_graph, bundle_graph, &facets)?;

    let shared = SharedBundleOptimizer::run(bundle_graph, &self.config)?;
    let dedup = Deduplicator::run(bundle_graph);
    let internalize = AsyncInternalizer::run(asset_graph, bundle_graph);

    let stats = BundleStats {
      assets: asset_graph.get_assets().count(),
      dependencies: asset_graph.get_dependencies().count(),
      passes: partition.passes,
      bundles: partition.bundles + shared.shared_bundles,
      bundle_groups: partition.bundle_groups - internalize.removed_bundle_groups,
      shared_bundles: shared.shared_bundles,
      internalized_dependencies: internalize.internalized_dependencies,
    };

    debug!(
      assets = stats.assets,
      bundles = stats.bundles,
      bundle_groups = stats.bundle_groups,
      shared_bundles = stats.shared_bundles,
      deduplicated_assets = dedup.removed_assets,
      internalized = stats.internalized_dependencies,
      "bundling complete"
    );

    Ok(stats)
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;
  use std::sync::Arc;

  use pretty_assertions::assert_eq;

  use bindle_core::asset_graph::NodeId;
  use bindle_core::bundle_graph::BundleGraphEdgeType;
  use bindle_core::types::{Asset, Dependency, Environment, Priority, Target};

  use crate::config::HTTP1_DEFAULTS;
  use crate::shared_bundles::SharedBundleStats;

  use super::*;

  fn asset(file_path: &str, size: u32) -> Arc<Asset> {
    Arc::new(Asset::new(
      Arc::new(Environment::default()),
      PathBuf::from(file_path),
      None,
      false,
      size,
    ))
  }

  fn add_entry(graph: &mut AssetGraph, entry: &Arc<Asset>) -> NodeId {
    let entry_dep = graph.add_entry_dependency(Dependency::entry(
      entry.file_path.to_string_lossy().to_string(),
      Target::default(),
    ));
    let entry_node = graph.add_asset(entry.clone());
    graph.add_edge(&entry_dep, &entry_node);
    entry_node
  }

  fn import(
    graph: &mut AssetGraph,
    source: &Arc<Asset>,
    source_node: NodeId,
    specifier: &str,
    priority: Priority,
    to_node: NodeId,
  ) -> NodeId {
    let dep = graph.add_dependency(Dependency {
      priority,
      source_asset_id: Some(source.id.clone()),
      ..Dependency::new(specifier.to_string(), source.env.clone())
    });
    graph.add_edge(&source_node, &dep);
    graph.add_edge(&dep, &to_node);
    dep
  }

  fn bundle_graph_node(bundle_graph: &BundleGraph, content_key: &str) -> NodeId {
    *bundle_graph.get_node_id_by_content_key(content_key).unwrap()
  }

  /// entry.js lazily loads three routes; every route synchronously imports
  /// the same 25000 byte module.
  fn three_routes_sharing_a_module(
    shared_size: u32,
  ) -> (AssetGraph, Arc<Asset>, Vec<Arc<Asset>>) {
    let mut graph = AssetGraph::new();
    let entry = asset("entry.js", 500);
    let entry_node = add_entry(&mut graph, &entry);

    let shared = asset("shared.js", shared_size);
    let shared_node = graph.add_asset(shared.clone());

    let mut routes = Vec::new();
    for i in 0..3 {
      let route = asset(&format!("routes/route-{i}.js"), 100);
      let route_node = graph.add_asset(route.clone());
      import(
        &mut graph,
        &entry,
        entry_node,
        &format!("./routes/route-{i}.js"),
        Priority::Lazy,
        route_node,
      );
      import(
        &mut graph,
        &route,
        route_node,
        "./shared.js",
        Priority::Sync,
        shared_node,
      );
      routes.push(route);
    }

    (graph, shared, routes)
  }

  fn run_default(
    asset_graph: &AssetGraph,
    config: PartitionConfig,
  ) -> (BundleGraph, BundleStats) {
    let mut bundle_graph = BundleGraph::from_asset_graph(asset_graph);
    let stats = DefaultBundler::new(config)
      .bundle(asset_graph, &mut bundle_graph)
      .unwrap();
    (bundle_graph, stats)
  }

  #[test]
  fn every_reachable_asset_lands_in_a_bundle() {
    let (mut graph, _, _) = three_routes_sharing_a_module(25000);

    // Add a type-change boundary for good measure.
    let entry = asset("entry.js", 500);
    let entry_node = *graph.get_node_id_by_content_key(&entry.id).unwrap();
    let styles_node = graph.add_asset(asset("styles.css", 300));
    import(
      &mut graph,
      &entry,
      entry_node,
      "./styles.css",
      Priority::Sync,
      styles_node,
    );

    let (bundle_graph, _) = run_default(&graph, HTTP1_DEFAULTS);

    for (asset_node, asset) in bundle_graph.asset_nodes() {
      assert!(
        !bundle_graph.bundles_containing_asset(&asset_node).is_empty(),
        "asset {} is in no bundle",
        asset.file_path.display()
      );
    }
  }

  #[test]
  fn duplicated_module_is_extracted_into_one_shared_bundle() {
    let (graph, shared, _) = three_routes_sharing_a_module(25000);

    let (bundle_graph, stats) = run_default(
      &graph,
      PartitionConfig {
        min_bundles: 1,
        min_bundle_size: 20000,
        max_parallel_requests: 6,
      },
    );

    assert_eq!(stats.shared_bundles, 1);

    // The module now lives in exactly one bundle: the shared one.
    let shared_asset_node = bundle_graph_node(&bundle_graph, &shared.id);
    let containing = bundle_graph.bundles_containing_asset(&shared_asset_node);
    assert_eq!(containing.len(), 1);

    let shared_bundle_node = containing[0];
    let shared_bundle = bundle_graph.bundle(&shared_bundle_node).unwrap();
    assert!(shared_bundle.entry_asset_ids.is_empty());

    // All three route bundles reference it.
    let referencing: Vec<NodeId> = bundle_graph
      .bundles()
      .filter(|(node_id, _)| {
        bundle_graph.has_edge(node_id, &shared_bundle_node, BundleGraphEdgeType::References)
      })
      .map(|(node_id, _)| node_id)
      .collect();
    assert_eq!(referencing.len(), 3);
  }

  #[test]
  fn a_source_bundle_in_a_saturated_group_keeps_its_copy_inline() {
    let (mut graph, shared, routes) = three_routes_sharing_a_module(25000);

    // Saturate the third route's bundle group with a type-change bundle.
    let route = &routes[2];
    let route_node = *graph.get_node_id_by_content_key(&route.id).unwrap();
    let styles_node = graph.add_asset(asset("routes/route-2.css", 300));
    import(
      &mut graph,
      route,
      route_node,
      "./route-2.css",
      Priority::Sync,
      styles_node,
    );

    let (bundle_graph, stats) = run_default(
      &graph,
      PartitionConfig {
        min_bundles: 1,
        min_bundle_size: 20000,
        max_parallel_requests: 2,
      },
    );

    assert_eq!(stats.shared_bundles, 1);

    let shared_asset_node = bundle_graph_node(&bundle_graph, &shared.id);
    let containing = bundle_graph.bundles_containing_asset(&shared_asset_node);

    // The shared bundle plus the excluded route bundle, which keeps the
    // module duplicated inline.
    assert_eq!(containing.len(), 2);
    let keeps_inline = containing
      .iter()
      .filter_map(|node_id| bundle_graph.bundle(node_id))
      .any(|bundle| bundle.entry_asset_ids.contains(&route.id));
    assert!(keeps_inline);

    // No bundle group ever exceeds the parallel request budget.
    for (group_node, _) in bundle_graph.bundle_groups() {
      assert!(bundle_graph.bundles_in_bundle_group(&group_node).len() <= 2);
    }
  }

  #[test]
  fn a_candidate_with_one_eligible_source_is_skipped_entirely() {
    // Two routes duplicate the module, but one route's group is already at
    // the parallel request limit.
    let mut graph = AssetGraph::new();
    let entry = asset("entry.js", 500);
    let entry_node = add_entry(&mut graph, &entry);
    let shared = asset("shared.js", 25000);
    let shared_node = graph.add_asset(shared.clone());

    for i in 0..2 {
      let route = asset(&format!("routes/route-{i}.js"), 100);
      let route_node = graph.add_asset(route.clone());
      import(
        &mut graph,
        &entry,
        entry_node,
        &format!("./routes/route-{i}.js"),
        Priority::Lazy,
        route_node,
      );
      import(
        &mut graph,
        &route,
        route_node,
        "./shared.js",
        Priority::Sync,
        shared_node,
      );
      if i == 1 {
        // Saturate this route's group so it drops out of eligibility.
        let styles_node = graph.add_asset(asset("routes/route-1.css", 300));
        import(
          &mut graph,
          &route,
          route_node,
          "./route-1.css",
          Priority::Sync,
          styles_node,
        );
      }
    }

    let (bundle_graph, stats) = run_default(
      &graph,
      PartitionConfig {
        min_bundles: 1,
        min_bundle_size: 20000,
        max_parallel_requests: 2,
      },
    );

    // One candidate, one eligible source: no shared bundle at all.
    assert_eq!(stats.shared_bundles, 0);
    let shared_asset_node = bundle_graph_node(&bundle_graph, &shared.id);
    assert_eq!(
      bundle_graph.bundles_containing_asset(&shared_asset_node).len(),
      2
    );
  }

  #[test]
  fn excess_candidates_are_skipped_rather_than_exceeding_the_budget() {
    let mut graph = AssetGraph::new();
    let entry = asset("entry.js", 500);
    let entry_node = add_entry(&mut graph, &entry);

    let mut route_data = Vec::new();
    for i in 0..3 {
      let route = asset(&format!("routes/route-{i}.js"), 100);
      let route_node = graph.add_asset(route.clone());
      import(
        &mut graph,
        &entry,
        entry_node,
        &format!("./routes/route-{i}.js"),
        Priority::Lazy,
        route_node,
      );
      route_data.push((route, route_node));
    }

    // Three overlapping pairs of duplicated modules: {0,1}, {1,2}, {0,2}.
    for (module, (a, b)) in [("f", (0, 1)), ("g", (1, 2)), ("h", (0, 2))] {
      let module_asset = asset(&format!("lib/{module}.js"), 30000);
      let module_node = graph.add_asset(module_asset.clone());
      for source in [a, b] {
        let (route, route_node) = &route_data[source];
        import(
          &mut graph,
          route,
          *route_node,
          &format!("../lib/{module}.js"),
          Priority::Sync,
          module_node,
        );
      }
    }

    let config = PartitionConfig {
      min_bundles: 1,
      min_bundle_size: 20000,
      max_parallel_requests: 2,
    };

    let facets = FacetCollector::collect(&graph);
    let mut bundle_graph = BundleGraph::from_asset_graph(&graph);
    Partitioner::new()
      .run(&graph, &mut bundle_graph, &facets)
      .unwrap();
    let stats = SharedBundleOptimizer::run(&mut bundle_graph, &config).unwrap();

    assert_eq!(
      stats,
      SharedBundleStats {
        candidates: 3,
        shared_bundles: 1,
        skipped_candidates: 2,
      }
    );

    for (group_node, _) in bundle_graph.bundle_groups() {
      assert!(
        bundle_graph.bundles_in_bundle_group(&group_node).len() <= config.max_parallel_requests
      );
    }
  }

  #[test]
  fn async_dependency_on_an_already_shipped_asset_is_internalized() {
    let mut graph = AssetGraph::new();
    let entry = asset("entry.js", 500);
    let entry_node = add_entry(&mut graph, &entry);

    let widget = asset("widget.js", 400);
    let widget_node = graph.add_asset(widget.clone());
    import(
      &mut graph,
      &entry,
      entry_node,
      "./widget.js",
      Priority::Sync,
      widget_node,
    );
    let lazy_dep = import(
      &mut graph,
      &entry,
      entry_node,
      "./widget.js?lazy",
      Priority::Lazy,
      widget_node,
    );
    let lazy_dep_id = graph.get_dependency(&lazy_dep).unwrap().id();

    let (bundle_graph, stats) = run_default(&graph, HTTP1_DEFAULTS);

    assert_eq!(stats.internalized_dependencies, 1);
    assert_eq!(stats.bundle_groups, 1);

    let lazy_dep_node = bundle_graph_node(&bundle_graph, &lazy_dep_id);
    assert!(bundle_graph.is_dependency_internalized(&lazy_dep_node));
    assert_eq!(bundle_graph.bundle_groups().count(), 1);
  }

  #[test]
  fn faceted_dependencies_partition_once_per_facet_path() {
    let mut graph = AssetGraph::new();
    let entry = asset("entry.js", 500);
    let entry_node = add_entry(&mut graph, &entry);

    for facet in ["checkout", "profile"] {
      let route = asset(&format!("routes/{facet}.js"), 200);
      let route_node = graph.add_asset(route);
      let dep = graph.add_dependency(Dependency {
        facet: Some(facet.to_string()),
        source_asset_id: Some(entry.id.clone()),
        ..Dependency::new(format!("./routes/{facet}.js"), entry.env.clone())
      });
      graph.add_edge(&entry_node, &dep);
      graph.add_edge(&dep, &route_node);
    }

    let (bundle_graph, stats) = run_default(&graph, HTTP1_DEFAULTS);

    assert_eq!(stats.passes, 2);

    let facets_seen: Vec<Option<String>> = bundle_graph
      .bundles()
      .map(|(_, bundle)| bundle.facet.clone())
      .collect();
    assert!(facets_seen.contains(&Some("checkout".to_string())));
    assert!(facets_seen.contains(&Some("profile".to_string())));
    // Faceted passes never produce stable-name bundles.
    assert!(
      bundle_graph
        .bundles()
        .all(|(_, bundle)| bundle.needs_stable_name == Some(false))
    );
  }
}
