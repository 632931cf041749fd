use std::path::PathBuf;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

use bindle_bundling::{Bundler, DefaultBundler};
use bindle_core::asset_graph::{AssetGraph, NodeId};
use bindle_core::bundle_graph::BundleGraph;
use bindle_core::types::{Asset, Dependency, Environment, Priority, Target};

/// Parameters controlling the synthetic graph shape.
///
/// The generator is intentionally simple and layered, but aims to resemble a
/// real application:
///
/// - Layer 0: entry assets
/// - Layer 1: route modules (lazy deps from entries)
/// - Layer 2: component modules (sync deps from routes)
/// - Layer 3: shared utility modules (sync deps from many components)
/// - Plus: some components import CSS (sync deps with a type-change boundary)
#[derive(Debug, Clone, Copy)]
struct GraphConfig {
  num_entries: usize,
  num_routes: usize,
  num_components: usize,
  num_utils: usize,
  /// Sync imports per route / component.
  fan_out: usize,
  /// Every n-th component pulls in a stylesheet.
  css_every: usize,
  seed: u64,
}

fn make_asset(env: &Arc<Environment>, file_path: String, size: u32) -> Arc<Asset> {
  Arc::new(Asset::new(env.clone(), PathBuf::from(file_path), None, false, size))
}

fn add_import(
  graph: &mut AssetGraph,
  source: &Arc<Asset>,
  source_node: NodeId,
  specifier: String,
  priority: Priority,
  to_node: NodeId,
) {
  let dep = graph.add_dependency(Dependency {
    priority,
    source_asset_id: Some(source.id.clone()),
    ..Dependency::new(specifier, source.env.clone())
  });
  graph.add_edge(&source_node, &dep);
  graph.add_edge(&dep, &to_node);
}

/// Generates a layered synthetic asset graph.
///
/// Deterministic: uses `seed` for RNG.
fn generate_asset_graph(cfg: GraphConfig) -> AssetGraph {
  let mut rng = StdRng::seed_from_u64(cfg.seed);
  let env = Arc::new(Environment::default());
  let mut graph = AssetGraph::new();

  let utils: Vec<(Arc<Asset>, NodeId)> = (0..cfg.num_utils)
    .map(|i| {
      let asset = make_asset(&env, format!("lib/util-{i}.js"), rng.gen_range(500..40_000));
      let node = graph.add_asset(asset.clone());
      (asset, node)
    })
    .collect();

  let components: Vec<(Arc<Asset>, NodeId)> = (0..cfg.num_components)
    .map(|i| {
      let asset = make_asset(
        &env,
        format!("components/component-{i}.js"),
        rng.gen_range(200..5_000),
      );
      let node = graph.add_asset(asset.clone());
      (asset, node)
    })
    .collect();

  for (i, (component, component_node)) in components.iter().enumerate() {
    for _ in 0..cfg.fan_out {
      let (util, util_node) = &utils[rng.gen_range(0..utils.len())];
      add_import(
        &mut graph,
        component,
        *component_node,
        format!("../lib/{}", util.file_path.file_name().unwrap().to_string_lossy()),
        Priority::Sync,
        *util_node,
      );
    }

    if cfg.css_every > 0 && i % cfg.css_every == 0 {
      let styles = make_asset(
        &env,
        format!("components/component-{i}.css"),
        rng.gen_range(100..2_000),
      );
      let styles_node = graph.add_asset(styles);
      add_import(
        &mut graph,
        component,
        *component_node,
        format!("./component-{i}.css"),
        Priority::Sync,
        styles_node,
      );
    }
  }

  let routes: Vec<(Arc<Asset>, NodeId)> = (0..cfg.num_routes)
    .map(|i| {
      let asset = make_asset(&env, format!("routes/route-{i}.js"), rng.gen_range(500..8_000));
      let node = graph.add_asset(asset.clone());
      (asset, node)
    })
    .collect();

  for (route, route_node) in &routes {
    for _ in 0..cfg.fan_out {
      let (component, component_node) = &components[rng.gen_range(0..components.len())];
      add_import(
        &mut graph,
        route,
        *route_node,
        format!(
          "../components/{}",
          component.file_path.file_name().unwrap().to_string_lossy()
        ),
        Priority::Sync,
        *component_node,
      );
    }
  }

  for i in 0..cfg.num_entries {
    let entry = make_asset(&env, format!("entry-{i}.js"), rng.gen_range(500..4_000));
    let entry_dep = graph.add_entry_dependency(Dependency::entry(
      format!("entry-{i}.js"),
      Target::default(),
    ));
    let entry_node = graph.add_asset(entry.clone());
    graph.add_edge(&entry_dep, &entry_node);

    for (route, route_node) in &routes {
      add_import(
        &mut graph,
        &entry,
        entry_node,
        format!("./routes/{}", route.file_path.file_name().unwrap().to_string_lossy()),
        Priority::Lazy,
        *route_node,
      );
    }
  }

  graph
}

fn benchmark_partitioning(c: &mut Criterion) {
  let mut group = c.benchmark_group("partitioning");

  let configs = [
    ("small", GraphConfig {
      num_entries: 1,
      num_routes: 10,
      num_components: 50,
      num_utils: 20,
      fan_out: 3,
      css_every: 10,
      seed: 42,
    }),
    ("medium", GraphConfig {
      num_entries: 2,
      num_routes: 50,
      num_components: 500,
      num_utils: 100,
      fan_out: 4,
      css_every: 10,
      seed: 42,
    }),
    ("large", GraphConfig {
      num_entries: 5,
      num_routes: 200,
      num_components: 2_000,
      num_utils: 400,
      fan_out: 5,
      css_every: 10,
      seed: 42,
    }),
  ];

  for (name, cfg) in configs {
    let graph = generate_asset_graph(cfg);
    let bundler = DefaultBundler::default();

    group.bench_function(BenchmarkId::new("bundle", name), |b| {
      b.iter(|| {
        let mut bundle_graph = BundleGraph::from_asset_graph(black_box(&graph));
        let stats = bundler.bundle(black_box(&graph), &mut bundle_graph).unwrap();
        black_box((bundle_graph, stats));
      })
    });
  }

  group.finish();
}

criterion_group!(benches, benchmark_partitioning);
criterion_main!(benches);
