use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use tracing::instrument;

use bindle_core::asset_graph::{AssetGraph, AssetGraphNode, NodeId, VisitControl};
use bindle_core::bundle_graph::{
  BundleGraph, BundleGraphEdgeType, BundleGroup, bundle_group_id,
};
use bindle_core::diagnostic::{DiagnosticBuilder, DiagnosticError, ErrorKind};
use bindle_core::diagnostic_error;
use bindle_core::hash::hash_string;
use bindle_core::types::{
  Bundle, Environment, FileType, MaybeBundleBehavior, Priority, Target,
};

use crate::facets::{FacetPath, FacetTable};

/// Policy predicate excluding facet paths from partitioning.
pub type FacetExclusion = Box<dyn Fn(&FacetPath) -> bool>;

/// Builds the denylist policy: exclude any facet path whose final segment
/// matches one of the given values.
pub fn facet_segment_denylist(segments: Vec<String>) -> FacetExclusion {
  Box::new(move |path| {
    path
      .last()
      .is_some_and(|last| segments.iter().any(|segment| segment == last))
  })
}

type PendingBundleId = usize;
type PendingGroupId = usize;

#[derive(Debug)]
struct PendingBundle {
  unique_key: String,
  bundle_type: FileType,
  env: Arc<Environment>,
  target: Target,
  facet: Option<String>,
  needs_stable_name: bool,
  bundle_behavior: MaybeBundleBehavior,
  pipeline: Option<String>,
  is_splittable: bool,
  entry_asset: NodeId,
  assets: Vec<NodeId>,
  asset_set: HashSet<NodeId>,
  dependencies: Vec<NodeId>,
  dependency_set: HashSet<NodeId>,
}

#[derive(Debug)]
struct PendingGroup {
  dependency: NodeId,
  dependency_id: String,
  target: Target,
  facet: Option<String>,
  bundles: Vec<PendingBundleId>,
}

/// Parameters for a bundle opened during a partitioning pass.
struct StartBundle {
  unique_key: String,
  bundle_type: FileType,
  env: Arc<Environment>,
  target: Target,
  facet: Option<String>,
  needs_stable_name: bool,
  bundle_behavior: MaybeBundleBehavior,
  pipeline: Option<String>,
  is_splittable: bool,
  entry_asset: NodeId,
}

/// Accumulates the side effects of all partitioning passes.
///
/// Nothing touches the bundle graph until every pass has run; the queued
/// operations are applied in one ordered materialization step, which makes
/// the passes inspectable and unit-testable in isolation.
#[derive(Debug, Default)]
pub struct PartitionResult {
  bundles: Vec<PendingBundle>,
  bundles_by_key: HashMap<(String, String, Option<String>), PendingBundleId>,
  groups: Vec<PendingGroup>,
  groups_by_key: HashMap<(NodeId, Option<String>), PendingGroupId>,
  asset_references: Vec<(NodeId, NodeId)>,
  dependency_removals: Vec<(PendingBundleId, NodeId)>,
}

impl PartitionResult {
  /// Opens a bundle, or returns the existing one for the same
  /// (unique key, target, facet) identity.
  fn start_bundle(&mut self, params: StartBundle) -> PendingBundleId {
    let key = (
      params.unique_key.clone(),
      params.target.name.clone(),
      params.facet.clone(),
    );
    if let Some(existing) = self.bundles_by_key.get(&key) {
      return *existing;
    }

    let id = self.bundles.len();
    self.bundles.push(PendingBundle {
      unique_key: params.unique_key,
      bundle_type: params.bundle_type,
      env: params.env,
      target: params.target,
      facet: params.facet,
      needs_stable_name: params.needs_stable_name,
      bundle_behavior: params.bundle_behavior,
      pipeline: params.pipeline,
      is_splittable: params.is_splittable,
      entry_asset: params.entry_asset,
      assets: vec![params.entry_asset],
      asset_set: HashSet::from([params.entry_asset]),
      dependencies: Vec::new(),
      dependency_set: HashSet::new(),
    });
    self.bundles_by_key.insert(key, id);
    id
  }

  fn bundle_type(&self, bundle: PendingBundleId) -> &FileType {
    &self.bundles[bundle].bundle_type
  }

  /// Adds an asset to a bundle; duplicates are no-ops.
  fn add_asset(&mut self, bundle: PendingBundleId, asset: NodeId) {
    let pending = &mut self.bundles[bundle];
    if pending.asset_set.insert(asset) {
      pending.assets.push(asset);
    }
  }

  fn attach_dependency(&mut self, bundle: PendingBundleId, dependency: NodeId) {
    let pending = &mut self.bundles[bundle];
    if pending.dependency_set.insert(dependency) {
      pending.dependencies.push(dependency);
    }
  }

  fn bundle_has_dependency(&self, bundle: PendingBundleId, dependency: NodeId) -> bool {
    self.bundles[bundle].dependency_set.contains(&dependency)
  }

  /// Opens a bundle group for a triggering dependency, or returns the
  /// existing one for the same (dependency, facet) identity.
  fn start_group(
    &mut self,
    dependency: NodeId,
    dependency_id: String,
    target: Target,
    facet: Option<String>,
  ) -> PendingGroupId {
    let key = (dependency, facet.clone());
    if let Some(existing) = self.groups_by_key.get(&key) {
      return *existing;
    }

    let id = self.groups.len();
    self.groups.push(PendingGroup {
      dependency,
      dependency_id,
      target,
      facet,
      bundles: Vec::new(),
    });
    self.groups_by_key.insert(key, id);
    id
  }

  fn add_bundle_to_group(&mut self, group: PendingGroupId, bundle: PendingBundleId) {
    let pending = &mut self.groups[group];
    if !pending.bundles.contains(&bundle) {
      pending.bundles.push(bundle);
    }
  }

  fn queue_asset_reference(&mut self, dependency: NodeId, asset: NodeId) {
    if !self.asset_references.contains(&(dependency, asset)) {
      self.asset_references.push((dependency, asset));
    }
  }

  fn queue_dependency_removal(&mut self, bundle: PendingBundleId, dependency: NodeId) {
    self.dependency_removals.push((bundle, dependency));
  }
}

/// Traversal context carried from a node to its children, one value per
/// path.
#[derive(Clone)]
struct PassContext {
  dependency: Option<NodeId>,
  target: Option<Target>,
  bundle: Option<PendingBundleId>,
  group: Option<PendingGroupId>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PartitionStats {
  pub passes: usize,
  pub bundles: usize,
  pub bundle_groups: usize,
  pub removed_dependencies: usize,
}

/// Walks the asset graph once per (target, facet path) combination, assigning
/// assets to bundles and dependencies to bundle groups.
#[derive(Default)]
pub struct Partitioner<'a> {
  facet_exclusion: Option<&'a dyn Fn(&FacetPath) -> bool>,
}

impl<'a> Partitioner<'a> {
  pub fn new() -> Self {
    Partitioner {
      facet_exclusion: None,
    }
  }

  pub fn with_facet_exclusion(exclusion: &'a dyn Fn(&FacetPath) -> bool) -> Self {
    Partitioner {
      facet_exclusion: Some(exclusion),
    }
  }

  fn is_excluded(&self, path: &FacetPath) -> bool {
    self.facet_exclusion.map(|f| f(path)).unwrap_or(false)
  }

  #[instrument(level = "debug", skip_all)]
  pub fn run(
    &self,
    asset_graph: &AssetGraph,
    bundle_graph: &mut BundleGraph,
    facets: &FacetTable,
  ) -> Result<PartitionStats, DiagnosticError> {
    let mut targets: Vec<Target> = Vec::new();
    for dep in asset_graph.get_dependencies() {
      if !dep.is_entry {
        continue;
      }
      if let Some(target) = dep.target.as_deref() {
        if !targets.iter().any(|existing| existing.name == target.name) {
          targets.push(target.clone());
        }
      }
    }

    let mut result = PartitionResult::default();
    let mut passes = 0;

    for target in &targets {
      let mut paths: Vec<FacetPath> = facets
        .paths_for_target(&target.name)
        .iter()
        .filter(|path| !self.is_excluded(path))
        .cloned()
        .collect();

      if paths.is_empty() {
        paths.push(FacetPath::new());
      }

      for pass_path in &paths {
        self.run_pass(asset_graph, &mut result, target, pass_path, facets)?;
        passes += 1;
      }
    }

    let mut stats = materialize(asset_graph, bundle_graph, result)?;
    stats.passes = passes;

    debug!(
      passes = stats.passes,
      bundles = stats.bundles,
      bundle_groups = stats.bundle_groups,
      removed_dependencies = stats.removed_dependencies,
      "partitioned asset graph"
    );

    Ok(stats)
  }

  fn run_pass(
    &self,
    asset_graph: &AssetGraph,
    result: &mut PartitionResult,
    target: &Target,
    pass_path: &FacetPath,
    facets: &FacetTable,
  ) -> Result<(), DiagnosticError> {
    let mut seen: HashSet<(NodeId, Option<PendingBundleId>, Option<PendingGroupId>)> =
      HashSet::new();
    let mut failure: Option<DiagnosticError> = None;

    let root_context = PassContext {
      dependency: None,
      target: None,
      bundle: None,
      group: None,
    };

    asset_graph.traverse(asset_graph.root_node(), root_context, |node_id, node, context| {
      match node {
        AssetGraphNode::Root => VisitControl::Continue(context.clone()),

        AssetGraphNode::Dependency(dep) => {
          // Entries open one target's traversal; prune other targets.
          if dep.is_entry
            && dep.target.as_deref().map(|t| t.name.as_str()) != Some(target.name.as_str())
          {
            return VisitControl::SkipChildren;
          }

          let skipped = asset_graph.is_dependency_excluded(&node_id)
            || (dep.facet.is_some() && !self.facet_compatible(facets, &dep.id(), pass_path));

          if skipped {
            // A dependency attached to the context bundle by an earlier,
            // compatible pass gets a queued removal from it.
            if let Some(bundle) = context.bundle {
              if result.bundle_has_dependency(bundle, node_id) {
                result.queue_dependency_removal(bundle, node_id);
              }
            }
            return VisitControl::SkipChildren;
          }

          let target_context = dep
            .target
            .as_deref()
            .cloned()
            .or_else(|| context.target.clone());

          let mut bundle = context.bundle;
          let mut group = context.group;

          // The dependency's call site ships with the bundle it was reached
          // from, whatever its priority.
          if let Some(bundle) = bundle {
            result.attach_dependency(bundle, node_id);
          }

          // Loading boundaries get a bundle group of their own.
          if dep.is_entry || dep.priority == Priority::Lazy || group.is_none() {
            let Some(group_target) = target_context.clone() else {
              failure = Some(diagnostic_error!(DiagnosticBuilder::default()
                .kind(ErrorKind::InvalidState)
                .message(format!(
                  "Dependency {} reached a bundle group boundary with no target context",
                  dep.specifier
                ))));
              return VisitControl::Stop;
            };

            group = Some(result.start_group(
              node_id,
              dep.id(),
              group_target,
              pass_path.last().map(str::to_string),
            ));
            bundle = None;
          }

          if !seen.insert((node_id, bundle, group)) {
            return VisitControl::SkipChildren;
          }

          VisitControl::Continue(PassContext {
            dependency: Some(node_id),
            target: target_context,
            bundle,
            group,
          })
        }

        AssetGraphNode::Asset(asset) => {
          let Some(asset_target) = context.target.clone() else {
            failure = Some(diagnostic_error!(DiagnosticBuilder::default()
              .kind(ErrorKind::InvalidState)
              .message(format!(
                "Asset {} was reached with no target context",
                asset.file_path.display()
              ))));
            return VisitControl::Stop;
          };

          let mut bundle = context.bundle;
          let needs_new_bundle = match bundle {
            None => true,
            Some(bundle) => *result.bundle_type(bundle) != asset.file_type,
          };

          if needs_new_bundle {
            let (Some(group), Some(dependency)) = (context.group, context.dependency) else {
              failure = Some(diagnostic_error!(DiagnosticBuilder::default()
                .kind(ErrorKind::InvalidState)
                .message(format!(
                  "Asset {} was reached outside of any bundle group",
                  asset.file_path.display()
                ))));
              return VisitControl::Stop;
            };

            let Some(triggering) = asset_graph.get_dependency(&dependency) else {
              failure = Some(diagnostic_error!(DiagnosticBuilder::default()
                .kind(ErrorKind::NotFound)
                .message("Triggering dependency is missing from the asset graph")));
              return VisitControl::Stop;
            };

            let started = result.start_bundle(StartBundle {
              unique_key: asset.id.clone(),
              bundle_type: asset.file_type.clone(),
              env: asset.env.clone(),
              target: asset_target.clone(),
              facet: pass_path.last().map(str::to_string),
              needs_stable_name: pass_path.is_empty() && triggering.is_entry,
              bundle_behavior: triggering.bundle_behavior,
              pipeline: asset.pipeline.clone(),
              is_splittable: asset.is_bundle_splittable,
              entry_asset: node_id,
            });
            result.add_bundle_to_group(group, started);
            result.queue_asset_reference(dependency, node_id);
            bundle = Some(started);
          } else if let Some(bundle) = bundle {
            result.add_asset(bundle, node_id);
          }

          if !seen.insert((node_id, bundle, context.group)) {
            return VisitControl::SkipChildren;
          }

          VisitControl::Continue(PassContext {
            dependency: context.dependency,
            target: Some(asset_target),
            bundle,
            group: context.group,
          })
        }
      }
    });

    match failure {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }

  /// A pass participates in a faceted dependency's subtree only when the
  /// pass path and the dependency's recorded transitive path agree up to the
  /// shorter of the two.
  fn facet_compatible(&self, facets: &FacetTable, dep_id: &str, pass_path: &FacetPath) -> bool {
    facets
      .transitive_path(dep_id)
      .map(|recorded| pass_path.is_prefix_of(recorded) || recorded.is_prefix_of(pass_path))
      .unwrap_or(false)
  }
}

/// Applies a [`PartitionResult`] to the bundle graph: bundles first, then
/// bundle groups, then queued asset references, then queued dependency
/// removals, each removal guarded by a still-present check.
fn materialize(
  asset_graph: &AssetGraph,
  bundle_graph: &mut BundleGraph,
  result: PartitionResult,
) -> Result<PartitionStats, DiagnosticError> {
  let asset_content_key = |node: &NodeId| -> Result<String, DiagnosticError> {
    asset_graph
      .get_asset(node)
      .map(|asset| asset.id.clone())
      .ok_or_else(|| {
        diagnostic_error!(DiagnosticBuilder::default()
          .kind(ErrorKind::NotFound)
          .message("Partitioned asset is missing from the asset graph"))
      })
  };
  let dependency_content_key = |node: &NodeId| -> Result<String, DiagnosticError> {
    asset_graph
      .get_dependency(node)
      .map(|dep| dep.id())
      .ok_or_else(|| {
        diagnostic_error!(DiagnosticBuilder::default()
          .kind(ErrorKind::NotFound)
          .message("Partitioned dependency is missing from the asset graph"))
      })
  };

  let lookup = |bundle_graph: &BundleGraph, content_key: &str| -> Result<NodeId, DiagnosticError> {
    bundle_graph
      .get_node_id_by_content_key(content_key)
      .copied()
      .ok_or_else(|| {
        diagnostic_error!(DiagnosticBuilder::default()
          .kind(ErrorKind::NotFound)
          .message(format!("Missing bundle graph node for {content_key}")))
      })
  };

  let mut bundle_nodes: Vec<NodeId> = Vec::with_capacity(result.bundles.len());

  for pending in &result.bundles {
    let entry_asset_id = asset_content_key(&pending.entry_asset)?;
    let bundle_id = hash_string(format!(
      "bundle:{}:{}:{}",
      pending.unique_key,
      pending.target.name,
      pending.facet.as_deref().unwrap_or_default()
    ));

    let bundle_node = bundle_graph.add_bundle(Bundle {
      id: bundle_id,
      public_id: None,
      bundle_type: pending.bundle_type.clone(),
      env: pending.env.clone(),
      unique_key: Some(pending.unique_key.clone()),
      entry_asset_ids: vec![entry_asset_id.clone()],
      main_entry_id: Some(entry_asset_id.clone()),
      needs_stable_name: Some(pending.needs_stable_name),
      bundle_behavior: pending.bundle_behavior,
      is_splittable: Some(pending.is_splittable),
      facet: pending.facet.clone(),
      pipeline: pending.pipeline.clone(),
      name: None,
      target: pending.target.clone(),
    });

    let entry_node = lookup(bundle_graph, &entry_asset_id)?;
    bundle_graph.add_edge(&bundle_node, &entry_node, BundleGraphEdgeType::Null);

    for asset in &pending.assets {
      let asset_node = lookup(bundle_graph, &asset_content_key(asset)?)?;
      bundle_graph.add_asset_to_bundle(&bundle_node, &asset_node);
    }
    for dependency in &pending.dependencies {
      let dep_node = lookup(bundle_graph, &dependency_content_key(dependency)?)?;
      bundle_graph.add_edge(&bundle_node, &dep_node, BundleGraphEdgeType::Contains);
    }

    bundle_nodes.push(bundle_node);
  }

  let root_node = bundle_graph.root_node();
  for pending in &result.groups {
    let group = BundleGroup {
      target: pending.target.clone(),
      entry_dep_id: pending.dependency_id.clone(),
      facet: pending.facet.clone(),
    };
    let group_node = bundle_graph.add_bundle_group(bundle_group_id(&group), group);

    bundle_graph.add_edge(&root_node, &group_node, BundleGraphEdgeType::Bundle);
    let dep_node = lookup(bundle_graph, &dependency_content_key(&pending.dependency)?)?;
    bundle_graph.add_edge(&dep_node, &group_node, BundleGraphEdgeType::Null);

    for bundle in &pending.bundles {
      bundle_graph.add_bundle_to_bundle_group(&group_node, &bundle_nodes[*bundle]);
    }
  }

  for (dependency, asset) in &result.asset_references {
    let dep_node = lookup(bundle_graph, &dependency_content_key(dependency)?)?;
    let asset_node = lookup(bundle_graph, &asset_content_key(asset)?)?;
    bundle_graph.add_edge(&dep_node, &asset_node, BundleGraphEdgeType::References);
  }

  let mut removed_dependencies = 0;
  for (bundle, dependency) in &result.dependency_removals {
    let dep_node = lookup(bundle_graph, &dependency_content_key(dependency)?)?;
    if bundle_graph.remove_edge(
      &bundle_nodes[*bundle],
      &dep_node,
      BundleGraphEdgeType::Contains,
    ) {
      removed_dependencies += 1;
    }
  }

  Ok(PartitionStats {
    passes: 0,
    bundles: result.bundles.len(),
    bundle_groups: result.groups.len(),
    removed_dependencies,
  })
}
