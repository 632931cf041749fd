use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;

use tracing::debug;
use tracing::instrument;

use bindle_core::asset_graph::{AssetGraph, AssetGraphNode, NodeId, VisitControl};

/// An ordered sequence of facet tags.
///
/// Facet paths are sequences, not sets: `[a, b]` and `[b, a]` are distinct
/// partitioning contexts. The empty path is the default, facet-less context.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct FacetPath(Vec<String>);

impl FacetPath {
  pub fn new() -> Self {
    FacetPath(Vec::new())
  }

  pub fn from_segments(segments: Vec<String>) -> Self {
    FacetPath(segments)
  }

  /// Returns this path extended by one segment.
  ///
  /// A tag already on the path is not appended again, which keeps paths
  /// finite on cyclic graphs while preserving monotonic growth along any
  /// traversal path.
  pub fn child(&self, segment: &str) -> FacetPath {
    if self.contains(segment) {
      return self.clone();
    }
    let mut segments = self.0.clone();
    segments.push(segment.to_string());
    FacetPath(segments)
  }

  pub fn contains(&self, segment: &str) -> bool {
    self.0.iter().any(|s| s == segment)
  }

  pub fn last(&self) -> Option<&str> {
    self.0.last().map(String::as_str)
  }

  pub fn segments(&self) -> &[String] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Ordered prefix comparison: `[a]` is a prefix of `[a, b]` but `[a, c]`
  /// is not, and neither is `[b, a]`.
  pub fn is_prefix_of(&self, other: &FacetPath) -> bool {
    other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
  }
}

impl Display for FacetPath {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0.join("."))
  }
}

impl<S: Into<String>> FromIterator<S> for FacetPath {
  fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
    FacetPath(iter.into_iter().map(Into::into).collect())
  }
}

/// The output of [`FacetCollector`]: the distinct facet paths seen per
/// target, and each faceted dependency's transitive facet membership.
#[derive(Debug, Default)]
pub struct FacetTable {
  paths_by_target: HashMap<String, Vec<FacetPath>>,
  transitive_by_dependency: HashMap<String, FacetPath>,
}

impl FacetTable {
  /// Facet paths recorded for a target, in first-visit order.
  ///
  /// Empty for targets with no faceted dependencies; the partitioner covers
  /// those with a single default pass.
  pub fn paths_for_target(&self, target_name: &str) -> &[FacetPath] {
    self
      .paths_by_target
      .get(target_name)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  /// The merged facet path recorded for a dependency.
  pub fn transitive_path(&self, dependency_id: &str) -> Option<&FacetPath> {
    self.transitive_by_dependency.get(dependency_id)
  }

  fn register_path(&mut self, target_name: &str, path: &FacetPath) {
    let paths = self.paths_by_target.entry(target_name.to_string()).or_default();
    if !paths.contains(path) {
      paths.push(path.clone());
    }
  }

  /// Records the merged path for a dependency.
  ///
  /// A recorded path only ever grows: a revisit replaces it only when the
  /// existing path is a prefix of the new one. Revisits along unrelated
  /// paths keep the first recording, making collection deterministic for a
  /// deterministic input graph.
  fn record_transitive(&mut self, dependency_id: String, path: &FacetPath) {
    match self.transitive_by_dependency.get_mut(&dependency_id) {
      None => {
        self.transitive_by_dependency.insert(dependency_id, path.clone());
      }
      Some(existing) => {
        if existing.is_prefix_of(path) && existing.len() < path.len() {
          *existing = path.clone();
        }
      }
    }
  }
}

#[derive(Clone)]
struct CollectContext {
  target: Option<String>,
  path: FacetPath,
}

/// One traversal computing, per target, the set of distinct facet paths and,
/// per dependency, its transitive facet membership.
pub struct FacetCollector;

impl FacetCollector {
  #[instrument(level = "debug", skip_all)]
  pub fn collect(asset_graph: &AssetGraph) -> FacetTable {
    let mut table = FacetTable::default();
    let mut seen: HashSet<(NodeId, FacetPath)> = HashSet::new();

    let root_context = CollectContext {
      target: None,
      path: FacetPath::new(),
    };

    asset_graph.traverse(asset_graph.root_node(), root_context, |node_id, node, context| {
      let dep = match node {
        AssetGraphNode::Root => return VisitControl::Continue(context.clone()),
        AssetGraphNode::Asset(_) => {
          if !seen.insert((node_id, context.path.clone())) {
            return VisitControl::SkipChildren;
          }
          return VisitControl::Continue(context.clone());
        }
        AssetGraphNode::Dependency(dep) => dep,
      };

      let target = dep
        .target
        .as_ref()
        .map(|target| target.name.clone())
        .or_else(|| context.target.clone());

      let path = match &dep.facet {
        None => context.path.clone(),
        Some(facet) => {
          let merged = context.path.child(facet);
          if let Some(target_name) = &target {
            table.register_path(target_name, &merged);
          }
          table.record_transitive(dep.id(), &merged);
          merged
        }
      };

      if !seen.insert((node_id, path.clone())) {
        return VisitControl::SkipChildren;
      }

      VisitControl::Continue(CollectContext { target, path })
    });

    debug!(
      targets = table.paths_by_target.len(),
      faceted_dependencies = table.transitive_by_dependency.len(),
      "collected facet paths"
    );

    table
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;
  use std::sync::Arc;

  use pretty_assertions::assert_eq;

  use bindle_core::types::{Asset, Dependency, Environment, Target};

  use super::*;

  fn path(segments: &[&str]) -> FacetPath {
    segments.iter().copied().collect()
  }

  #[test]
  fn empty_path_is_a_prefix_of_everything() {
    assert!(path(&[]).is_prefix_of(&path(&[])));
    assert!(path(&[]).is_prefix_of(&path(&["a"])));
  }

  #[test]
  fn prefix_comparison_is_ordered() {
    assert!(path(&["a"]).is_prefix_of(&path(&["a", "b"])));
    assert!(!path(&["b"]).is_prefix_of(&path(&["a", "b"])));
    assert!(!path(&["a", "c"]).is_prefix_of(&path(&["a", "b"])));
    assert!(!path(&["a", "b"]).is_prefix_of(&path(&["a"])));
  }

  #[test]
  fn child_does_not_repeat_a_tag_already_on_the_path() {
    let base = path(&["a", "b"]);

    assert_eq!(base.child("a"), base);
    assert_eq!(base.child("c"), path(&["a", "b", "c"]));
  }

  fn asset(file_path: &str) -> Arc<Asset> {
    Arc::new(Asset::new(
      Arc::new(Environment::default()),
      PathBuf::from(file_path),
      None,
      false,
      100,
    ))
  }

  fn faceted_dependency(source: &Arc<Asset>, specifier: &str, facet: &str) -> Dependency {
    Dependency {
      facet: Some(facet.to_string()),
      source_asset_id: Some(source.id.clone()),
      ..Dependency::new(specifier.to_string(), source.env.clone())
    }
  }

  #[test]
  fn collects_merged_paths_per_target_and_dependency() {
    let mut graph = AssetGraph::new();

    let entry_dep = graph.add_entry_dependency(Dependency::entry(
      "entry.js".to_string(),
      Target::default(),
    ));
    let entry = asset("entry.js");
    let entry_node = graph.add_asset(entry.clone());
    graph.add_edge(&entry_dep, &entry_node);

    let outer = faceted_dependency(&entry, "./routes/admin.js", "admin");
    let outer_id = outer.id();
    let outer_node = graph.add_dependency(outer);
    graph.add_edge(&entry_node, &outer_node);

    let admin = asset("routes/admin.js");
    let admin_node = graph.add_asset(admin.clone());
    graph.add_edge(&outer_node, &admin_node);

    let inner = faceted_dependency(&admin, "./routes/admin/audit.js", "audit");
    let inner_id = inner.id();
    let inner_node = graph.add_dependency(inner);
    graph.add_edge(&admin_node, &inner_node);

    let audit_node = graph.add_asset(asset("routes/admin/audit.js"));
    graph.add_edge(&inner_node, &audit_node);

    let table = FacetCollector::collect(&graph);

    assert_eq!(
      table.paths_for_target("default").to_vec(),
      vec![path(&["admin"]), path(&["admin", "audit"])]
    );
    assert_eq!(table.transitive_path(&outer_id), Some(&path(&["admin"])));
    assert_eq!(
      table.transitive_path(&inner_id),
      Some(&path(&["admin", "audit"]))
    );
  }

  #[test]
  fn targets_without_facets_record_no_paths() {
    let mut graph = AssetGraph::new();
    let entry_dep = graph.add_entry_dependency(Dependency::entry(
      "entry.js".to_string(),
      Target::default(),
    ));
    let entry_node = graph.add_asset(asset("entry.js"));
    graph.add_edge(&entry_dep, &entry_node);

    let table = FacetCollector::collect(&graph);

    assert!(table.paths_for_target("default").is_empty());
  }
}
