use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::asset_graph::{AssetGraph, AssetGraphNode};
use crate::types::{Asset, Bundle, Dependency, Target};

pub type NodeId = usize;

/// Edge types in the bundle graph.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum BundleGraphEdgeType {
  /// Plain structural edge, mirroring the asset graph topology
  #[default]
  Null = 1,
  /// Bundle or bundle group membership
  Contains = 2,
  /// Attaches a bundle group to the root, or a bundle to a group
  Bundle = 3,
  /// Load-time reference from one bundle to another
  References = 4,
  /// Marks an async dependency as resolved from already-loaded code
  InternalAsync = 5,
}

/// The set of bundles loaded together in response to one triggering
/// dependency.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleGroup {
  pub target: Target,
  /// The id of the dependency whose resolution triggers loading this group
  pub entry_dep_id: String,
  /// The final facet path segment the group was partitioned for, if any
  pub facet: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum BundleGraphNode {
  Root,
  Asset(Arc<Asset>),
  Dependency(Arc<Dependency>),
  BundleGroup(BundleGroup),
  Bundle(Bundle),
}

/// PetGraph-backed bundle graph, modelled similarly to `AssetGraph`.
///
/// All bundling passes mutate this structure in place; downstream packaging
/// consumes the finalized graph.
#[derive(Clone, Debug)]
pub struct BundleGraph {
  pub graph: StableDiGraph<NodeId, BundleGraphEdgeType>,
  nodes: Vec<BundleGraphNode>,
  node_id_to_node_index: HashMap<NodeId, NodeIndex>,
  content_key_to_node_id: HashMap<String, NodeId>,
  root_node_id: NodeId,

  /// Maps full asset IDs to concise public IDs.
  pub public_id_by_asset_id: HashMap<String, String>,
  /// Set of all assigned asset public IDs.
  pub asset_public_ids: HashSet<String>,
  /// Set of all assigned bundle public IDs.
  pub bundle_public_ids: HashSet<String>,
}

impl Default for BundleGraph {
  fn default() -> Self {
    Self::new()
  }
}

impl BundleGraph {
  pub fn new() -> Self {
    let mut graph = StableDiGraph::new();
    let mut node_id_to_node_index = HashMap::new();
    let nodes = vec![BundleGraphNode::Root];
    let root_node_id = 0;
    node_id_to_node_index.insert(root_node_id, graph.add_node(root_node_id));

    let mut content_key_to_node_id = HashMap::new();
    content_key_to_node_id.insert("@@root".to_string(), root_node_id);

    Self {
      graph,
      nodes,
      node_id_to_node_index,
      content_key_to_node_id,
      root_node_id,
      public_id_by_asset_id: HashMap::new(),
      asset_public_ids: HashSet::new(),
      bundle_public_ids: HashSet::new(),
    }
  }

  /// Create a bundle graph from an asset graph.
  ///
  /// Copies all asset/dependency nodes and all edges from the asset graph, so
  /// dependency resolution keeps working inside the bundle graph.
  pub fn from_asset_graph(asset_graph: &AssetGraph) -> Self {
    let mut bundle_graph = BundleGraph::new();

    for node in asset_graph.nodes() {
      match node {
        AssetGraphNode::Root => {
          // already present
        }
        AssetGraphNode::Asset(asset) => {
          bundle_graph.add_asset(asset.clone());
        }
        AssetGraphNode::Dependency(dep) => {
          bundle_graph.add_dependency(dep.clone());
        }
      }
    }

    for (from_id, to_id) in asset_graph.edges() {
      bundle_graph.add_edge(&from_id, &to_id, BundleGraphEdgeType::Null);
    }

    // Assign public ids for assets
    let asset_ids: Vec<String> = bundle_graph
      .nodes
      .iter()
      .filter_map(|node| match node {
        BundleGraphNode::Asset(asset) => Some(asset.id.clone()),
        _ => None,
      })
      .collect();

    for asset_id in asset_ids {
      let public_id = generate_public_id(&asset_id, |candidate| {
        bundle_graph.asset_public_ids.contains(candidate)
      });
      bundle_graph.asset_public_ids.insert(public_id.clone());
      bundle_graph
        .public_id_by_asset_id
        .insert(asset_id, public_id);
    }

    debug!(
      nodes = bundle_graph.nodes.len(),
      "created bundle graph from asset graph"
    );

    bundle_graph
  }

  /// Live nodes of the graph, skipping any that have been removed.
  pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &BundleGraphNode)> {
    self
      .nodes
      .iter()
      .enumerate()
      .filter(|(node_id, _)| self.node_id_to_node_index.contains_key(node_id))
  }

  pub fn root_node(&self) -> NodeId {
    self.root_node_id
  }

  pub fn get_node(&self, idx: &NodeId) -> Option<&BundleGraphNode> {
    if !self.node_id_to_node_index.contains_key(idx) {
      return None;
    }
    self.nodes.get(*idx)
  }

  pub fn get_node_id_by_content_key(&self, content_key: &str) -> Option<&NodeId> {
    self.content_key_to_node_id.get(content_key)
  }

  fn add_node(&mut self, content_key: String, node: BundleGraphNode) -> NodeId {
    let node_id = if let Some(existing_node_id) = self.content_key_to_node_id.get(&content_key) {
      *existing_node_id
    } else {
      let node_id = self.nodes.len();
      self.nodes.push(node);
      self.content_key_to_node_id.insert(content_key, node_id);
      node_id
    };

    if !self.node_id_to_node_index.contains_key(&node_id) {
      let node_index = self.graph.add_node(node_id);
      self.node_id_to_node_index.insert(node_id, node_index);
    }
    node_id
  }

  pub fn add_asset(&mut self, asset: Arc<Asset>) -> NodeId {
    self.add_node(asset.id.clone(), BundleGraphNode::Asset(asset))
  }

  pub fn add_dependency(&mut self, dependency: Arc<Dependency>) -> NodeId {
    self.add_node(dependency.id(), BundleGraphNode::Dependency(dependency))
  }

  /// Add a bundle group node.
  pub fn add_bundle_group(&mut self, id: String, bundle_group: BundleGroup) -> NodeId {
    self.add_node(id, BundleGraphNode::BundleGroup(bundle_group))
  }

  /// Add a bundle node. If the bundle does not have a public id, assign it
  /// here.
  pub fn add_bundle(&mut self, mut bundle: Bundle) -> NodeId {
    if bundle.public_id.is_none() {
      let public_id = generate_public_id(&bundle.id, |candidate| {
        self.bundle_public_ids.contains(candidate)
      });
      self.bundle_public_ids.insert(public_id.clone());
      bundle.public_id = Some(public_id);
    }

    self.add_node(bundle.id.clone(), BundleGraphNode::Bundle(bundle))
  }

  pub fn has_edge(&self, from_id: &NodeId, to_id: &NodeId, edge_type: BundleGraphEdgeType) -> bool {
    let (Some(from), Some(to)) = (
      self.node_id_to_node_index.get(from_id),
      self.node_id_to_node_index.get(to_id),
    ) else {
      return false;
    };
    self
      .graph
      .edges_connecting(*from, *to)
      .any(|edge| *edge.weight() == edge_type)
  }

  /// Adds an edge, treating repeated additions of the same typed edge as
  /// no-ops.
  pub fn add_edge(&mut self, from_id: &NodeId, to_id: &NodeId, edge_type: BundleGraphEdgeType) {
    if self.has_edge(from_id, to_id, edge_type) {
      return;
    }
    self.graph.add_edge(
      self.node_id_to_node_index[from_id],
      self.node_id_to_node_index[to_id],
      edge_type,
    );
  }

  /// Removes an edge if it is still present.
  ///
  /// Returns whether an edge was removed, so redundant removal requests
  /// queued across passes never double-fail.
  pub fn remove_edge(
    &mut self,
    from_id: &NodeId,
    to_id: &NodeId,
    edge_type: BundleGraphEdgeType,
  ) -> bool {
    let (Some(from), Some(to)) = (
      self.node_id_to_node_index.get(from_id),
      self.node_id_to_node_index.get(to_id),
    ) else {
      return false;
    };

    let edge = self
      .graph
      .edges_connecting(*from, *to)
      .find(|edge| *edge.weight() == edge_type)
      .map(|edge| edge.id());

    match edge {
      Some(edge) => {
        self.graph.remove_edge(edge);
        true
      }
      None => false,
    }
  }

  fn neighbors_of_type(
    &self,
    node_id: &NodeId,
    direction: Direction,
    edge_type: BundleGraphEdgeType,
  ) -> Vec<NodeId> {
    let Some(node_index) = self.node_id_to_node_index.get(node_id) else {
      return Vec::new();
    };

    let mut neighbors: Vec<NodeId> = self
      .graph
      .edges_directed(*node_index, direction)
      .filter(|edge| *edge.weight() == edge_type)
      .filter_map(|edge| {
        let other = match direction {
          Direction::Outgoing => edge.target(),
          Direction::Incoming => edge.source(),
        };
        self.graph.node_weight(other).copied()
      })
      .collect();

    // Edge iteration order is newest-first; reverse for insertion order.
    neighbors.reverse();
    neighbors
  }

  pub fn get_outgoing_neighbors_of_type(
    &self,
    node_id: &NodeId,
    edge_type: BundleGraphEdgeType,
  ) -> Vec<NodeId> {
    self.neighbors_of_type(node_id, Direction::Outgoing, edge_type)
  }

  pub fn get_incoming_neighbors_of_type(
    &self,
    node_id: &NodeId,
    edge_type: BundleGraphEdgeType,
  ) -> Vec<NodeId> {
    self.neighbors_of_type(node_id, Direction::Incoming, edge_type)
  }

  pub fn bundle(&self, node_id: &NodeId) -> Option<&Bundle> {
    let BundleGraphNode::Bundle(bundle) = self.get_node(node_id)? else {
      return None;
    };
    Some(bundle)
  }

  pub fn bundle_group(&self, node_id: &NodeId) -> Option<&BundleGroup> {
    let BundleGraphNode::BundleGroup(group) = self.get_node(node_id)? else {
      return None;
    };
    Some(group)
  }

  pub fn dependency(&self, node_id: &NodeId) -> Option<&Dependency> {
    let BundleGraphNode::Dependency(dependency) = self.get_node(node_id)? else {
      return None;
    };
    Some(dependency)
  }

  pub fn asset(&self, node_id: &NodeId) -> Option<&Asset> {
    let BundleGraphNode::Asset(asset) = self.get_node(node_id)? else {
      return None;
    };
    Some(asset)
  }

  pub fn bundles(&self) -> impl Iterator<Item = (NodeId, &Bundle)> {
    self.nodes().filter_map(|(node_id, node)| match node {
      BundleGraphNode::Bundle(bundle) => Some((node_id, bundle)),
      _ => None,
    })
  }

  pub fn bundle_groups(&self) -> impl Iterator<Item = (NodeId, &BundleGroup)> {
    self.nodes().filter_map(|(node_id, node)| match node {
      BundleGraphNode::BundleGroup(group) => Some((node_id, group)),
      _ => None,
    })
  }

  pub fn asset_nodes(&self) -> impl Iterator<Item = (NodeId, &Asset)> {
    self.nodes().filter_map(|(node_id, node)| match node {
      BundleGraphNode::Asset(asset) => Some((node_id, asset.as_ref())),
      _ => None,
    })
  }

  pub fn dependency_nodes(&self) -> impl Iterator<Item = (NodeId, &Arc<Dependency>)> {
    self.nodes().filter_map(|(node_id, node)| match node {
      BundleGraphNode::Dependency(dependency) => Some((node_id, dependency)),
      _ => None,
    })
  }

  // ----------------------------
  // Bundle membership
  // ----------------------------

  pub fn add_asset_to_bundle(&mut self, bundle_node: &NodeId, asset_node: &NodeId) {
    self.add_edge(bundle_node, asset_node, BundleGraphEdgeType::Contains);
  }

  pub fn remove_asset_from_bundle(&mut self, bundle_node: &NodeId, asset_node: &NodeId) -> bool {
    self.remove_edge(bundle_node, asset_node, BundleGraphEdgeType::Contains)
  }

  pub fn bundle_contains_asset(&self, bundle_node: &NodeId, asset_node: &NodeId) -> bool {
    self.has_edge(bundle_node, asset_node, BundleGraphEdgeType::Contains)
  }

  pub fn assets_in_bundle(&self, bundle_node: &NodeId) -> Vec<NodeId> {
    self
      .get_outgoing_neighbors_of_type(bundle_node, BundleGraphEdgeType::Contains)
      .into_iter()
      .filter(|node_id| matches!(self.get_node(node_id), Some(BundleGraphNode::Asset(_))))
      .collect()
  }

  pub fn bundles_containing_asset(&self, asset_node: &NodeId) -> Vec<NodeId> {
    self
      .get_incoming_neighbors_of_type(asset_node, BundleGraphEdgeType::Contains)
      .into_iter()
      .filter(|node_id| matches!(self.get_node(node_id), Some(BundleGraphNode::Bundle(_))))
      .collect()
  }

  pub fn bundles_containing_dependency(&self, dep_node: &NodeId) -> Vec<NodeId> {
    self
      .get_incoming_neighbors_of_type(dep_node, BundleGraphEdgeType::Contains)
      .into_iter()
      .filter(|node_id| matches!(self.get_node(node_id), Some(BundleGraphNode::Bundle(_))))
      .collect()
  }

  // ----------------------------
  // Bundle groups
  // ----------------------------

  pub fn add_bundle_to_bundle_group(&mut self, group_node: &NodeId, bundle_node: &NodeId) {
    self.add_edge(group_node, bundle_node, BundleGraphEdgeType::Bundle);
    self.add_edge(group_node, bundle_node, BundleGraphEdgeType::Null);
  }

  pub fn bundles_in_bundle_group(&self, group_node: &NodeId) -> Vec<NodeId> {
    self
      .get_outgoing_neighbors_of_type(group_node, BundleGraphEdgeType::Bundle)
      .into_iter()
      .filter(|node_id| matches!(self.get_node(node_id), Some(BundleGraphNode::Bundle(_))))
      .collect()
  }

  pub fn bundle_groups_containing_bundle(&self, bundle_node: &NodeId) -> Vec<NodeId> {
    self
      .get_incoming_neighbors_of_type(bundle_node, BundleGraphEdgeType::Bundle)
      .into_iter()
      .filter(|node_id| {
        matches!(
          self.get_node(node_id),
          Some(BundleGraphNode::BundleGroup(_))
        )
      })
      .collect()
  }

  /// Deletes a bundle group node and all of its edges.
  pub fn remove_bundle_group(&mut self, group_node: &NodeId) {
    let Some(BundleGraphNode::BundleGroup(group)) = self.get_node(group_node) else {
      return;
    };
    let content_key = bundle_group_id(group);

    if let Some(node_index) = self.node_id_to_node_index.remove(group_node) {
      self.graph.remove_node(node_index);
    }
    self.content_key_to_node_id.remove(&content_key);
  }

  // ----------------------------
  // Bundle references
  // ----------------------------

  /// Records that `from_bundle` loads `to_bundle` alongside itself.
  ///
  /// The referenced bundle also joins every bundle group the referencing
  /// bundle belongs to, since it is now fetched whenever that group loads.
  pub fn create_bundle_reference(&mut self, from_bundle: &NodeId, to_bundle: &NodeId) {
    self.add_edge(from_bundle, to_bundle, BundleGraphEdgeType::References);

    for group_node in self.bundle_groups_containing_bundle(from_bundle) {
      self.add_bundle_to_bundle_group(&group_node, to_bundle);
    }
  }

  /// All bundles reachable from `bundle_node` through reference edges.
  pub fn referenced_bundles(&self, bundle_node: &NodeId) -> Vec<NodeId> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::from([*bundle_node]);
    let mut result = Vec::new();

    while let Some(node_id) = queue.pop_front() {
      for referenced in
        self.get_outgoing_neighbors_of_type(&node_id, BundleGraphEdgeType::References)
      {
        if visited.insert(referenced) {
          result.push(referenced);
          queue.push_back(referenced);
        }
      }
    }

    result
  }

  /// Whether an asset ships with a bundle: contained directly, or contained
  /// in a bundle reachable through reference edges.
  pub fn is_asset_reachable_from_bundle(&self, bundle_node: &NodeId, asset_node: &NodeId) -> bool {
    if self.bundle_contains_asset(bundle_node, asset_node) {
      return true;
    }
    self
      .referenced_bundles(bundle_node)
      .iter()
      .any(|referenced| self.bundle_contains_asset(referenced, asset_node))
  }

  // ----------------------------
  // Async internalization
  // ----------------------------

  /// Resolves a dependency node to its target asset node via the structural
  /// edges copied from the asset graph.
  pub fn resolve_dependency_asset(&self, dep_node: &NodeId) -> Option<NodeId> {
    self
      .get_outgoing_neighbors_of_type(dep_node, BundleGraphEdgeType::Null)
      .into_iter()
      .find(|node_id| matches!(self.get_node(node_id), Some(BundleGraphNode::Asset(_))))
  }

  /// Marks an async dependency as internal to `bundle_node`: at runtime the
  /// import resolves from already-loaded code instead of a separate fetch.
  pub fn internalize_async_dependency(&mut self, bundle_node: &NodeId, dep_node: &NodeId) {
    self.add_edge(bundle_node, dep_node, BundleGraphEdgeType::InternalAsync);
  }

  pub fn is_dependency_internalized(&self, dep_node: &NodeId) -> bool {
    !self
      .get_incoming_neighbors_of_type(dep_node, BundleGraphEdgeType::InternalAsync)
      .is_empty()
  }

  /// Bundle groups triggered by this dependency.
  pub fn bundle_groups_triggered_by_dependency(&self, dep_node: &NodeId) -> Vec<NodeId> {
    self
      .get_outgoing_neighbors_of_type(dep_node, BundleGraphEdgeType::Null)
      .into_iter()
      .filter(|node_id| {
        matches!(
          self.get_node(node_id),
          Some(BundleGraphNode::BundleGroup(_))
        )
      })
      .collect()
  }

  /// Dependencies with a live edge into this bundle group.
  pub fn dependencies_triggering_bundle_group(&self, group_node: &NodeId) -> Vec<NodeId> {
    self
      .get_incoming_neighbors_of_type(group_node, BundleGraphEdgeType::Null)
      .into_iter()
      .filter(|node_id| {
        matches!(
          self.get_node(node_id),
          Some(BundleGraphNode::Dependency(_))
        )
      })
      .collect()
  }
}

/// Stable content key for a bundle group node.
pub fn bundle_group_id(group: &BundleGroup) -> String {
  format!(
    "bundle_group:{}:{}:{}",
    group.target.name,
    group.entry_dep_id,
    group.facet.as_deref().unwrap_or_default()
  )
}

const BASE62_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn base62_encode(bytes: &[u8]) -> String {
  if bytes.is_empty() {
    return String::new();
  }

  let mut num = bytes.iter().fold(0u128, |acc, &b| acc * 256 + b as u128);
  if num == 0 {
    return "0".to_string();
  }

  let mut result = Vec::new();
  while num > 0 {
    let remainder = (num % 62) as usize;
    result.push(BASE62_ALPHABET[remainder]);
    num /= 62;
  }

  result.reverse();
  String::from_utf8(result).unwrap_or_default()
}

pub fn generate_public_id<F>(id: &str, already_exists: F) -> String
where
  F: Fn(&str) -> bool,
{
  let mut bytes = Vec::with_capacity(id.len() / 2);
  let mut i = 0;
  while i + 1 < id.len() {
    if let Ok(b) = u8::from_str_radix(&id[i..i + 2], 16) {
      bytes.push(b);
    }
    i += 2;
  }

  let encoded = base62_encode(&bytes);

  for end in 5..=encoded.len() {
    let candidate = &encoded[..end];
    if !already_exists(candidate) {
      return candidate.to_string();
    }
  }

  panic!("Original id was not unique: {}", id);
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;
  use std::sync::Arc;

  use pretty_assertions::assert_eq;

  use crate::types::{Environment, FileType};

  use super::*;

  fn bundle(id: &str) -> Bundle {
    Bundle {
      id: id.to_string(),
      bundle_type: FileType::Js,
      target: Target::default(),
      ..Bundle::default()
    }
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

  fn group(entry_dep_id: &str) -> BundleGroup {
    BundleGroup {
      target: Target::default(),
      entry_dep_id: entry_dep_id.to_string(),
      facet: None,
    }
  }

  #[test]
  fn add_edge_is_idempotent_per_edge_type() {
    let mut graph = BundleGraph::new();
    let a = graph.add_bundle(bundle("deadbeefdeadbeef"));
    let asset_node = graph.add_asset(asset("a.js"));

    graph.add_asset_to_bundle(&a, &asset_node);
    graph.add_asset_to_bundle(&a, &asset_node);

    assert_eq!(graph.assets_in_bundle(&a).len(), 1);
  }

  #[test]
  fn remove_edge_reports_whether_an_edge_was_present() {
    let mut graph = BundleGraph::new();
    let a = graph.add_bundle(bundle("deadbeefdeadbeef"));
    let asset_node = graph.add_asset(asset("a.js"));

    graph.add_asset_to_bundle(&a, &asset_node);

    assert!(graph.remove_asset_from_bundle(&a, &asset_node));
    assert!(!graph.remove_asset_from_bundle(&a, &asset_node));
  }

  #[test]
  fn create_bundle_reference_joins_the_source_bundle_groups() {
    let mut graph = BundleGraph::new();
    let source = graph.add_bundle(bundle("deadbeefdeadbeef"));
    let shared = graph.add_bundle(bundle("cafebabecafebabe"));

    let bundle_group = group("dep-1");
    let group_node = graph.add_bundle_group(bundle_group_id(&bundle_group), bundle_group);
    graph.add_bundle_to_bundle_group(&group_node, &source);

    graph.create_bundle_reference(&source, &shared);

    assert_eq!(
      graph.bundles_in_bundle_group(&group_node),
      vec![source, shared]
    );
    assert!(graph.has_edge(&source, &shared, BundleGraphEdgeType::References));
  }

  #[test]
  fn asset_reachability_follows_reference_edges_transitively() {
    let mut graph = BundleGraph::new();
    let a = graph.add_bundle(bundle("deadbeefdeadbeef"));
    let b = graph.add_bundle(bundle("cafebabecafebabe"));
    let c = graph.add_bundle(bundle("0123456789abcdef"));
    let asset_node = graph.add_asset(asset("shared.js"));
    let stray_asset = graph.add_asset(asset("stray.js"));

    graph.add_asset_to_bundle(&c, &asset_node);
    graph.add_edge(&a, &b, BundleGraphEdgeType::References);
    graph.add_edge(&b, &c, BundleGraphEdgeType::References);

    assert!(graph.is_asset_reachable_from_bundle(&a, &asset_node));
    assert!(!graph.is_asset_reachable_from_bundle(&a, &stray_asset));
  }

  #[test]
  fn removed_bundle_groups_disappear_from_node_iteration() {
    let mut graph = BundleGraph::new();
    let bundle_group = group("dep-1");
    let group_node = graph.add_bundle_group(bundle_group_id(&bundle_group), bundle_group);

    assert_eq!(graph.bundle_groups().count(), 1);

    graph.remove_bundle_group(&group_node);

    assert_eq!(graph.bundle_groups().count(), 0);
    assert_eq!(graph.get_node(&group_node), None);
  }

  #[test]
  fn from_asset_graph_copies_nodes_and_assigns_public_ids() {
    let mut asset_graph = AssetGraph::new();
    let dep_node = asset_graph.add_entry_dependency(crate::types::Dependency::entry(
      "entry.js".to_string(),
      Target::default(),
    ));
    let asset_node = asset_graph.add_asset(asset("entry.js"));
    asset_graph.add_edge(&dep_node, &asset_node);

    let bundle_graph = BundleGraph::from_asset_graph(&asset_graph);

    assert_eq!(bundle_graph.asset_nodes().count(), 1);
    assert_eq!(bundle_graph.dependency_nodes().count(), 1);
    assert_eq!(bundle_graph.public_id_by_asset_id.len(), 1);
  }
}
