use std::collections::HashMap;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::visit::IntoEdgeReferences;

use crate::types::Asset;
use crate::types::Dependency;

/// Resolution state of a dependency, maintained by the upstream graph
/// builder.
#[derive(Clone, Debug, PartialEq)]
pub enum DependencyState {
  New,
  /// The dependency was excluded from the build; bundling must not descend
  /// into its subtree.
  Excluded,
  Resolved,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum AssetGraphNode {
  Root,
  Asset(Arc<Asset>),
  Dependency(Arc<Dependency>),
}

pub type NodeId = usize;

/// Control value returned by [`AssetGraph::traverse`] visitors.
///
/// Contexts are passed down by value: `Continue` carries the context every
/// child of the visited node will receive.
pub enum VisitControl<C> {
  Continue(C),
  SkipChildren,
  Stop,
}

/// The fully materialized asset/dependency graph the bundling engine
/// consumes.
#[derive(Clone, Debug)]
pub struct AssetGraph {
  pub graph: StableDiGraph<NodeId, ()>,
  nodes: Vec<AssetGraphNode>,
  dependency_states: HashMap<NodeId, DependencyState>,
  content_key_to_node_id: HashMap<String, NodeId>,
  node_id_to_node_index: HashMap<NodeId, NodeIndex>,
  root_node_id: NodeId,
}

impl Default for AssetGraph {
  fn default() -> Self {
    Self::new()
  }
}

impl AssetGraph {
  pub fn new() -> Self {
    let mut graph = StableDiGraph::new();

    let mut node_id_to_node_index = HashMap::new();
    let nodes = vec![AssetGraphNode::Root];
    let root_node_id = 0;

    node_id_to_node_index.insert(root_node_id, graph.add_node(root_node_id));

    AssetGraph {
      graph,
      content_key_to_node_id: HashMap::new(),
      dependency_states: HashMap::new(),
      node_id_to_node_index,
      nodes,
      root_node_id,
    }
  }

  pub fn nodes(&self) -> impl Iterator<Item = &AssetGraphNode> {
    self.nodes.iter()
  }

  pub fn root_node(&self) -> NodeId {
    self.root_node_id
  }

  pub fn get_node(&self, idx: &NodeId) -> Option<&AssetGraphNode> {
    self.nodes.get(*idx)
  }

  pub fn get_node_id_by_content_key(&self, content_key: &str) -> Option<&NodeId> {
    self.content_key_to_node_id.get(content_key)
  }

  fn add_node(&mut self, content_key: String, node: AssetGraphNode) -> NodeId {
    let node_id = if let Some(existing_node_id) = self.content_key_to_node_id.get(&content_key) {
      self.nodes[*existing_node_id] = node;
      *existing_node_id
    } else {
      let node_id = self.nodes.len();
      self.nodes.push(node);
      self.content_key_to_node_id.insert(content_key, node_id);
      node_id
    };

    let node_index = self.graph.add_node(node_id);
    self.node_id_to_node_index.insert(node_id, node_index);

    node_id
  }

  pub fn add_asset(&mut self, asset: Arc<Asset>) -> NodeId {
    self.add_node(asset.id.clone(), AssetGraphNode::Asset(asset))
  }

  pub fn add_dependency(&mut self, dependency: Dependency) -> NodeId {
    let node_id = self.add_node(
      dependency.id(),
      AssetGraphNode::Dependency(Arc::new(dependency)),
    );

    self.dependency_states.insert(node_id, DependencyState::New);
    node_id
  }

  /// Adds an entry dependency and connects it to the graph root.
  pub fn add_entry_dependency(&mut self, dependency: Dependency) -> NodeId {
    let root_node_id = self.root_node_id;
    let dependency_idx = self.add_dependency(dependency);
    self.add_edge(&root_node_id, &dependency_idx);
    dependency_idx
  }

  pub fn get_asset(&self, idx: &NodeId) -> Option<&Asset> {
    let AssetGraphNode::Asset(asset) = self.get_node(idx)? else {
      return None;
    };
    Some(asset)
  }

  pub fn get_dependency(&self, idx: &NodeId) -> Option<&Dependency> {
    let AssetGraphNode::Dependency(dependency) = self.get_node(idx)? else {
      return None;
    };
    Some(dependency)
  }

  pub fn get_assets(&self) -> impl Iterator<Item = &Arc<Asset>> {
    self.nodes().filter_map(|node| match node {
      AssetGraphNode::Asset(asset) => Some(asset),
      _ => None,
    })
  }

  pub fn get_dependencies(&self) -> impl Iterator<Item = &Arc<Dependency>> {
    self.nodes().filter_map(|node| match node {
      AssetGraphNode::Dependency(dependency) => Some(dependency),
      _ => None,
    })
  }

  pub fn has_edge(&self, from_idx: &NodeId, to_idx: &NodeId) -> bool {
    self.graph.contains_edge(
      self.node_id_to_node_index[from_idx],
      self.node_id_to_node_index[to_idx],
    )
  }

  pub fn add_edge(&mut self, from_idx: &NodeId, to_idx: &NodeId) {
    self.graph.add_edge(
      self.node_id_to_node_index[from_idx],
      self.node_id_to_node_index[to_idx],
      (),
    );
  }

  pub fn get_outgoing_neighbors(&self, node_id: &NodeId) -> Vec<NodeId> {
    self
      .graph
      .neighbors_directed(self.node_id_to_node_index[node_id], Direction::Outgoing)
      .filter_map(|node_index| self.graph.node_weight(node_index).copied())
      .collect()
  }

  /// Resolves a dependency node to its target asset node, if resolution
  /// succeeded upstream.
  pub fn resolve_dependency_asset(&self, dep_node_id: &NodeId) -> Option<NodeId> {
    self
      .graph
      .edges_directed(self.node_id_to_node_index[dep_node_id], Direction::Outgoing)
      .filter_map(|edge| self.graph.node_weight(edge.target()).copied())
      .find(|node_id| matches!(self.get_node(node_id), Some(AssetGraphNode::Asset(_))))
  }

  pub fn set_dependency_state(&mut self, node_id: &NodeId, state: DependencyState) {
    self.dependency_states.insert(*node_id, state);
  }

  pub fn is_dependency_excluded(&self, node_id: &NodeId) -> bool {
    matches!(
      self.dependency_states.get(node_id),
      Some(DependencyState::Excluded)
    )
  }

  /// Walks the graph from `start` with an explicit stack, threading a context
  /// value from each node down to its children.
  ///
  /// The visitor decides per node whether to descend (`Continue` with the
  /// context the children should see), prune (`SkipChildren`) or abort the
  /// whole walk (`Stop`). The graph performs no cycle detection itself:
  /// visitors are expected to deduplicate on (node, context) keys, which is
  /// what makes revisiting a node under a different context possible.
  pub fn traverse<C, F>(&self, start: NodeId, root_context: C, mut visit: F)
  where
    C: Clone,
    F: FnMut(NodeId, &AssetGraphNode, &C) -> VisitControl<C>,
  {
    let mut stack: Vec<(NodeId, C)> = vec![(start, root_context)];

    while let Some((node_id, context)) = stack.pop() {
      let Some(node) = self.get_node(&node_id) else {
        continue;
      };

      match visit(node_id, node, &context) {
        VisitControl::Stop => return,
        VisitControl::SkipChildren => {}
        VisitControl::Continue(child_context) => {
          // `neighbors_directed` yields children in reverse insertion order,
          // so pushing them as-is makes the stack pop in insertion order.
          for child in self
            .graph
            .neighbors_directed(self.node_id_to_node_index[&node_id], Direction::Outgoing)
          {
            if let Some(child_id) = self.graph.node_weight(child).copied() {
              stack.push((child_id, child_context.clone()));
            }
          }
        }
      }
    }
  }

  pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
    self
      .graph
      .edge_references()
      .filter_map(|edge| {
        let from = *self.graph.node_weight(edge.source())?;
        let to = *self.graph.node_weight(edge.target())?;
        Some((from, to))
      })
      .collect()
  }
}
