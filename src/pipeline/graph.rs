//! User-editable directed graph.
//!
//! Nodes and edges live in insertion-ordered vectors. Removing a node leaves
//! its edges in storage; such dangling edges are invisible to every lookup
//! instead of being cascade-deleted.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::reference::{NodeKind, Position};

/// Identifier of a node, unique for the lifetime of a [`GraphState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "n{}", self.0)
	}
}

/// Identifier of an edge, unique for the lifetime of a [`GraphState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u64);

impl fmt::Display for EdgeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "e{}", self.0)
	}
}

/// A labeled node placed on the canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
	/// Stable identifier.
	pub id: NodeId,
	/// Semantic role.
	pub kind: NodeKind,
	/// Canvas position in graph units.
	pub position: Position,
}

/// A directed connection between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
	/// Stable identifier.
	pub id: EdgeId,
	/// Tail of the edge.
	pub source: NodeId,
	/// Head of the edge.
	pub target: NodeId,
	/// Session clock reading when the edge was created.
	pub created_at: Duration,
}

/// The graph the user is building.
///
/// Holds plain data only; change notification is the session's job.
#[derive(Clone, Debug, Default)]
pub struct GraphState {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	// Counters survive `clear` so ids are never reused.
	next_node: u64,
	next_edge: u64,
}

impl GraphState {
	/// Empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a node and return its fresh id.
	pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
		let id = NodeId(self.next_node);
		self.next_node += 1;
		self.nodes.push(GraphNode { id, kind, position });
		id
	}

	/// Connect `source` to `target` with a zero timestamp.
	pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError> {
		self.add_edge_at(source, target, Duration::ZERO)
	}

	/// Connect `source` to `target`, stamping the edge with `created_at`.
	///
	/// Duplicates, self-loops and cycles are accepted. The graph is left
	/// untouched when either endpoint is missing.
	pub fn add_edge_at(
		&mut self,
		source: NodeId,
		target: NodeId,
		created_at: Duration,
	) -> Result<EdgeId, GraphError> {
		for endpoint in [source, target] {
			if !self.contains_node(endpoint) {
				return Err(GraphError::InvalidReference(endpoint));
			}
		}

		let id = EdgeId(self.next_edge);
		self.next_edge += 1;
		self.edges.push(GraphEdge {
			id,
			source,
			target,
			created_at,
		});
		Ok(id)
	}

	/// Remove a node. Edges touching it are kept but become dangling.
	pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode> {
		let idx = self.nodes.iter().position(|node| node.id == id)?;
		Some(self.nodes.remove(idx))
	}

	/// Remove an edge, dangling or not.
	pub fn remove_edge(&mut self, id: EdgeId) -> Option<GraphEdge> {
		let idx = self.edges.iter().position(|edge| edge.id == id)?;
		Some(self.edges.remove(idx))
	}

	/// Reposition a node. Returns `false` if the node does not exist.
	pub fn move_node(&mut self, id: NodeId, position: Position) -> bool {
		match self.nodes.iter_mut().find(|node| node.id == id) {
			Some(node) => {
				node.position = position;
				true
			}
			None => false,
		}
	}

	/// Remove everything. Ids keep counting up.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
	}

	/// Whether `id` names a live node.
	pub fn contains_node(&self, id: NodeId) -> bool {
		self.nodes.iter().any(|node| node.id == id)
	}

	/// Live node by id.
	pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
		self.nodes.iter().find(|node| node.id == id)
	}

	/// Look up a live edge.
	pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
		self.edges().find(|edge| edge.id == id)
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Edges whose endpoints both still exist, in insertion order.
	pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
		self.edges.iter().filter(|edge| self.is_live(edge))
	}

	/// Number of live nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of live edges.
	pub fn edge_count(&self) -> usize {
		self.edges().count()
	}

	/// Number of stored edges with at least one removed endpoint.
	pub fn dangling_edge_count(&self) -> usize {
		self.edges.len() - self.edge_count()
	}

	/// True when nothing at all is stored, dangling edges included.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Ids of all nodes of `kind`, in insertion order.
	pub fn find_nodes_by_kind(&self, kind: NodeKind) -> Vec<NodeId> {
		self.nodes
			.iter()
			.filter(|node| node.kind == kind)
			.map(|node| node.id)
			.collect()
	}

	/// The earliest-inserted node of `kind`.
	pub fn first_node_of_kind(&self, kind: NodeKind) -> Option<NodeId> {
		self.nodes
			.iter()
			.find(|node| node.kind == kind)
			.map(|node| node.id)
	}

	/// Whether a live edge runs exactly from `source` to `target`.
	pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
		self.edges()
			.any(|edge| edge.source == source && edge.target == target)
	}

	fn is_live(&self, edge: &GraphEdge) -> bool {
		self.contains_node(edge.source) && self.contains_node(edge.target)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn origin() -> Position {
		Position::default()
	}

	#[test]
	fn node_ids_are_unique_and_never_reused() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, origin());
		let b = graph.add_node(NodeKind::User, origin());
		assert_ne!(a, b);

		graph.clear();
		let c = graph.add_node(NodeKind::User, origin());
		assert_ne!(c, a);
		assert_ne!(c, b);
	}

	#[test]
	fn add_edge_rejects_missing_endpoint() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, origin());
		let b = graph.add_node(NodeKind::Retriever, origin());
		graph.remove_node(b);

		assert_eq!(graph.add_edge(a, b), Err(GraphError::InvalidReference(b)));
		assert_eq!(graph.add_edge(b, a), Err(GraphError::InvalidReference(b)));
		assert!(graph.edges().next().is_none());
		assert_eq!(graph.dangling_edge_count(), 0);
	}

	#[test]
	fn duplicate_edges_are_accepted() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, origin());
		let b = graph.add_node(NodeKind::KnowledgeBase, origin());

		let first = graph.add_edge(a, b).unwrap();
		let second = graph.add_edge(a, b).unwrap();
		assert_ne!(first, second);
		assert_eq!(graph.edge_count(), 2);
	}

	#[test]
	fn has_edge_is_directional() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, origin());
		let b = graph.add_node(NodeKind::KnowledgeBase, origin());
		graph.add_edge(a, b).unwrap();

		assert!(graph.has_edge(a, b));
		assert!(!graph.has_edge(b, a));
	}

	#[test]
	fn removing_a_node_leaves_dangling_edges_hidden() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, origin());
		let b = graph.add_node(NodeKind::KnowledgeBase, origin());
		let edge = graph.add_edge(a, b).unwrap();

		assert!(graph.remove_node(b).is_some());
		assert!(!graph.has_edge(a, b));
		assert_eq!(graph.edge_count(), 0);
		assert_eq!(graph.dangling_edge_count(), 1);
		assert!(graph.edge(edge).is_none());

		// Dangling edges can still be removed explicitly.
		assert!(graph.remove_edge(edge).is_some());
		assert_eq!(graph.dangling_edge_count(), 0);
	}

	#[test]
	fn find_nodes_by_kind_keeps_insertion_order() {
		let mut graph = GraphState::new();
		let first = graph.add_node(NodeKind::Retriever, origin());
		graph.add_node(NodeKind::User, origin());
		let second = graph.add_node(NodeKind::Retriever, origin());

		assert_eq!(graph.find_nodes_by_kind(NodeKind::Retriever), vec![first, second]);
		assert_eq!(graph.first_node_of_kind(NodeKind::Retriever), Some(first));
		assert_eq!(graph.first_node_of_kind(NodeKind::Response), None);
	}

	#[test]
	fn move_node_updates_position() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, origin());
		assert!(graph.move_node(a, Position::new(3.0, 4.0)));
		assert_eq!(graph.node(a).map(|n| n.position), Some(Position::new(3.0, 4.0)));

		graph.remove_node(a);
		assert!(!graph.move_node(a, origin()));
	}

	#[test]
	fn clear_empties_everything() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, origin());
		let b = graph.add_node(NodeKind::KnowledgeBase, origin());
		graph.add_edge(a, b).unwrap();
		graph.remove_node(a);

		graph.clear();
		assert!(graph.is_empty());
		assert_eq!(graph.node_count(), 0);
		assert_eq!(graph.dangling_edge_count(), 0);
	}
}
