//! Reference model for the query-processing pipeline.
//!
//! Static catalog of node kinds, the correct edge sequence, the adjacency
//! rules derived from it, and the fixed layout used when the solution is
//! revealed. Everything here is immutable process-wide data.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the fixed semantic roles a node on the canvas can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	/// The person asking questions and supplying documents.
	User,
	/// Front end that receives questions.
	QueryInterface,
	/// Source documents.
	KnowledgeBase,
	/// Splits and cleans documents.
	DocumentProcessor,
	/// Turns text into vectors.
	EmbeddingModel,
	/// Indexes embeddings for similarity search.
	VectorStore,
	/// Finds passages relevant to a question.
	Retriever,
	/// Assembles the prompt from question and context.
	AiEngine,
	/// Generates the answer.
	LlmModel,
	/// Answer returned to the user.
	Response,
}

impl NodeKind {
	/// Every kind, in palette order.
	pub const ALL: [NodeKind; 10] = [
		NodeKind::User,
		NodeKind::QueryInterface,
		NodeKind::KnowledgeBase,
		NodeKind::DocumentProcessor,
		NodeKind::EmbeddingModel,
		NodeKind::VectorStore,
		NodeKind::Retriever,
		NodeKind::AiEngine,
		NodeKind::LlmModel,
		NodeKind::Response,
	];

	/// Catalog entry for this kind.
	pub fn info(self) -> &'static NodeKindInfo {
		&CATALOG[self as usize]
	}

	/// Display name.
	pub fn label(self) -> &'static str {
		self.info().label
	}

	/// One-sentence role description.
	pub fn description(self) -> &'static str {
		self.info().description
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Display metadata for a node kind, used to populate the add-node palette
/// and the hover info panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NodeKindInfo {
	/// Kind described.
	pub kind: NodeKind,
	/// Display name.
	pub label: &'static str,
	/// One-sentence role description.
	pub description: &'static str,
}

/// Indexed by `NodeKind as usize`.
static CATALOG: [NodeKindInfo; 10] = [
	NodeKindInfo {
		kind: NodeKind::User,
		label: "User",
		description: "Asks questions and supplies the documents the system should know about.",
	},
	NodeKindInfo {
		kind: NodeKind::QueryInterface,
		label: "Query Interface",
		description: "Receives the user's question and forwards it to retrieval and generation.",
	},
	NodeKindInfo {
		kind: NodeKind::KnowledgeBase,
		label: "Knowledge Base",
		description: "Raw collection of documents, manuals and notes to answer from.",
	},
	NodeKindInfo {
		kind: NodeKind::DocumentProcessor,
		label: "Document Processor",
		description: "Cleans documents and splits them into retrievable chunks.",
	},
	NodeKindInfo {
		kind: NodeKind::EmbeddingModel,
		label: "Embedding Model",
		description: "Turns text chunks into vectors that capture their meaning.",
	},
	NodeKindInfo {
		kind: NodeKind::VectorStore,
		label: "Vector Store",
		description: "Indexes embeddings so similar chunks can be found quickly.",
	},
	NodeKindInfo {
		kind: NodeKind::Retriever,
		label: "Retriever",
		description: "Searches the vector store for the chunks most relevant to a query.",
	},
	NodeKindInfo {
		kind: NodeKind::AiEngine,
		label: "AI Engine",
		description: "Combines the query with retrieved context into a grounded prompt.",
	},
	NodeKindInfo {
		kind: NodeKind::LlmModel,
		label: "LLM Model",
		description: "Large language model that generates text from the prompt.",
	},
	NodeKindInfo {
		kind: NodeKind::Response,
		label: "Response",
		description: "Final answer delivered back to the user.",
	},
];

/// A directed `(source, target)` pair in the correct pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceEdge {
	/// Kind at the tail.
	pub source: NodeKind,
	/// Kind at the head.
	pub target: NodeKind,
}

impl ReferenceEdge {
	/// Edge from `source` to `target`.
	pub const fn new(source: NodeKind, target: NodeKind) -> Self {
		Self { source, target }
	}
}

impl fmt::Display for ReferenceEdge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} → {}", self.source, self.target)
	}
}

static REFERENCE_EDGES: [ReferenceEdge; 11] = [
	ReferenceEdge::new(NodeKind::User, NodeKind::KnowledgeBase),
	ReferenceEdge::new(NodeKind::KnowledgeBase, NodeKind::DocumentProcessor),
	ReferenceEdge::new(NodeKind::DocumentProcessor, NodeKind::EmbeddingModel),
	ReferenceEdge::new(NodeKind::EmbeddingModel, NodeKind::VectorStore),
	ReferenceEdge::new(NodeKind::User, NodeKind::QueryInterface),
	ReferenceEdge::new(NodeKind::QueryInterface, NodeKind::Retriever),
	ReferenceEdge::new(NodeKind::Retriever, NodeKind::VectorStore),
	ReferenceEdge::new(NodeKind::VectorStore, NodeKind::AiEngine),
	ReferenceEdge::new(NodeKind::QueryInterface, NodeKind::AiEngine),
	ReferenceEdge::new(NodeKind::AiEngine, NodeKind::LlmModel),
	ReferenceEdge::new(NodeKind::LlmModel, NodeKind::Response),
];

/// A point in graph (world) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance_to(self, other: Position) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}
}

/// Read-only view over the static pipeline tables.
///
/// There is exactly one instance, [`ReferenceModel::standard`]; the struct
/// exists so evaluation takes the model as an explicit input.
#[derive(Debug)]
pub struct ReferenceModel {
	catalog: &'static [NodeKindInfo],
	edges: &'static [ReferenceEdge],
}

static STANDARD: ReferenceModel = ReferenceModel {
	catalog: &CATALOG,
	edges: &REFERENCE_EDGES,
};

impl ReferenceModel {
	/// The process-wide model.
	pub fn standard() -> &'static ReferenceModel {
		&STANDARD
	}

	/// Node kinds with label and description, in palette order.
	pub fn catalog(&self) -> &'static [NodeKindInfo] {
		self.catalog
	}

	/// The correct edges, in the order they are checked and revealed.
	pub fn edges(&self) -> &'static [ReferenceEdge] {
		self.edges
	}

	/// Number of reference edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Kinds that `kind` points to in the reference pipeline.
	///
	/// Advisory only: user edges are never rejected for breaking this rule.
	pub fn allowed_targets(&self, kind: NodeKind) -> BTreeSet<NodeKind> {
		self.edges
			.iter()
			.filter(|edge| edge.source == kind)
			.map(|edge| edge.target)
			.collect()
	}

	/// Catalog entry for `kind`.
	pub fn describe(&self, kind: NodeKind) -> &'static NodeKindInfo {
		kind.info()
	}

	/// Fixed layout slot for `kind` when the solution is revealed.
	pub fn solution_position(&self, kind: NodeKind) -> Position {
		match kind {
			NodeKind::User => Position::new(80.0, 260.0),
			NodeKind::KnowledgeBase => Position::new(260.0, 100.0),
			NodeKind::DocumentProcessor => Position::new(440.0, 100.0),
			NodeKind::EmbeddingModel => Position::new(620.0, 100.0),
			NodeKind::VectorStore => Position::new(800.0, 200.0),
			NodeKind::QueryInterface => Position::new(260.0, 420.0),
			NodeKind::Retriever => Position::new(540.0, 300.0),
			NodeKind::AiEngine => Position::new(800.0, 420.0),
			NodeKind::LlmModel => Position::new(980.0, 420.0),
			NodeKind::Response => Position::new(1160.0, 420.0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn catalog_is_indexed_by_kind() {
		for (i, kind) in NodeKind::ALL.iter().enumerate() {
			assert_eq!(CATALOG[i].kind, *kind);
			assert_eq!(kind.info().kind, *kind);
		}
	}

	#[test]
	fn catalog_labels_are_unique() {
		let labels: BTreeSet<_> = CATALOG.iter().map(|info| info.label).collect();
		assert_eq!(labels.len(), NodeKind::ALL.len());
	}

	#[test]
	fn every_kind_appears_in_reference_edges() {
		let model = ReferenceModel::standard();
		for kind in NodeKind::ALL {
			assert!(
				model
					.edges()
					.iter()
					.any(|edge| edge.source == kind || edge.target == kind),
				"{kind} is never referenced"
			);
		}
	}

	#[test]
	fn reference_graph_has_fixed_shape() {
		let model = ReferenceModel::standard();
		assert_eq!(model.catalog().len(), 10);
		assert_eq!(model.edge_count(), 11);
		assert_eq!(
			model.edges()[0],
			ReferenceEdge::new(NodeKind::User, NodeKind::KnowledgeBase)
		);
	}

	#[test]
	fn allowed_targets_follow_reference_edges() {
		let model = ReferenceModel::standard();
		let targets = model.allowed_targets(NodeKind::QueryInterface);
		assert_eq!(
			targets,
			BTreeSet::from([NodeKind::Retriever, NodeKind::AiEngine])
		);
		assert!(model.allowed_targets(NodeKind::Response).is_empty());
	}

	#[test]
	fn solution_positions_are_distinct() {
		let model = ReferenceModel::standard();
		for (i, a) in NodeKind::ALL.iter().enumerate() {
			for b in &NodeKind::ALL[i + 1..] {
				let (pa, pb) = (model.solution_position(*a), model.solution_position(*b));
				assert!(pa.distance_to(pb) > 50.0, "{a} and {b} overlap");
			}
		}
	}

	#[test]
	fn edge_display_uses_labels() {
		let edge = ReferenceEdge::new(NodeKind::AiEngine, NodeKind::LlmModel);
		assert_eq!(edge.to_string(), "AI Engine → LLM Model");
	}
}
