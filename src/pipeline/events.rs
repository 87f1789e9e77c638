//! Outbound notifications for the presentation layer.

use serde::Serialize;

use super::graph::{EdgeId, GraphEdge, GraphNode, NodeId};
use super::reference::{NodeKind, Position};
use super::validator::EvaluationResult;

/// Something the presentation layer may want to react to.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
	/// A node joined the graph.
	NodeAdded(GraphNode),
	/// An edge joined the graph.
	EdgeAdded(GraphEdge),
	/// A node left the graph; its edges stop counting.
	NodeRemoved {
		/// Removed node.
		id: NodeId,
	},
	/// An edge left the graph.
	EdgeRemoved {
		/// Removed edge.
		id: EdgeId,
	},
	/// A node was dragged to `position`.
	NodeMoved {
		/// Moved node.
		id: NodeId,
		/// New position in graph units.
		position: Position,
	},
	/// Every node and edge was removed.
	GraphCleared,
	/// Result of an explicit evaluation.
	EvaluationCompleted(EvaluationResult),
	/// Reference edge `edge_index` (zero-based) of `total` has been revealed.
	SolutionRevealProgress {
		/// Index into the reference sequence.
		edge_index: usize,
		/// Edges in the whole reveal.
		total: usize,
	},
	/// The reveal finished; fit the view to the graph.
	SolutionRevealComplete,
	/// Play the success effect.
	Celebrate,
	/// Play the retry effect.
	Discourage,
	/// Pointer entered a node.
	NodeHoverInfo {
		/// Kind of the hovered node.
		kind: NodeKind,
		/// Display name of the kind.
		label: &'static str,
		/// What the kind does in the pipeline.
		description: &'static str,
	},
	/// Pointer left every node.
	NodeHoverClear,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PipelineEvent)>;

/// Ordered list of event listeners.
#[derive(Default)]
pub struct EventBus {
	listeners: Vec<(SubscriptionId, Listener)>,
	next_id: u64,
}

impl EventBus {
	/// Empty bus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a listener. Listeners run in subscription order.
	pub fn subscribe(&mut self, listener: impl FnMut(&PipelineEvent) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.listeners.push((id, Box::new(listener)));
		id
	}

	/// Returns `false` if `id` was not subscribed.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(sub, _)| *sub != id);
		self.listeners.len() != before
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Deliver `event` to every listener, in order.
	pub fn emit(&mut self, event: &PipelineEvent) {
		for (_, listener) in &mut self.listeners {
			listener(event);
		}
	}
}

impl std::fmt::Debug for EventBus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventBus")
			.field("listeners", &self.listeners.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn listeners_run_in_order_until_unsubscribed() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let mut bus = EventBus::new();

		let log_a = seen.clone();
		let a = bus.subscribe(move |_| log_a.borrow_mut().push("a"));
		let log_b = seen.clone();
		bus.subscribe(move |_| log_b.borrow_mut().push("b"));

		bus.emit(&PipelineEvent::GraphCleared);
		assert!(bus.unsubscribe(a));
		assert!(!bus.unsubscribe(a));
		bus.emit(&PipelineEvent::GraphCleared);

		assert_eq!(*seen.borrow(), vec!["a", "b", "b"]);
		assert_eq!(bus.listener_count(), 1);
	}

	#[test]
	fn events_serialize_with_type_tag() {
		let json = serde_json::to_value(PipelineEvent::SolutionRevealProgress {
			edge_index: 2,
			total: 11,
		})
		.unwrap();
		assert_eq!(json["type"], "solution_reveal_progress");
		assert_eq!(json["edge_index"], 2);
	}
}
