//! Deterministic reveal of the reference solution.
//!
//! Starting a reveal rebuilds the graph's nodes immediately and queues one
//! deferred step per reference edge, spaced by a fixed stride, followed by a
//! settle step. Every step carries the epoch of the reveal that produced it;
//! cancelling bumps the epoch, so steps from an abandoned reveal are refused
//! even if a caller still holds them.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use serde::Serialize;

use super::config::PipelineConfig;
use super::graph::{GraphState, NodeId};
use super::reference::{NodeKind, ReferenceModel};

/// Generation counter identifying one reveal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RevealEpoch(u64);

impl RevealEpoch {
	fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

/// Where the sequencer is in the reveal lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RevealPhase {
	/// No reveal in flight.
	#[default]
	Idle,
	/// Emptying the graph.
	Clearing,
	/// Placing one node per kind.
	BuildingNodes,
	/// Edges are appearing one stride apart.
	RevealingEdges {
		/// Index of the next reference edge to appear.
		next: usize,
	},
	/// Every edge is in and the settle step ran.
	Settled,
}

/// What a scheduled step does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealAction {
	/// Create the edge for reference edge `index`.
	Connect {
		/// Position in the reference sequence.
		index: usize,
		/// Tail node.
		source: NodeId,
		/// Head node.
		target: NodeId,
	},
	/// All edges are in; the view may fit itself to the graph.
	Settle,
}

/// A deferred reveal mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledStep {
	/// Reveal that queued the step.
	pub epoch: RevealEpoch,
	/// Session clock reading at which the step fires.
	pub due: Duration,
	/// What to do.
	pub action: RevealAction,
}

/// Plans and tracks solution reveals.
#[derive(Debug)]
pub struct SolutionSequencer {
	epoch: RevealEpoch,
	phase: RevealPhase,
	pending: VecDeque<ScheduledStep>,
	stride: Duration,
	settle_delay: Duration,
	total: usize,
}

impl SolutionSequencer {
	/// Sequencer with the given pacing.
	pub fn new(stride: Duration, settle_delay: Duration) -> Self {
		Self {
			epoch: RevealEpoch::default(),
			phase: RevealPhase::Idle,
			pending: VecDeque::new(),
			stride,
			settle_delay,
			total: 0,
		}
	}

	/// Sequencer paced by `config`.
	pub fn from_config(config: &PipelineConfig) -> Self {
		Self::new(config.reveal_stride(), config.settle_delay())
	}

	/// Epoch of the current reveal.
	pub fn epoch(&self) -> RevealEpoch {
		self.epoch
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> RevealPhase {
		self.phase
	}

	/// Number of edges in the current (or last) reveal.
	pub fn total_edges(&self) -> usize {
		self.total
	}

	/// Steps queued and not yet handed out.
	pub fn pending(&self) -> usize {
		self.pending.len()
	}

	/// Whether `epoch` belongs to the current reveal.
	pub fn is_current(&self, epoch: RevealEpoch) -> bool {
		self.epoch == epoch
	}

	/// Abandon any in-flight reveal and return to idle.
	///
	/// Returns the number of queued steps that were dropped.
	pub fn cancel(&mut self) -> usize {
		let dropped = self.pending.len();
		self.pending.clear();
		self.epoch = self.epoch.next();
		self.transition(RevealPhase::Idle);
		dropped
	}

	/// Rebuild `graph` with one node per kind and queue the edge reveal.
	///
	/// Returns the created nodes' ids in creation order.
	pub fn start(
		&mut self,
		graph: &mut GraphState,
		model: &ReferenceModel,
		now: Duration,
	) -> Vec<NodeId> {
		self.cancel();

		self.transition(RevealPhase::Clearing);
		graph.clear();

		self.transition(RevealPhase::BuildingNodes);
		let mut placed: Vec<(NodeKind, NodeId)> = Vec::with_capacity(model.catalog().len());
		let mut due = now;
		for (index, edge) in model.edges().iter().enumerate() {
			let source = place_once(graph, model, &mut placed, edge.source);
			let target = place_once(graph, model, &mut placed, edge.target);
			due = now + self.stride * index as u32;
			self.pending.push_back(ScheduledStep {
				epoch: self.epoch,
				due,
				action: RevealAction::Connect {
					index,
					source,
					target,
				},
			});
		}
		self.pending.push_back(ScheduledStep {
			epoch: self.epoch,
			due: due + self.settle_delay,
			action: RevealAction::Settle,
		});
		self.total = model.edge_count();

		self.transition(RevealPhase::RevealingEdges { next: 0 });
		placed.into_iter().map(|(_, id)| id).collect()
	}

	/// Hand out every queued step due at or before `now`, in order.
	pub fn take_due(&mut self, now: Duration) -> Vec<ScheduledStep> {
		let mut due = Vec::new();
		while let Some(step) = self.pending.front() {
			if step.due > now {
				break;
			}
			due.extend(self.pending.pop_front());
		}
		due
	}

	/// Hand out every queued step regardless of due time.
	///
	/// For hosts that run their own timers and deliver steps back later.
	pub fn take_all(&mut self) -> Vec<ScheduledStep> {
		self.pending.drain(..).collect()
	}

	/// Record that `step` was applied.
	///
	/// Refuses steps from stale epochs, and any step that is not the next one
	/// in reference order: edges are accepted once each, in sequence, and
	/// settle only after the last edge.
	pub fn complete(&mut self, step: &ScheduledStep) -> bool {
		if !self.is_current(step.epoch) {
			return false;
		}
		let RevealPhase::RevealingEdges { next } = self.phase else {
			return false;
		};
		match step.action {
			RevealAction::Connect { index, .. } if index == next && index < self.total => {
				self.transition(RevealPhase::RevealingEdges { next: index + 1 })
			}
			RevealAction::Settle if next == self.total => self.transition(RevealPhase::Settled),
			_ => {
				debug!(
					"pipeline: refusing out-of-order reveal step {:?}, expected edge {next}",
					step.action
				);
				return false;
			}
		}
		true
	}

	fn transition(&mut self, to: RevealPhase) {
		if self.phase != to {
			debug!("pipeline: reveal {:?} -> {:?}", self.phase, to);
			self.phase = to;
		}
	}
}

fn place_once(
	graph: &mut GraphState,
	model: &ReferenceModel,
	placed: &mut Vec<(NodeKind, NodeId)>,
	kind: NodeKind,
) -> NodeId {
	if let Some(&(_, id)) = placed.iter().find(|(k, _)| *k == kind) {
		return id;
	}
	let id = graph.add_node(kind, model.solution_position(kind));
	placed.push((kind, id));
	id
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::reference::Position;

	fn ms(n: u64) -> Duration {
		Duration::from_millis(n)
	}

	fn sequencer() -> SolutionSequencer {
		SolutionSequencer::new(ms(100), ms(100))
	}

	#[test]
	fn start_builds_one_node_per_kind_at_fixed_positions() {
		let model = ReferenceModel::standard();
		let mut graph = GraphState::new();
		graph.add_node(NodeKind::Response, Position::default());

		let created = sequencer().start(&mut graph, model, Duration::ZERO);
		assert_eq!(created.len(), NodeKind::ALL.len());
		assert_eq!(graph.node_count(), NodeKind::ALL.len());
		for kind in NodeKind::ALL {
			let ids = graph.find_nodes_by_kind(kind);
			assert_eq!(ids.len(), 1, "{kind}");
			let node = graph.node(ids[0]).unwrap();
			assert_eq!(node.position, model.solution_position(kind));
		}
		assert_eq!(graph.edge_count(), 0);
	}

	#[test]
	fn steps_follow_reference_order_with_increasing_due_times() {
		let model = ReferenceModel::standard();
		let mut graph = GraphState::new();
		let mut seq = sequencer();
		seq.start(&mut graph, model, ms(1_000));

		let steps = seq.take_all();
		assert_eq!(steps.len(), model.edge_count() + 1);
		for (i, pair) in steps.windows(2).enumerate() {
			assert!(pair[0].due < pair[1].due, "step {i} not before step {}", i + 1);
		}
		for (i, step) in steps[..model.edge_count()].iter().enumerate() {
			let RevealAction::Connect {
				index,
				source,
				target,
			} = step.action
			else {
				panic!("expected connect at {i}");
			};
			assert_eq!(index, i);
			assert_eq!(step.due, ms(1_000 + 100 * i as u64));
			let edge = model.edges()[i];
			assert_eq!(graph.node(source).unwrap().kind, edge.source);
			assert_eq!(graph.node(target).unwrap().kind, edge.target);
		}
		let settle = steps.last().unwrap();
		assert_eq!(settle.action, RevealAction::Settle);
		assert_eq!(settle.due, ms(1_000 + 100 * 10 + 100));
	}

	#[test]
	fn take_due_hands_out_only_elapsed_steps() {
		let mut graph = GraphState::new();
		let mut seq = sequencer();
		seq.start(&mut graph, ReferenceModel::standard(), Duration::ZERO);

		assert_eq!(seq.take_due(Duration::ZERO).len(), 1);
		assert_eq!(seq.take_due(ms(250)).len(), 2);
		assert_eq!(seq.take_due(ms(250)).len(), 0);
		assert_eq!(seq.pending(), 9);
	}

	#[test]
	fn phases_advance_as_steps_complete() {
		let mut graph = GraphState::new();
		let mut seq = sequencer();
		assert_eq!(seq.phase(), RevealPhase::Idle);

		seq.start(&mut graph, ReferenceModel::standard(), Duration::ZERO);
		assert_eq!(seq.phase(), RevealPhase::RevealingEdges { next: 0 });

		for step in seq.take_all() {
			assert!(seq.complete(&step));
		}
		assert_eq!(seq.phase(), RevealPhase::Settled);
	}

	#[test]
	fn steps_complete_once_each_in_reference_order() {
		let mut graph = GraphState::new();
		let mut seq = sequencer();
		seq.start(&mut graph, ReferenceModel::standard(), Duration::ZERO);
		let steps = seq.take_all();
		let settle = steps[steps.len() - 1];

		assert!(!seq.complete(&settle), "settle before any edge");
		assert!(!seq.complete(&steps[1]), "second edge before the first");
		assert!(seq.complete(&steps[0]));
		assert!(!seq.complete(&steps[0]), "first edge twice");
		assert_eq!(seq.phase(), RevealPhase::RevealingEdges { next: 1 });

		for step in &steps[1..] {
			assert!(seq.complete(step));
		}
		assert_eq!(seq.phase(), RevealPhase::Settled);
		assert!(!seq.complete(&settle));
		assert!(!seq.complete(&steps[3]));
		assert_eq!(seq.phase(), RevealPhase::Settled);
	}

	#[test]
	fn cancel_invalidates_outstanding_steps() {
		let mut graph = GraphState::new();
		let mut seq = sequencer();
		seq.start(&mut graph, ReferenceModel::standard(), Duration::ZERO);
		let held = seq.take_due(ms(300));
		let old_epoch = seq.epoch();

		assert_eq!(seq.cancel(), 8);
		assert_ne!(seq.epoch(), old_epoch);
		assert_eq!(seq.phase(), RevealPhase::Idle);
		assert!(seq.take_due(ms(10_000)).is_empty());
		for step in &held {
			assert!(!seq.complete(step));
		}
	}

	#[test]
	fn restarting_uses_a_fresh_epoch() {
		let mut graph = GraphState::new();
		let mut seq = sequencer();
		seq.start(&mut graph, ReferenceModel::standard(), Duration::ZERO);
		let first = seq.epoch();
		seq.start(&mut graph, ReferenceModel::standard(), Duration::ZERO);

		assert_ne!(seq.epoch(), first);
		assert_eq!(seq.pending(), 12);
		assert_eq!(graph.node_count(), NodeKind::ALL.len());
	}
}
