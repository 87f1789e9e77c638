//! Command facade over the pipeline core.
//!
//! A [`PipelineSession`] owns the user graph, the solution sequencer and the
//! event bus. Every inbound command mutates state in one place and announces
//! the change to subscribers. Time only moves through [`PipelineSession::tick`],
//! which fires reveal steps that have come due.

use std::time::Duration;

use log::{debug, info, warn};

use super::config::PipelineConfig;
use super::error::GraphError;
use super::events::{EventBus, PipelineEvent, SubscriptionId};
use super::graph::{EdgeId, GraphEdge, GraphNode, GraphState, NodeId};
use super::reference::{NodeKind, NodeKindInfo, Position, ReferenceModel};
use super::sequencer::{RevealAction, RevealEpoch, RevealPhase, ScheduledStep, SolutionSequencer};
use super::validator::{self, EvaluationResult, FeedbackEffect};

/// One interactive session of the pipeline builder.
#[derive(Debug)]
pub struct PipelineSession {
	model: &'static ReferenceModel,
	config: PipelineConfig,
	graph: GraphState,
	sequencer: SolutionSequencer,
	events: EventBus,
	clock: Duration,
	/// Palette additions since the last reset, drives scatter placement.
	placed: u64,
	hovered: Option<NodeId>,
}

impl Default for PipelineSession {
	fn default() -> Self {
		Self::new(PipelineConfig::default())
	}
}

impl PipelineSession {
	/// Fresh session with an empty graph.
	pub fn new(config: PipelineConfig) -> Self {
		Self {
			model: ReferenceModel::standard(),
			sequencer: SolutionSequencer::from_config(&config),
			config,
			graph: GraphState::new(),
			events: EventBus::new(),
			clock: Duration::ZERO,
			placed: 0,
			hovered: None,
		}
	}

	/// Settings in use.
	pub fn config(&self) -> &PipelineConfig {
		&self.config
	}

	/// Reference model scored against.
	pub fn model(&self) -> &'static ReferenceModel {
		self.model
	}

	/// Current user graph.
	pub fn graph(&self) -> &GraphState {
		&self.graph
	}

	/// Current session clock reading.
	pub fn now(&self) -> Duration {
		self.clock
	}

	/// Phase of the solution reveal.
	pub fn reveal_phase(&self) -> RevealPhase {
		self.sequencer.phase()
	}

	/// Epoch of the latest reveal.
	pub fn reveal_epoch(&self) -> RevealEpoch {
		self.sequencer.epoch()
	}

	/// Node under the pointer.
	pub fn hovered(&self) -> Option<NodeId> {
		self.hovered
	}

	/// Register an event listener.
	pub fn subscribe(&mut self, listener: impl FnMut(&PipelineEvent) + 'static) -> SubscriptionId {
		self.events.subscribe(listener)
	}

	/// Remove a listener. Returns `false` if it was not registered.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.events.unsubscribe(id)
	}

	/// Add a node of `kind` at the next scatter position.
	pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
		let position = self.config.placement.place(self.placed);
		self.placed += 1;
		self.add_node_at(kind, position)
	}

	/// Add a node of `kind` at `position`.
	pub fn add_node_at(&mut self, kind: NodeKind, position: Position) -> NodeId {
		let id = self.graph.add_node(kind, position);
		debug!("pipeline: added {kind} as {id}");
		self.announce_node(id);
		id
	}

	/// Connect two existing nodes. The graph is unchanged on error.
	pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError> {
		let id = self
			.graph
			.add_edge_at(source, target, self.clock)
			.inspect_err(|err| warn!("pipeline: connect {source} -> {target} refused: {err}"))?;
		debug!("pipeline: connected {source} -> {target} as {id}");
		self.announce_edge(id);
		Ok(id)
	}

	/// Remove a node. Its edges stay stored but stop counting anywhere.
	pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode> {
		let node = self.graph.remove_node(id)?;
		if self.hovered == Some(id) {
			self.hover(None);
		}
		debug!("pipeline: removed node {id}");
		self.events.emit(&PipelineEvent::NodeRemoved { id });
		Some(node)
	}

	/// Remove an edge.
	pub fn remove_edge(&mut self, id: EdgeId) -> Option<GraphEdge> {
		let edge = self.graph.remove_edge(id)?;
		debug!("pipeline: removed edge {id}");
		self.events.emit(&PipelineEvent::EdgeRemoved { id });
		Some(edge)
	}

	/// Move a node. Returns `false` if it does not exist.
	pub fn move_node(&mut self, id: NodeId, position: Position) -> bool {
		if !self.graph.move_node(id, position) {
			return false;
		}
		self.events
			.emit(&PipelineEvent::NodeMoved { id, position });
		true
	}

	/// Score the current graph and announce the result plus its effect.
	pub fn evaluate(&mut self) -> EvaluationResult {
		let result = validator::evaluate(&self.graph, self.model);
		info!(
			"pipeline: evaluated {}/{} ({}%, {:?})",
			result.matched_count, result.total_expected, result.accuracy_percent, result.feedback_tier
		);

		self.events
			.emit(&PipelineEvent::EvaluationCompleted(result.clone()));
		let effect = match result.effect() {
			FeedbackEffect::Celebrate => PipelineEvent::Celebrate,
			FeedbackEffect::Discourage => PipelineEvent::Discourage,
		};
		self.events.emit(&effect);
		result
	}

	/// Rebuild the graph as the reference solution and start the edge reveal.
	///
	/// Any reveal already in flight is abandoned first.
	pub fn reveal_solution(&mut self) {
		self.hover(None);
		let created = self
			.sequencer
			.start(&mut self.graph, self.model, self.clock);
		info!(
			"pipeline: revealing solution, {} nodes, {} edges queued",
			created.len(),
			self.sequencer.total_edges()
		);

		self.events.emit(&PipelineEvent::GraphCleared);
		for id in created {
			self.announce_node(id);
		}
	}

	/// Cancel any reveal and empty the graph.
	pub fn reset(&mut self) {
		let dropped = self.sequencer.cancel();
		self.hover(None);
		self.graph.clear();
		self.placed = 0;
		info!("pipeline: reset, {dropped} pending reveal steps dropped");
		self.events.emit(&PipelineEvent::GraphCleared);
	}

	/// Advance the session clock by `dt` and fire due reveal steps.
	///
	/// Returns how many steps were applied.
	pub fn tick(&mut self, dt: Duration) -> usize {
		self.clock += dt;
		let due = self.sequencer.take_due(self.clock);
		due.into_iter()
			.filter(|step| self.apply_step(*step))
			.count()
	}

	/// Take every queued reveal step, for hosts that schedule them with their
	/// own timers and hand them back through [`Self::apply_step`].
	pub fn drain_scheduled(&mut self) -> Vec<ScheduledStep> {
		self.sequencer.take_all()
	}

	/// Apply one reveal step. Steps from an abandoned reveal are ignored and
	/// `false` is returned.
	pub fn apply_step(&mut self, step: ScheduledStep) -> bool {
		if !self.sequencer.complete(&step) {
			debug!("pipeline: ignoring stale reveal step {:?}", step.action);
			return false;
		}

		match step.action {
			RevealAction::Connect {
				index,
				source,
				target,
			} => {
				match self.graph.add_edge_at(source, target, step.due) {
					Ok(id) => self.announce_edge(id),
					Err(err) => warn!("pipeline: skipping revealed edge {index}: {err}"),
				}
				self.events.emit(&PipelineEvent::SolutionRevealProgress {
					edge_index: index,
					total: self.sequencer.total_edges(),
				});
			}
			RevealAction::Settle => {
				info!("pipeline: solution reveal complete");
				self.events.emit(&PipelineEvent::SolutionRevealComplete);
			}
		}
		true
	}

	/// Label and description for `kind`.
	pub fn describe(&self, kind: NodeKind) -> &'static NodeKindInfo {
		self.model.describe(kind)
	}

	/// Update the hovered node, announcing info for it or clearing the panel.
	pub fn hover(&mut self, node: Option<NodeId>) {
		let node = node.filter(|id| self.graph.contains_node(*id));
		if self.hovered == node {
			return;
		}
		self.hovered = node;

		let event = match node.and_then(|id| self.graph.node(id)) {
			Some(node) => {
				let info = self.model.describe(node.kind);
				PipelineEvent::NodeHoverInfo {
					kind: info.kind,
					label: info.label,
					description: info.description,
				}
			}
			None => PipelineEvent::NodeHoverClear,
		};
		self.events.emit(&event);
	}

	fn announce_node(&mut self, id: NodeId) {
		if let Some(node) = self.graph.node(id).cloned() {
			self.events.emit(&PipelineEvent::NodeAdded(node));
		}
	}

	fn announce_edge(&mut self, id: EdgeId) {
		if let Some(edge) = self.graph.edge(id).cloned() {
			self.events.emit(&PipelineEvent::EdgeAdded(edge));
		}
	}
}
