//! Canvas view state and interaction tracking.
//!
//! Holds everything the canvas needs that is not part of the pipeline graph:
//! the pan/zoom transform, in-progress drags, the connection source picked by
//! the user, and the feedback tint.

use crate::pipeline::{EdgeId, FeedbackEffect, GraphState, NodeId, PipelineEvent, Position};

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// A drag is in progress.
	pub active: bool,
	/// Node being dragged.
	pub node: Option<NodeId>,
	/// Screen x where the press started.
	pub start_x: f64,
	/// Screen y where the press started.
	pub start_y: f64,
	/// Node position when the press started.
	pub node_start: Position,
	/// Set once the pointer travels far enough to count as a drag, not a click.
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// A pan is in progress.
	pub active: bool,
	/// Screen x where the press started.
	pub start_x: f64,
	/// Screen y where the press started.
	pub start_y: f64,
	/// Transform x when the press started.
	pub transform_start_x: f64,
	/// Transform y when the press started.
	pub transform_start_y: f64,
	/// Set once the pointer leaves the click slop.
	pub moved: bool,
}

/// Canvas-side reaction to a pipeline event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanvasCue {
	/// Fit the view to the whole graph.
	Fit,
	/// Play the feedback tint.
	Flash(FeedbackEffect),
	/// Drop selection and drag state.
	Cleared,
	/// Forget a removed node.
	NodeGone(NodeId),
}

impl CanvasCue {
	/// Cue for `event`, if the canvas reacts to it.
	pub fn from_event(event: &PipelineEvent) -> Option<Self> {
		match event {
			PipelineEvent::SolutionRevealComplete => Some(CanvasCue::Fit),
			PipelineEvent::Celebrate => Some(CanvasCue::Flash(FeedbackEffect::Celebrate)),
			PipelineEvent::Discourage => Some(CanvasCue::Flash(FeedbackEffect::Discourage)),
			PipelineEvent::GraphCleared => Some(CanvasCue::Cleared),
			PipelineEvent::NodeRemoved { id } => Some(CanvasCue::NodeGone(*id)),
			_ => None,
		}
	}
}

/// Pointer travel in pixels below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;

/// View state for one canvas.
#[derive(Clone, Debug, Default)]
pub struct CanvasView {
	/// Pan and zoom.
	pub transform: ViewTransform,
	/// Node drag in progress.
	pub drag: DragState,
	/// Background pan in progress.
	pub pan: PanState,
	/// Node picked as the source of the next connection.
	pub selected: Option<NodeId>,
	/// Last pointer position in screen coordinates.
	pub cursor: Option<(f64, f64)>,
	/// Active feedback tint and its remaining intensity in `0.0..=1.0`.
	pub flash: Option<(FeedbackEffect, f64)>,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
}

impl CanvasView {
	/// View for a canvas of the given size.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Self::default()
		}
	}

	/// Convert a screen point to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under the screen point, if any.
	pub fn node_at_position(
		&self,
		graph: &GraphState,
		sx: f64,
		sy: f64,
		radius: f64,
	) -> Option<NodeId> {
		let point = self.screen_to_graph(sx, sy);
		graph
			.nodes()
			.iter()
			.rev()
			.find(|node| node.position.distance_to(point) <= radius)
			.map(|node| node.id)
	}

	/// Edge whose line passes within a few screen pixels of the point.
	pub fn edge_at_position(&self, graph: &GraphState, sx: f64, sy: f64) -> Option<EdgeId> {
		let point = self.screen_to_graph(sx, sy);
		let tolerance = 6.0 / self.transform.k;
		graph
			.edges()
			.filter_map(|edge| {
				let a = graph.node(edge.source)?.position;
				let b = graph.node(edge.target)?.position;
				let d = distance_to_segment(point, a, b);
				(d <= tolerance).then_some((edge.id, d))
			})
			.min_by(|x, y| x.1.total_cmp(&y.1))
			.map(|(id, _)| id)
	}

	/// Zoom around a screen point.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Center and scale the view so every node is visible.
	pub fn fit_to(&mut self, graph: &GraphState, padding: f64) {
		let mut nodes = graph.nodes().iter();
		let Some(first) = nodes.next() else {
			return;
		};
		let (mut min, mut max) = (first.position, first.position);
		for node in nodes {
			min.x = min.x.min(node.position.x);
			min.y = min.y.min(node.position.y);
			max.x = max.x.max(node.position.x);
			max.y = max.y.max(node.position.y);
		}

		let (bw, bh) = (max.x - min.x + 2.0 * padding, max.y - min.y + 2.0 * padding);
		let k = (self.width / bw).min(self.height / bh).clamp(0.1, 2.0);
		let (cx, cy) = ((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	/// React to a queued cue.
	pub fn apply_cue(&mut self, cue: CanvasCue, graph: &GraphState, padding: f64) {
		match cue {
			CanvasCue::Fit => self.fit_to(graph, padding),
			CanvasCue::Flash(effect) => self.flash = Some((effect, 1.0)),
			CanvasCue::Cleared => {
				self.selected = None;
				self.drag = DragState::default();
			}
			CanvasCue::NodeGone(id) => {
				if self.selected == Some(id) {
					self.selected = None;
				}
				if self.drag.node == Some(id) {
					self.drag = DragState::default();
				}
			}
		}
	}

	/// Fade the feedback tint; `fade_secs` is the full fade time.
	pub fn tick(&mut self, dt: f64, fade_secs: f64) {
		if let Some((effect, intensity)) = self.flash {
			let next = intensity - dt / fade_secs.max(f64::EPSILON);
			self.flash = (next > 0.0).then_some((effect, next));
		}
	}

	/// Track a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq < f64::EPSILON {
		return p.distance_to(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	p.distance_to(Position::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::NodeKind;

	#[test]
	fn hit_testing_respects_transform() {
		let mut graph = GraphState::new();
		let id = graph.add_node(NodeKind::User, Position::new(100.0, 100.0));
		let mut view = CanvasView::new(800.0, 600.0);
		view.transform = ViewTransform {
			x: 50.0,
			y: 0.0,
			k: 2.0,
		};

		assert_eq!(view.node_at_position(&graph, 250.0, 200.0, 10.0), Some(id));
		assert_eq!(view.node_at_position(&graph, 100.0, 100.0, 10.0), None);
	}

	#[test]
	fn later_nodes_win_hit_tests() {
		let mut graph = GraphState::new();
		graph.add_node(NodeKind::User, Position::new(0.0, 0.0));
		let top = graph.add_node(NodeKind::Response, Position::new(5.0, 0.0));
		let view = CanvasView::new(100.0, 100.0);
		assert_eq!(view.node_at_position(&graph, 2.0, 0.0, 10.0), Some(top));
	}

	#[test]
	fn edges_are_picked_near_their_line() {
		let mut graph = GraphState::new();
		let a = graph.add_node(NodeKind::User, Position::new(0.0, 0.0));
		let b = graph.add_node(NodeKind::KnowledgeBase, Position::new(100.0, 0.0));
		let edge = graph.add_edge(a, b).unwrap();
		let view = CanvasView::new(200.0, 200.0);

		assert_eq!(view.edge_at_position(&graph, 50.0, 3.0), Some(edge));
		assert_eq!(view.edge_at_position(&graph, 50.0, 30.0), None);
	}

	#[test]
	fn fit_centers_the_graph() {
		let mut graph = GraphState::new();
		graph.add_node(NodeKind::User, Position::new(0.0, 0.0));
		graph.add_node(NodeKind::Response, Position::new(200.0, 100.0));
		let mut view = CanvasView::new(400.0, 400.0);
		view.fit_to(&graph, 0.0);

		let center = view.screen_to_graph(200.0, 200.0);
		assert!((center.x - 100.0).abs() < 1e-9);
		assert!((center.y - 50.0).abs() < 1e-9);
		assert_eq!(view.transform.k, 2.0);
	}

	#[test]
	fn flash_fades_out() {
		let mut view = CanvasView::new(10.0, 10.0);
		view.apply_cue(
			CanvasCue::Flash(FeedbackEffect::Celebrate),
			&GraphState::new(),
			0.0,
		);
		view.tick(0.5, 1.0);
		assert!(matches!(view.flash, Some((FeedbackEffect::Celebrate, i)) if (i - 0.5).abs() < 1e-9));
		view.tick(0.6, 1.0);
		assert_eq!(view.flash, None);
	}

	#[test]
	fn removed_selection_is_dropped() {
		let mut graph = GraphState::new();
		let id = graph.add_node(NodeKind::User, Position::default());
		let mut view = CanvasView::new(10.0, 10.0);
		view.selected = Some(id);
		view.apply_cue(CanvasCue::NodeGone(id), &graph, 0.0);
		assert_eq!(view.selected, None);
	}
}
