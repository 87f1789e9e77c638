//! Canvas rendering for the pipeline graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, then the pending-connection preview (world space)
//! 3. Nodes with rings and labels (world space)
//! 4. Feedback tint (screen space)

use std::f64::consts::PI;
use std::time::Duration;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::theme::Theme;
use super::view::CanvasView;
use crate::pipeline::{GraphEdge, GraphNode, GraphState, NodeId};

/// Renders the complete graph to the canvas.
///
/// `now` is the session clock, used to fade freshly created edges.
pub fn render(
	graph: &GraphState,
	view: &CanvasView,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	hovered: Option<NodeId>,
	now: Duration,
) {
	draw_background(view, ctx, theme);

	ctx.save();
	let _ = ctx.translate(view.transform.x, view.transform.y);
	let _ = ctx.scale(view.transform.k, view.transform.k);

	for edge in graph.edges() {
		draw_edge(graph, edge, view, ctx, theme, now);
	}
	draw_pending_connection(graph, view, ctx, theme);
	for node in graph.nodes() {
		draw_node(node, view, ctx, theme, hovered);
	}

	ctx.restore();

	if let Some((effect, intensity)) = view.flash {
		let tint = theme.flash_color(effect);
		ctx.set_fill_style_str(&tint.with_alpha(tint.a * intensity).to_css());
		ctx.fill_rect(0.0, 0.0, view.width, view.height);
	}
}

fn draw_background(view: &CanvasView, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	match ctx.create_radial_gradient(
		view.width / 2.0,
		view.height / 2.0,
		0.0,
		view.width / 2.0,
		view.height / 2.0,
		view.width.max(view.height) * 0.8,
	) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&theme.background.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, view.width, view.height);
}

fn draw_edge(
	graph: &GraphState,
	edge: &GraphEdge,
	view: &CanvasView,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	now: Duration,
) {
	let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target)) else {
		return;
	};
	let (x1, y1) = (source.position.x, source.position.y);
	let (x2, y2) = (target.position.x, target.position.y);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	let radius = theme.node.radius;
	if dist < radius * 2.0 {
		return;
	}

	let age = now.saturating_sub(edge.created_at).as_secs_f64();
	let freshness = 1.0 - (age / theme.edge.fresh_fade.max(f64::EPSILON)).clamp(0.0, 1.0);
	let color = theme.edge.color.lerp(theme.edge.fresh_color, freshness);
	let arrow = theme.edge.arrow_size;

	let (ux, uy) = (dx / dist, dy / dist);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(theme.edge.line_width * (1.0 + freshness) / view.transform.k);
	ctx.begin_path();
	ctx.move_to(x1 + ux * radius, y1 + uy * radius);
	ctx.line_to(x2 - ux * (radius + arrow), y2 - uy * (radius + arrow));
	ctx.stroke();

	let (tip_x, tip_y) = (x2 - ux * radius, y2 - uy * radius);
	let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
	let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);

	ctx.set_fill_style_str(&color.to_css());
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

/// Dashed line from the selected source node to the pointer.
fn draw_pending_connection(
	graph: &GraphState,
	view: &CanvasView,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
) {
	let (Some(source), Some((sx, sy))) = (view.selected.and_then(|id| graph.node(id)), view.cursor)
	else {
		return;
	};
	let end = view.screen_to_graph(sx, sy);
	let k = view.transform.k;

	ctx.set_stroke_style_str(&theme.edge.pending_color.to_css());
	ctx.set_line_width(theme.edge.line_width / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	ctx.begin_path();
	ctx.move_to(source.position.x, source.position.y);
	ctx.line_to(end.x, end.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_node(
	node: &GraphNode,
	view: &CanvasView,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	hovered: Option<NodeId>,
) {
	let (x, y) = (node.position.x, node.position.y);
	let radius = theme.node.radius;
	let base = theme.kind_color(node.kind);
	let k = view.transform.k;

	match ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &base.to_css());
			let _ = gradient.add_color_stop(1.0, &base.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&base.to_css()),
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.fill();

	let ring = if view.selected == Some(node.id) {
		Some((theme.node.selected_ring, 2.5))
	} else if hovered == Some(node.id) {
		Some((theme.node.hover_ring, 1.5))
	} else {
		None
	};
	if let Some((color, width)) = ring {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width / k);
		ctx.stroke();
	}

	let label = node.kind.label();
	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	ctx.set_font(theme.node.label_font);
	let width = ctx
		.measure_text(label)
		.map(|metrics| metrics.width())
		.unwrap_or(0.0);
	let _ = ctx.fill_text(label, x - width / 2.0, y + radius + 14.0);
}
