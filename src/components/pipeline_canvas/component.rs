//! Leptos component wrapping the pipeline canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, connecting, removal, panning, and zooming. An
//! animation loop runs via `requestAnimationFrame`, advancing the session clock
//! and redrawing each frame.
//!
//! Interaction:
//! - click a node, then another, to connect them
//! - drag a node to move it, drag the background to pan, scroll to zoom
//! - right-click a node or edge to remove it

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::theme::Theme;
use super::view::{CLICK_SLOP, CanvasCue, CanvasView, DragState, PanState};
use crate::pipeline::{EdgeId, NodeId, PipelineSession, Position};

/// Shared handle to the session driven by the canvas and the side panels.
pub type SessionHandle = Rc<RefCell<PipelineSession>>;

/// Fixed animation step fed to the session clock each frame.
const FRAME: Duration = Duration::from_millis(16);

/// World-space margin kept around the graph when fitting the view.
const FIT_PADDING: f64 = 60.0;

/// Bundles view state with visual configuration.
struct CanvasContext {
	view: CanvasView,
	theme: Theme,
}

enum Removal {
	Node(NodeId),
	Edge(EdgeId),
}

/// Renders the session's graph on a canvas element and forwards user input
/// to the session as commands.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with the
/// window. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn PipelineCanvas(
	session: SessionHandle,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<CanvasContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	// Listeners run while the session is mutably borrowed, so they only queue
	// cues; the frame loop applies them.
	let cues: Rc<RefCell<Vec<CanvasCue>>> = Rc::new(RefCell::new(Vec::new()));
	let cue_sink = cues.clone();
	session.borrow_mut().subscribe(move |event| {
		if let Some(cue) = CanvasCue::from_event(event) {
			cue_sink.borrow_mut().push(cue);
		}
	});

	let (context_init, animate_init, resize_cb_init, session_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		session.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("pipeline-builder: canvas 2d context unavailable");
			return;
		};

		*context_init.borrow_mut() = Some(CanvasContext {
			view: CanvasView::new(w, h),
			theme: Theme::default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.view.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, session_anim, cues_anim) = (
			context_init.clone(),
			animate_init.clone(),
			session_init.clone(),
			cues.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			session_anim.borrow_mut().tick(FRAME);
			let pending: Vec<CanvasCue> = cues_anim.borrow_mut().drain(..).collect();

			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let session = session_anim.borrow();
				for cue in pending {
					c.view.apply_cue(cue, session.graph(), FIT_PADDING);
				}
				c.view.tick(FRAME.as_secs_f64(), c.theme.flash.duration);
				render::render(
					session.graph(),
					&c.view,
					&ctx,
					&c.theme,
					session.hovered(),
					session.now(),
				);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (context_md, session_md) = (context.clone(), session.clone());
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let session = session_md.borrow();
		if let Some(ref mut c) = *context_md.borrow_mut() {
			let hit = c
				.view
				.node_at_position(session.graph(), x, y, c.theme.node.radius);
			match hit.and_then(|id| session.graph().node(id)) {
				Some(node) => {
					c.view.drag = DragState {
						active: true,
						node: Some(node.id),
						start_x: x,
						start_y: y,
						node_start: node.position,
						moved: false,
					};
				}
				None => {
					c.view.pan = PanState {
						active: true,
						start_x: x,
						start_y: y,
						transform_start_x: c.view.transform.x,
						transform_start_y: c.view.transform.y,
						moved: false,
					};
				}
			}
		}
	};

	let (context_mm, session_mm) = (context.clone(), session.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};

		let mut drag_to = None;
		let mut hover = None;
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.view.cursor = Some((x, y));

			if c.view.drag.active {
				let (dx, dy) = (x - c.view.drag.start_x, y - c.view.drag.start_y);
				if dx.hypot(dy) > CLICK_SLOP {
					c.view.drag.moved = true;
				}
				if let (true, Some(id)) = (c.view.drag.moved, c.view.drag.node) {
					let k = c.view.transform.k;
					let start = c.view.drag.node_start;
					drag_to = Some((id, Position::new(start.x + dx / k, start.y + dy / k)));
				}
			} else if c.view.pan.active {
				let (dx, dy) = (x - c.view.pan.start_x, y - c.view.pan.start_y);
				if dx.hypot(dy) > CLICK_SLOP {
					c.view.pan.moved = true;
				}
				c.view.transform.x = c.view.pan.transform_start_x + dx;
				c.view.transform.y = c.view.pan.transform_start_y + dy;
			} else {
				let session = session_mm.borrow();
				hover = Some(c.view.node_at_position(
					session.graph(),
					x,
					y,
					c.theme.node.radius,
				));
			}
		}

		let mut session = session_mm.borrow_mut();
		if let Some((id, position)) = drag_to {
			session.move_node(id, position);
		}
		if let Some(node) = hover {
			session.hover(node);
		}
	};

	let (context_mu, session_mu) = (context.clone(), session.clone());
	let on_mouseup = move |_: MouseEvent| {
		let mut connect = None;
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			let clicked_node = (c.view.drag.active && !c.view.drag.moved)
				.then_some(c.view.drag.node)
				.flatten();
			let clicked_background = c.view.pan.active && !c.view.pan.moved;
			c.view.drag = DragState::default();
			c.view.pan = PanState::default();

			if clicked_background {
				c.view.selected = None;
			}
			if let Some(id) = clicked_node {
				match c.view.selected.take() {
					None => c.view.selected = Some(id),
					Some(source) if source == id => {}
					Some(source) => connect = Some((source, id)),
				}
			}
		}
		if let Some((source, target)) = connect {
			// Refusals are logged by the session.
			let _ = session_mu.borrow_mut().connect(source, target);
		}
	};

	let (context_cm, session_cm) = (context.clone(), session.clone());
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let removal = {
			let session = session_cm.borrow();
			let graph = session.graph();
			context_cm.borrow().as_ref().and_then(|c| {
				c.view
					.node_at_position(graph, x, y, c.theme.node.radius)
					.map(Removal::Node)
					.or_else(|| c.view.edge_at_position(graph, x, y).map(Removal::Edge))
			})
		};
		let mut session = session_cm.borrow_mut();
		match removal {
			Some(Removal::Node(id)) => {
				session.remove_node(id);
			}
			Some(Removal::Edge(id)) => {
				session.remove_edge(id);
			}
			None => {}
		}
	};

	let (context_ml, session_ml) = (context.clone(), session.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.view.drag = DragState::default();
			c.view.pan = PanState::default();
			c.view.cursor = None;
		}
		session_ml.borrow_mut().hover(None);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.view.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="pipeline-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:contextmenu=on_contextmenu
			on:wheel=on_wheel
			style="display: block; cursor: crosshair;"
		/>
	}
}

/// Pointer position relative to the canvas' top-left corner.
fn canvas_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |value: Result<JsValue, JsValue>, fallback: f64| {
		value.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(
		dim(window.inner_width(), 800.0),
		dim(window.inner_height(), 600.0),
	)
}
