//! pipeline-builder: interactive query-pipeline construction exercise.
//!
//! The user assembles a directed graph of pipeline components on a canvas and
//! the [`pipeline`] engine scores it against a fixed reference pipeline. A
//! "show solution" action rebuilds the reference graph with an animated,
//! cancellable edge reveal.
//!
//! [`pipeline`] is plain Rust with no browser dependencies; [`components`] is
//! the WASM client that drives it.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

/// Leptos components.
pub mod components;
/// Browser-free pipeline engine.
pub mod pipeline;

pub use components::pipeline_canvas::{PipelineCanvas, SessionHandle};
pub use pipeline::{PipelineConfig, PipelineEvent, PipelineSession};

use components::pipeline_canvas::{FeedbackPanel, HoverInfo, Palette, RevealStatus, Toolbar};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("pipeline-builder: logging initialized");
}

/// Load session config from a script element with id="pipeline-config".
/// Expected format: JSON object, every field optional.
fn load_config() -> Option<PipelineConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("pipeline-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match PipelineConfig::from_json(&json_text) {
		Ok(config) => {
			info!(
				"pipeline-builder: loaded config, reveal stride {} ms",
				config.reveal_stride_ms
			);
			Some(config)
		}
		Err(e) => {
			warn!("pipeline-builder: ignoring pipeline config: {}", e);
			None
		}
	}
}

/// Main application component.
/// Creates the session, mirrors its events into signals and lays out the
/// palette, canvas and feedback panels.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config().unwrap_or_default();
	let session: SessionHandle = Rc::new(RefCell::new(PipelineSession::new(config)));

	let (result, set_result) = signal(None);
	let (hovered, set_hovered) = signal(None);
	let (progress, set_progress) = signal(None);

	session.borrow_mut().subscribe(move |event| match event {
		PipelineEvent::EvaluationCompleted(evaluation) => set_result.set(Some(evaluation.clone())),
		PipelineEvent::NodeHoverInfo { kind, .. } => set_hovered.set(Some(*kind)),
		PipelineEvent::NodeHoverClear => set_hovered.set(None),
		PipelineEvent::SolutionRevealProgress { edge_index, total } => {
			set_progress.set(Some((edge_index + 1, *total)))
		}
		PipelineEvent::GraphCleared => {
			set_result.set(None);
			set_progress.set(None);
		}
		_ => {}
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Build a Query Pipeline" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="pipeline-builder">
			<aside class="sidebar">
				<Palette session=session.clone() />
				<Toolbar session=session.clone() />
				<RevealStatus progress=progress />
				<FeedbackPanel result=result />
				<HoverInfo kind=hovered />
			</aside>
			<main class="stage">
				<PipelineCanvas session=session fullscreen=true />
				<div class="graph-overlay">
					<h1>"Build a Query Pipeline"</h1>
					<p class="subtitle">
						"Add components, click two nodes to connect them, right-click to remove."
					</p>
				</div>
			</main>
		</div>
	}
}
