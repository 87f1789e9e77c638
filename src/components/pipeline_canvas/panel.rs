//! Side panels around the canvas: node palette, actions, and feedback.

use leptos::prelude::*;

use super::component::SessionHandle;
use crate::pipeline::{EvaluationResult, NodeKind, ReferenceModel};

/// Buttons that add one node of each kind.
#[component]
pub fn Palette(session: SessionHandle) -> impl IntoView {
	let items = ReferenceModel::standard()
		.catalog()
		.iter()
		.map(|info| {
			let session = session.clone();
			let kind = info.kind;
			view! {
				<button
					class="palette-item"
					title=info.description
					on:click=move |_| {
						session.borrow_mut().add_node(kind);
					}
				>
					{info.label}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="palette">
			<h2>"Components"</h2>
			{items}
		</div>
	}
}

/// Evaluate, reveal and reset actions.
#[component]
pub fn Toolbar(session: SessionHandle) -> impl IntoView {
	let (evaluate, reveal, reset) = (session.clone(), session.clone(), session);
	view! {
		<div class="toolbar">
			<button class="primary" on:click=move |_| {
				evaluate.borrow_mut().evaluate();
			}>"Check my pipeline"</button>
			<button on:click=move |_| reveal.borrow_mut().reveal_solution()>"Show solution"</button>
			<button on:click=move |_| reset.borrow_mut().reset()>"Reset"</button>
		</div>
	}
}

/// Score, tier message and the reference connections still missing.
#[component]
pub fn FeedbackPanel(#[prop(into)] result: Signal<Option<EvaluationResult>>) -> impl IntoView {
	view! {
		<div class="feedback">
			{move || {
				result
					.get()
					.map(|result| {
						let missing: Vec<String> = result.missing().map(|edge| edge.to_string()).collect();
						let tier = result.feedback_tier;
						view! {
							<p class="score">
								{format!(
									"{}/{} connections, {:.1}%",
									result.matched_count,
									result.total_expected,
									result.accuracy_percent,
								)}
							</p>
							<p class=format!("tier tier-{}", tier.label().to_lowercase().replace(' ', "-"))>
								{tier.message()}
							</p>
							<ul class="missing">
								{missing.into_iter().map(|edge| view! { <li>{edge}</li> }).collect_view()}
							</ul>
						}
					})
			}}
		</div>
	}
}

/// Description of the hovered node's kind.
#[component]
pub fn HoverInfo(#[prop(into)] kind: Signal<Option<NodeKind>>) -> impl IntoView {
	view! {
		<div class="hover-info">
			{move || {
				kind.get()
					.map(|kind| {
						view! {
							<h3>{kind.label()}</h3>
							<p>{kind.description()}</p>
						}
					})
			}}
		</div>
	}
}

/// "Revealing 4/11" while the solution animates in.
#[component]
pub fn RevealStatus(#[prop(into)] progress: Signal<Option<(usize, usize)>>) -> impl IntoView {
	view! {
		<div class="reveal-status">
			{move || {
				progress
					.get()
					.map(|(done, total)| {
						if done == total {
							"Solution revealed".to_string()
						} else {
							format!("Revealing {done}/{total}")
						}
					})
			}}
		</div>
	}
}
