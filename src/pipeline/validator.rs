//! Scoring a user graph against the reference pipeline.
//!
//! Each reference edge is checked independently: the first node of the source
//! kind must have an edge to the first node of the target kind. This is an
//! existence check per expected edge, not a graph isomorphism test, so extra
//! or duplicate user edges neither help nor hurt.

use serde::Serialize;

use super::graph::GraphState;
use super::reference::{ReferenceEdge, ReferenceModel};

/// Qualitative feedback band, derived from the accuracy percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
	/// 90% and above.
	Excellent,
	/// 70% up to 90%.
	Good,
	/// 50% up to 70%.
	Fair,
	/// Below 50%.
	NeedsWork,
}

impl FeedbackTier {
	/// Tier for a percentage in `[0, 100]`. Bands are checked high to low.
	pub fn from_percent(percent: f64) -> Self {
		if percent >= 90.0 {
			FeedbackTier::Excellent
		} else if percent >= 70.0 {
			FeedbackTier::Good
		} else if percent >= 50.0 {
			FeedbackTier::Fair
		} else {
			FeedbackTier::NeedsWork
		}
	}

	/// Short tier name.
	pub fn label(self) -> &'static str {
		match self {
			FeedbackTier::Excellent => "Excellent",
			FeedbackTier::Good => "Good",
			FeedbackTier::Fair => "Fair",
			FeedbackTier::NeedsWork => "Needs work",
		}
	}

	/// Message shown in the feedback panel.
	pub fn message(self) -> &'static str {
		match self {
			FeedbackTier::Excellent => {
				"Excellent! Your pipeline matches the reference architecture."
			}
			FeedbackTier::Good => "Good job! Most of the data flow is right, a few links are missing.",
			FeedbackTier::Fair => {
				"Fair attempt. Trace how a question travels from the user to the response."
			}
			FeedbackTier::NeedsWork => {
				"Needs work. Start from the user and follow the data through each stage."
			}
		}
	}
}

/// Effect the presentation layer should play after an evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackEffect {
	/// Score reached 70%.
	Celebrate,
	/// Score below 70%.
	Discourage,
}

/// Outcome for one reference edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeCheck {
	/// Reference edge checked.
	pub edge: ReferenceEdge,
	/// Whether the user graph has it.
	pub satisfied: bool,
}

/// Score of a graph snapshot. Recomputed on every evaluation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluationResult {
	/// Reference edges present in the graph.
	pub matched_count: usize,
	/// Size of the reference edge set.
	pub total_expected: usize,
	/// `matched / total * 100`, rounded to one decimal place.
	pub accuracy_percent: f64,
	/// Band for `accuracy_percent`.
	pub feedback_tier: FeedbackTier,
	/// One entry per reference edge, in reference order.
	pub checks: Vec<EdgeCheck>,
}

impl EvaluationResult {
	/// True at or above 70% of reference edges matched.
	pub fn celebrates(&self) -> bool {
		// matched / total >= 0.7, kept in integers.
		self.matched_count * 10 >= self.total_expected * 7
	}

	/// Celebrate or discourage.
	pub fn effect(&self) -> FeedbackEffect {
		if self.celebrates() {
			FeedbackEffect::Celebrate
		} else {
			FeedbackEffect::Discourage
		}
	}

	/// Every reference edge matched.
	pub fn is_perfect(&self) -> bool {
		self.matched_count == self.total_expected
	}

	/// Reference edges the graph does not satisfy yet.
	pub fn missing(&self) -> impl Iterator<Item = ReferenceEdge> {
		self.checks
			.iter()
			.filter(|check| !check.satisfied)
			.map(|check| check.edge)
	}
}

/// Score `graph` against `model`.
pub fn evaluate(graph: &GraphState, model: &ReferenceModel) -> EvaluationResult {
	let checks: Vec<EdgeCheck> = model
		.edges()
		.iter()
		.map(|&edge| EdgeCheck {
			edge,
			satisfied: is_satisfied(graph, edge),
		})
		.collect();

	let matched_count = checks.iter().filter(|check| check.satisfied).count();
	let total_expected = checks.len();
	let accuracy_percent = round_percent(matched_count, total_expected);

	EvaluationResult {
		matched_count,
		total_expected,
		accuracy_percent,
		feedback_tier: FeedbackTier::from_percent(accuracy_percent),
		checks,
	}
}

fn is_satisfied(graph: &GraphState, edge: ReferenceEdge) -> bool {
	match (
		graph.first_node_of_kind(edge.source),
		graph.first_node_of_kind(edge.target),
	) {
		(Some(source), Some(target)) => graph.has_edge(source, target),
		_ => false,
	}
}

fn round_percent(matched: usize, total: usize) -> f64 {
	if total == 0 {
		return 0.0;
	}
	(matched as f64 / total as f64 * 1000.0).round() / 10.0
}
