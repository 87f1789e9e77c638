//! Error types for the pipeline core.

use thiserror::Error;

use super::graph::NodeId;

/// Failures from mutating the user graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
	/// An edge endpoint does not name a live node.
	#[error("node {0} does not exist")]
	InvalidReference(NodeId),
}

/// Failures from loading [`PipelineConfig`](super::config::PipelineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The text is not valid JSON for the config shape.
	#[error("malformed pipeline config: {0}")]
	Json(#[from] serde_json::Error),
	/// The values parse but cannot be used.
	#[error("invalid pipeline config: {0}")]
	Invalid(String),
}
