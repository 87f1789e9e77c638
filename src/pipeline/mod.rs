//! Graph construction and validation engine.
//!
//! The presentation layer drives a [`PipelineSession`] with commands and
//! listens for [`PipelineEvent`]s:
//!
//! ```
//! use pipeline_builder::pipeline::{NodeKind, PipelineSession};
//!
//! let mut session = PipelineSession::default();
//! let user = session.add_node(NodeKind::User);
//! let kb = session.add_node(NodeKind::KnowledgeBase);
//! session.connect(user, kb).unwrap();
//!
//! let result = session.evaluate();
//! assert_eq!(result.matched_count, 1);
//! assert_eq!(result.accuracy_percent, 9.1);
//! ```

/// Session settings.
pub mod config;
/// Error types.
pub mod error;
/// Outbound events and the listener bus.
pub mod events;
/// The user-built graph.
pub mod graph;
/// Node kinds and the reference pipeline.
pub mod reference;
/// Animated solution reveal.
pub mod sequencer;
/// Command facade.
pub mod session;
/// Scoring against the reference.
pub mod validator;

pub use config::{PipelineConfig, PlacementArea};
pub use error::{ConfigError, GraphError};
pub use events::{EventBus, PipelineEvent, SubscriptionId};
pub use graph::{EdgeId, GraphEdge, GraphNode, GraphState, NodeId};
pub use reference::{NodeKind, NodeKindInfo, Position, ReferenceEdge, ReferenceModel};
pub use sequencer::{RevealAction, RevealEpoch, RevealPhase, ScheduledStep, SolutionSequencer};
pub use session::PipelineSession;
pub use validator::{EdgeCheck, EvaluationResult, FeedbackEffect, FeedbackTier, evaluate};
