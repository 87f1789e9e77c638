//! Leptos components for the pipeline builder client.

/// Canvas widget and side panels for the pipeline builder.
pub mod pipeline_canvas;
