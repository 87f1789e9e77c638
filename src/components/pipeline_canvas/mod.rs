//! Interactive canvas for building a query-processing pipeline.
//!
//! Renders a [`PipelineSession`](crate::pipeline::PipelineSession)'s graph on
//! an HTML canvas and turns mouse input into session commands:
//! - Click one node, then another, to connect them
//! - Drag nodes to reposition, drag the background to pan, scroll to zoom
//! - Right-click a node or edge to remove it
//!
//! The side panels ([`Palette`], [`Toolbar`], [`FeedbackPanel`], [`HoverInfo`],
//! [`RevealStatus`]) share the same session handle.
//!
//! # Example
//!
//! ```ignore
//! let session: SessionHandle = Rc::new(RefCell::new(PipelineSession::default()));
//!
//! view! {
//!     <Palette session=session.clone() />
//!     <PipelineCanvas session=session fullscreen=true />
//! }
//! ```

mod component;
mod panel;
mod render;
/// Colors and sizes used by the canvas.
pub mod theme;
mod view;

pub use component::{PipelineCanvas, SessionHandle};
pub use panel::{FeedbackPanel, HoverInfo, Palette, RevealStatus, Toolbar};
pub use theme::Theme;
