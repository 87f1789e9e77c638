//! Visual theming for the pipeline canvas.
//!
//! Colors, node sizing and feedback tints.

use crate::pipeline::{FeedbackEffect, NodeKind};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color at opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Mix toward white; `1.0` is white. Opacity is kept.
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Mix toward black; `1.0` is black. Opacity is kept.
	pub fn darken(self, factor: f64) -> Self {
		self.lerp(Color::rgba(0, 0, 0, self.a), factor)
	}

	/// Blend every channel, opacity included, `t` of the way to `other`.
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a + (other.a - self.a) * t,
		}
	}

	/// CSS color string: `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		let Self { r, g, b, a } = self;
		if a >= 0.999 {
			format!("#{r:02x}{g:02x}{b:02x}")
		} else {
			format!("rgba({r}, {g}, {b}, {a})")
		}
	}
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Radius in world units; also the hit radius.
	pub radius: f64,
	/// Label text color.
	pub label_color: Color,
	/// CSS font for labels.
	pub label_font: &'static str,
	/// Ring drawn around the node picked as a connection source.
	pub selected_ring: Color,
	/// Ring drawn around the hovered node.
	pub hover_ring: Color,
	/// One color per [`NodeKind`], indexed by `kind as usize`.
	pub kind_colors: [Color; 10],
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Settled edge color.
	pub color: Color,
	/// Color of an edge right after it was created.
	pub fresh_color: Color,
	/// Seconds a new edge takes to fade from `fresh_color` to `color`.
	pub fresh_fade: f64,
	/// Line width in screen pixels.
	pub line_width: f64,
	/// Arrow head length in world units.
	pub arrow_size: f64,
	/// Preview line from the selected node to the cursor.
	pub pending_color: Color,
}

/// Full-canvas tint played after an evaluation.
#[derive(Clone, Debug)]
pub struct FlashStyle {
	/// Tint after a passing score.
	pub celebrate: Color,
	/// Tint after a failing score.
	pub discourage: Color,
	/// Seconds the tint takes to fade out.
	pub duration: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Outer background color.
	pub background: Color,
	/// Center of the background gradient.
	pub background_secondary: Color,
	/// Node style.
	pub node: NodeStyle,
	/// Edge style.
	pub edge: EdgeStyle,
	/// Feedback tint style.
	pub flash: FlashStyle,
}

impl Theme {
	/// Fill color for nodes of `kind`.
	pub fn kind_color(&self, kind: NodeKind) -> Color {
		self.node.kind_colors[kind as usize]
	}

	/// Tint color for `effect`.
	pub fn flash_color(&self, effect: FeedbackEffect) -> Color {
		match effect {
			FeedbackEffect::Celebrate => self.flash.celebrate,
			FeedbackEffect::Discourage => self.flash.discourage,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			background_secondary: Color::rgb(30, 35, 42),
			node: NodeStyle {
				radius: 22.0,
				label_color: Color::rgba(255, 255, 255, 0.85),
				label_font: "12px sans-serif",
				selected_ring: Color::rgb(235, 203, 139),
				hover_ring: Color::rgba(255, 255, 255, 0.8),
				kind_colors: [
					Color::rgb(94, 129, 172),  // User
					Color::rgb(129, 161, 193), // Query Interface
					Color::rgb(180, 136, 100), // Knowledge Base
					Color::rgb(170, 145, 115), // Document Processor
					Color::rgb(130, 120, 150), // Embedding Model
					Color::rgb(100, 148, 160), // Vector Store
					Color::rgb(119, 158, 165), // Retriever
					Color::rgb(180, 120, 100), // AI Engine
					Color::rgb(165, 115, 90),  // LLM Model
					Color::rgb(100, 145, 135), // Response
				],
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.6),
				fresh_color: Color::rgba(235, 203, 139, 1.0),
				fresh_fade: 0.6,
				line_width: 1.5,
				arrow_size: 9.0,
				pending_color: Color::rgba(235, 203, 139, 0.6),
			},
			flash: FlashStyle {
				celebrate: Color::rgba(120, 200, 140, 0.25),
				discourage: Color::rgba(200, 110, 110, 0.25),
				duration: 1.2,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opaque_colors_render_as_hex() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn lerp_reaches_endpoints() {
		let (a, b) = (Color::rgb(0, 0, 0), Color::rgb(200, 100, 50));
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
	}

	#[test]
	fn lighten_and_darken_keep_opacity() {
		let base = Color::rgba(100, 50, 0, 0.5);
		assert_eq!(base.lighten(1.0), Color::rgba(255, 255, 255, 0.5));
		assert_eq!(base.darken(1.0), Color::rgba(0, 0, 0, 0.5));
		assert_eq!(base.darken(0.5), Color::rgba(50, 25, 0, 0.5));
		assert_eq!(base.lighten(0.0), base);
	}

	#[test]
	fn every_kind_has_a_color() {
		let theme = Theme::default();
		for kind in NodeKind::ALL {
			assert_eq!(theme.kind_color(kind).a, 1.0);
		}
	}
}
