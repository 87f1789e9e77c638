//! Tunable session settings.
//!
//! Every field has a default, so a host page may supply a partial JSON object
//! (or none at all).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::reference::Position;

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
	/// Delay between consecutive edges of the solution reveal.
	pub reveal_stride_ms: u64,
	/// Delay between the last revealed edge and the settle signal.
	pub settle_delay_ms: u64,
	/// Region where palette-added nodes are dropped.
	pub placement: PlacementArea,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			reveal_stride_ms: 100,
			settle_delay_ms: 100,
			placement: PlacementArea::default(),
		}
	}
}

impl PipelineConfig {
	/// Parse and validate a JSON config object.
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Reject settings the reveal or placement cannot work with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		// A zero stride would give revealed edges identical timestamps.
		if self.reveal_stride_ms == 0 {
			return Err(ConfigError::Invalid("reveal_stride_ms must be positive".into()));
		}
		// Settle must land strictly after the last edge.
		if self.settle_delay_ms == 0 {
			return Err(ConfigError::Invalid("settle_delay_ms must be positive".into()));
		}
		let area = &self.placement;
		let finite = [area.x, area.y, area.width, area.height]
			.iter()
			.all(|v| v.is_finite());
		if !finite || area.width < 0.0 || area.height < 0.0 {
			return Err(ConfigError::Invalid(
				"placement must be a finite, non-negative rectangle".into(),
			));
		}
		Ok(())
	}

	/// Reveal stride as a [`Duration`].
	pub fn reveal_stride(&self) -> Duration {
		Duration::from_millis(self.reveal_stride_ms)
	}

	/// Settle delay as a [`Duration`].
	pub fn settle_delay(&self) -> Duration {
		Duration::from_millis(self.settle_delay_ms)
	}
}

/// Rectangle in graph coordinates where new nodes are scattered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementArea {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width in graph units.
	pub width: f64,
	/// Height in graph units.
	pub height: f64,
}

impl Default for PlacementArea {
	fn default() -> Self {
		Self {
			x: 60.0,
			y: 60.0,
			width: 600.0,
			height: 360.0,
		}
	}
}

impl PlacementArea {
	/// Position for the `index`-th placed node.
	///
	/// Deterministic scatter, so the same sequence of additions always
	/// produces the same layout.
	pub fn place(&self, index: u64) -> Position {
		let seed = index as f64 + 1.0;
		Position::new(
			self.x + pseudo_random(seed * 1.1) * self.width,
			self.y + pseudo_random(seed * 2.3) * self.height,
		)
	}
}

fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_reveal_timing() {
		let config = PipelineConfig::default();
		assert_eq!(config.reveal_stride(), Duration::from_millis(100));
		assert_eq!(config.settle_delay(), Duration::from_millis(100));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn partial_json_falls_back_to_defaults() {
		let config = PipelineConfig::from_json(r#"{ "reveal_stride_ms": 250 }"#).unwrap();
		assert_eq!(config.reveal_stride_ms, 250);
		assert_eq!(config.settle_delay_ms, 100);
		assert_eq!(config.placement, PlacementArea::default());
	}

	#[test]
	fn malformed_json_is_rejected() {
		assert!(matches!(
			PipelineConfig::from_json("{ not json"),
			Err(ConfigError::Json(_))
		));
	}

	#[test]
	fn zero_stride_is_rejected() {
		assert!(matches!(
			PipelineConfig::from_json(r#"{ "reveal_stride_ms": 0 }"#),
			Err(ConfigError::Invalid(_))
		));
	}

	#[test]
	fn zero_settle_delay_is_rejected() {
		assert!(matches!(
			PipelineConfig::from_json(r#"{ "settle_delay_ms": 0 }"#),
			Err(ConfigError::Invalid(_))
		));
	}

	#[test]
	fn negative_placement_is_rejected() {
		let text = r#"{ "placement": { "width": -1.0 } }"#;
		assert!(matches!(
			PipelineConfig::from_json(text),
			Err(ConfigError::Invalid(_))
		));
	}

	#[test]
	fn placement_stays_inside_area() {
		let area = PlacementArea::default();
		for index in 0..200 {
			let p = area.place(index);
			assert!(p.x >= area.x && p.x <= area.x + area.width);
			assert!(p.y >= area.y && p.y <= area.y + area.height);
		}
		assert_eq!(area.place(3), area.place(3));
	}
}
