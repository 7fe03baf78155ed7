//! Viewer configuration, read from an optional JSON island in the page.

use log::{info, warn};
use serde::Deserialize;

use crate::color::{Gradient, Rgba};

/// Id of the `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "viewer-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
	/// Prefix for the layout/simulation endpoints (`drag`, `run`, ...).
	pub api_base: String,
	pub stream_url: String,
	pub redraw_interval_ms: u32,
	pub min_scale: f64,
	pub max_scale: f64,
	/// Move shapes locally while the reposition request is in flight.
	pub optimistic_drag: bool,
	pub gradient_hi: String,
	pub gradient_lo: String,
	pub chart_window: usize,
	pub canvas_width: f64,
	pub canvas_height: f64,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			stream_url: "ws://localhost:80/stream".into(),
			redraw_interval_ms: 30,
			min_scale: 0.05,
			max_scale: 40.0,
			optimistic_drag: false,
			gradient_hi: "#F93F3F".into(),
			gradient_lo: "#01DFF7".into(),
			chart_window: 100,
			canvas_width: 900.0,
			canvas_height: 560.0,
		}
	}
}

impl ViewerConfig {
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		let mut config: Self = serde_json::from_str(json)?;
		config.sanitize();
		Ok(config)
	}

	/// Reads the page's config island, falling back to defaults.
	pub fn load() -> Self {
		let text = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|el| el.text_content());
		let Some(text) = text else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("Loaded viewer config from #{CONFIG_ELEMENT_ID}");
				config
			}
			Err(e) => {
				warn!("Ignoring malformed viewer config: {e}");
				Self::default()
			}
		}
	}

	pub fn gradient(&self) -> Gradient {
		let fallback = Gradient::default();
		Gradient {
			hi: Rgba::parse(&self.gradient_hi).unwrap_or(fallback.hi),
			lo: Rgba::parse(&self.gradient_lo).unwrap_or(fallback.lo),
		}
	}

	fn sanitize(&mut self) {
		let defaults = Self::default();
		if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
			self.min_scale = defaults.min_scale;
		}
		if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
			self.max_scale = defaults.max_scale.max(self.min_scale);
		}
		if self.redraw_interval_ms == 0 {
			self.redraw_interval_ms = defaults.redraw_interval_ms;
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn missing_fields_take_defaults() {
		let config = ViewerConfig::from_json(r#"{ "api_base": "/api/" }"#).unwrap();
		assert_eq!(
			config,
			ViewerConfig {
				api_base: "/api/".into(),
				..ViewerConfig::default()
			}
		);
	}

	#[test]
	fn degenerate_zoom_limits_are_replaced() {
		let config =
			ViewerConfig::from_json(r#"{ "min_scale": 0, "max_scale": -1, "redraw_interval_ms": 0 }"#)
				.unwrap();
		assert!(config.min_scale > 0.0);
		assert!(config.max_scale >= config.min_scale);
		assert_eq!(config.redraw_interval_ms, 30);
	}

	#[test]
	fn bad_gradient_strings_fall_back() {
		let config = ViewerConfig {
			gradient_hi: "nope".into(),
			..ViewerConfig::default()
		};
		assert_eq!(config.gradient().hi, Gradient::default().hi);
	}
}
