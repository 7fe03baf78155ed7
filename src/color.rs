//! Colours, CSS colour parsing and the value → colour gradient.

use std::fmt;

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8,
}

impl Rgba {
	pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
	pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
	pub const GREY: Rgba = Rgba::rgb(128, 128, 128);
	pub const GREEN: Rgba = Rgba::rgb(0, 128, 0);
	pub const SKY_BLUE: Rgba = Rgba::rgb(135, 206, 235);

	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self { r, g, b, a }
	}

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::new(r, g, b, 255)
	}

	/// Opaque colour whose every RGB channel differs from `self`.
	pub fn complement(self) -> Self {
		Self::rgb(255 - self.r, 255 - self.g, 255 - self.b)
	}

	pub fn same_rgb(self, other: Rgba) -> bool {
		self.r == other.r && self.g == other.g && self.b == other.b
	}

	pub fn lerp(self, other: Rgba, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Self::new(
			mix(self.r, other.r),
			mix(self.g, other.g),
			mix(self.b, other.b),
			mix(self.a, other.a),
		)
	}

	pub fn random() -> Self {
		let mut rng = rand::thread_rng();
		Self::rgb(rng.r#gen(), rng.r#gen(), rng.r#gen())
	}

	/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` and a few names.
	pub fn parse(s: &str) -> Option<Self> {
		let s = s.trim();
		if let Some(hex) = s.strip_prefix('#') {
			return parse_hex(hex);
		}
		let lower = s.to_ascii_lowercase();
		if let Some(body) = lower
			.strip_prefix("rgba(")
			.or_else(|| lower.strip_prefix("rgb("))
			.and_then(|rest| rest.strip_suffix(')'))
		{
			return parse_functional(body);
		}
		match lower.as_str() {
			"white" => Some(Self::WHITE),
			"black" => Some(Self::BLACK),
			"grey" | "gray" => Some(Self::GREY),
			"green" => Some(Self::GREEN),
			"skyblue" => Some(Self::SKY_BLUE),
			"transparent" => Some(Self::new(0, 0, 0, 0)),
			_ => None,
		}
	}

	pub fn to_css(self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.a == 255 {
			write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			let alpha = self.a as f64 / 255.0;
			write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, alpha)
		}
	}
}

fn parse_hex(hex: &str) -> Option<Rgba> {
	let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
	let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
	match hex.len() {
		3 => Some(Rgba::rgb(
			nibble(0)? * 17,
			nibble(1)? * 17,
			nibble(2)? * 17,
		)),
		6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
		8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
		_ => None,
	}
}

fn parse_functional(body: &str) -> Option<Rgba> {
	let parts: Vec<&str> = body.split(',').map(str::trim).collect();
	let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
	match parts.as_slice() {
		[r, g, b] => Some(Rgba::rgb(channel(r)?, channel(g)?, channel(b)?)),
		[r, g, b, a] => {
			let alpha = a.parse::<f64>().ok()?.clamp(0.0, 1.0);
			Some(Rgba::new(
				channel(r)?,
				channel(g)?,
				channel(b)?,
				(alpha * 255.0).round() as u8,
			))
		}
		_ => None,
	}
}

/// Shown for nodes whose value cannot be mapped.
pub const FALLBACK_COLOR: Rgba = Rgba::WHITE;

/// Fixed colour of boundary species.
pub const BOUNDARY_COLOR: Rgba = Rgba::rgb(190, 190, 190);

/// Two-stop colour ramp; fraction 0 is `lo`, fraction 1 is `hi`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
	pub hi: Rgba,
	pub lo: Rgba,
}

impl Default for Gradient {
	fn default() -> Self {
		Self {
			hi: Rgba::rgb(0xF9, 0x3F, 0x3F),
			lo: Rgba::rgb(0x01, 0xDF, 0xF7),
		}
	}
}

impl Gradient {
	pub fn color_at(&self, fraction: f64) -> Rgba {
		if !fraction.is_finite() {
			return FALLBACK_COLOR;
		}
		self.lo.lerp(self.hi, fraction)
	}
}

/// Order-of-magnitude bracket `[10^k, 10^(k+1))` around a reference value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueScale {
	pub min: f64,
	pub max: f64,
}

impl ValueScale {
	pub fn bracketing(value: f64) -> Option<Self> {
		if !value.is_finite() || value <= 0.0 {
			return None;
		}
		let mut k = value.log10().floor();
		// log10 of an exact power of ten can land just under the integer
		if 10f64.powf(k + 1.0) <= value {
			k += 1.0;
		}
		let min = 10f64.powf(k);
		Some(Self {
			min,
			max: min * 10.0,
		})
	}

	/// Position of `value` within the bracket, clamped to `[0, 1]`.
	pub fn fraction(&self, value: f64) -> Option<f64> {
		if !value.is_finite() || value <= 0.0 {
			return None;
		}
		Some(((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_css_forms() {
		assert_eq!(Rgba::parse("#F93F3F"), Some(Rgba::rgb(0xF9, 0x3F, 0x3F)));
		assert_eq!(Rgba::parse("#fff"), Some(Rgba::WHITE));
		assert_eq!(Rgba::parse("rgb(1, 2, 3)"), Some(Rgba::rgb(1, 2, 3)));
		assert_eq!(
			Rgba::parse("rgba(10, 20, 30, 0.5)"),
			Some(Rgba::new(10, 20, 30, 128))
		);
		assert_eq!(Rgba::parse("grey"), Some(Rgba::GREY));
		assert_eq!(Rgba::parse("#12"), None);
		assert_eq!(Rgba::parse("hsl(1, 2, 3)"), None);
	}

	#[test]
	fn complement_differs_in_every_channel() {
		for c in [Rgba::BLACK, Rgba::WHITE, Rgba::rgb(127, 128, 0), Rgba::new(0, 0, 0, 0)] {
			let s = c.complement();
			assert!(s.r != c.r && s.g != c.g && s.b != c.b);
		}
	}

	#[test]
	fn bracket_contains_value() {
		let s = ValueScale::bracketing(5.0).unwrap();
		assert_eq!((s.min, s.max), (1.0, 10.0));
		let s = ValueScale::bracketing(50.0).unwrap();
		assert_eq!((s.min, s.max), (10.0, 100.0));
		let s = ValueScale::bracketing(1000.0).unwrap();
		assert_eq!((s.min, s.max), (1000.0, 10000.0));
		let s = ValueScale::bracketing(0.02).unwrap();
		assert!((s.min - 0.01).abs() < 1e-12);
	}

	#[test]
	fn bracket_rejects_unusable_values() {
		assert_eq!(ValueScale::bracketing(0.0), None);
		assert_eq!(ValueScale::bracketing(-3.0), None);
		assert_eq!(ValueScale::bracketing(f64::NAN), None);
		assert_eq!(ValueScale::bracketing(f64::INFINITY), None);
	}

	#[test]
	fn gradient_endpoints() {
		let g = Gradient::default();
		assert_eq!(g.color_at(0.0), g.lo);
		assert_eq!(g.color_at(1.0), g.hi);
		assert_eq!(g.color_at(f64::NAN), FALLBACK_COLOR);
	}
}
