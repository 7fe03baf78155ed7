use serde::{Deserialize, Serialize};

/// A 2-D point. Travels on the wire as `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

impl From<[f64; 2]> for Point {
	fn from([x, y]: [f64; 2]) -> Self {
		Self { x, y }
	}
}

impl From<Point> for [f64; 2] {
	fn from(p: Point) -> Self {
		[p.x, p.y]
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}
}

/// One cubic bezier segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bezier {
	pub start: Point,
	pub cp1: Point,
	pub cp2: Point,
	pub end: Point,
}

impl Bezier {
	pub fn translate(&mut self, dx: f64, dy: f64) {
		for p in [&mut self.start, &mut self.cp1, &mut self.cp2, &mut self.end] {
			*p = p.offset(dx, dy);
		}
	}

	pub fn is_finite(&self) -> bool {
		[self.start, self.cp1, self.cp2, self.end]
			.iter()
			.all(|p| p.is_finite())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn point_reads_from_pair() {
		let p: Point = serde_json::from_str("[3.5, -2]").unwrap();
		assert_eq!(p, Point::new(3.5, -2.0));
		assert_eq!(serde_json::to_string(&p).unwrap(), "[3.5,-2.0]");
	}

	#[test]
	fn bezier_translates_every_control_point() {
		let mut b = Bezier {
			start: Point::new(0.0, 0.0),
			cp1: Point::new(1.0, 1.0),
			cp2: Point::new(2.0, 2.0),
			end: Point::new(3.0, 3.0),
		};
		b.translate(10.0, -1.0);
		assert_eq!(b.start, Point::new(10.0, -1.0));
		assert_eq!(b.end, Point::new(13.0, 2.0));
	}
}
