use crate::geometry::Point;

/// Wheel delta that doubles (or halves towards zero) the scale.
const WHEEL_STEP: f64 = 240.0;
/// Smallest per-event zoom factor; keeps the transform invertible.
const MIN_ZOOM_FACTOR: f64 = 0.1;

/// Pan/zoom state shared by the visible canvas and the pick surface.
///
/// World point `w` is drawn at surface point `(w - origin) * scale`.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	origin: Point,
	scale: f64,
	min_scale: f64,
	max_scale: f64,
	width: u32,
	height: u32,
	valid: bool,
}

impl Viewport {
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			origin: Point::default(),
			scale: 1.0,
			min_scale: f64::MIN_POSITIVE,
			max_scale: f64::MAX,
			width,
			height,
			valid: false,
		}
	}

	pub fn with_limits(mut self, min_scale: f64, max_scale: f64) -> Self {
		self.min_scale = min_scale;
		self.max_scale = max_scale.max(min_scale);
		self.scale = self.scale.clamp(self.min_scale, self.max_scale);
		self
	}

	pub fn origin(&self) -> Point {
		self.origin
	}

	pub fn scale(&self) -> f64 {
		self.scale
	}

	pub fn size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	/// Surface point → world point.
	pub fn to_local(&self, screen: Point) -> Point {
		Point::new(
			screen.x / self.scale + self.origin.x,
			screen.y / self.scale + self.origin.y,
		)
	}

	/// World point → surface point.
	pub fn to_screen(&self, world: Point) -> Point {
		Point::new(
			(world.x - self.origin.x) * self.scale,
			(world.y - self.origin.y) * self.scale,
		)
	}

	/// Moves the view by a surface-pixel delta, so content follows the pointer.
	pub fn pan(&mut self, dx: f64, dy: f64) {
		if !(dx.is_finite() && dy.is_finite()) {
			return;
		}
		self.origin = self.origin.offset(-dx / self.scale, -dy / self.scale);
		self.valid = false;
	}

	/// Zooms by `1 + wheel_delta / 240`, keeping the world point under `screen` fixed.
	pub fn zoom_at(&mut self, screen: Point, wheel_delta: f64) {
		if !(screen.is_finite() && wheel_delta.is_finite()) {
			return;
		}
		let requested = (1.0 + wheel_delta / WHEEL_STEP).max(MIN_ZOOM_FACTOR);
		let scale = (self.scale * requested).clamp(self.min_scale, self.max_scale);
		let zoom = scale / self.scale;
		let (mx, my) = (screen.x / self.scale, screen.y / self.scale);
		self.origin = Point::new(
			mx + self.origin.x - mx / zoom,
			my + self.origin.y - my / zoom,
		);
		self.scale = scale;
		self.valid = false;
	}

	pub fn resize(&mut self, width: u32, height: u32) {
		self.width = width;
		self.height = height;
		self.valid = false;
	}

	pub fn invalidate(&mut self) {
		self.valid = false;
	}

	pub fn is_valid(&self) -> bool {
		self.valid
	}

	pub fn mark_valid(&mut self) {
		self.valid = true;
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn close(a: Point, b: Point) -> bool {
		let tol = 1e-6 * (1.0 + a.x.abs().max(a.y.abs()));
		(a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol
	}

	#[test]
	fn pan_divides_by_scale() {
		let mut v = Viewport::new(100, 100);
		v.zoom_at(Point::new(0.0, 0.0), 240.0);
		assert_eq!(v.scale(), 2.0);
		let before = v.to_local(Point::new(10.0, 10.0));
		v.pan(20.0, 0.0);
		let after = v.to_local(Point::new(10.0, 10.0));
		assert!((before.x - after.x - 10.0).abs() < 1e-12);
		assert_eq!(before.y, after.y);
		assert!(!v.is_valid());
	}

	#[test]
	fn to_screen_inverts_to_local() {
		let mut v = Viewport::new(100, 100);
		v.pan(13.0, -7.0);
		v.zoom_at(Point::new(40.0, 60.0), 90.0);
		let p = Point::new(3.0, 4.0);
		assert!(close(v.to_screen(v.to_local(p)), p));
	}

	#[test]
	fn zoom_factor_never_reaches_zero() {
		let mut v = Viewport::new(100, 100);
		v.zoom_at(Point::new(50.0, 50.0), -10_000.0);
		assert!(v.scale() > 0.0);
		assert!(v.scale().is_finite());
	}

	#[test]
	fn zoom_is_clamped_to_limits() {
		let mut v = Viewport::new(100, 100).with_limits(0.5, 4.0);
		for _ in 0..20 {
			v.zoom_at(Point::new(30.0, 30.0), 240.0);
		}
		assert_eq!(v.scale(), 4.0);
		for _ in 0..20 {
			v.zoom_at(Point::new(30.0, 30.0), -200.0);
		}
		assert_eq!(v.scale(), 0.5);
	}

	#[test]
	fn non_finite_input_is_ignored() {
		let mut v = Viewport::new(100, 100);
		v.mark_valid();
		v.pan(f64::NAN, 1.0);
		v.zoom_at(Point::new(1.0, 1.0), f64::INFINITY);
		assert_eq!(v.origin(), Point::default());
		assert_eq!(v.scale(), 1.0);
		assert!(v.is_valid());
	}

	proptest! {
		#[test]
		fn zoom_keeps_pointer_anchored(
			px in 0.0f64..2000.0,
			py in 0.0f64..2000.0,
			delta in -239.0f64..2000.0,
			pan_x in -500.0f64..500.0,
			pan_y in -500.0f64..500.0,
			pre_zoom in -200.0f64..200.0,
		) {
			let mut v = Viewport::new(800, 600).with_limits(1e-3, 1e3);
			v.pan(pan_x, pan_y);
			v.zoom_at(Point::new(400.0, 300.0), pre_zoom);
			let p = Point::new(px, py);
			let before = v.to_local(p);
			v.zoom_at(p, delta);
			let after = v.to_local(p);
			prop_assert!(close(before, after), "{before:?} vs {after:?}");
		}
	}
}
