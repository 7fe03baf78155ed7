//! Raster targets shapes and charts draw onto.
//!
//! Two implementations exist: [`PixmapSurface`] renders into an in-memory
//! `tiny-skia` pixmap (the off-screen pick surface, and everything under
//! test), [`CanvasSurface`] forwards to a browser 2D context.

mod canvas;
mod pixmap;

pub use canvas::CanvasSurface;
pub use pixmap::PixmapSurface;

use crate::color::Rgba;
use crate::geometry::{Bezier, Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
	Left,
	Center,
}

#[derive(Clone, Copy, Debug)]
pub struct TextStyle {
	pub size: f64,
	pub max_width: Option<f64>,
	pub align: TextAlign,
}

/// Drawing primitives needed by the diagram and the chart.
///
/// Geometry passed to the drawing calls is in world units and goes through the
/// transform set by [`Surface::set_transform`]. [`Surface::pixel`] reads in
/// surface pixels and ignores the transform.
pub trait Surface {
	fn size(&self) -> (u32, u32);

	/// Maps world `p` to surface `(p - origin) * scale`.
	fn set_transform(&mut self, scale: f64, origin: Point);

	fn reset_transform(&mut self) {
		self.set_transform(1.0, Point::default());
	}

	/// Clears every pixel, whatever the current transform.
	fn clear(&mut self);

	fn fill_rect(&mut self, rect: Rect, color: Rgba);

	fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64);

	fn stroke_bezier(&mut self, bezier: &Bezier, color: Rgba, line_width: f64);

	/// Fills the closed polygon through `points`; fewer than three points is a no-op.
	fn fill_polygon(&mut self, points: &[Point], color: Rgba);

	fn stroke_polyline(&mut self, points: &[Point], color: Rgba, line_width: f64);

	fn fill_text(&mut self, text: &str, anchor: Point, style: TextStyle, color: Rgba);

	fn pixel(&self, x: f64, y: f64) -> Option<Rgba>;
}
