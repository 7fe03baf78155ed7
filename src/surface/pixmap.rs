use tiny_skia::{
	Color, FillRule, Paint, PathBuilder, Pixmap, Rect as SkRect, Stroke, Transform,
};

use super::{Surface, TextStyle};
use crate::color::Rgba;
use crate::geometry::{Bezier, Point, Rect};

/// In-memory raster backed by a `tiny-skia` pixmap.
#[derive(Clone)]
pub struct PixmapSurface {
	pixmap: Pixmap,
	transform: Transform,
	anti_alias: bool,
}

impl PixmapSurface {
	/// Returns `None` for a zero-sized surface.
	pub fn new(width: u32, height: u32) -> Option<Self> {
		Some(Self {
			pixmap: Pixmap::new(width, height)?,
			transform: Transform::identity(),
			anti_alias: true,
		})
	}

	/// A surface with anti-aliasing off, so every pixel is fully covered or untouched.
	pub fn aliased(width: u32, height: u32) -> Option<Self> {
		let mut surface = Self::new(width, height)?;
		surface.anti_alias = false;
		Some(surface)
	}

	pub fn checkpoint(&self) -> Pixmap {
		self.pixmap.clone()
	}

	pub fn rollback(&mut self, checkpoint: Pixmap) {
		if checkpoint.width() == self.pixmap.width() && checkpoint.height() == self.pixmap.height() {
			self.pixmap = checkpoint;
		}
	}

	pub fn data(&self) -> &[u8] {
		self.pixmap.data()
	}

	fn paint(&self, color: Rgba) -> Paint<'static> {
		let mut paint = Paint::default();
		paint.set_color_rgba8(color.r, color.g, color.b, color.a);
		paint.anti_alias = self.anti_alias;
		paint
	}

	fn stroke_style(line_width: f64) -> Stroke {
		Stroke {
			width: line_width.max(0.0) as f32,
			..Stroke::default()
		}
	}
}

fn sk_rect(rect: Rect) -> Option<SkRect> {
	SkRect::from_xywh(
		rect.x as f32,
		rect.y as f32,
		rect.width as f32,
		rect.height as f32,
	)
}

impl Surface for PixmapSurface {
	fn size(&self) -> (u32, u32) {
		(self.pixmap.width(), self.pixmap.height())
	}

	fn set_transform(&mut self, scale: f64, origin: Point) {
		let s = scale as f32;
		self.transform = Transform::from_row(
			s,
			0.0,
			0.0,
			s,
			(-origin.x * scale) as f32,
			(-origin.y * scale) as f32,
		);
	}

	fn clear(&mut self) {
		self.pixmap.fill(Color::TRANSPARENT);
	}

	fn fill_rect(&mut self, rect: Rect, color: Rgba) {
		let Some(rect) = sk_rect(rect) else {
			return;
		};
		let paint = self.paint(color);
		self.pixmap.fill_rect(rect, &paint, self.transform, None);
	}

	fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64) {
		let Some(rect) = sk_rect(rect) else {
			return;
		};
		let path = PathBuilder::from_rect(rect);
		let paint = self.paint(color);
		self.pixmap.stroke_path(
			&path,
			&paint,
			&Self::stroke_style(line_width),
			self.transform,
			None,
		);
	}

	fn stroke_bezier(&mut self, bezier: &Bezier, color: Rgba, line_width: f64) {
		let mut pb = PathBuilder::new();
		pb.move_to(bezier.start.x as f32, bezier.start.y as f32);
		pb.cubic_to(
			bezier.cp1.x as f32,
			bezier.cp1.y as f32,
			bezier.cp2.x as f32,
			bezier.cp2.y as f32,
			bezier.end.x as f32,
			bezier.end.y as f32,
		);
		let Some(path) = pb.finish() else {
			return;
		};
		let paint = self.paint(color);
		self.pixmap.stroke_path(
			&path,
			&paint,
			&Self::stroke_style(line_width),
			self.transform,
			None,
		);
	}

	fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
		let [first, rest @ ..] = points else {
			return;
		};
		if rest.len() < 2 {
			return;
		}
		let mut pb = PathBuilder::new();
		pb.move_to(first.x as f32, first.y as f32);
		for p in rest {
			pb.line_to(p.x as f32, p.y as f32);
		}
		pb.close();
		let Some(path) = pb.finish() else {
			return;
		};
		let paint = self.paint(color);
		self.pixmap
			.fill_path(&path, &paint, FillRule::Winding, self.transform, None);
	}

	fn stroke_polyline(&mut self, points: &[Point], color: Rgba, line_width: f64) {
		let [first, rest @ ..] = points else {
			return;
		};
		let mut pb = PathBuilder::new();
		pb.move_to(first.x as f32, first.y as f32);
		for p in rest {
			pb.line_to(p.x as f32, p.y as f32);
		}
		let Some(path) = pb.finish() else {
			return;
		};
		let paint = self.paint(color);
		self.pixmap.stroke_path(
			&path,
			&paint,
			&Self::stroke_style(line_width),
			self.transform,
			None,
		);
	}

	// No glyph rasteriser here. Node labels sit inside the node box, which is
	// already filled, so picking is unaffected.
	fn fill_text(&mut self, _text: &str, _anchor: Point, _style: TextStyle, _color: Rgba) {}

	fn pixel(&self, x: f64, y: f64) -> Option<Rgba> {
		// `Pixmap::pixel` only bounds-checks the flat index, so a column past
		// the right edge would wrap onto the next row.
		let (w, h) = (self.pixmap.width() as f64, self.pixmap.height() as f64);
		if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 || x >= w || y >= h {
			return None;
		}
		let c = self
			.pixmap
			.pixel(x.floor() as u32, y.floor() as u32)?
			.demultiply();
		Some(Rgba::new(c.red(), c.green(), c.blue(), c.alpha()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_sized_surface_is_refused() {
		assert!(PixmapSurface::new(0, 10).is_none());
	}

	#[test]
	fn fill_rect_respects_transform() {
		let mut s = PixmapSurface::aliased(100, 100).unwrap();
		s.set_transform(2.0, Point::new(10.0, 10.0));
		s.fill_rect(Rect::new(10.0, 10.0, 5.0, 5.0), Rgba::BLACK);
		assert_eq!(s.pixel(0.0, 0.0), Some(Rgba::BLACK));
		assert_eq!(s.pixel(9.0, 9.0), Some(Rgba::BLACK));
		assert_eq!(s.pixel(10.0, 10.0), Some(Rgba::new(0, 0, 0, 0)));
	}

	#[test]
	fn pixel_outside_is_none() {
		let s = PixmapSurface::new(4, 4).unwrap();
		assert_eq!(s.pixel(-1.0, 0.0), None);
		assert_eq!(s.pixel(4.0, 0.0), None);
		assert_eq!(s.pixel(4.0, 1.0), None);
		assert_eq!(s.pixel(0.0, 4.0), None);
		assert_eq!(s.pixel(3.5, 3.5).map(|c| c.a), Some(0));
		assert_eq!(s.pixel(f64::NAN, 0.0), None);
	}

	#[test]
	fn short_polygons_are_skipped() {
		let mut s = PixmapSurface::new(8, 8).unwrap();
		s.fill_polygon(&[], Rgba::BLACK);
		s.fill_polygon(&[Point::new(1.0, 1.0), Point::new(5.0, 5.0)], Rgba::BLACK);
		assert!(s.data().iter().all(|&b| b == 0));
	}

	#[test]
	fn rollback_restores_pixels() {
		let mut s = PixmapSurface::aliased(8, 8).unwrap();
		let before = s.checkpoint();
		s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Rgba::GREEN);
		s.rollback(before);
		assert!(s.data().iter().all(|&b| b == 0));
	}
}
