//! Recolor/diff hit-testing.
//!
//! A shape covers a pixel if redrawing it in a sentinel colour changes that
//! pixel. This is exact for any path the surface can rasterise (bezier
//! strokes, arrowheads, text) without shape-specific geometry.

use super::render;
use super::shape::{Drawable, Palette, Shape};
use super::viewport::Viewport;
use crate::geometry::Point;
use crate::surface::{PixmapSurface, Surface};

/// Draws `shape` in a sentinel palette, samples `(x, y)`, then redraws it in
/// its true colours. The sentinel is the complement of the pixel underneath,
/// so any painted pixel differs from the sample in every channel.
pub fn covers<D: Drawable + ?Sized>(shape: &mut D, surface: &mut dyn Surface, x: f64, y: f64) -> bool {
	let Some(before) = surface.pixel(x, y) else {
		return false;
	};
	let saved = shape.palette();
	shape.set_palette(Palette::uniform(before.complement()));
	shape.draw(surface);
	let after = surface.pixel(x, y);
	shape.set_palette(saved);
	shape.draw(surface);
	after.is_some_and(|after| !after.same_rgb(before))
}

/// Off-screen surface mirroring the visible canvas, used only for picking.
pub struct Picker {
	surface: Option<PixmapSurface>,
}

impl Picker {
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			surface: PixmapSurface::aliased(width, height),
		}
	}

	pub fn resize(&mut self, width: u32, height: u32) {
		self.surface = PixmapSurface::aliased(width, height);
	}

	/// Index of the first shape, in insertion order, covering surface point `at`.
	///
	/// Shape colours are restored before returning and the pick surface is
	/// left as mirrored.
	pub fn hit_test(&mut self, shapes: &mut [Shape], viewport: &Viewport, at: Point) -> Option<usize> {
		let surface = self.surface.as_mut()?;
		render::render_shapes(shapes, viewport, surface);
		let mirrored = surface.checkpoint();
		let hit = shapes
			.iter_mut()
			.position(|shape| shape.contains(surface, at.x, at.y));
		surface.rollback(mirrored);
		hit
	}

	#[cfg(test)]
	pub fn surface(&self) -> Option<&PixmapSurface> {
		self.surface.as_ref()
	}
}
