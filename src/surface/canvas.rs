use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Surface, TextAlign, TextStyle};
use crate::color::Rgba;
use crate::geometry::{Bezier, Point, Rect};

/// A visible `<canvas>` and its 2D context.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()?
			.dyn_into::<CanvasRenderingContext2d>()
			.ok()?;
		Some(Self { canvas, ctx })
	}

	pub fn resize(&mut self, width: u32, height: u32) {
		self.canvas.set_width(width);
		self.canvas.set_height(height);
	}

	fn trace_polyline(&self, points: &[Point]) -> bool {
		let [first, rest @ ..] = points else {
			return false;
		};
		self.ctx.begin_path();
		self.ctx.move_to(first.x, first.y);
		for p in rest {
			self.ctx.line_to(p.x, p.y);
		}
		true
	}
}

impl Surface for CanvasSurface {
	fn size(&self) -> (u32, u32) {
		(self.canvas.width(), self.canvas.height())
	}

	fn set_transform(&mut self, scale: f64, origin: Point) {
		let _ = self
			.ctx
			.set_transform(scale, 0.0, 0.0, scale, -origin.x * scale, -origin.y * scale);
	}

	fn clear(&mut self) {
		let (w, h) = self.size();
		self.ctx.save();
		let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
		self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
		self.ctx.restore();
	}

	fn fill_rect(&mut self, rect: Rect, color: Rgba) {
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
	}

	fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64) {
		self.ctx.set_stroke_style_str(&color.to_css());
		self.ctx.set_line_width(line_width);
		self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
	}

	fn stroke_bezier(&mut self, bezier: &Bezier, color: Rgba, line_width: f64) {
		self.ctx.set_stroke_style_str(&color.to_css());
		self.ctx.set_line_width(line_width);
		self.ctx.begin_path();
		self.ctx.move_to(bezier.start.x, bezier.start.y);
		self.ctx.bezier_curve_to(
			bezier.cp1.x,
			bezier.cp1.y,
			bezier.cp2.x,
			bezier.cp2.y,
			bezier.end.x,
			bezier.end.y,
		);
		self.ctx.stroke();
	}

	fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
		if points.len() < 3 || !self.trace_polyline(points) {
			return;
		}
		self.ctx.close_path();
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.fill();
	}

	fn stroke_polyline(&mut self, points: &[Point], color: Rgba, line_width: f64) {
		if !self.trace_polyline(points) {
			return;
		}
		self.ctx.set_stroke_style_str(&color.to_css());
		self.ctx.set_line_width(line_width);
		self.ctx.stroke();
	}

	fn fill_text(&mut self, text: &str, anchor: Point, style: TextStyle, color: Rgba) {
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.set_text_align(match style.align {
			TextAlign::Left => "left",
			TextAlign::Center => "center",
		});
		self.ctx.set_font(&format!("{}px sans-serif", style.size));
		let _ = match style.max_width {
			Some(max) => self.ctx.fill_text_with_max_width(text, anchor.x, anchor.y, max),
			None => self.ctx.fill_text(text, anchor.x, anchor.y),
		};
	}

	fn pixel(&self, x: f64, y: f64) -> Option<Rgba> {
		let image = self
			.ctx
			.get_image_data(x.floor(), y.floor(), 1.0, 1.0)
			.ok()?;
		match image.data().as_slice() {
			[r, g, b, a, ..] => Some(Rgba::new(*r, *g, *b, *a)),
			_ => None,
		}
	}
}
