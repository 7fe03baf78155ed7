use super::binder::ChartBinder;
use crate::color::Rgba;
use crate::geometry::{Point, Rect};
use crate::surface::{Surface, TextAlign, TextStyle};

const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 12.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 36.0;
const GRID_LINES: usize = 4;

const AXIS_COLOR: Rgba = Rgba::rgb(90, 90, 90);
const GRID_COLOR: Rgba = Rgba::rgb(225, 225, 225);

fn label_style(size: f64, align: TextAlign) -> TextStyle {
	TextStyle {
		size,
		max_width: None,
		align,
	}
}

/// Finite min/max of `values`, widened when flat.
fn extent<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
	let (lo, hi) = values
		.filter(|v| v.is_finite())
		.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
			(lo.min(v), hi.max(v))
		});
	if lo > hi {
		return None;
	}
	if hi - lo < f64::EPSILON {
		let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
		return Some((lo - pad, hi + pad));
	}
	Some((lo, hi))
}

/// Draws the bound datasets as a line chart filling `surface`.
pub fn render(chart: &ChartBinder, surface: &mut dyn Surface) {
	surface.clear();
	surface.reset_transform();
	let (w, h) = surface.size();
	let (w, h) = (w as f64, h as f64);
	let plot = Rect::new(
		MARGIN_LEFT,
		MARGIN_TOP,
		(w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
		(h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
	);

	for i in 1..=GRID_LINES {
		let y = plot.y + plot.height * i as f64 / (GRID_LINES + 1) as f64;
		surface.stroke_polyline(
			&[Point::new(plot.x, y), Point::new(plot.x + plot.width, y)],
			GRID_COLOR,
			0.5,
		);
	}
	let bottom = plot.y + plot.height;
	surface.stroke_polyline(
		&[
			Point::new(plot.x, plot.y),
			Point::new(plot.x, bottom),
			Point::new(plot.x + plot.width, bottom),
		],
		AXIS_COLOR,
		1.0,
	);
	surface.fill_text(
		"Time",
		Point::new(plot.x + plot.width / 2.0, h - 6.0),
		label_style(12.0, TextAlign::Center),
		AXIS_COLOR,
	);
	surface.fill_text(
		"Concentration",
		Point::new(4.0, MARGIN_TOP - 8.0),
		label_style(12.0, TextAlign::Left),
		AXIS_COLOR,
	);

	let time = chart.time_axis();
	let (Some((t0, t1)), Some((v0, v1))) = (
		extent(time.iter()),
		extent(chart.datasets().iter().flat_map(|d| d.data.iter())),
	) else {
		return;
	};
	surface.fill_text(
		&format!("{v1:.3}"),
		Point::new(plot.x - 4.0, plot.y + 4.0),
		label_style(10.0, TextAlign::Left),
		AXIS_COLOR,
	);
	surface.fill_text(
		&format!("{t1:.2}"),
		Point::new(plot.x + plot.width - 16.0, bottom + 14.0),
		label_style(10.0, TextAlign::Left),
		AXIS_COLOR,
	);

	let to_surface = |t: f64, v: f64| {
		Point::new(
			plot.x + (t - t0) / (t1 - t0) * plot.width,
			bottom - (v - v0) / (v1 - v0) * plot.height,
		)
	};

	for (n, dataset) in chart.datasets().iter().enumerate() {
		// Gaps (non-finite samples) split the line into runs.
		let mut run: Vec<Point> = Vec::new();
		for (&t, &v) in time.iter().zip(&dataset.data) {
			if t.is_finite() && v.is_finite() {
				run.push(to_surface(t, v));
			} else if !run.is_empty() {
				surface.stroke_polyline(&run, dataset.color, 1.5);
				run.clear();
			}
		}
		if !run.is_empty() {
			surface.stroke_polyline(&run, dataset.color, 1.5);
		}

		let key_y = plot.y + 4.0 + 14.0 * n as f64;
		surface.fill_rect(Rect::new(plot.x + 8.0, key_y, 10.0, 10.0), dataset.color);
		surface.fill_text(
			&dataset.label,
			Point::new(plot.x + 22.0, key_y + 9.0),
			label_style(11.0, TextAlign::Left),
			AXIS_COLOR,
		);
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::surface::PixmapSurface;
	use crate::time_series::TimeSeriesStore;

	#[test]
	fn extent_skips_non_finite_and_widens_flat() {
		let v = [f64::NAN, 2.0, 2.0];
		assert_eq!(extent(v.iter()), Some((1.8, 2.2)));
		assert_eq!(extent([f64::NAN].iter()), None);
		assert_eq!(extent([1.0, 3.0].iter()), Some((1.0, 3.0)));
	}

	#[test]
	fn draws_plotted_series() {
		let mut series = BTreeMap::new();
		series.insert("[A]".to_string(), vec![1.0, f64::NAN, 3.0, 4.0]);
		let mut store = TimeSeriesStore::default();
		store.load(series, vec![0.0, 1.0, 2.0, 3.0]);
		let mut chart = ChartBinder::default();
		chart.plot(&store, "[A]");

		let mut surface = PixmapSurface::new(300, 200).unwrap();
		render(&chart, &mut surface);
		let colour = chart.dataset("[A]").unwrap().color;
		// the legend key is a solid block of the series colour
		assert_eq!(surface.pixel(MARGIN_LEFT + 12.0, MARGIN_TOP + 8.0), Some(colour));
	}

	#[test]
	fn empty_chart_draws_axes_only() {
		let mut surface = PixmapSurface::new(120, 80).unwrap();
		render(&ChartBinder::default(), &mut surface);
		assert!(surface.data().iter().any(|&b| b != 0));
	}
}
