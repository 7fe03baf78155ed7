//! Drawable diagram entities: species nodes, bezier curves and the
//! hyperedges that bundle curves into one reaction.

use log::warn;

use super::picking;
use super::types::{CurveJson, EdgeJson, NodeJson};
use crate::color::{BOUNDARY_COLOR, FALLBACK_COLOR, Gradient, Rgba, ValueScale};
use crate::error::PayloadError;
use crate::geometry::{Bezier, Point, Rect};
use crate::surface::{Surface, TextAlign, TextStyle};

/// Every colour a shape paints with. Hit-testing swaps the whole palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
	pub fill: Rgba,
	pub edge: Rgba,
	pub text: Rgba,
	pub select: Rgba,
}

impl Palette {
	pub const fn uniform(color: Rgba) -> Self {
		Self {
			fill: color,
			edge: color,
			text: color,
			select: color,
		}
	}

	const fn new(fill: Rgba, edge: Rgba) -> Self {
		Self {
			fill,
			edge,
			text: Rgba::BLACK,
			select: Rgba::GREEN,
		}
	}
}

pub trait Drawable {
	fn draw(&self, surface: &mut dyn Surface);

	fn palette(&self) -> Palette;

	fn set_palette(&mut self, palette: Palette);

	/// Translates geometry by a world-space delta.
	fn drag(&mut self, dx: f64, dy: f64);

	fn select(&mut self);

	fn deselect(&mut self);

	fn is_selected(&self) -> bool;

	/// Whether drawing this shape paints surface pixel `(x, y)`.
	fn contains(&mut self, surface: &mut dyn Surface, x: f64, y: f64) -> bool {
		picking::covers(self, surface, x, y)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	centroid: Point,
	pub width: f64,
	pub height: f64,
	value: f64,
	boundary: bool,
	scale: Option<ValueScale>,
	palette: Palette,
	selected: bool,
}

impl Node {
	pub fn new(json: &NodeJson, gradient: &Gradient) -> Result<Self, PayloadError> {
		if !(json.centroid.is_finite() && json.width.is_finite() && json.height.is_finite()) {
			return Err(PayloadError::NodeGeometry(json.id.clone()));
		}
		let mut node = Self {
			id: json.id.clone(),
			centroid: json.centroid,
			width: json.width,
			height: json.height,
			value: json.value,
			boundary: json.boundary,
			scale: ValueScale::bracketing(json.value),
			palette: Palette::new(Rgba::SKY_BLUE, Rgba::GREY),
			selected: false,
		};
		node.recolor(gradient);
		Ok(node)
	}

	pub fn centroid(&self) -> Point {
		self.centroid
	}

	pub fn x(&self) -> f64 {
		self.centroid.x - self.width / 2.0
	}

	pub fn y(&self) -> f64 {
		self.centroid.y - self.height / 2.0
	}

	pub fn bounds(&self) -> Rect {
		Rect::new(self.x(), self.y(), self.width, self.height)
	}

	pub fn value(&self) -> f64 {
		self.value
	}

	pub fn is_boundary(&self) -> bool {
		self.boundary
	}

	/// Series label this node's concentration is published under.
	pub fn series_label(&self) -> String {
		format!("[{}]", self.id)
	}

	pub fn set_value(&mut self, value: f64, gradient: &Gradient) {
		self.value = value;
		if self.scale.is_none() {
			self.scale = ValueScale::bracketing(value);
		}
		self.recolor(gradient);
	}

	/// Recomputes the fill from the current value.
	pub fn recolor(&mut self, gradient: &Gradient) {
		self.palette.fill = if self.boundary {
			BOUNDARY_COLOR
		} else {
			self.scale
				.and_then(|s| s.fraction(self.value))
				.map_or(FALLBACK_COLOR, |f| gradient.color_at(f))
		};
	}

	pub fn set_fill_color(&mut self, color: Rgba) {
		self.palette.fill = color;
	}

	pub fn set_edge_color(&mut self, color: Rgba) {
		self.palette.edge = color;
	}
}

impl Drawable for Node {
	fn draw(&self, surface: &mut dyn Surface) {
		let bounds = self.bounds();
		let edge = if self.selected {
			self.palette.select
		} else {
			self.palette.edge
		};
		surface.fill_rect(bounds, self.palette.fill);
		surface.stroke_rect(bounds, edge, 1.0);
		surface.fill_text(
			&self.id,
			Point::new(bounds.x + bounds.width / 2.0, bounds.y + 3.0 * bounds.height / 4.0),
			TextStyle {
				size: self.height / 2.0,
				max_width: Some(self.width),
				align: TextAlign::Center,
			},
			self.palette.text,
		);
	}

	fn palette(&self) -> Palette {
		self.palette
	}

	fn set_palette(&mut self, palette: Palette) {
		self.palette = palette;
	}

	fn drag(&mut self, dx: f64, dy: f64) {
		self.centroid = self.centroid.offset(dx, dy);
	}

	fn select(&mut self) {
		self.selected = true;
	}

	fn deselect(&mut self) {
		self.selected = false;
	}

	fn is_selected(&self) -> bool {
		self.selected
	}
}

/// One direction of one reaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
	pub bezier: Bezier,
	pub kind: String,
	pub arrow: Vec<Point>,
	pub line_width: f64,
	palette: Palette,
	selected: bool,
}

impl Curve {
	pub fn new(bezier: Bezier, arrow: Vec<Point>) -> Self {
		Self {
			bezier,
			kind: String::new(),
			arrow,
			line_width: 1.0,
			palette: Palette::new(Rgba::BLACK, Rgba::GREY),
			selected: false,
		}
	}

	fn from_json(json: &CurveJson, edge_id: &str) -> Option<Self> {
		if !json.bezier.is_finite() {
			warn!("Dropping curve of `{edge_id}` with non-finite control points");
			return None;
		}
		let arrow = if json.arrow.iter().all(|p| p.is_finite()) {
			json.arrow.clone()
		} else {
			warn!("Skipping malformed arrowhead on `{edge_id}`");
			Vec::new()
		};
		let mut curve = Self::new(json.bezier, arrow);
		curve.kind = json.kind.clone();
		Some(curve)
	}
}

impl Drawable for Curve {
	fn draw(&self, surface: &mut dyn Surface) {
		let stroke = if self.selected {
			self.palette.select
		} else {
			self.palette.edge
		};
		surface.stroke_bezier(&self.bezier, stroke, self.line_width);
		if !self.arrow.is_empty() {
			surface.fill_polygon(&self.arrow, self.palette.fill);
		}
	}

	fn palette(&self) -> Palette {
		self.palette
	}

	fn set_palette(&mut self, palette: Palette) {
		self.palette = palette;
	}

	fn drag(&mut self, dx: f64, dy: f64) {
		self.bezier.translate(dx, dy);
		for p in &mut self.arrow {
			*p = p.offset(dx, dy);
		}
	}

	fn select(&mut self) {
		self.selected = true;
	}

	fn deselect(&mut self) {
		self.selected = false;
	}

	fn is_selected(&self) -> bool {
		self.selected
	}
}

/// A reaction: a non-empty bundle of curves sharing one id.
#[derive(Clone, Debug, PartialEq)]
pub struct HyperEdge {
	pub id: String,
	pub rate: f64,
	curves: Vec<Curve>,
	selected: bool,
}

impl HyperEdge {
	pub fn new(id: impl Into<String>, rate: f64, curves: Vec<Curve>) -> Result<Self, PayloadError> {
		let id = id.into();
		if curves.is_empty() {
			return Err(PayloadError::EmptyHyperEdge(id));
		}
		Ok(Self {
			id,
			rate,
			curves,
			selected: false,
		})
	}

	pub fn from_json(json: &EdgeJson) -> Result<Self, PayloadError> {
		let curves = json
			.curves
			.iter()
			.filter_map(|c| Curve::from_json(c, &json.id))
			.collect();
		Self::new(json.id.clone(), json.rate, curves)
	}

	pub fn curves(&self) -> &[Curve] {
		&self.curves
	}

	pub fn set_line_width(&mut self, width: f64) {
		for curve in &mut self.curves {
			curve.line_width = width;
		}
	}

	pub fn set_curve_edge_color(&mut self, color: Rgba) {
		for curve in &mut self.curves {
			curve.palette.edge = color;
		}
	}

	pub fn set_curve_fill_color(&mut self, color: Rgba) {
		for curve in &mut self.curves {
			curve.palette.fill = color;
		}
	}
}

impl Drawable for HyperEdge {
	fn draw(&self, surface: &mut dyn Surface) {
		for curve in &self.curves {
			curve.draw(surface);
		}
	}

	fn palette(&self) -> Palette {
		self.curves[0].palette
	}

	fn set_palette(&mut self, palette: Palette) {
		for curve in &mut self.curves {
			curve.palette = palette;
		}
	}

	fn drag(&mut self, dx: f64, dy: f64) {
		for curve in &mut self.curves {
			curve.drag(dx, dy);
		}
	}

	fn select(&mut self) {
		self.selected = true;
		for curve in &mut self.curves {
			curve.select();
		}
	}

	fn deselect(&mut self) {
		self.selected = false;
		for curve in &mut self.curves {
			curve.deselect();
		}
	}

	fn is_selected(&self) -> bool {
		self.selected
	}

	fn contains(&mut self, surface: &mut dyn Surface, x: f64, y: f64) -> bool {
		self.curves
			.iter_mut()
			.any(|curve| curve.contains(surface, x, y))
	}
}

/// An entry of the diagram's shape list.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
	Node(Node),
	HyperEdge(HyperEdge),
}

impl Shape {
	pub fn id(&self) -> &str {
		match self {
			Shape::Node(n) => &n.id,
			Shape::HyperEdge(e) => &e.id,
		}
	}

	/// Label of the time series plotted when this shape is clicked in plot mode.
	pub fn series_label(&self) -> String {
		match self {
			Shape::Node(n) => n.series_label(),
			Shape::HyperEdge(e) => e.id.clone(),
		}
	}

	fn inner(&self) -> &dyn Drawable {
		match self {
			Shape::Node(n) => n,
			Shape::HyperEdge(e) => e,
		}
	}

	fn inner_mut(&mut self) -> &mut dyn Drawable {
		match self {
			Shape::Node(n) => n,
			Shape::HyperEdge(e) => e,
		}
	}
}

impl Drawable for Shape {
	fn draw(&self, surface: &mut dyn Surface) {
		self.inner().draw(surface);
	}

	fn palette(&self) -> Palette {
		self.inner().palette()
	}

	fn set_palette(&mut self, palette: Palette) {
		self.inner_mut().set_palette(palette);
	}

	fn drag(&mut self, dx: f64, dy: f64) {
		self.inner_mut().drag(dx, dy);
	}

	fn select(&mut self) {
		self.inner_mut().select();
	}

	fn deselect(&mut self) {
		self.inner_mut().deselect();
	}

	fn is_selected(&self) -> bool {
		self.inner().is_selected()
	}

	fn contains(&mut self, surface: &mut dyn Surface, x: f64, y: f64) -> bool {
		self.inner_mut().contains(surface, x, y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(value: f64) -> Node {
		let json = NodeJson {
			id: "A".into(),
			centroid: Point::new(100.0, 100.0),
			width: 40.0,
			height: 20.0,
			value,
			boundary: false,
		};
		Node::new(&json, &Gradient::default()).unwrap()
	}

	fn curve() -> Curve {
		Curve::new(
			Bezier {
				start: Point::new(0.0, 0.0),
				cp1: Point::new(10.0, 0.0),
				cp2: Point::new(20.0, 10.0),
				end: Point::new(30.0, 10.0),
			},
			Vec::new(),
		)
	}

	#[test]
	fn bounds_follow_centroid() {
		let mut n = node(5.0);
		assert_eq!(n.bounds(), Rect::new(80.0, 90.0, 40.0, 20.0));
		n.drag(5.0, -5.0);
		assert_eq!((n.x(), n.y()), (85.0, 85.0));
		assert_eq!(n.centroid(), Point::new(105.0, 95.0));
	}

	#[test]
	fn unusable_values_fall_back() {
		assert_eq!(node(0.0).palette().fill, FALLBACK_COLOR);
		assert_eq!(node(f64::NAN).palette().fill, FALLBACK_COLOR);
		let mut n = node(5.0);
		n.set_value(f64::NAN, &Gradient::default());
		assert_eq!(n.palette().fill, FALLBACK_COLOR);
		n.set_value(-1.0, &Gradient::default());
		assert_eq!(n.palette().fill, FALLBACK_COLOR);
	}

	#[test]
	fn value_maps_into_its_decade() {
		let g = Gradient::default();
		let mut n = node(1.0);
		assert_eq!(n.palette().fill, g.lo);
		n.set_value(10.0, &g);
		assert_eq!(n.palette().fill, g.hi);
		n.set_value(5.5, &g);
		assert_eq!(n.palette().fill, g.color_at(0.5));
	}

	#[test]
	fn first_usable_value_sets_the_bracket() {
		let g = Gradient::default();
		let mut n = node(0.0);
		n.set_value(50.0, &g);
		assert_eq!(n.palette().fill, g.color_at(40.0 / 90.0));
	}

	#[test]
	fn boundary_nodes_ignore_value() {
		let json = NodeJson {
			id: "X".into(),
			centroid: Point::new(0.0, 0.0),
			width: 10.0,
			height: 10.0,
			value: 3.0,
			boundary: true,
		};
		let mut n = Node::new(&json, &Gradient::default()).unwrap();
		assert_eq!(n.palette().fill, BOUNDARY_COLOR);
		n.set_value(7.0, &Gradient::default());
		assert_eq!(n.palette().fill, BOUNDARY_COLOR);
	}

	#[test]
	fn non_finite_node_geometry_is_rejected() {
		let json = NodeJson {
			id: "bad".into(),
			centroid: Point::new(f64::NAN, 0.0),
			width: 10.0,
			height: 10.0,
			value: 1.0,
			boundary: false,
		};
		assert_eq!(
			Node::new(&json, &Gradient::default()),
			Err(PayloadError::NodeGeometry("bad".into()))
		);
	}

	#[test]
	fn hyperedge_select_fans_out() {
		let mut e = HyperEdge::new("r1", 1.0, vec![curve(), curve(), curve()]).unwrap();
		e.select();
		assert!(e.is_selected());
		assert!(e.curves().iter().all(Curve::is_selected));
		e.deselect();
		assert!(!e.is_selected());
		assert!(e.curves().iter().all(|c| !c.is_selected()));
	}

	#[test]
	fn hyperedge_setters_fan_out() {
		let mut e = HyperEdge::new("r1", 1.0, vec![curve(), curve()]).unwrap();
		e.set_line_width(4.0);
		e.set_curve_edge_color(Rgba::GREEN);
		e.set_curve_fill_color(Rgba::WHITE);
		for c in e.curves() {
			assert_eq!(c.line_width, 4.0);
			assert_eq!(c.palette().edge, Rgba::GREEN);
			assert_eq!(c.palette().fill, Rgba::WHITE);
		}
	}

	#[test]
	fn empty_hyperedge_is_rejected() {
		assert_eq!(
			HyperEdge::new("r0", 1.0, Vec::new()),
			Err(PayloadError::EmptyHyperEdge("r0".into()))
		);
	}

	#[test]
	fn malformed_arrow_is_dropped_not_fatal() {
		let json = EdgeJson {
			id: "r2".into(),
			rate: 1.0,
			curves: vec![CurveJson {
				bezier: curve().bezier,
				kind: "substrate".into(),
				arrow: vec![Point::new(f64::NAN, 1.0)],
			}],
		};
		let e = HyperEdge::from_json(&json).unwrap();
		assert!(e.curves()[0].arrow.is_empty());
		assert_eq!(e.curves()[0].kind, "substrate");
	}

	#[test]
	fn series_labels() {
		let n = Shape::Node(node(1.0));
		let e = Shape::HyperEdge(HyperEdge::new("r1", 1.0, vec![curve()]).unwrap());
		assert_eq!(n.series_label(), "[A]");
		assert_eq!(e.series_label(), "r1");
	}
}
