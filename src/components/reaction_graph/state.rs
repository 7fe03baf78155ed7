use std::collections::HashSet;

use log::{info, warn};

use super::picking::Picker;
use super::shape::{Drawable, HyperEdge, Node, Shape};
use super::types::DiagramSnapshot;
use super::viewport::Viewport;
use crate::color::{Gradient, Rgba};
use crate::geometry::Point;
use crate::time_series::TimeSeriesStore;

/// Kind of a legend entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
	Species,
	Reaction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
	pub index: usize,
	pub id: String,
	pub kind: ShapeKind,
}

/// The diagram: shape list, selection, viewport and pick surface.
pub struct ReactionGraphState {
	shapes: Vec<Shape>,
	selection: HashSet<usize>,
	viewport: Viewport,
	picker: Picker,
	gradient: Gradient,
	line_width: f64,
}

impl ReactionGraphState {
	pub fn new(viewport: Viewport, gradient: Gradient) -> Self {
		let (width, height) = viewport.size();
		Self {
			shapes: Vec::new(),
			selection: HashSet::new(),
			picker: Picker::new(width, height),
			viewport,
			gradient,
			line_width: 1.0,
		}
	}

	/// Replaces the diagram with `snapshot`. Shapes whose ids were selected
	/// before stay selected; malformed nodes and edges are skipped.
	pub fn load_snapshot(&mut self, snapshot: &DiagramSnapshot) {
		let selected: HashSet<String> = self
			.selection
			.iter()
			.filter_map(|&i| self.shapes.get(i))
			.map(|s| s.id().to_string())
			.collect();
		self.clear();

		for json in &snapshot.nodes {
			match Node::new(json, &self.gradient) {
				Ok(node) => self.add_shape(Shape::Node(node)),
				Err(e) => warn!("Skipping node: {e}"),
			}
		}
		for json in &snapshot.edges {
			match HyperEdge::from_json(json) {
				Ok(mut edge) => {
					edge.set_line_width(self.line_width);
					self.add_shape(Shape::HyperEdge(edge));
				}
				Err(e) => warn!("Skipping hyperedge: {e}"),
			}
		}

		for index in 0..self.shapes.len() {
			if selected.contains(self.shapes[index].id()) {
				self.select_shape(index);
			}
		}
		info!(
			"Diagram loaded: {} nodes, {} reactions",
			self.nodes().count(),
			self.hyperedges().count()
		);
	}

	pub fn add_shape(&mut self, shape: Shape) {
		self.shapes.push(shape);
		self.viewport.invalidate();
	}

	pub fn clear(&mut self) {
		self.shapes.clear();
		self.selection.clear();
		self.viewport.invalidate();
	}

	pub fn shapes(&self) -> &[Shape] {
		&self.shapes
	}

	pub fn shape(&self, index: usize) -> Option<&Shape> {
		self.shapes.get(index)
	}

	pub fn position_of(&self, id: &str) -> Option<usize> {
		self.shapes.iter().position(|s| s.id() == id)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.shapes.iter().filter_map(|s| match s {
			Shape::Node(n) => Some(n),
			Shape::HyperEdge(_) => None,
		})
	}

	pub fn hyperedges(&self) -> impl Iterator<Item = &HyperEdge> {
		self.shapes.iter().filter_map(|s| match s {
			Shape::HyperEdge(e) => Some(e),
			Shape::Node(_) => None,
		})
	}

	fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
		self.shapes.iter_mut().filter_map(|s| match s {
			Shape::Node(n) => Some(n),
			Shape::HyperEdge(_) => None,
		})
	}

	fn hyperedges_mut(&mut self) -> impl Iterator<Item = &mut HyperEdge> {
		self.shapes.iter_mut().filter_map(|s| match s {
			Shape::HyperEdge(e) => Some(e),
			Shape::Node(_) => None,
		})
	}

	pub fn legend(&self) -> Vec<LegendEntry> {
		self.shapes
			.iter()
			.enumerate()
			.map(|(index, s)| LegendEntry {
				index,
				id: s.id().to_string(),
				kind: match s {
					Shape::Node(_) => ShapeKind::Species,
					Shape::HyperEdge(_) => ShapeKind::Reaction,
				},
			})
			.collect()
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn viewport_mut(&mut self) -> &mut Viewport {
		&mut self.viewport
	}

	pub fn resize(&mut self, width: u32, height: u32) {
		self.viewport.resize(width, height);
		self.picker.resize(width, height);
	}

	/// Shape under surface point `at`, if any.
	pub fn shape_at(&mut self, at: Point) -> Option<usize> {
		self.picker.hit_test(&mut self.shapes, &self.viewport, at)
	}

	/// Moves a shape locally. Only used when drags are applied optimistically.
	pub fn drag_shape(&mut self, id: &str, dx: f64, dy: f64) {
		if let Some(index) = self.position_of(id) {
			self.shapes[index].drag(dx, dy);
			self.viewport.invalidate();
		}
	}

	// Selection. Flags and the set only change together here.

	pub fn selection(&self) -> &HashSet<usize> {
		&self.selection
	}

	pub fn is_selected(&self, index: usize) -> bool {
		self.selection.contains(&index)
	}

	pub fn select_shape(&mut self, index: usize) {
		if let Some(shape) = self.shapes.get_mut(index) {
			shape.select();
			self.selection.insert(index);
			self.viewport.invalidate();
		}
	}

	pub fn deselect_shape(&mut self, index: usize) {
		if let Some(shape) = self.shapes.get_mut(index) {
			shape.deselect();
			self.selection.remove(&index);
			self.viewport.invalidate();
		}
	}

	pub fn toggle_selection(&mut self, index: usize) {
		if self.is_selected(index) {
			self.deselect_shape(index);
		} else {
			self.select_shape(index);
		}
	}

	pub fn clear_selection(&mut self) {
		for index in std::mem::take(&mut self.selection) {
			if let Some(shape) = self.shapes.get_mut(index) {
				shape.deselect();
			}
		}
		self.viewport.invalidate();
	}

	pub fn select_all(&mut self) {
		for index in 0..self.shapes.len() {
			self.select_shape(index);
		}
	}

	// Whole-class recolouring driven by the colour inputs.

	pub fn gradient(&self) -> Gradient {
		self.gradient
	}

	pub fn set_gradient(&mut self, gradient: Gradient) {
		self.gradient = gradient;
		for node in self.nodes_mut() {
			node.recolor(&gradient);
		}
		self.viewport.invalidate();
	}

	pub fn set_node_fill_color(&mut self, color: Rgba) {
		for node in self.nodes_mut() {
			node.set_fill_color(color);
		}
		self.viewport.invalidate();
	}

	pub fn set_node_edge_color(&mut self, color: Rgba) {
		for node in self.nodes_mut() {
			node.set_edge_color(color);
		}
		self.viewport.invalidate();
	}

	pub fn set_hyperedge_fill_color(&mut self, color: Rgba) {
		for edge in self.hyperedges_mut() {
			edge.set_curve_fill_color(color);
		}
		self.viewport.invalidate();
	}

	pub fn set_hyperedge_edge_color(&mut self, color: Rgba) {
		for edge in self.hyperedges_mut() {
			edge.set_curve_edge_color(color);
		}
		self.viewport.invalidate();
	}

	pub fn set_line_width(&mut self, width: f64) {
		if !(width.is_finite() && width > 0.0) {
			return;
		}
		self.line_width = width;
		for edge in self.hyperedges_mut() {
			edge.set_line_width(width);
		}
		self.viewport.invalidate();
	}

	/// Shows each node's value at sample `index` of its `[id]` series.
	/// Nodes without a series, or past its end, fall back to the neutral colour.
	pub fn set_timepoint(&mut self, store: &TimeSeriesStore, index: usize) {
		let gradient = self.gradient;
		for node in self.nodes_mut() {
			let value = store
				.series(&node.series_label())
				.and_then(|s| s.get(index).copied())
				.unwrap_or(f64::NAN);
			node.set_value(value, &gradient);
		}
		self.viewport.invalidate();
	}
}
