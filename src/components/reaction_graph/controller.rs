use log::debug;

use super::state::ReactionGraphState;
use super::types::RepositionRequest;
use crate::geometry::Point;

/// What a click on a shape does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
	#[default]
	Select,
	Plot,
}

/// Pointer gesture in progress. Anchors are surface-local pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
	#[default]
	Idle,
	Panning {
		anchor: Point,
	},
	Dragging {
		id: String,
		anchor: Point,
	},
}

/// Side effects the controller asks its owner to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// A shape was pressed; `additive` when shift was held.
	Click { index: usize, additive: bool },
	/// Ask the layout service to move a shape. Geometry is left alone here.
	Reposition(RepositionRequest),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
	pub position: Point,
	pub shift: bool,
}

/// Turns pointer events into viewport changes and intents.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	state: InteractionState,
}

impl InteractionController {
	pub fn state(&self) -> &InteractionState {
		&self.state
	}

	pub fn pointer_down(
		&mut self,
		graph: &mut ReactionGraphState,
		input: PointerInput,
	) -> Option<Intent> {
		graph.viewport_mut().invalidate();
		match graph.shape_at(input.position) {
			Some(index) => {
				let id = graph.shapes()[index].id().to_string();
				debug!("Pressed {id}");
				self.state = InteractionState::Dragging {
					id,
					anchor: input.position,
				};
				Some(Intent::Click {
					index,
					additive: input.shift,
				})
			}
			None => {
				self.state = InteractionState::Panning {
					anchor: input.position,
				};
				None
			}
		}
	}

	pub fn pointer_move(
		&mut self,
		graph: &mut ReactionGraphState,
		position: Point,
	) -> Option<Intent> {
		match &mut self.state {
			InteractionState::Idle => None,
			InteractionState::Panning { anchor } => {
				let (dx, dy) = (position.x - anchor.x, position.y - anchor.y);
				*anchor = position;
				graph.viewport_mut().pan(dx, dy);
				None
			}
			InteractionState::Dragging { id, anchor } => {
				let scale = graph.viewport().scale();
				let (dx, dy) = (
					(position.x - anchor.x) / scale,
					(position.y - anchor.y) / scale,
				);
				*anchor = position;
				if dx == 0.0 && dy == 0.0 {
					return None;
				}
				Some(Intent::Reposition(RepositionRequest {
					id: id.clone(),
					dx,
					dy,
				}))
			}
		}
	}

	pub fn pointer_up(&mut self) {
		self.state = InteractionState::Idle;
	}

	pub fn pointer_leave(&mut self) {
		self.state = InteractionState::Idle;
	}

	/// Zooms about `position`; the gesture in progress is kept.
	pub fn wheel(&mut self, graph: &mut ReactionGraphState, position: Point, delta_y: f64) {
		let viewport = graph.viewport_mut();
		viewport.zoom_at(position, delta_y);
		viewport.invalidate();
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::color::Gradient;
	use crate::components::reaction_graph::types::DiagramSnapshot;
	use crate::components::reaction_graph::viewport::Viewport;

	fn graph() -> ReactionGraphState {
		let snapshot: DiagramSnapshot = serde_json::from_str(
			r#"{"nodes": [{"id": "A", "centroid": [100, 100], "width": 40, "height": 20, "value": 5}], "edges": []}"#,
		)
		.unwrap();
		let mut g = ReactionGraphState::new(Viewport::new(400, 400), Gradient::default());
		g.load_snapshot(&snapshot);
		g
	}

	fn press(at: (f64, f64), shift: bool) -> PointerInput {
		PointerInput {
			position: Point::new(at.0, at.1),
			shift,
		}
	}

	#[test]
	fn press_on_shape_clicks_and_drags() {
		let mut g = graph();
		let mut c = InteractionController::default();
		let intent = c.pointer_down(&mut g, press((100.0, 100.0), true));
		assert_eq!(
			intent,
			Some(Intent::Click {
				index: 0,
				additive: true
			})
		);
		assert!(matches!(c.state(), InteractionState::Dragging { id, .. } if id == "A"));
	}

	#[test]
	fn press_on_background_pans() {
		let mut g = graph();
		let mut c = InteractionController::default();
		assert_eq!(c.pointer_down(&mut g, press((10.0, 10.0), false)), None);
		assert!(matches!(c.state(), InteractionState::Panning { .. }));
		c.pointer_move(&mut g, Point::new(30.0, 0.0));
		assert_eq!(g.viewport().origin(), Point::new(-20.0, 10.0));
		assert!(!g.viewport().is_valid());
	}

	#[test]
	fn pan_at_scale_two_moves_half_the_world_distance() {
		let mut g = graph();
		g.viewport_mut().zoom_at(Point::default(), 240.0);
		assert_eq!(g.viewport().scale(), 2.0);
		let before = g.viewport().origin();
		let mut c = InteractionController::default();
		c.pointer_down(&mut g, press((290.0, 190.0), false));
		c.pointer_move(&mut g, Point::new(270.0, 190.0));
		assert_eq!(g.viewport().origin(), before.offset(10.0, 0.0));
	}

	#[test]
	fn drag_emits_world_deltas_and_leaves_geometry() {
		let mut g = graph();
		g.viewport_mut().zoom_at(Point::default(), 240.0);
		let at = g.viewport().to_screen(Point::new(100.0, 100.0));
		let mut c = InteractionController::default();
		c.pointer_down(&mut g, press((at.x, at.y), false));
		let intent = c.pointer_move(&mut g, at.offset(10.0, -4.0));
		assert_eq!(
			intent,
			Some(Intent::Reposition(RepositionRequest {
				id: "A".into(),
				dx: 5.0,
				dy: -2.0
			}))
		);
		assert_eq!(g.nodes().next().unwrap().centroid(), Point::new(100.0, 100.0));
		// no movement, no request
		assert_eq!(c.pointer_move(&mut g, at.offset(10.0, -4.0)), None);
	}

	#[test]
	fn leave_and_up_always_return_to_idle() {
		let mut g = graph();
		let mut c = InteractionController::default();
		c.pointer_down(&mut g, press((100.0, 100.0), false));
		c.pointer_leave();
		assert_eq!(c.state(), &InteractionState::Idle);
		c.pointer_down(&mut g, press((5.0, 5.0), false));
		c.pointer_up();
		assert_eq!(c.state(), &InteractionState::Idle);
		assert_eq!(c.pointer_move(&mut g, Point::new(50.0, 50.0)), None);
	}

	#[test]
	fn wheel_keeps_gesture() {
		let mut g = graph();
		let mut c = InteractionController::default();
		c.pointer_down(&mut g, press((5.0, 5.0), false));
		g.viewport_mut().mark_valid();
		c.wheel(&mut g, Point::new(50.0, 50.0), -120.0);
		assert_eq!(g.viewport().scale(), 0.5);
		assert!(!g.viewport().is_valid());
		assert!(matches!(c.state(), InteractionState::Panning { .. }));
	}
}
