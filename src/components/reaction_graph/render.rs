use super::shape::{Drawable, Shape};
use super::state::ReactionGraphState;
use super::viewport::Viewport;
use crate::surface::Surface;

/// Redraws the diagram if anything changed since the last frame.
///
/// Returns whether a frame was drawn.
pub fn render(state: &mut ReactionGraphState, surface: &mut dyn Surface) -> bool {
	if state.viewport().is_valid() {
		return false;
	}
	render_shapes(state.shapes(), state.viewport(), surface);
	state.viewport_mut().mark_valid();
	true
}

/// Clears `surface` and draws `shapes` in insertion order under the viewport transform.
pub fn render_shapes(shapes: &[Shape], viewport: &Viewport, surface: &mut dyn Surface) {
	surface.clear();
	surface.set_transform(viewport.scale(), viewport.origin());
	for shape in shapes {
		shape.draw(surface);
	}
}
