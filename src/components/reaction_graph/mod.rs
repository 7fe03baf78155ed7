//! The reaction network diagram: shapes, viewport, picking and pointer handling.

mod component;
pub mod controller;
pub mod picking;
pub mod render;
pub mod shape;
pub mod state;
pub mod types;
pub mod viewport;

pub use component::ReactionGraphCanvas;
pub use controller::{Intent, InteractionController, InteractionMode, InteractionState, PointerInput};
pub use render::render;
pub use state::{LegendEntry, ReactionGraphState, ShapeKind};
pub use types::{
	ControlMessage, DiagramSnapshot, LayoutReply, ParamQuery, ParamUpdate, RedrawRequest, RepositionRequest,
	RunRequest, RunResult, StreamPoint, StreamStart,
};
pub use viewport::Viewport;
