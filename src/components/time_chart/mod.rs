//! Line chart of the plotted series.

pub mod binder;
mod component;
pub mod render;

pub use binder::{ChartBinder, Dataset};
pub use component::TimeChart;
pub use render::render;
