//! Everything one open diagram owns: shapes, gesture, series and chart.

use log::{debug, info, warn};

use crate::components::reaction_graph::{
	Intent, InteractionController, InteractionMode, LayoutReply, PointerInput, ReactionGraphState,
	RepositionRequest, RunRequest, RunResult, StreamPoint, Viewport, render as render_graph,
};
use crate::components::time_chart::{ChartBinder, render as render_chart};
use crate::config::ViewerConfig;
use crate::geometry::Point;
use crate::surface::Surface;
use crate::time_series::TimeSeriesStore;

/// Where series come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationMode {
	/// A finished run replaces the store.
	#[default]
	Offline,
	/// Points arrive one by one over the stream channel.
	Online,
}

pub struct Session {
	graph: ReactionGraphState,
	controller: InteractionController,
	mode: InteractionMode,
	store: TimeSeriesStore,
	chart: ChartBinder,
	sim_mode: SimulationMode,
	params: Vec<String>,
	sbml: Option<String>,
	last_run: Option<RunRequest>,
	/// Bumped whenever the series are reset or a run is issued. Run results
	/// carry the value they were issued under and are dropped once it moves.
	generation: u64,
	optimistic_drag: bool,
}

impl Session {
	pub fn new(config: &ViewerConfig) -> Self {
		let viewport = Viewport::new(config.canvas_width as u32, config.canvas_height as u32)
			.with_limits(config.min_scale, config.max_scale);
		Self {
			graph: ReactionGraphState::new(viewport, config.gradient()),
			controller: InteractionController::default(),
			mode: InteractionMode::default(),
			store: TimeSeriesStore::default(),
			chart: ChartBinder::default(),
			sim_mode: SimulationMode::default(),
			params: Vec::new(),
			sbml: None,
			last_run: None,
			generation: 0,
			optimistic_drag: config.optimistic_drag,
		}
	}

	pub fn graph(&self) -> &ReactionGraphState {
		&self.graph
	}

	pub fn graph_mut(&mut self) -> &mut ReactionGraphState {
		&mut self.graph
	}

	pub fn store(&self) -> &TimeSeriesStore {
		&self.store
	}

	pub fn chart(&self) -> &ChartBinder {
		&self.chart
	}

	pub fn mode(&self) -> InteractionMode {
		self.mode
	}

	pub fn sim_mode(&self) -> SimulationMode {
		self.sim_mode
	}

	/// Tunable parameter names from the latest run.
	pub fn params(&self) -> &[String] {
		&self.params
	}

	/// Model text that came with the latest layout.
	pub fn sbml(&self) -> Option<&str> {
		self.sbml.as_deref()
	}

	pub fn last_run(&self) -> Option<&RunRequest> {
		self.last_run.as_ref()
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn apply_layout(&mut self, reply: LayoutReply) {
		self.graph.load_snapshot(&reply.layout);
		if reply.sbml.is_some() {
			self.sbml = reply.sbml;
		}
	}

	// Pointer input. Only a drag produces a request for the layout service.

	pub fn pointer_down(&mut self, input: PointerInput) {
		if let Some(Intent::Click { index, additive }) =
			self.controller.pointer_down(&mut self.graph, input)
		{
			self.click_shape(index, additive);
		}
	}

	pub fn pointer_move(&mut self, position: Point) -> Option<RepositionRequest> {
		match self.controller.pointer_move(&mut self.graph, position)? {
			Intent::Reposition(request) => {
				if self.optimistic_drag {
					self.graph.drag_shape(&request.id, request.dx, request.dy);
				}
				Some(request)
			}
			Intent::Click { .. } => None,
		}
	}

	pub fn pointer_up(&mut self) {
		self.controller.pointer_up();
	}

	pub fn pointer_leave(&mut self) {
		self.controller.pointer_leave();
	}

	pub fn wheel(&mut self, position: Point, delta_y: f64) {
		self.controller.wheel(&mut self.graph, position, delta_y);
	}

	/// Clicks shape `index` as if pressed on the canvas.
	pub fn click_shape(&mut self, index: usize, additive: bool) {
		let Some(shape) = self.graph.shape(index) else {
			return;
		};
		debug!("Click {} ({:?}, additive: {additive})", shape.id(), self.mode);
		match self.mode {
			InteractionMode::Select => {
				if !additive {
					self.graph.clear_selection();
				}
				self.graph.toggle_selection(index);
			}
			InteractionMode::Plot => {
				let label = shape.series_label();
				if !additive {
					self.chart.unplot_all();
				}
				self.chart.toggle(&self.store, &label);
			}
		}
	}

	/// Selects every shape, or plots every series in plot mode.
	pub fn select_all(&mut self) {
		match self.mode {
			InteractionMode::Select => self.graph.select_all(),
			InteractionMode::Plot => self.chart.plot_all(&self.store),
		}
	}

	pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
		self.mode = mode;
	}

	/// Switches the series source. Any previous series and plots are dropped.
	pub fn set_sim_mode(&mut self, mode: SimulationMode) {
		if self.sim_mode != mode {
			info!("Simulation mode: {mode:?}");
			self.sim_mode = mode;
			self.generation += 1;
			self.reset_series();
		}
	}

	/// Clears the store and chart ahead of a new run. Returns the generation
	/// the run's result must be loaded under.
	pub fn begin_run(&mut self, request: Option<RunRequest>) -> u64 {
		if request.is_some() {
			self.last_run = request;
		}
		self.generation += 1;
		self.reset_series();
		self.generation
	}

	/// Reissues the last offline run, keeping the current plots. Earlier
	/// results still in flight go stale.
	pub fn begin_rerun(&mut self) -> Option<(RunRequest, u64)> {
		if self.sim_mode != SimulationMode::Offline {
			return None;
		}
		let request = self.last_run.clone()?;
		self.generation += 1;
		Some((request, self.generation))
	}

	fn reset_series(&mut self) {
		self.store.clear();
		self.chart.unplot_all();
		let window = self.chart.window();
		self.chart.replot(&self.store, window);
	}

	/// Loads a run result issued under `generation`. Returns false, leaving
	/// the store untouched, if a newer run or a mode switch superseded it.
	pub fn load_run(&mut self, generation: u64, result: RunResult) -> bool {
		if generation != self.generation {
			warn!("Dropping stale run result ({generation}, now {})", self.generation);
			return false;
		}
		self.params = result.params.clone();
		let (series, time) = result.into_series();
		info!("Run loaded: {} series, {} samples", series.len(), time.len());
		self.store.load(series, time);
		let window = self.chart.window();
		self.chart.replot(&self.store, window);
		true
	}

	pub fn push_stream_point(&mut self, point: &StreamPoint) {
		self.store.append(point);
		let window = self.chart.window();
		self.chart.replot(&self.store, window);
	}

	/// Limits the chart to the trailing `window` samples; `None` shows all.
	pub fn set_window(&mut self, window: Option<usize>) {
		self.chart.replot(&self.store, window);
	}

	pub fn set_timepoint(&mut self, index: usize) {
		self.graph.set_timepoint(&self.store, index);
	}

	/// Redraws the diagram if it changed. Returns whether a frame was drawn.
	pub fn tick_graph(&mut self, surface: &mut dyn Surface) -> bool {
		render_graph(&mut self.graph, surface)
	}

	/// Redraws the chart if its bound data changed.
	pub fn tick_chart(&mut self, surface: &mut dyn Surface) -> bool {
		if !self.chart.take_dirty() {
			return false;
		}
		render_chart(&self.chart, surface);
		true
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::surface::PixmapSurface;

	const LAYOUT: &str = r#"{
		"layout": {
			"nodes": [
				{"id": "A", "centroid": [100, 100], "width": 40, "height": 20, "value": 5},
				{"id": "B", "centroid": [300, 100], "width": 40, "height": 20, "value": 50}
			],
			"edges": [
				{"id": "r1", "rate": 1.0, "curves": [
					{"bezier": {"start": [120, 100.5], "cp1": [180, 100.5], "cp2": [220, 100.5], "end": [280, 100.5]},
					 "type": "product", "arrow": [[280, 100], [270, 95], [270, 105]]}
				]}
			]
		},
		"sbml": "<sbml/>"
	}"#;

	fn session() -> Session {
		let config = ViewerConfig {
			canvas_width: 400.0,
			canvas_height: 200.0,
			..ViewerConfig::default()
		};
		let mut s = Session::new(&config);
		s.apply_layout(serde_json::from_str(LAYOUT).unwrap());
		s
	}

	fn point(time: f64, a: f64, b: f64) -> StreamPoint {
		serde_json::from_str(&format!(r#"{{"time": {time}, "[A]": {a}, "[B]": {b}}}"#)).unwrap()
	}

	fn press(x: f64, y: f64, shift: bool) -> PointerInput {
		PointerInput {
			position: Point::new(x, y),
			shift,
		}
	}

	#[test]
	fn streamed_points_plot_in_order() {
		let mut s = session();
		s.set_sim_mode(SimulationMode::Online);
		s.push_stream_point(&point(0.0, 5.0, 50.0));
		s.push_stream_point(&point(1.0, 4.0, 55.0));
		s.set_interaction_mode(InteractionMode::Plot);
		s.pointer_down(press(100.0, 100.0, false));
		let a = s.chart().dataset("[A]").unwrap();
		assert_eq!(a.data, vec![5.0, 4.0]);
		assert_eq!(s.chart().time_axis(), &[0.0, 1.0]);
		assert_eq!(s.sbml(), Some("<sbml/>"));
	}

	#[test]
	fn select_click_replaces_unless_shift() {
		let mut s = session();
		s.pointer_down(press(100.0, 100.0, false));
		s.pointer_up();
		s.pointer_down(press(300.0, 100.0, false));
		s.pointer_up();
		assert_eq!(s.graph().selection().len(), 1);
		assert!(s.graph().is_selected(1));
		s.pointer_down(press(100.0, 100.0, true));
		assert_eq!(s.graph().selection().len(), 2);
	}

	#[test]
	fn plot_click_uses_series_labels() {
		let mut s = session();
		s.set_interaction_mode(InteractionMode::Plot);
		let r1 = s.graph().position_of("r1").unwrap();
		s.click_shape(0, false);
		s.click_shape(r1, true);
		let labels: Vec<_> = s.chart().datasets().iter().map(|d| d.label.clone()).collect();
		assert_eq!(labels, vec!["[A]", "r1"]);
		s.click_shape(1, false);
		let labels: Vec<_> = s.chart().datasets().iter().map(|d| d.label.clone()).collect();
		assert_eq!(labels, vec!["[B]"]);
		assert!(s.graph().selection().is_empty());
	}

	#[test]
	fn select_all_follows_mode() {
		let mut s = session();
		let generation = s.begin_run(None);
		assert!(s.load_run(
			generation,
			serde_json::from_str(r#"{"data": {"[A]": [1, 2], "[B]": [3, 4], "time": [0, 1]}, "params": ["k1"]}"#)
				.unwrap(),
		));
		s.select_all();
		assert_eq!(s.graph().selection().len(), 3);
		assert!(!s.chart().is_visible());
		s.set_interaction_mode(InteractionMode::Plot);
		s.select_all();
		assert_eq!(s.chart().datasets().len(), 2);
		assert_eq!(s.params(), &["k1".to_string()]);
	}

	#[test]
	fn mode_switch_resets_series() {
		let mut s = session();
		s.push_stream_point(&point(0.0, 5.0, 50.0));
		s.set_interaction_mode(InteractionMode::Plot);
		s.click_shape(0, false);
		s.set_sim_mode(SimulationMode::Online);
		assert!(s.store().is_empty());
		assert!(!s.chart().is_visible());
	}

	#[test]
	fn drag_requests_world_deltas_without_moving() {
		let mut s = session();
		s.pointer_down(press(100.0, 100.0, false));
		let request = s.pointer_move(Point::new(110.0, 96.0)).unwrap();
		assert_eq!(
			request,
			RepositionRequest {
				id: "A".into(),
				dx: 10.0,
				dy: -4.0
			}
		);
		assert_eq!(s.graph().nodes().next().unwrap().centroid(), Point::new(100.0, 100.0));
		s.pointer_leave();
		assert_eq!(s.pointer_move(Point::new(120.0, 96.0)), None);
	}

	#[test]
	fn optimistic_drag_moves_locally() {
		let config = ViewerConfig {
			canvas_width: 400.0,
			canvas_height: 200.0,
			optimistic_drag: true,
			..ViewerConfig::default()
		};
		let mut s = Session::new(&config);
		s.apply_layout(serde_json::from_str(LAYOUT).unwrap());
		s.pointer_down(press(100.0, 100.0, false));
		s.pointer_move(Point::new(110.0, 100.0));
		assert_eq!(s.graph().nodes().next().unwrap().centroid(), Point::new(110.0, 100.0));
	}

	#[test]
	fn ticks_draw_only_when_dirty() {
		let mut s = session();
		let mut graph_surface = PixmapSurface::new(400, 200).unwrap();
		let mut chart_surface = PixmapSurface::new(200, 100).unwrap();
		assert!(s.tick_graph(&mut graph_surface));
		assert!(!s.tick_graph(&mut graph_surface));
		s.wheel(Point::new(10.0, 10.0), 120.0);
		assert!(s.tick_graph(&mut graph_surface));

		assert!(!s.tick_chart(&mut chart_surface));
		s.set_window(Some(10));
		assert!(s.tick_chart(&mut chart_surface));
		assert!(!s.tick_chart(&mut chart_surface));
	}

	#[test]
	fn run_request_is_remembered() {
		let mut s = session();
		s.push_stream_point(&point(0.0, 5.0, 50.0));
		let request = RunRequest {
			start: 0.0,
			end: 10.0,
			steps: 100,
		};
		s.begin_run(Some(request.clone()));
		assert!(s.store().is_empty());
		s.begin_run(None);
		assert_eq!(s.last_run(), Some(&request));
	}

	#[test]
	fn late_run_result_does_not_touch_the_stream() {
		let mut s = session();
		let offline = s.begin_run(Some(RunRequest {
			start: 0.0,
			end: 10.0,
			steps: 2,
		}));
		s.set_sim_mode(SimulationMode::Online);
		s.begin_run(None);
		s.push_stream_point(&point(0.0, 5.0, 50.0));
		let late: RunResult =
			serde_json::from_str(r#"{"data": {"[OLD]": [1, 2, 3]}, "time": [0, 1, 2]}"#).unwrap();
		assert!(!s.load_run(offline, late));
		s.push_stream_point(&point(1.0, 4.0, 55.0));

		assert_eq!(s.store().labels().collect::<Vec<_>>(), vec!["[A]", "[B]"]);
		assert_eq!(s.store().time(), &[0.0, 1.0]);
		assert_eq!(s.store().series("[A]"), Some(&[5.0, 4.0][..]));
	}

	#[test]
	fn rerun_supersedes_earlier_results() {
		let mut s = session();
		assert_eq!(s.begin_rerun(), None);
		let request = RunRequest {
			start: 0.0,
			end: 1.0,
			steps: 1,
		};
		let first = s.begin_run(Some(request.clone()));
		let (again, second) = s.begin_rerun().unwrap();
		assert_eq!(again, request);
		let result = || -> RunResult {
			serde_json::from_str(r#"{"data": {"[A]": [1, 2]}, "time": [0, 1]}"#).unwrap()
		};
		assert!(!s.load_run(first, result()));
		assert!(s.load_run(second, result()));
		assert_eq!(s.store().len(), 2);

		s.set_sim_mode(SimulationMode::Online);
		assert_eq!(s.begin_rerun(), None);
	}
}
