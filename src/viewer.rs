//! Binds a [`Session`] to the service client and the page's reactive state.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info, warn};
use wasm_bindgen_futures::spawn_local;

use crate::color::{Gradient, Rgba};
use crate::components::reaction_graph::{
	ControlMessage, InteractionMode, LegendEntry, ParamUpdate, PointerInput, RedrawRequest,
	RepositionRequest, RunRequest, StreamStart,
};
use crate::config::ViewerConfig;
use crate::geometry::Point;
use crate::params::ParamControl;
use crate::session::{Session, SimulationMode};
use crate::surface::{CanvasSurface, Surface};
use crate::transport::{ApiClient, StreamChannel};

/// Shared handle the components and controls talk to.
///
/// Session state lives behind `Rc<RefCell<_>>`; the signals mirror the parts
/// of it the page renders as lists and toggles.
#[derive(Clone)]
pub struct Viewer {
	session: Rc<RefCell<Session>>,
	api: ApiClient,
	config: Rc<ViewerConfig>,
	stream: Rc<RefCell<Option<StreamChannel>>>,
	pub legend: RwSignal<Vec<LegendEntry>>,
	pub params: RwSignal<Vec<String>>,
	pub controls: RwSignal<Vec<ParamControl>>,
	pub chart_visible: RwSignal<bool>,
	pub history_len: RwSignal<usize>,
	pub sbml: RwSignal<Option<String>>,
}

impl Viewer {
	pub fn new(config: ViewerConfig) -> Self {
		Self {
			session: Rc::new(RefCell::new(Session::new(&config))),
			api: ApiClient::new(&config.api_base),
			config: Rc::new(config),
			stream: Rc::new(RefCell::new(None)),
			legend: RwSignal::new(Vec::new()),
			params: RwSignal::new(Vec::new()),
			controls: RwSignal::new(Vec::new()),
			chart_visible: RwSignal::new(false),
			history_len: RwSignal::new(0),
			sbml: RwSignal::new(None),
		}
	}

	pub fn config(&self) -> &ViewerConfig {
		&self.config
	}

	/// Pushes session state into the signals.
	fn sync(&self) {
		let session = self.session.borrow();
		self.legend.set(session.graph().legend());
		self.params.set(session.params().to_vec());
		self.chart_visible.set(session.chart().is_visible());
		self.history_len.set(session.store().len());
		self.sbml.set(session.sbml().map(str::to_string));
	}

	fn sync_chart(&self) {
		let session = self.session.borrow();
		self.chart_visible.set(session.chart().is_visible());
		self.history_len.set(session.store().len());
	}

	pub fn tick_graph(&self, surface: &mut dyn Surface) -> bool {
		self.session.borrow_mut().tick_graph(surface)
	}

	pub fn tick_chart(&self, surface: &mut dyn Surface) -> bool {
		self.session.borrow_mut().tick_chart(surface)
	}

	/// Sizes the visible canvas and the diagram's viewport and pick surface
	/// together, so hit tests line up with what is drawn.
	pub(crate) fn fit_canvas(&self, surface: &mut CanvasSurface, width: u32, height: u32) {
		surface.resize(width, height);
		self.session.borrow_mut().graph_mut().resize(width, height);
	}

	// Pointer input from the diagram canvas.

	pub fn pointer_down(&self, input: PointerInput) {
		self.session.borrow_mut().pointer_down(input);
		self.sync_chart();
	}

	pub fn pointer_move(&self, position: Point) {
		let request = self.session.borrow_mut().pointer_move(position);
		if let Some(request) = request {
			self.reposition(request);
		}
	}

	pub fn pointer_up(&self) {
		self.session.borrow_mut().pointer_up();
	}

	pub fn pointer_leave(&self) {
		self.session.borrow_mut().pointer_leave();
	}

	pub fn wheel(&self, position: Point, delta_y: f64) {
		self.session.borrow_mut().wheel(position, delta_y);
	}

	// Legend and mode controls.

	pub fn click_shape(&self, index: usize, additive: bool) {
		self.session.borrow_mut().click_shape(index, additive);
		self.sync_chart();
	}

	pub fn select_all(&self) {
		self.session.borrow_mut().select_all();
		self.sync_chart();
	}

	pub fn set_interaction_mode(&self, mode: InteractionMode) {
		self.session.borrow_mut().set_interaction_mode(mode);
	}

	pub fn set_sim_mode(&self, mode: SimulationMode) {
		self.close_stream();
		self.session.borrow_mut().set_sim_mode(mode);
		self.sync_chart();
	}

	pub fn set_window(&self, window: Option<usize>) {
		self.session.borrow_mut().set_window(window);
	}

	pub fn set_timepoint(&self, index: usize) {
		self.session.borrow_mut().set_timepoint(index);
	}

	// Colours and widths.

	pub fn set_node_fill_color(&self, color: Rgba) {
		self.session.borrow_mut().graph_mut().set_node_fill_color(color);
	}

	pub fn set_node_edge_color(&self, color: Rgba) {
		self.session.borrow_mut().graph_mut().set_node_edge_color(color);
	}

	pub fn set_hyperedge_fill_color(&self, color: Rgba) {
		self.session.borrow_mut().graph_mut().set_hyperedge_fill_color(color);
	}

	pub fn set_hyperedge_edge_color(&self, color: Rgba) {
		self.session.borrow_mut().graph_mut().set_hyperedge_edge_color(color);
	}

	pub fn set_line_width(&self, width: f64) {
		self.session.borrow_mut().graph_mut().set_line_width(width);
	}

	pub fn set_gradient_hi(&self, hi: Rgba) {
		let mut session = self.session.borrow_mut();
		let gradient = Gradient {
			hi,
			..session.graph().gradient()
		};
		session.graph_mut().set_gradient(gradient);
	}

	pub fn set_gradient_lo(&self, lo: Rgba) {
		let mut session = self.session.borrow_mut();
		let gradient = Gradient {
			lo,
			..session.graph().gradient()
		};
		session.graph_mut().set_gradient(gradient);
	}

	// Service calls. Replies are applied when they land; failures are logged.

	fn reposition(&self, request: RepositionRequest) {
		let viewer = self.clone();
		spawn_local(async move {
			match viewer.api.drag(&request).await {
				Ok(reply) => {
					viewer.session.borrow_mut().apply_layout(reply);
					viewer.sync();
				}
				Err(e) => error!("Moving {} failed: {e}", request.id),
			}
		});
	}

	/// Asks for a fresh layout at the current canvas size.
	pub fn redraw(&self) {
		let (width, height) = self.session.borrow().graph().viewport().size();
		let request = RedrawRequest {
			width: width as f64,
			height: height as f64,
		};
		let viewer = self.clone();
		spawn_local(async move {
			match viewer.api.redraw(&request).await {
				Ok(reply) => {
					viewer.session.borrow_mut().apply_layout(reply);
					viewer.sync();
				}
				Err(e) => error!("Redraw failed: {e}"),
			}
		});
	}

	/// Starts a finite-horizon run; its result replaces the series.
	pub fn run_offline(&self, request: RunRequest) {
		self.close_stream();
		let generation = self.session.borrow_mut().begin_run(Some(request.clone()));
		self.sync_chart();
		self.run(request, generation);
	}

	fn run(&self, request: RunRequest, generation: u64) {
		let viewer = self.clone();
		spawn_local(async move {
			match viewer.api.run(&request).await {
				Ok(result) => {
					if viewer.session.borrow_mut().load_run(generation, result) {
						viewer.sync();
					}
				}
				Err(e) => error!("Run failed: {e}"),
			}
		});
	}

	/// Opens the stream channel; each point is appended and replotted.
	pub fn start_online(&self, start: StreamStart) {
		self.close_stream();
		self.session.borrow_mut().begin_run(None);
		self.sync_chart();

		let viewer = self.clone();
		let channel = StreamChannel::connect(&self.config.stream_url, start, move |point| {
			viewer.session.borrow_mut().push_stream_point(&point);
			viewer.sync_chart();
		});
		match channel {
			Ok(channel) => *self.stream.borrow_mut() = Some(channel),
			Err(e) => error!("Could not open stream: {e}"),
		}
	}

	pub fn pause_online(&self) {
		self.send_control(&ControlMessage::Pause);
	}

	pub fn end_online(&self) {
		self.send_control(&ControlMessage::End);
		self.close_stream();
	}

	fn send_control(&self, message: &ControlMessage) {
		match self.stream.borrow().as_ref() {
			Some(channel) => {
				if let Err(e) = channel.send(message) {
					error!("Stream control failed: {e}");
				}
			}
			None => warn!("No stream is open"),
		}
	}

	fn close_stream(&self) {
		if self.stream.borrow_mut().take().is_some() {
			info!("Stream channel closed");
		}
	}

	// Parameter sliders.

	/// Adds a slider for `param`, or removes it if already shown.
	pub fn toggle_param(&self, param: String) {
		let shown = self
			.controls
			.with_untracked(|controls| controls.iter().any(|c| c.name == param));
		if shown {
			self.controls.update(|controls| controls.retain(|c| c.name != param));
			return;
		}
		let viewer = self.clone();
		spawn_local(async move {
			match viewer.api.get_param(&param).await {
				Ok(value) => viewer
					.controls
					.update(|controls| controls.push(ParamControl::new(param, value))),
				Err(e) => error!("Reading `{param}` failed: {e}"),
			}
		});
	}

	pub fn set_param_value(&self, param: &str, value: f64) {
		let stored = self.update_control(param, |c| Some(c.set_value(value)));
		if let Some(value) = stored {
			self.push_param(param, value);
		}
	}

	pub fn set_param_min(&self, param: &str, min: f64) {
		let moved = self.update_control(param, |c| c.set_min(min).then_some(c.value));
		if let Some(value) = moved {
			self.push_param(param, value);
		}
	}

	pub fn set_param_max(&self, param: &str, max: f64) {
		let moved = self.update_control(param, |c| c.set_max(max).then_some(c.value));
		if let Some(value) = moved {
			self.push_param(param, value);
		}
	}

	fn update_control(
		&self,
		param: &str,
		f: impl FnOnce(&mut ParamControl) -> Option<f64>,
	) -> Option<f64> {
		let mut out = None;
		self.controls.update(|controls| {
			if let Some(control) = controls.iter_mut().find(|c| c.name == param) {
				out = f(control);
			}
		});
		out
	}

	/// Sends the new value, then reruns the last offline run with it.
	fn push_param(&self, param: &str, value: f64) {
		let update = ParamUpdate {
			param: param.to_string(),
			value,
		};
		let issued = self.session.borrow().generation();
		let viewer = self.clone();
		spawn_local(async move {
			if let Err(e) = viewer.api.set_param(&update).await {
				error!("Setting `{}` failed: {e}", update.param);
				return;
			}
			if viewer.session.borrow().generation() != issued {
				debug!("Skipping rerun for `{}`: series changed meanwhile", update.param);
				return;
			}
			let rerun = viewer.session.borrow_mut().begin_rerun();
			if let Some((request, generation)) = rerun {
				viewer.run(request, generation);
			}
		});
	}
}
