use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::surface::CanvasSurface;
use crate::viewer::Viewer;

const CHART_HEIGHT: u32 = 260;

/// Chart of the plotted series, hidden while nothing is plotted.
#[component]
pub fn TimeChart(viewer: Viewer) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let tick: RefCell<Option<Closure<dyn FnMut()>>> = RefCell::new(None);
	let interval = StoredValue::new(None::<i32>);
	let width = viewer.config().canvas_width as u32;
	let redraw_ms = viewer.config().redraw_interval_ms as i32;
	let visible = viewer.chart_visible;

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(mut surface) = CanvasSurface::new(canvas) else {
			log::error!("Chart canvas has no 2d context");
			return;
		};
		surface.resize(width, CHART_HEIGHT);

		let viewer = viewer.clone();
		let cb = Closure::<dyn FnMut()>::new(move || {
			viewer.tick_chart(&mut surface);
		});
		let started = web_sys::window().map(|w| {
			w.set_interval_with_callback_and_timeout_and_arguments_0(
				cb.as_ref().unchecked_ref(),
				redraw_ms,
			)
		});
		match started {
			Some(Ok(id)) => interval.set_value(Some(id)),
			Some(Err(e)) => log::error!("Could not start chart timer: {e:?}"),
			None => return,
		}
		*tick.borrow_mut() = Some(cb);
	});

	on_cleanup(move || {
		if let (Some(id), Some(window)) = (interval.get_value(), web_sys::window()) {
			window.clear_interval_with_handle(id);
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="time-chart"
			style:display=move || if visible.get() { "block" } else { "none" }
		/>
	}
}
