use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::controller::PointerInput;
use crate::geometry::Point;
use crate::surface::CanvasSurface;
use crate::viewer::Viewer;

/// Pointer position relative to the canvas' top-left corner.
fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// The diagram canvas. Redraws on a fixed interval whenever the viewport is dirty.
#[component]
pub fn ReactionGraphCanvas(viewer: Viewer) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let interval = StoredValue::new(None::<i32>);
	let (width, height) = (viewer.config().canvas_width, viewer.config().canvas_height);
	let redraw_ms = viewer.config().redraw_interval_ms as i32;

	let viewer_init = viewer.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};
		let Some(mut surface) = CanvasSurface::new(canvas) else {
			log::error!("Canvas has no 2d context");
			return;
		};
		viewer_init.fit_canvas(&mut surface, width as u32, height as u32);

		let viewer_tick = viewer_init.clone();
		*tick.borrow_mut() = Some(Closure::new(move || {
			viewer_tick.tick_graph(&mut surface);
		}));
		if let Some(ref cb) = *tick.borrow() {
			match window.set_interval_with_callback_and_timeout_and_arguments_0(
				cb.as_ref().unchecked_ref(),
				redraw_ms,
			) {
				Ok(id) => interval.set_value(Some(id)),
				Err(e) => log::error!("Could not start redraw timer: {e:?}"),
			}
		}
	});

	on_cleanup(move || {
		if let (Some(id), Some(window)) = (interval.get_value(), web_sys::window()) {
			window.clear_interval_with_handle(id);
		}
	});

	let viewer_md = viewer.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(position) = local_position(canvas_ref, &ev) {
			viewer_md.pointer_down(PointerInput {
				position,
				shift: ev.shift_key(),
			});
		}
	};

	let viewer_mm = viewer.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(position) = local_position(canvas_ref, &ev) {
			viewer_mm.pointer_move(position);
		}
	};

	let viewer_mu = viewer.clone();
	let on_mouseup = move |_: MouseEvent| viewer_mu.pointer_up();

	let viewer_ml = viewer.clone();
	let on_mouseleave = move |_: MouseEvent| viewer_ml.pointer_leave();

	let viewer_wh = viewer;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(position) = local_position(canvas_ref, &ev) {
			viewer_wh.wheel(position, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="reaction-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
