//! Browser client for the layout/simulation service.
//!
//! Requests are `multipart/form-data` POSTs whose fields mirror the request
//! struct; replies are JSON. Online runs stream over a WebSocket.

use log::{error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CloseEvent, FormData, MessageEvent, Request, RequestInit, Response, WebSocket};

use crate::components::reaction_graph::{
	ControlMessage, LayoutReply, ParamQuery, ParamUpdate, RedrawRequest, RepositionRequest, RunRequest,
	RunResult, StreamPoint, StreamStart,
};
use crate::error::TransportError;

#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
}

impl ApiClient {
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	fn url(&self, endpoint: &str) -> String {
		if self.base_url.is_empty() {
			endpoint.to_string()
		} else {
			format!("{}/{endpoint}", self.base_url)
		}
	}

	async fn post_text<A: Serialize>(&self, endpoint: &str, args: &A) -> Result<String, TransportError> {
		let form = FormData::new()?;
		for (key, value) in form_fields(args)? {
			form.append_with_str(&key, &value)?;
		}

		let opts = RequestInit::new();
		opts.set_method("POST");
		opts.set_body(&form);
		let request = Request::new_with_str_and_init(&self.url(endpoint), &opts)?;

		let window = web_sys::window().ok_or_else(|| TransportError::Js("no window".into()))?;
		let resp: Response = JsFuture::from(window.fetch_with_request(&request))
			.await?
			.dyn_into()?;
		let body = JsFuture::from(resp.text()?).await?.as_string().unwrap_or_default();
		if !resp.ok() {
			return Err(TransportError::Http {
				status: resp.status(),
				body,
			});
		}
		Ok(body)
	}

	async fn post<A: Serialize, T: DeserializeOwned>(&self, endpoint: &str, args: &A) -> Result<T, TransportError> {
		let body = self.post_text(endpoint, args).await?;
		Ok(serde_json::from_str(&body)?)
	}

	/// Moves a shape on the server; the reply is the new layout.
	pub async fn drag(&self, request: &RepositionRequest) -> Result<LayoutReply, TransportError> {
		self.post("drag", request).await
	}

	pub async fn redraw(&self, request: &RedrawRequest) -> Result<LayoutReply, TransportError> {
		self.post("redraw", request).await
	}

	pub async fn run(&self, request: &RunRequest) -> Result<RunResult, TransportError> {
		self.post("run", request).await
	}

	pub async fn get_param(&self, param: &str) -> Result<f64, TransportError> {
		let query = ParamQuery {
			param: param.to_string(),
		};
		let value: serde_json::Value = self.post("get_param", &query).await?;
		// Some services answer with the number as a string.
		match value {
			serde_json::Value::String(s) => s
				.trim()
				.parse()
				.map_err(|_| TransportError::Js(format!("`{param}` is not a number: {s}"))),
			other => Ok(serde_json::from_value(other)?),
		}
	}

	pub async fn set_param(&self, update: &ParamUpdate) -> Result<(), TransportError> {
		self.post_text("set_param", update).await.map(drop)
	}
}

/// Flattens a request struct into form fields. Strings go as-is, everything
/// else as its JSON text.
fn form_fields<A: Serialize>(args: &A) -> Result<Vec<(String, String)>, TransportError> {
	let serde_json::Value::Object(map) = serde_json::to_value(args)? else {
		return Err(TransportError::Js("form arguments must be a struct".into()));
	};
	Ok(map
		.into_iter()
		.map(|(key, value)| {
			let text = match value {
				serde_json::Value::String(s) => s,
				other => other.to_string(),
			};
			(key, text)
		})
		.collect())
}

/// An open streaming channel. Dropping it closes the socket.
pub struct StreamChannel {
	socket: WebSocket,
	_on_open: Closure<dyn FnMut()>,
	_on_message: Closure<dyn FnMut(MessageEvent)>,
	_on_error: Closure<dyn FnMut(JsValue)>,
	_on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl StreamChannel {
	/// Connects to `url`, sends the start message once open, and hands every
	/// decoded point to `on_point`.
	pub fn connect(
		url: &str,
		start: StreamStart,
		mut on_point: impl FnMut(StreamPoint) + 'static,
	) -> Result<Self, TransportError> {
		let socket = WebSocket::new(url)?;

		let (open_socket, start_message) = (socket.clone(), ControlMessage::Start(start));
		let on_open = Closure::<dyn FnMut()>::new(move || {
			info!("Stream connected");
			if let Err(e) = send_on(&open_socket, &start_message) {
				error!("Could not start stream: {e}");
			}
		});

		let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
			let Some(text) = ev.data().as_string() else {
				warn!("Ignoring non-text stream frame");
				return;
			};
			match serde_json::from_str::<StreamPoint>(&text) {
				Ok(point) => on_point(point),
				Err(e) => warn!("Ignoring malformed stream point: {e}"),
			}
		});

		let error_socket = socket.clone();
		let on_error = Closure::<dyn FnMut(JsValue)>::new(move |ev: JsValue| {
			error!("Stream error: {ev:?}");
			let _ = error_socket.close();
		});

		let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
			info!("Stream closed ({})", ev.code());
		});

		socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
		socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
		socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
		socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

		Ok(Self {
			socket,
			_on_open: on_open,
			_on_message: on_message,
			_on_error: on_error,
			_on_close: on_close,
		})
	}

	pub fn send(&self, message: &ControlMessage) -> Result<(), TransportError> {
		send_on(&self.socket, message)
	}
}

fn send_on(socket: &WebSocket, message: &ControlMessage) -> Result<(), TransportError> {
	if socket.ready_state() != WebSocket::OPEN {
		return Err(TransportError::Closed);
	}
	socket.send_with_str(&serde_json::to_string(message)?)?;
	Ok(())
}

impl Drop for StreamChannel {
	fn drop(&mut self) {
		self.socket.set_onopen(None);
		self.socket.set_onmessage(None);
		self.socket.set_onerror(None);
		self.socket.set_onclose(None);
		let _ = self.socket.close();
	}
}
