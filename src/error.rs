use thiserror::Error;

/// Failures talking to the layout/simulation service.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("HTTP {status}: {body}")]
	Http { status: u16, body: String },
	#[error("browser error: {0}")]
	Js(String),
	#[error("undecodable payload: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("stream channel is closed")]
	Closed,
}

impl From<wasm_bindgen::JsValue> for TransportError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

/// A piece of a collaborator payload that cannot be turned into a shape.
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
	#[error("node `{0}` has non-finite geometry")]
	NodeGeometry(String),
	#[error("hyperedge `{0}` has no drawable curves")]
	EmptyHyperEdge(String),
}
