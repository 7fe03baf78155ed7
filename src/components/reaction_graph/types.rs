use std::collections::BTreeMap;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{Bezier, Point};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeJson {
	pub id: String,
	pub centroid: Point,
	pub width: f64,
	pub height: f64,
	#[serde(default = "nan", deserialize_with = "nullable")]
	pub value: f64,
	#[serde(default)]
	pub boundary: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CurveJson {
	pub bezier: Bezier,
	#[serde(rename = "type", default)]
	pub kind: String,
	#[serde(default)]
	pub arrow: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeJson {
	pub id: String,
	#[serde(default = "nan", deserialize_with = "nullable")]
	pub rate: f64,
	pub curves: Vec<CurveJson>,
}

/// Node and edge geometry computed by the layout service.
///
/// Entries are decoded one at a time; a malformed node or edge is logged and
/// skipped without losing the rest of the layout.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DiagramSnapshot {
	#[serde(default, deserialize_with = "skip_malformed")]
	pub nodes: Vec<NodeJson>,
	#[serde(default, deserialize_with = "skip_malformed")]
	pub edges: Vec<EdgeJson>,
}

/// Reply to upload, redraw and drag requests.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LayoutReply {
	pub layout: DiagramSnapshot,
	#[serde(default)]
	pub sbml: Option<String>,
}

/// Ask the layout service to move a shape by a world-space delta.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepositionRequest {
	pub id: String,
	pub dx: f64,
	pub dy: f64,
}

/// Output of a finite-horizon run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RunResult {
	pub data: BTreeMap<String, Vec<Option<f64>>>,
	#[serde(default)]
	pub time: Option<Vec<f64>>,
	#[serde(default)]
	pub params: Vec<String>,
}

impl RunResult {
	/// Splits into `(series, time)`; a `time` series inside `data` is used when
	/// the top-level axis is absent. `null` samples become `NaN`.
	pub fn into_series(mut self) -> (BTreeMap<String, Vec<f64>>, Vec<f64>) {
		let embedded = self.data.remove(TIME_LABEL);
		let time = self
			.time
			.or_else(|| embedded.map(|t| t.into_iter().map(or_nan).collect()))
			.unwrap_or_default();
		let series = self
			.data
			.into_iter()
			.map(|(label, values)| (label, values.into_iter().map(or_nan).collect()))
			.collect();
		(series, time)
	}
}

/// One sample of an online run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StreamPoint {
	pub time: f64,
	#[serde(flatten)]
	pub values: BTreeMap<String, Option<f64>>,
}

impl StreamPoint {
	pub fn value(&self, label: &str) -> Option<f64> {
		self.values.get(label).map(|v| or_nan(*v))
	}
}

pub const TIME_LABEL: &str = "time";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunRequest {
	pub start: f64,
	pub end: f64,
	pub steps: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StreamStart {
	pub start: f64,
	pub frequency: f64,
	#[serde(rename = "stepSize")]
	pub step_size: f64,
}

/// Ask for a fresh layout sized to the canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RedrawRequest {
	pub width: f64,
	pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParamQuery {
	pub param: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParamUpdate {
	pub param: String,
	pub value: f64,
}

/// Outbound messages on the streaming channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ControlMessage {
	Start(StreamStart),
	Pause,
	End,
}

fn nan() -> f64 {
	f64::NAN
}

fn or_nan(v: Option<f64>) -> f64 {
	v.unwrap_or(f64::NAN)
}

fn nullable<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
	Option::<f64>::deserialize(d).map(or_nan)
}

fn skip_malformed<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let raw = Vec::<serde_json::Value>::deserialize(d)?;
	Ok(raw
		.into_iter()
		.enumerate()
		.filter_map(|(i, entry)| match serde_json::from_value(entry) {
			Ok(item) => Some(item),
			Err(e) => {
				warn!("Skipping malformed layout entry {i}: {e}");
				None
			}
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn snapshot_decodes() {
		let json = r#"{
			"layout": {
				"nodes": [{"id": "A", "centroid": [10, 20], "width": 40, "height": 20, "value": 5}],
				"edges": [{"id": "r1", "rate": 0.3, "curves": [{
					"bezier": {"start": [0,0], "cp1": [1,1], "cp2": [2,2], "end": [3,3]},
					"type": "product",
					"arrow": [[3,3], [2,4], [4,2]]
				}]}]
			},
			"sbml": "<sbml/>"
		}"#;
		let reply: LayoutReply = serde_json::from_str(json).unwrap();
		assert_eq!(reply.layout.nodes[0].centroid, Point::new(10.0, 20.0));
		assert!(!reply.layout.nodes[0].boundary);
		assert_eq!(reply.layout.edges[0].curves[0].kind, "product");
		assert_eq!(reply.layout.edges[0].curves[0].arrow.len(), 3);
		assert_eq!(reply.sbml.as_deref(), Some("<sbml/>"));
	}

	#[test]
	fn null_values_and_bad_entries_keep_the_layout() {
		let json = r#"{
			"nodes": [
				{"id": "A", "centroid": [10, 20], "width": 40, "height": 20, "value": null},
				{"id": "X", "centroid": "middle", "width": 40, "height": 20},
				{"id": "B", "centroid": [90, 20], "width": 40, "height": 20, "value": 2}
			],
			"edges": [
				{"id": "r1", "rate": null, "curves": []},
				{"id": "r2"}
			]
		}"#;
		let snapshot: DiagramSnapshot = serde_json::from_str(json).unwrap();
		let ids: Vec<_> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["A", "B"]);
		assert!(snapshot.nodes[0].value.is_nan());
		assert_eq!(snapshot.nodes[1].value, 2.0);
		assert_eq!(snapshot.edges.len(), 1);
		assert!(snapshot.edges[0].rate.is_nan());
	}

	#[test]
	fn run_result_takes_time_from_data_when_missing() {
		let json = r#"{"data": {"[A]": [1, 2], "time": [0, 0.5]}, "params": ["k1"]}"#;
		let result: RunResult = serde_json::from_str(json).unwrap();
		assert_eq!(result.params, vec!["k1".to_string()]);
		let (series, time) = result.into_series();
		assert_eq!(time, vec![0.0, 0.5]);
		assert_eq!(series.keys().collect::<Vec<_>>(), vec!["[A]"]);
	}

	#[test]
	fn run_result_prefers_top_level_time() {
		let json = r#"{"data": {"[A]": [1, null]}, "time": [0, 1]}"#;
		let (series, time) = serde_json::from_str::<RunResult>(json).unwrap().into_series();
		assert_eq!(time, vec![0.0, 1.0]);
		assert!(series["[A]"][1].is_nan());
	}

	#[test]
	fn stream_point_splits_time() {
		let p: StreamPoint = serde_json::from_str(r#"{"[A]": 5, "k1": null, "time": 0.25}"#).unwrap();
		assert_eq!(p.time, 0.25);
		assert_eq!(p.value("[A]"), Some(5.0));
		assert!(p.value("k1").is_some_and(f64::is_nan));
		assert_eq!(p.value("[B]"), None);
		assert!(!p.values.contains_key("time"));
	}

	#[test]
	fn control_messages_are_tagged() {
		let start = ControlMessage::Start(StreamStart {
			start: 0.0,
			frequency: 10.0,
			step_size: 0.1,
		});
		assert_eq!(
			serde_json::to_string(&start).unwrap(),
			r#"{"event":"start","start":0.0,"frequency":10.0,"stepSize":0.1}"#
		);
		assert_eq!(serde_json::to_string(&ControlMessage::Pause).unwrap(), r#"{"event":"pause"}"#);
	}
}
