//! Simulated series keyed by label, sharing one time axis.

use std::collections::BTreeMap;

use log::warn;

use crate::components::reaction_graph::types::StreamPoint;

/// Label → samples, plus the parallel time axis.
///
/// Every series always has exactly `time().len()` samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeriesStore {
	series: BTreeMap<String, Vec<f64>>,
	time: Vec<f64>,
}

impl TimeSeriesStore {
	/// Replaces everything with a finished run. Series of the wrong length are
	/// padded with `NaN` or truncated to the time axis.
	pub fn load(&mut self, series: BTreeMap<String, Vec<f64>>, time: Vec<f64>) {
		let len = time.len();
		self.series = series
			.into_iter()
			.map(|(label, mut values)| {
				if values.len() != len {
					warn!(
						"Series `{label}` has {} samples for {len} time points",
						values.len()
					);
					values.resize(len, f64::NAN);
				}
				(label, values)
			})
			.collect();
		self.time = time;
	}

	/// Adds one streamed sample. The first point fixes the tracked labels;
	/// later points missing a tracked label record `NaN` for it.
	pub fn append(&mut self, point: &StreamPoint) {
		if self.time.is_empty() && self.series.is_empty() {
			self.series = point
				.values
				.keys()
				.map(|label| (label.clone(), Vec::new()))
				.collect();
		}
		for (label, values) in &mut self.series {
			let value = point.value(label).unwrap_or_else(|| {
				warn!("Stream point at t={} is missing `{label}`", point.time);
				f64::NAN
			});
			values.push(value);
		}
		for label in point.values.keys() {
			if !self.series.contains_key(label) {
				warn!("Ignoring untracked series `{label}`");
			}
		}
		self.time.push(point.time);
	}

	pub fn clear(&mut self) {
		self.series.clear();
		self.time.clear();
	}

	pub fn len(&self) -> usize {
		self.time.len()
	}

	pub fn is_empty(&self) -> bool {
		self.time.is_empty()
	}

	pub fn time(&self) -> &[f64] {
		&self.time
	}

	pub fn series(&self, label: &str) -> Option<&[f64]> {
		self.series.get(label).map(Vec::as_slice)
	}

	pub fn labels(&self) -> impl Iterator<Item = &str> {
		self.series.keys().map(String::as_str)
	}
}
