use log::debug;

use crate::color::Rgba;
use crate::time_series::TimeSeriesStore;

/// A plotted series as handed to the chart surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
	pub label: String,
	pub color: Rgba,
	pub data: Vec<f64>,
}

/// Which series are visible, and the (possibly windowed) samples bound to them.
///
/// Every dataset's `data` is index-aligned with `time_axis`.
#[derive(Clone, Debug, Default)]
pub struct ChartBinder {
	datasets: Vec<Dataset>,
	time_axis: Vec<f64>,
	window: Option<usize>,
	dirty: bool,
}

/// First index of the trailing `window` samples out of `len`.
/// `0` or anything past `len` means the whole history.
fn window_start(len: usize, window: Option<usize>) -> usize {
	match window {
		Some(w) if w > 0 && w < len => len - w,
		_ => 0,
	}
}

impl ChartBinder {
	pub fn datasets(&self) -> &[Dataset] {
		&self.datasets
	}

	pub fn dataset(&self, label: &str) -> Option<&Dataset> {
		self.datasets.iter().find(|d| d.label == label)
	}

	pub fn time_axis(&self) -> &[f64] {
		&self.time_axis
	}

	pub fn window(&self) -> Option<usize> {
		self.window
	}

	pub fn is_plotted(&self, label: &str) -> bool {
		self.dataset(label).is_some()
	}

	/// The chart is shown while at least one series is plotted.
	pub fn is_visible(&self) -> bool {
		!self.datasets.is_empty()
	}

	/// Clears the redraw flag, returning whether it was set.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	/// Makes `label` visible with a fresh colour. Labels the store does not
	/// have yet are bound as gaps until data arrives.
	pub fn plot(&mut self, store: &TimeSeriesStore, label: &str) -> bool {
		if self.is_plotted(label) {
			return false;
		}
		self.push_dataset(label);
		self.replot(store, self.window);
		true
	}

	pub fn unplot(&mut self, label: &str) -> bool {
		let before = self.datasets.len();
		self.datasets.retain(|d| d.label != label);
		let removed = self.datasets.len() != before;
		self.dirty |= removed;
		removed
	}

	pub fn toggle(&mut self, store: &TimeSeriesStore, label: &str) {
		if !self.unplot(label) {
			self.plot(store, label);
		}
	}

	/// Plots every series in the store, each with a new colour.
	pub fn plot_all(&mut self, store: &TimeSeriesStore) {
		self.datasets.clear();
		for label in store.labels() {
			self.push_dataset(label);
		}
		self.replot(store, self.window);
	}

	pub fn unplot_all(&mut self) {
		self.datasets.clear();
		self.dirty = true;
	}

	/// Rebinds every visible series (and the time axis) to the trailing
	/// `window` samples of the store, or to the full history.
	pub fn replot(&mut self, store: &TimeSeriesStore, window: Option<usize>) {
		self.window = window;
		let start = window_start(store.len(), window);
		for dataset in &mut self.datasets {
			dataset.data = bind(store, &dataset.label, start);
		}
		self.time_axis = store.time()[start..].to_vec();
		self.dirty = true;
	}

	fn push_dataset(&mut self, label: &str) {
		debug!("Plotting {label}");
		self.datasets.push(Dataset {
			label: label.to_string(),
			color: Rgba::random(),
			data: Vec::new(),
		});
	}
}

fn bind(store: &TimeSeriesStore, label: &str, start: usize) -> Vec<f64> {
	match store.series(label) {
		Some(values) => values[start..].to_vec(),
		None => vec![f64::NAN; store.len() - start],
	}
}
