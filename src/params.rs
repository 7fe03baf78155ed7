//! Range controls for tunable model parameters.

/// A slider over one parameter. Starts at `[0, 2 * value]` with a step two
/// decades below the value's magnitude.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamControl {
	pub name: String,
	pub value: f64,
	pub min: f64,
	pub max: f64,
	pub step: f64,
}

impl ParamControl {
	pub fn new(name: impl Into<String>, value: f64) -> Self {
		let value = if value.is_finite() { value } else { 0.0 };
		let step = if value == 0.0 {
			0.01
		} else {
			10f64.powf(value.abs().log10().floor() - 2.0)
		};
		Self {
			name: name.into(),
			value,
			min: 0.0,
			max: 2.0 * value.max(0.0),
			step,
		}
	}

	/// Sets the value, keeping it inside `[min, max]`. Returns the stored value.
	pub fn set_value(&mut self, value: f64) -> f64 {
		if value.is_finite() {
			self.value = value.clamp(self.min, self.max);
		}
		self.value
	}

	/// Moves the lower bound, dragging the value and upper bound along.
	/// Returns whether the value changed.
	pub fn set_min(&mut self, min: f64) -> bool {
		if !min.is_finite() {
			return false;
		}
		self.min = min;
		self.max = self.max.max(min);
		self.pull_inside()
	}

	/// Moves the upper bound, dragging the value and lower bound along.
	/// Returns whether the value changed.
	pub fn set_max(&mut self, max: f64) -> bool {
		if !max.is_finite() {
			return false;
		}
		self.max = max;
		self.min = self.min.min(max);
		self.pull_inside()
	}

	fn pull_inside(&mut self) -> bool {
		let clamped = self.value.clamp(self.min, self.max);
		let changed = clamped != self.value;
		self.value = clamped;
		changed
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn initial_range_and_step() {
		let p = ParamControl::new("k1", 5.0);
		assert_eq!((p.min, p.max), (0.0, 10.0));
		assert!((p.step - 0.01).abs() < 1e-12);
		let small = ParamControl::new("k2", 0.003);
		assert!((small.step - 1e-5).abs() < 1e-15);
		assert_eq!(ParamControl::new("k3", 0.0).step, 0.01);
	}

	#[test]
	fn bounds_drag_the_value() {
		let mut p = ParamControl::new("k1", 5.0);
		assert!(p.set_max(3.0));
		assert_eq!(p.value, 3.0);
		assert!(p.set_min(4.0));
		assert_eq!((p.min, p.max, p.value), (4.0, 4.0, 4.0));
		assert!(!p.set_max(f64::NAN));
		assert_eq!(p.set_value(100.0), 4.0);
	}
}
