use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
	Begin,
	Step,
	End,
}

/// A lifecycle notification from a countdown.
///
/// `Begin` and `End` carry the full duration of the cycle, `Step` carries the
/// time remaining after the firing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Signal {
	Begin(f64),
	Step(f64),
	End(f64),
}

impl Signal {
	pub fn kind(&self) -> SignalKind {
		match self {
			Signal::Begin(_) => SignalKind::Begin,
			Signal::Step(_) => SignalKind::Step,
			Signal::End(_) => SignalKind::End,
		}
	}

	pub fn value(&self) -> f64 {
		match *self {
			Signal::Begin(value) | Signal::Step(value) | Signal::End(value) => value,
		}
	}
}
