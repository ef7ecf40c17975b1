use crate::error::TimerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler ticks (milliseconds) per countdown second
pub const TICKS_PER_SECOND: f64 = 1000.0;

/// Shortest period the scheduler will sleep for between firings.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Settings for a single countdown cycle.
///
/// `duration` and `step` are in countdown seconds. Each firing subtracts
/// `step * scale` from the remaining time and firings happen every
/// `step * TICKS_PER_SECOND / scale` milliseconds, so a scale of `2.0` runs
/// the countdown twice as fast as real time and `0.0` freezes it.
///
/// # Example
///
/// ```rust
/// use countdown_timer::CountdownConfig;
///
/// let config = CountdownConfig::new(30.0).with_step(0.5).with_scale(2.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.interval(), Some(std::time::Duration::from_millis(250)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
	pub duration: f64,
	pub step: f64,
	pub scale: f64,
}

impl Default for CountdownConfig {
	fn default() -> Self {
		Self {
			duration: 0.0,
			step: 1.0,
			scale: 1.0,
		}
	}
}

impl CountdownConfig {
	pub fn new(duration: f64) -> Self {
		Self {
			duration,
			..Self::default()
		}
	}

	pub fn with_step(mut self, step: f64) -> Self {
		self.step = step;
		self
	}

	pub fn with_scale(mut self, scale: f64) -> Self {
		self.scale = scale;
		self
	}

	/// Checks every field, reporting the first invalid one.
	///
	/// # Errors
	///
	/// Returns `TimerError::InvalidArgument` when `duration` is negative,
	/// `step` is not strictly positive, `scale` is negative, or any of them
	/// is NaN or infinite.
	pub fn validate(&self) -> Result<(), TimerError> {
		if !self.duration.is_finite() || self.duration < 0.0 {
			return Err(TimerError::InvalidArgument {
				name: "duration",
				value: self.duration,
				reason: "must be a finite value of at least 0",
			});
		}
		if !self.step.is_finite() || self.step <= 0.0 {
			return Err(TimerError::InvalidArgument {
				name: "step",
				value: self.step,
				reason: "must be a finite value greater than 0",
			});
		}
		validate_scale(self.scale)
	}

	pub fn interval(&self) -> Option<Duration> {
		interval_for(self.step, self.scale)
	}
}

pub(crate) fn validate_scale(scale: f64) -> Result<(), TimerError> {
	if !scale.is_finite() || scale < 0.0 {
		return Err(TimerError::InvalidArgument {
			name: "scale",
			value: scale,
			reason: "must be a finite value of at least 0",
		});
	}
	Ok(())
}

/// Firing period for `step` at `scale`, `None` only while the scale is zero.
///
/// Periods are kept between `MIN_INTERVAL` and `Duration::MAX`.
pub(crate) fn interval_for(step: f64, scale: f64) -> Option<Duration> {
	if scale == 0.0 {
		return None;
	}
	let ticks = step * TICKS_PER_SECOND / scale;
	let period = Duration::try_from_secs_f64(ticks / TICKS_PER_SECOND).unwrap_or(Duration::MAX);
	Some(period.max(MIN_INTERVAL))
}
