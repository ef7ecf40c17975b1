use crate::config::{self, CountdownConfig};
use crate::error::TimerError;
use crate::signal::Signal;
use serde::Serialize;
use std::time::Duration;

/// Point-in-time view of a countdown, suitable for rendering or reporting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CountdownSnapshot {
	pub remaining: f64,
	pub full_duration: f64,
	pub elapsed: f64,
	/// `remaining / full_duration`, absent for a zero-length countdown
	pub progress: Option<f64>,
	pub step: f64,
	pub scale: f64,
	pub running: bool,
	pub finished: bool,
}

/// The countdown state machine without any scheduling attached.
///
/// Every mutation is synchronous and returns the signal it produced, if any.
/// `CountdownTimer` drives this from its scheduler task, but it can just as
/// well be stepped by hand from a frame loop or a test.
#[derive(Clone, Debug)]
pub struct CountdownState {
	config: CountdownConfig,
	remaining: f64,
	running: bool,
	started: bool,
	finished: bool,
}

impl CountdownState {
	/// Validates `config` and creates a paused state holding its full duration.
	pub fn new(config: CountdownConfig) -> Result<Self, TimerError> {
		config.validate()?;
		Ok(Self {
			config,
			remaining: config.duration,
			running: false,
			started: false,
			finished: false,
		})
	}

	/// Marks the countdown running. Returns `Signal::Begin` on the first call
	/// of the cycle and `None` afterwards. An ended cycle stays ended until
	/// `reset`.
	pub fn start(&mut self) -> Option<Signal> {
		if self.finished {
			return None;
		}
		self.running = true;
		if self.started {
			return None;
		}
		self.started = true;
		Some(Signal::Begin(self.config.duration))
	}

	pub fn pause(&mut self) {
		self.running = false;
	}

	/// Restores the full duration and opens a new cycle, so the next `start`
	/// emits begin again. The running flag is left to the caller.
	pub fn reset(&mut self) {
		self.remaining = self.config.duration;
		self.started = false;
		self.finished = false;
	}

	pub fn set_scale(&mut self, scale: f64) -> Result<(), TimerError> {
		config::validate_scale(scale)?;
		self.config.scale = scale;
		Ok(())
	}

	/// Performs one firing.
	///
	/// Returns `None` when paused, frozen by a zero scale, or already ended.
	/// Once the remaining time has reached zero the next firing produces
	/// `Signal::End` and halts the countdown.
	pub fn fire(&mut self) -> Option<Signal> {
		if !self.running || self.finished || self.is_frozen() {
			return None;
		}
		if self.remaining <= 0.0 {
			self.remaining = 0.0;
			self.running = false;
			self.finished = true;
			return Some(Signal::End(self.config.duration));
		}
		let decrement = self.config.step * self.config.scale;
		self.remaining = (self.remaining - decrement).max(0.0);
		Some(Signal::Step(self.remaining))
	}

	pub fn config(&self) -> &CountdownConfig {
		&self.config
	}

	pub fn remaining(&self) -> f64 {
		self.remaining
	}

	pub fn full_duration(&self) -> f64 {
		self.config.duration
	}

	pub fn elapsed(&self) -> f64 {
		self.config.duration - self.remaining
	}

	pub fn progress(&self) -> Option<f64> {
		if self.config.duration == 0.0 {
			return None;
		}
		Some((self.remaining / self.config.duration).clamp(0.0, 1.0))
	}

	pub fn step(&self) -> f64 {
		self.config.step
	}

	pub fn scale(&self) -> f64 {
		self.config.scale
	}

	pub fn interval(&self) -> Option<Duration> {
		self.config.interval()
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn is_frozen(&self) -> bool {
		self.config.scale == 0.0
	}

	pub fn is_finished(&self) -> bool {
		self.finished
	}

	pub fn has_started(&self) -> bool {
		self.started
	}

	pub fn snapshot(&self) -> CountdownSnapshot {
		CountdownSnapshot {
			remaining: self.remaining,
			full_duration: self.config.duration,
			elapsed: self.elapsed(),
			progress: self.progress(),
			step: self.config.step,
			scale: self.config.scale,
			running: self.running,
			finished: self.finished,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn running(config: CountdownConfig) -> CountdownState {
		let mut state = CountdownState::new(config).unwrap();
		assert!(!state.has_started());
		assert_eq!(state.start(), Some(Signal::Begin(config.duration)));
		assert!(state.has_started());
		state
	}

	fn fire_n(state: &mut CountdownState, n: usize) -> Vec<Signal> {
		(0..n).filter_map(|_| state.fire()).collect()
	}

	#[test]
	fn five_second_countdown_emits_steps_then_end() {
		let mut state = running(CountdownConfig::new(5.0));
		let signals = fire_n(&mut state, 8);
		assert_eq!(
			signals,
			vec![
				Signal::Step(4.0),
				Signal::Step(3.0),
				Signal::Step(2.0),
				Signal::Step(1.0),
				Signal::Step(0.0),
				Signal::End(5.0),
			]
		);
		assert!(state.is_finished());
		assert!(!state.is_running());
	}

	#[test]
	fn remaining_follows_step_times_scale() {
		for (duration, step, scale) in [(10.0, 1.0, 1.0), (12.0, 0.5, 2.0), (9.0, 1.5, 0.5)] {
			let config = CountdownConfig::new(duration).with_step(step).with_scale(scale);
			let mut state = running(config);
			for n in 1..=3 {
				state.fire();
				let expected = f64::max(duration - n as f64 * step * scale, 0.0);
				assert!((state.remaining() - expected).abs() < 1e-9);
			}
		}
	}

	#[test]
	fn rescaling_applies_to_later_firings() {
		let mut state = running(CountdownConfig::new(10.0).with_scale(2.0));
		fire_n(&mut state, 2);
		state.set_scale(1.0).unwrap();
		fire_n(&mut state, 2);
		assert_eq!(*state.config(), CountdownConfig::new(10.0).with_scale(1.0));
		assert_eq!(state.elapsed(), 6.0);
		assert_eq!(state.remaining(), 4.0);
	}

	#[test]
	fn overshoot_clamps_and_ends_once() {
		let mut state = running(CountdownConfig::new(2.5));
		let signals = fire_n(&mut state, 10);
		assert_eq!(
			signals,
			vec![Signal::Step(1.5), Signal::Step(0.5), Signal::Step(0.0), Signal::End(2.5)]
		);
		assert_eq!(state.remaining(), 0.0);
	}

	#[test]
	fn zero_duration_ends_on_first_firing() {
		let mut state = running(CountdownConfig::new(0.0));
		assert_eq!(fire_n(&mut state, 3), vec![Signal::End(0.0)]);
		assert_eq!(state.progress(), None);
	}

	#[test]
	fn begin_only_once_across_pause_and_resume() {
		let mut state = running(CountdownConfig::new(5.0));
		for _ in 0..3 {
			state.pause();
			assert_eq!(state.fire(), None);
			assert_eq!(state.start(), None);
		}
		assert_eq!(state.fire(), Some(Signal::Step(4.0)));
	}

	#[test]
	fn reset_opens_new_cycle() {
		let mut state = running(CountdownConfig::new(3.0));
		fire_n(&mut state, 10);
		state.reset();
		assert_eq!(state.remaining(), 3.0);
		assert!(!state.is_finished());
		assert!(!state.has_started());
		assert_eq!(state.start(), Some(Signal::Begin(3.0)));
		assert_eq!(state.fire(), Some(Signal::Step(2.0)));
	}

	#[test]
	fn zero_scale_freezes_remaining() {
		let mut state = running(CountdownConfig::new(5.0));
		state.fire();
		state.set_scale(0.0).unwrap();
		assert!(fire_n(&mut state, 5).is_empty());
		assert_eq!(state.remaining(), 4.0);
		assert!(state.is_running());
		assert_eq!(state.interval(), None);
		state.set_scale(1.0).unwrap();
		assert_eq!(state.fire(), Some(Signal::Step(3.0)));
	}

	#[test]
	fn invalid_scale_leaves_state_unchanged() {
		let mut state = running(CountdownConfig::new(5.0).with_scale(2.0));
		assert!(state.set_scale(-1.0).is_err());
		assert_eq!(state.scale(), 2.0);
	}

	#[test]
	fn progress_stays_in_unit_range() {
		let mut state = running(CountdownConfig::new(3.0).with_step(2.0));
		assert_eq!(state.progress(), Some(1.0));
		while state.fire().is_some() {
			let progress = state.progress().unwrap();
			assert!((0.0..=1.0).contains(&progress));
		}
		assert_eq!(state.progress(), Some(0.0));
	}

	#[test]
	fn snapshot_reflects_state() {
		let mut state = running(CountdownConfig::new(4.0));
		state.fire();
		let snapshot = state.snapshot();
		assert_eq!(snapshot.remaining, 3.0);
		assert_eq!(snapshot.elapsed, 1.0);
		assert_eq!(snapshot.progress, Some(0.75));
		assert!(snapshot.running);
		let json = serde_json::to_value(snapshot).unwrap();
		assert_eq!(json["full_duration"], 4.0);
	}
}
