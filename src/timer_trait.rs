use crate::error::TimerError;
use std::future::Future;

pub trait Timer {
	/// Starts the countdown, emitting the begin signal once per cycle
	fn start(&self) -> impl Future<Output = Result<(), TimerError>> + Send;
	/// Suspends firing without touching the remaining time
	fn pause(&self) -> impl Future<Output = Result<(), TimerError>> + Send;
	/// Continues firing from the current remaining time
	fn resume(&self) -> impl Future<Output = Result<(), TimerError>> + Send;
	/// Restores the full duration; `None` keeps the current running state
	fn reset(&self, start: Option<bool>) -> impl Future<Output = Result<(), TimerError>> + Send;
	/// Aborts the countdown and releases its scheduler
	fn stop(&self) -> impl Future<Output = Result<(), TimerError>> + Send;
	fn is_running(&self) -> impl Future<Output = bool> + Send;
}
