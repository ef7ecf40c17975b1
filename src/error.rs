#[derive(Debug, thiserror::Error)]
pub enum TimerError {
	#[error("Invalid {name} '{value}': {reason}")]
	InvalidArgument {
		name: &'static str,
		value: f64,
		reason: &'static str,
	},
	#[error("Timer has not been configured, call set() first")]
	NotConfigured,
	#[error("Timer was stopped, call set() or reset() to begin a new countdown")]
	Stopped,
	#[error("Broadcast channel error: {0}")]
	Broadcast(#[from] tokio::sync::broadcast::error::RecvError),
}
