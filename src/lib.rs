#[cfg(feature = "event-timers")]
pub mod event;
#[cfg(feature = "callback-timers")]
pub mod callback;
pub mod timer_trait;
pub mod error;
pub mod config;
pub mod signal;
pub mod state;
pub mod countdown;

pub use config::CountdownConfig;
pub use countdown::CountdownTimer;
pub use error::TimerError;
pub use signal::{Signal, SignalKind};
pub use state::CountdownSnapshot;
pub use timer_trait::Timer;

#[cfg(all(not(feature = "callback-timers"), not(feature = "event-timers")))]
compile_error!("At least one of the features 'callback-timers' or 'event-timers' must be enabled.");
