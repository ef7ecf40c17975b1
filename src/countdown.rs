#[cfg(feature = "callback-timers")]
use crate::callback::{ObserverId, Observers};
use crate::config::{self, CountdownConfig};
use crate::error::TimerError;
#[cfg(feature = "event-timers")]
use crate::event::SignalReceiver;
use crate::signal::Signal;
#[cfg(feature = "callback-timers")]
use crate::signal::SignalKind;
use crate::state::{CountdownSnapshot, CountdownState};
use crate::timer_trait::Timer;
use log::{debug, trace};
use std::sync::{Arc, Weak};
use std::time::Duration;
#[cfg(feature = "event-timers")]
use tokio::sync::broadcast;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Signals buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// An asynchronous countdown driven by a tokio task.
///
/// Clones are handles to the same countdown, so one task can render it while
/// another pauses or rescales it. Control operations only take a short lock
/// and never wait on the scheduler. Dropping the last handle aborts the
/// scheduler task.
///
/// Signals are delivered while the countdown's state lock is held, which
/// keeps them ordered (begin, then steps, then a single end) and guarantees
/// nothing is emitted once `pause` or `stop` has returned. Observer callbacks
/// should therefore use their payload instead of awaiting the timer.
///
/// # Example
///
/// ```rust
/// use countdown_timer::{CountdownConfig, CountdownTimer, Timer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> anyhow::Result<()> {
/// let timer = CountdownTimer::new();
/// timer.set(CountdownConfig::new(3.0), false).await?;
/// timer.start().await?;
/// timer.pause().await?;
/// assert_eq!(timer.remaining().await?, 3.0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CountdownTimer {
    inner: Arc<Inner>,
}

struct Inner {
    shared: Mutex<Shared>,
    #[cfg(feature = "callback-timers")]
    observers: Observers,
    #[cfg(feature = "event-timers")]
    sender: broadcast::Sender<Signal>,
}

#[derive(Default)]
struct Shared {
    state: Option<CountdownState>,
    stopped: bool,
    /// Identifies the live scheduler task; a task holding an older value exits without firing.
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Shared {
    fn cancel_scheduler(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(task) = self.handle.take() {
            task.abort();
        }
    }

    fn scheduler_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Inner {
    fn emit(&self, signal: Signal) {
        trace!("Countdown signal {:?}", signal);
        #[cfg(feature = "event-timers")]
        {
            // Ignore send errors (happens when no receivers are listening)
            let _ = self.sender.send(signal);
        }
        #[cfg(feature = "callback-timers")]
        self.observers.notify(signal);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = self.shared.get_mut().handle.take() {
            task.abort();
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("snapshot", &self.try_snapshot())
            .finish_non_exhaustive()
    }
}

impl CountdownTimer {
    /// Creates an unconfigured countdown. Call [`CountdownTimer::set`] before starting it.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates an unconfigured countdown whose subscribers buffer up to
    /// `capacity` signals each (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        #[cfg(not(feature = "event-timers"))]
        let _ = capacity;
        let inner = Inner {
            shared: Mutex::new(Shared::default()),
            #[cfg(feature = "callback-timers")]
            observers: Observers::new(),
            #[cfg(feature = "event-timers")]
            sender: broadcast::channel(capacity.max(1)).0,
        };
        Self { inner: Arc::new(inner) }
    }

    /// Configures a new countdown cycle, replacing any previous one.
    ///
    /// The previous scheduler is released before the new state is installed.
    /// With `start` set the countdown starts right away and emits begin.
    ///
    /// # Errors
    ///
    /// * `TimerError::InvalidArgument` - `config` failed validation. The timer is left untouched.
    pub async fn set(&self, config: CountdownConfig, start: bool) -> Result<(), TimerError> {
        let state = CountdownState::new(config)?;
        let mut shared = self.inner.shared.lock().await;
        shared.cancel_scheduler();
        shared.state = Some(state);
        shared.stopped = false;
        debug!(
            "Countdown set to {}s (step {}s, scale {}), start={}",
            config.duration, config.step, config.scale, start
        );
        if start {
            self.start_locked(&mut shared)?;
        }
        Ok(())
    }

    /// Changes the time scale from the next firing on.
    ///
    /// The period already being waited out is kept; firings after it use the
    /// new period and decrement. A scale of `0` freezes the countdown and
    /// releases its scheduler while it stays logically running. Raising the
    /// scale again picks up from the frozen remaining time.
    ///
    /// # Errors
    ///
    /// * `TimerError::InvalidArgument` - `scale` is negative or not finite.
    /// * `TimerError::NotConfigured` - `set` was never called.
    pub async fn set_scale(&self, scale: f64) -> Result<(), TimerError> {
        config::validate_scale(scale)?;
        let mut shared = self.inner.shared.lock().await;
        let state = shared.state.as_mut().ok_or(TimerError::NotConfigured)?;
        state.set_scale(scale)?;
        let running = state.is_running();
        let frozen = state.is_frozen();
        debug!("Countdown scale set to {}", scale);

        if running && frozen {
            shared.cancel_scheduler();
        } else if running && !shared.scheduler_alive() {
            self.spawn_scheduler(&mut shared);
        }
        Ok(())
    }

    pub async fn remaining(&self) -> Result<f64, TimerError> {
        self.read(CountdownState::remaining).await
    }

    pub async fn full_duration(&self) -> Result<f64, TimerError> {
        self.read(CountdownState::full_duration).await
    }

    pub async fn elapsed(&self) -> Result<f64, TimerError> {
        self.read(CountdownState::elapsed).await
    }

    /// Fraction of the countdown still remaining, `None` for a zero-length countdown.
    pub async fn progress(&self) -> Result<Option<f64>, TimerError> {
        self.read(CountdownState::progress).await
    }

    pub async fn step(&self) -> Result<f64, TimerError> {
        self.read(CountdownState::step).await
    }

    pub async fn scale(&self) -> Result<f64, TimerError> {
        self.read(CountdownState::scale).await
    }

    /// Current firing period, `None` while frozen by a zero scale.
    pub async fn interval(&self) -> Result<Option<Duration>, TimerError> {
        self.read(CountdownState::interval).await
    }

    pub async fn snapshot(&self) -> Result<CountdownSnapshot, TimerError> {
        self.read(CountdownState::snapshot).await
    }

    /// Non-waiting variant of [`CountdownTimer::snapshot`] for frame loops.
    ///
    /// Returns `None` when the timer is unconfigured or its state is locked
    /// at this instant (a firing or control operation is in progress).
    pub fn try_snapshot(&self) -> Option<CountdownSnapshot> {
        let shared = self.inner.shared.try_lock().ok()?;
        shared.state.as_ref().map(CountdownState::snapshot)
    }

    async fn read<T>(&self, f: impl FnOnce(&CountdownState) -> T) -> Result<T, TimerError> {
        let shared = self.inner.shared.lock().await;
        shared.state.as_ref().map(f).ok_or(TimerError::NotConfigured)
    }

    fn start_locked(&self, shared: &mut Shared) -> Result<(), TimerError> {
        if shared.stopped {
            return Err(TimerError::Stopped);
        }
        let state = shared.state.as_mut().ok_or(TimerError::NotConfigured)?;
        // Begin goes out before the scheduler exists, so it precedes every step.
        if let Some(begin) = state.start() {
            self.inner.emit(begin);
        }
        if state.is_running() && !shared.scheduler_alive() {
            self.spawn_scheduler(shared);
        }
        Ok(())
    }

    fn spawn_scheduler(&self, shared: &mut Shared) {
        let Some(period) = shared.state.as_ref().and_then(CountdownState::interval) else {
            debug!("Countdown frozen, no scheduler spawned");
            return;
        };
        shared.cancel_scheduler();
        let generation = shared.generation;
        trace!("Spawning countdown scheduler #{} with period {:?}", generation, period);
        let task = tokio::spawn(run_scheduler(Arc::downgrade(&self.inner), generation, period));
        shared.handle = Some(task);
    }
}

#[cfg(feature = "callback-timers")]
impl CountdownTimer {
    /// Registers `callback` for signals of `kind`.
    ///
    /// Callbacks run in registration order on the scheduler task (or on the
    /// caller of `start`/`reset` for begin). Errors they return are logged.
    /// Registering and removing observers is allowed from inside a callback.
    pub fn observe<F>(&self, kind: SignalKind, callback: F) -> ObserverId
    where
        F: Fn(f64) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.inner.observers.register(kind, callback)
    }

    /// Called with the full duration whenever a cycle begins.
    pub fn on_begin<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(f64) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.observe(SignalKind::Begin, callback)
    }

    /// Called with the remaining time after every firing.
    pub fn on_step<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(f64) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.observe(SignalKind::Step, callback)
    }

    /// Called with the full duration once the countdown has run out.
    pub fn on_end<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(f64) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.observe(SignalKind::End, callback)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.inner.observers.remove(id)
    }
}

#[cfg(feature = "event-timers")]
impl CountdownTimer {
    /// Subscribes to every signal emitted from now on.
    pub fn subscribe(&self) -> SignalReceiver {
        SignalReceiver::new(self.inner.sender.subscribe())
    }
}

impl Timer for CountdownTimer {
    /// Starts the countdown. Begin is emitted on the first start of a cycle
    /// only; starting a running countdown has no further effect.
    ///
    /// # Errors
    ///
    /// * `TimerError::NotConfigured` - `set` was never called.
    /// * `TimerError::Stopped` - the cycle was stopped; `set` or `reset` first.
    async fn start(&self) -> Result<(), TimerError> {
        let mut shared = self.inner.shared.lock().await;
        self.start_locked(&mut shared)?;
        debug!("Countdown started");
        Ok(())
    }

    /// Suspends firing. Once this returns no further signal is emitted until
    /// the countdown is resumed.
    async fn pause(&self) -> Result<(), TimerError> {
        let mut shared = self.inner.shared.lock().await;
        let state = shared.state.as_mut().ok_or(TimerError::NotConfigured)?;
        state.pause();
        shared.cancel_scheduler();
        debug!("Countdown paused");
        Ok(())
    }

    /// Continues from the current remaining time without re-emitting begin.
    ///
    /// A cycle that was configured without starting has not begun yet, so
    /// resuming it emits begin like `start` would.
    async fn resume(&self) -> Result<(), TimerError> {
        let mut shared = self.inner.shared.lock().await;
        self.start_locked(&mut shared)?;
        debug!("Countdown resumed");
        Ok(())
    }

    /// Restores the full duration with the last step and scale.
    ///
    /// `None` keeps the running state from before the call, `Some(start)`
    /// overrides it. A reset opens a new cycle, so a countdown that ends up
    /// running emits begin again, even if it was running before the reset.
    /// Resetting also clears a previous `stop`.
    async fn reset(&self, start: Option<bool>) -> Result<(), TimerError> {
        let mut shared = self.inner.shared.lock().await;
        let state = shared.state.as_mut().ok_or(TimerError::NotConfigured)?;
        let run = start.unwrap_or(state.is_running());
        state.reset();
        state.pause();
        shared.cancel_scheduler();
        shared.stopped = false;
        debug!("Countdown reset, start={}", run);
        if run {
            self.start_locked(&mut shared)?;
        }
        Ok(())
    }

    /// Halts the countdown and releases its scheduler. A firing racing with
    /// this call is discarded. `start` and `resume` fail until the next `set`
    /// or `reset`. Stopping a stopped timer is a no-op.
    ///
    /// # Errors
    ///
    /// * `TimerError::NotConfigured` - `set` was never called.
    async fn stop(&self) -> Result<(), TimerError> {
        let mut shared = self.inner.shared.lock().await;
        let state = shared.state.as_mut().ok_or(TimerError::NotConfigured)?;
        state.pause();
        shared.cancel_scheduler();
        shared.stopped = true;
        debug!("Countdown stopped");
        Ok(())
    }

    async fn is_running(&self) -> bool {
        let shared = self.inner.shared.lock().await;
        shared.state.as_ref().is_some_and(CountdownState::is_running)
    }
}

/// Fires the countdown every `period` until it ends, is frozen, or the
/// generation moves on.
///
/// The period is re-read after each firing, so a rescale lands on the next
/// boundary without disturbing the sleep in progress.
async fn run_scheduler(timer: Weak<Inner>, generation: u64, mut period: Duration) {
    loop {
        tokio::time::sleep(period).await;
        let Some(inner) = timer.upgrade() else {
            return;
        };
        let mut shared = inner.shared.lock().await;
        if shared.generation != generation {
            return;
        }

        let fired = shared
            .state
            .as_mut()
            .and_then(|state| state.fire().map(|signal| (signal, state.interval())));
        match fired {
            Some((signal @ Signal::Step(_), Some(next))) => {
                inner.emit(signal);
                period = next;
            }
            Some((signal, _)) => {
                inner.emit(signal);
                shared.handle = None;
                if let Signal::End(full) = signal {
                    debug!("Countdown of {}s ended", full);
                }
                return;
            }
            None => {
                shared.handle = None;
                return;
            }
        }
    }
}
