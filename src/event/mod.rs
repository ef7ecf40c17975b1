use crate::error::TimerError;
use crate::signal::Signal;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// A subscription to the signals of one countdown.
///
/// Every subscriber receives every signal emitted after it subscribed.
/// A subscriber that falls more than the channel capacity behind loses the
/// oldest signals and is told so through `TimerError::Broadcast`.
///
/// # Example
///
/// ```rust
/// use countdown_timer::{CountdownConfig, CountdownTimer, Signal};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> anyhow::Result<()> {
/// let timer = CountdownTimer::new();
/// let mut signals = timer.subscribe();
/// timer.set(CountdownConfig::new(1.0).with_step(0.5).with_scale(10.0), true).await?;
/// while let Ok(signal) = signals.recv().await {
///     if let Signal::End(full) = signal {
///         println!("countdown of {full}s finished");
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SignalReceiver {
    receiver: broadcast::Receiver<Signal>,
}

impl SignalReceiver {
    pub(crate) fn new(receiver: broadcast::Receiver<Signal>) -> Self {
        Self { receiver }
    }

    /// Waits for the next signal.
    ///
    /// # Errors
    ///
    /// * `RecvError::Lagged` - signals were dropped because this subscriber fell behind;
    ///   receiving again continues with the oldest retained signal.
    /// * `RecvError::Closed` - the timer was dropped.
    pub async fn recv(&mut self) -> Result<Signal, TimerError> {
        Ok(self.receiver.recv().await?)
    }

    /// Returns the next buffered signal without waiting, `Ok(None)` if there is none.
    ///
    /// Meant for frame loops that drain pending signals once per frame.
    pub fn try_recv(&mut self) -> Result<Option<Signal>, TimerError> {
        match self.receiver.try_recv() {
            Ok(signal) => Ok(Some(signal)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Lagged(skipped)) => Err(RecvError::Lagged(skipped).into()),
            Err(TryRecvError::Closed) => Err(RecvError::Closed.into()),
        }
    }

    pub fn into_inner(self) -> broadcast::Receiver<Signal> {
        self.receiver
    }
}
