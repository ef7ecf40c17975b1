use crate::signal::{Signal, SignalKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type SignalCallback = dyn Fn(f64) -> anyhow::Result<()> + Send + Sync;

/// Handle returned on registration, used to remove the observer again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Entries = HashMap<SignalKind, Vec<(ObserverId, Arc<SignalCallback>)>>;

/// Ordered observer lists, one per signal kind.
///
/// `notify` copies the matching list before invoking anything, so callbacks
/// may register or remove observers (including themselves) while running.
/// Such changes take effect from the next signal on.
#[derive(Default)]
pub struct Observers {
    next_id: AtomicU64,
    entries: Mutex<Entries>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, kind: SignalKind, callback: F) -> ObserverId
    where
        F: Fn(f64) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().entry(kind).or_default().push((id, Arc::new(callback)));
        id
    }

    /// Returns `false` if no observer with `id` was registered.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut entries = self.lock();
        for list in entries.values_mut() {
            if let Some(index) = list.iter().position(|(entry, _)| *entry == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    pub fn len(&self, kind: SignalKind) -> usize {
        self.lock().get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values().all(Vec::is_empty)
    }

    pub fn notify(&self, signal: Signal) {
        let callbacks: Vec<Arc<SignalCallback>> = self
            .lock()
            .get(&signal.kind())
            .map(|list| list.iter().map(|(_, callback)| Arc::clone(callback)).collect())
            .unwrap_or_default();

        for callback in callbacks {
            if let Err(e) = callback(signal.value()) {
                log::error!("Countdown {:?} observer failed: {:?}", signal.kind(), e);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // A panicking observer cannot leave the lists half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
