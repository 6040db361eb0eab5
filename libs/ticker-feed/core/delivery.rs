//! Gated delivery to the subscriber callback
//!
//! Every snapshot a subscription hands to its consumer goes through one
//! [`SnapshotSink`]. Delivery and cancellation take the same reentrant
//! lock, so once [`SnapshotSink::cancel`] returns no callback can start,
//! and a callback that cancels its own subscription does not deadlock.

use crate::domain::Snapshot;
use parking_lot::ReentrantMutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

type Callback = Box<dyn Fn(Snapshot) + Send + Sync>;

pub struct SnapshotSink {
    gate: ReentrantMutex<()>,
    cancelled: AtomicBool,
    delivered: AtomicU64,
    callback: Callback,
}

impl SnapshotSink {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        Self {
            gate: ReentrantMutex::new(()),
            cancelled: AtomicBool::new(false),
            delivered: AtomicU64::new(0),
            callback: Box::new(callback),
        }
    }

    /// Invoke the callback unless cancelled. Returns whether it ran.
    pub fn deliver(&self, snapshot: Snapshot) -> bool {
        let _guard = self.gate.lock();
        if self.cancelled.load(Ordering::Acquire) {
            return false;
        }
        (self.callback)(snapshot);
        self.delivered.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Block all further deliveries. Returns `true` only for the first call.
    pub fn cancel(&self) -> bool {
        let _guard = self.gate.lock();
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Number of snapshots handed to the callback so far
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for SnapshotSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotSink")
            .field("cancelled", &self.is_cancelled())
            .field("delivered", &self.delivered())
            .finish()
    }
}
