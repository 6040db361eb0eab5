//! Fixed-interval polling, the degraded substitute for push delivery
//!
//! One Tokio task per loop: fetch immediately, then once per interval
//! tick until stopped. The fetch runs inline in the task, so two fetches
//! of the same loop never overlap. When a fetch outlasts the interval the
//! missed ticks are skipped instead of replayed in a burst.

use crate::domain::Snapshot;
use crate::traits::source::SnapshotSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Default time between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Stops a running poll loop. Cloneable; stopping twice is a no-op.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
}

impl StopHandle {
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.stop_signal.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

pub struct PollLoop;

impl PollLoop {
    /// Start polling `source` every `interval`, delivering each result to
    /// `on_snapshot`. The first fetch happens immediately.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start<F>(
        source: Arc<dyn SnapshotSource>,
        interval: Duration,
        on_snapshot: F,
    ) -> StopHandle
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        let handle = StopHandle {
            stopped: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(Notify::new()),
        };

        let stopped = Arc::clone(&handle.stopped);
        let stop_signal = Arc::clone(&handle.stop_signal);
        // tokio::time::interval panics on a zero period
        let interval = interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            run_poll(source, interval, on_snapshot, stopped, stop_signal).await;
        });

        handle
    }
}

async fn run_poll<F>(
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
    mut on_snapshot: F,
    stopped: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
) where
    F: FnMut(Snapshot),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!("[Ticker Poll] Started with interval {:?}", interval);

    loop {
        tokio::select! {
            biased;
            _ = stop_signal.notified() => break,
            _ = ticker.tick() => {}
        }

        let snapshot = tokio::select! {
            biased;
            _ = stop_signal.notified() => break,
            snapshot = source.snapshot() => snapshot,
        };

        if stopped.load(Ordering::Acquire) {
            break;
        }
        on_snapshot(snapshot);
    }

    debug!("[Ticker Poll] Stopped");
}
