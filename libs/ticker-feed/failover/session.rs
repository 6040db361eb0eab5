//! Per-subscription state
//!
//! A [`Session`] is created fresh by every `subscribe()` call and captured
//! only by that subscription's callbacks. Nothing here is shared between
//! subscriptions.

use crate::core::delivery::SnapshotSink;
use crate::core::poll_loop::{PollLoop, StopHandle};
use crate::core::push_channel::CloseHandle;
use crate::domain::Snapshot;
use crate::traits::source::SnapshotSource;
use parking_lot::Mutex;
#[cfg(test)]
use std::sync::atomic::AtomicU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Transport a subscription is using.
///
/// ```text
/// INIT ─┬─> PollOnly
///       └─> PushPending ─┬─> PushActive
///                        └─> PollFallback   (at most once, never reverts)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Push connection attempt in progress, nothing received yet
    PushPending,
    /// Snapshots arriving over push
    PushActive,
    /// Push never attempted
    PollOnly,
    /// Push failed; polling for the rest of the subscription
    PollFallback,
}

impl std::fmt::Display for FeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeedMode::PushPending => "push-pending",
            FeedMode::PushActive => "push",
            FeedMode::PollOnly => "poll-only",
            FeedMode::PollFallback => "poll-fallback",
        };
        write!(f, "{}", name)
    }
}

pub(crate) struct Session {
    id: u64,
    mode: Mutex<FeedMode>,
    fallback_fired: AtomicBool,
    sink: SnapshotSink,
    source: Arc<dyn SnapshotSource>,
    poll_interval: Duration,
    push: Mutex<Option<CloseHandle>>,
    poll: Mutex<Option<StopHandle>>,
    #[cfg(test)]
    poll_starts: AtomicU32,
}

impl Session {
    pub(crate) fn new(
        id: u64,
        mode: FeedMode,
        sink: SnapshotSink,
        source: Arc<dyn SnapshotSource>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            id,
            mode: Mutex::new(mode),
            fallback_fired: AtomicBool::new(false),
            sink,
            source,
            poll_interval,
            push: Mutex::new(None),
            poll: Mutex::new(None),
            #[cfg(test)]
            poll_starts: AtomicU32::new(0),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn mode(&self) -> FeedMode {
        *self.mode.lock()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.sink.is_cancelled()
    }

    #[cfg(test)]
    pub(crate) fn poll_starts(&self) -> u32 {
        self.poll_starts.load(Ordering::Acquire)
    }

    /// Keep the push handle so teardown can close it. If the subscription
    /// was cancelled before the handle got here, close it right away.
    pub(crate) fn attach_push(&self, handle: CloseHandle) {
        let mut push = self.push.lock();
        if self.is_cancelled() {
            handle.close();
        } else {
            *push = Some(handle);
        }
    }

    /// Snapshot arriving over push
    pub(crate) fn deliver_push(&self, snapshot: Snapshot) {
        {
            let mut mode = self.mode.lock();
            if *mode == FeedMode::PushPending {
                *mode = FeedMode::PushActive;
                info!("[Ticker] Subscription #{} receiving over push", self.id);
            }
        }
        self.sink.deliver(snapshot);
    }

    /// Push reported unavailable. Starts polling on the first call only.
    pub(crate) fn activate_fallback(self: &Arc<Self>) {
        if self.fallback_fired.swap(true, Ordering::AcqRel) {
            debug!("[Ticker] Subscription #{} fallback already active", self.id);
            return;
        }
        if self.is_cancelled() {
            return;
        }

        *self.mode.lock() = FeedMode::PollFallback;
        warn!(
            "[Ticker] Subscription #{} push unavailable, falling back to polling every {:?}",
            self.id, self.poll_interval
        );

        if let Some(push) = self.push.lock().take() {
            push.close();
        }
        self.start_poll();
    }

    /// Start the poll loop unless cancelled or already running
    pub(crate) fn start_poll(self: &Arc<Self>) {
        let mut poll = self.poll.lock();
        if self.is_cancelled() || poll.is_some() {
            return;
        }

        let session = Arc::clone(self);
        let handle = PollLoop::start(
            Arc::clone(&self.source),
            self.poll_interval,
            move |snapshot| {
                session.sink.deliver(snapshot);
            },
        );
        #[cfg(test)]
        self.poll_starts.fetch_add(1, Ordering::AcqRel);
        *poll = Some(handle);
    }

    /// Stop all delivery and release transports. Returns `true` on the first call.
    pub(crate) fn cancel(&self) -> bool {
        let first = self.sink.cancel();

        if let Some(push) = self.push.lock().take() {
            push.close();
        }
        if let Some(poll) = self.poll.lock().take() {
            poll.stop();
        }

        if first {
            info!(
                "[Ticker] Subscription #{} cancelled in {} mode ({} snapshots delivered)",
                self.id,
                self.mode(),
                self.sink.delivered()
            );
        }
        first
    }
}
