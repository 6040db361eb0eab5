#[cfg(test)]
use super::session::FeedMode;
use super::session::Session;
use std::sync::Arc;

/// Cancellation token for one subscription.
///
/// Cloneable. Dropping it does not cancel the subscription; call
/// [`cancel`](Self::cancel). Cancelling is idempotent, safe from inside
/// the snapshot callback, and guarantees no callback starts after it
/// returns.
#[derive(Clone)]
pub struct SubscriptionHandle {
    session: Arc<Session>,
}

impl SubscriptionHandle {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn cancel(&self) {
        self.session.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.session.is_cancelled()
    }

    /// Feed-local subscription number, as used in log lines
    pub fn id(&self) -> u64 {
        self.session.id()
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> FeedMode {
        self.session.mode()
    }

    #[cfg(test)]
    pub(crate) fn poll_starts(&self) -> u32 {
        self.session.poll_starts()
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
