//! Subscription entry point
//!
//! [`MarketFeed::subscribe`] is the only way consumers receive snapshots.
//! It tries push first and, if push turns out to be unavailable, switches
//! the subscription to polling for the rest of its life. Consumers never
//! see which transport is in use and never see an error.

use super::handle::SubscriptionHandle;
use super::session::{FeedMode, Session};
use crate::core::config::FeedConfig;
use crate::core::delivery::SnapshotSink;
use crate::core::endpoint::push_url;
use crate::core::fetcher::SnapshotFetcher;
use crate::core::push_channel::{PushChannel, PushEndpoint};
use crate::domain::{Snapshot, SymbolSet};
use crate::traits::error::Result;
use crate::traits::source::SnapshotSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Live market snapshot feed
pub struct MarketFeed {
    source: Arc<dyn SnapshotSource>,
    push_endpoint: Option<PushEndpoint>,
    poll_interval: Duration,
    symbols: SymbolSet,
    next_id: AtomicU64,
}

impl MarketFeed {
    /// Build a feed backed by the HTTP snapshot endpoint
    pub fn new(config: FeedConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = SnapshotFetcher::new(&config)?;
        Ok(Self::with_source(&config, Arc::new(fetcher)))
    }

    /// Build a feed with a custom polling source
    pub fn with_source(config: &FeedConfig, source: Arc<dyn SnapshotSource>) -> Self {
        let symbols = config.symbol_set();

        let push_endpoint = if config.push.enabled {
            match push_url(&config.base_url, &config.push.stream_path) {
                Ok(url) => Some(PushEndpoint {
                    url,
                    symbols: symbols.clone(),
                    connect_timeout: config.connect_timeout(),
                }),
                Err(e) => {
                    warn!("[Ticker] Push disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            source,
            push_endpoint,
            poll_interval: config.poll_interval(),
            symbols,
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether subscriptions will attempt push before polling
    pub fn push_capable(&self) -> bool {
        self.push_endpoint.is_some()
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Single snapshot through the polling source (never fails)
    pub async fn fetch_once(&self) -> Snapshot {
        self.source.snapshot().await
    }

    /// Start delivering snapshots to `on_snapshot` until the returned
    /// handle is cancelled.
    ///
    /// Every subscription gets its own connection and timers.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn subscribe<F>(&self, on_snapshot: F) -> SubscriptionHandle
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sink = SnapshotSink::new(on_snapshot);

        let Some(endpoint) = self.push_endpoint.clone() else {
            let session = Arc::new(Session::new(
                id,
                FeedMode::PollOnly,
                sink,
                Arc::clone(&self.source),
                self.poll_interval,
            ));
            info!("[Ticker] Subscription #{} started (poll only)", id);
            session.start_poll();
            return SubscriptionHandle::new(session);
        };

        let session = Arc::new(Session::new(
            id,
            FeedMode::PushPending,
            sink,
            Arc::clone(&self.source),
            self.poll_interval,
        ));
        info!(
            "[Ticker] Subscription #{} started (push: {})",
            id, endpoint.url
        );

        let on_push = Arc::clone(&session);
        let on_unavailable = Arc::clone(&session);
        let close = PushChannel::open(
            endpoint,
            move |snapshot| on_push.deliver_push(snapshot),
            move || on_unavailable.activate_fallback(),
        );
        session.attach_push(close);

        SubscriptionHandle::new(session)
    }
}
