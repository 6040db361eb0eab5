//! # Ticker Feed
//!
//! Live market snapshot feed for a dashboard ticker.
//!
//! ## Features
//!
//! - **Push first**: WebSocket stream with a 3 s connect timeout
//! - **One-way fallback**: any push failure switches the subscription to
//!   fixed-interval polling, exactly once, for good
//! - **Failure-opaque**: subscribers only ever receive complete snapshots;
//!   unreachable endpoints are covered with synthetic quotes
//! - **Safe cancellation**: idempotent, callable from inside the callback
//!
//! ## Example
//!
//! ```rust,ignore
//! use ticker_feed::{FeedConfig, MarketFeed};
//!
//! #[tokio::main]
//! async fn main() -> ticker_feed::Result<()> {
//!     let feed = MarketFeed::new(FeedConfig::new("https://api.example.com/api"))?;
//!
//!     let handle = feed.subscribe(|snapshot| {
//!         for (symbol, quote) in snapshot.iter() {
//!             println!("{} {:.2} ({:+.2}%)", symbol, quote.price, quote.change_percent);
//!         }
//!     });
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     handle.cancel();
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domain;
pub mod failover;
pub mod traits;

pub use crate::core::{
    ChannelState, CloseHandle, ConfigError, FeedConfig, PollLoop, PushChannel, PushEndpoint,
    SnapshotFetcher, StopHandle,
};
pub use domain::{Quote, Snapshot, Symbol, SymbolSet};
pub use failover::{MarketFeed, SubscriptionHandle};
pub use traits::{FeedError, Result, SnapshotSource};
