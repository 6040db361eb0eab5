//! Transports, fetcher and the pieces they share
//!
//! - [`fetcher`]: one-shot HTTP snapshot with synthetic fallback
//! - [`push_channel`]: WebSocket channel with a single unavailability report
//! - [`poll_loop`]: fixed-interval polling
//! - [`delivery`]: cancellation-gated callback invocation

pub mod channel_state;
pub mod config;
pub mod delivery;
pub mod endpoint;
pub mod fetcher;
pub mod frame;
pub mod poll_loop;
pub mod push_channel;
pub mod synthetic;

pub use channel_state::{AtomicChannelState, ChannelState};
pub use config::{ConfigError, FeedConfig};
pub use delivery::SnapshotSink;
pub use fetcher::SnapshotFetcher;
pub use frame::Frame;
pub use poll_loop::{PollLoop, StopHandle, DEFAULT_POLL_INTERVAL};
pub use push_channel::{CloseHandle, PushChannel, PushEndpoint};
