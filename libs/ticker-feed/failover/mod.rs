//! Push-first subscription with one-way fallback to polling

pub mod controller;
pub mod handle;
pub(crate) mod session;

pub use controller::MarketFeed;
pub use handle::SubscriptionHandle;
