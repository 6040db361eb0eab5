//! Core traits and error types shared across the feed

pub mod error;
pub mod source;

pub use error::{FeedError, Result};
pub use source::SnapshotSource;
