use crate::core::config::ConfigError;
use crate::domain::Symbol;
use thiserror::Error;

/// Main error type for the ticker feed
///
/// None of these ever reach a subscriber: fetch failures are replaced with
/// synthetic data and push failures trigger the polling fallback. They exist
/// so the internal paths can be tested and logged.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Envelope arrived with `success: false`
    #[error("Server reported failure")]
    Rejected,

    /// Envelope `data` absent or not an object
    #[error("Snapshot data missing")]
    MissingData,

    /// Snapshot lacks a required symbol
    #[error("Snapshot missing symbol: {0}")]
    MissingSymbol(Symbol),

    /// Quote for a symbol could not be decoded
    #[error("Invalid quote for {symbol}: {reason}")]
    InvalidQuote { symbol: Symbol, reason: String },

    /// Push endpoint could not be derived from the base URL
    #[error("Endpoint error: {0}")]
    Endpoint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for ticker feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
