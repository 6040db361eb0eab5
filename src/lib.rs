//! Market Ticker - Main Library
//!
//! Thin application layer over the `ticker-feed` workspace library.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (config path, logging)
//! - **ticker_feed**: Live snapshot feed (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use market_ticker::bin_common::{load_config_from_env, ConfigType};
//! use market_ticker::ticker_feed::MarketFeed;
//! ```

// Re-export workspace library for convenience
pub use ticker_feed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use runner::{init_tracing, print_banner, print_shutdown};
}
