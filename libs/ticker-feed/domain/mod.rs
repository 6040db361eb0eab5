//! Domain types carried by the feed

pub mod snapshot;
pub mod symbol;

pub use snapshot::{Quote, Snapshot};
pub use symbol::{Symbol, SymbolSet};
