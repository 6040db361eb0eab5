//! Ticker symbols
//!
//! The feed carries a small, closed set of instruments. Three of them are
//! always present in every snapshot; the extended ones are opt-in through
//! configuration.

use serde::{Deserialize, Serialize};

// =============================================================================
// Symbol
// =============================================================================

/// Instruments shown on the ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Symbol {
    /// Domestic stock index
    Kospi,
    /// Secondary stock index
    Kosdaq,
    /// Dollar / won exchange rate
    UsdKrw,
    Nasdaq,
    Sp500,
}

impl Symbol {
    /// Wire key used in snapshot payloads and subscribe frames
    pub fn key(&self) -> &'static str {
        match self {
            Symbol::Kospi => "kospi",
            Symbol::Kosdaq => "kosdaq",
            Symbol::UsdKrw => "usdKrw",
            Symbol::Nasdaq => "nasdaq",
            Symbol::Sp500 => "sp500",
        }
    }

    /// Parse a wire key back to a symbol (exact match)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.key() == key)
    }

    /// Reference level the synthetic generator varies around
    pub fn base_value(&self) -> f64 {
        match self {
            Symbol::Kospi => 2600.0,
            Symbol::Kosdaq => 850.0,
            Symbol::UsdKrw => 1330.0,
            Symbol::Nasdaq => 16000.0,
            Symbol::Sp500 => 5000.0,
        }
    }

    /// Maximum absolute synthetic variation, scaled to typical volatility
    pub fn max_variation(&self) -> f64 {
        match self {
            Symbol::UsdKrw => 2.0,
            _ => 5.0,
        }
    }

    /// Symbols every snapshot must carry
    pub fn core() -> &'static [Symbol] {
        &[Symbol::Kospi, Symbol::Kosdaq, Symbol::UsdKrw]
    }

    /// All known symbols
    pub fn all() -> &'static [Symbol] {
        &[
            Symbol::Kospi,
            Symbol::Kosdaq,
            Symbol::UsdKrw,
            Symbol::Nasdaq,
            Symbol::Sp500,
        ]
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// =============================================================================
// SymbolSet
// =============================================================================

/// The active symbol set for a feed: core symbols plus any extended ones.
///
/// Ordered and free of duplicates. Every delivered snapshot covers exactly
/// this set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
}

impl SymbolSet {
    /// Core symbols only
    pub fn core() -> Self {
        Self {
            symbols: Symbol::core().to_vec(),
        }
    }

    /// Core symbols plus the given extended ones
    pub fn with_extended(extended: &[Symbol]) -> Self {
        let mut symbols = Symbol::core().to_vec();
        for symbol in extended {
            if !symbols.contains(symbol) {
                symbols.push(*symbol);
            }
        }
        Self { symbols }
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Wire keys in order, as sent in the subscribe frame
    pub fn channel_names(&self) -> Vec<String> {
        self.symbols.iter().map(|s| s.key().to_string()).collect()
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::core()
    }
}
