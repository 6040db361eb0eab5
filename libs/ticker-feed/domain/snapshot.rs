//! Quote snapshots
//!
//! A [`Snapshot`] is the unit of delivery: one complete set of quotes at a
//! single instant. Partial snapshots are never constructed.

use super::symbol::{Symbol, SymbolSet};
use crate::traits::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

// =============================================================================
// Quote
// =============================================================================

/// A single instrument quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: f64,
    /// Absolute change against the reference level
    pub change: f64,
    /// Change in percent
    pub change_percent: f64,
}

impl Quote {
    pub fn new(price: f64, change: f64, change_percent: f64) -> Self {
        Self {
            price,
            change,
            change_percent,
        }
    }

    /// All three fields are finite numbers
    pub fn is_finite(&self) -> bool {
        self.price.is_finite() && self.change.is_finite() && self.change_percent.is_finite()
    }

    /// `change` and `change_percent` point the same way (zero counts as its own sign)
    pub fn is_consistent(&self) -> bool {
        sign(self.change) == sign(self.change_percent)
    }
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Complete set of quotes for the active [`SymbolSet`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    quotes: BTreeMap<Symbol, Quote>,
}

impl Snapshot {
    /// Build a snapshot from already-validated quotes.
    ///
    /// Fails if any symbol of `symbols` is missing or carries a non-finite
    /// field. Quotes for symbols outside the set are dropped.
    pub fn from_quotes(quotes: BTreeMap<Symbol, Quote>, symbols: &SymbolSet) -> Result<Self> {
        let mut kept = BTreeMap::new();
        for symbol in symbols.iter() {
            let quote = quotes
                .get(&symbol)
                .copied()
                .ok_or(FeedError::MissingSymbol(symbol))?;
            if !quote.is_finite() {
                return Err(FeedError::InvalidQuote {
                    symbol,
                    reason: "non-finite field".to_string(),
                });
            }
            kept.insert(symbol, quote);
        }
        Ok(Self { quotes: kept })
    }

    /// Wrap quotes the caller built for every symbol of its set
    pub(crate) fn from_complete(quotes: BTreeMap<Symbol, Quote>) -> Self {
        Self { quotes }
    }

    /// Parse a JSON object shaped like `{ "<key>": { price, change, changePercent }, ... }`.
    ///
    /// Unknown keys are ignored. Used both for the fetch envelope's `data`
    /// and for push frames.
    pub fn from_value(value: &Value, symbols: &SymbolSet) -> Result<Self> {
        let object = value.as_object().ok_or(FeedError::MissingData)?;

        let mut quotes = BTreeMap::new();
        for symbol in symbols.iter() {
            let raw = object
                .get(symbol.key())
                .ok_or(FeedError::MissingSymbol(symbol))?;
            let quote: Quote =
                serde_json::from_value(raw.clone()).map_err(|e| FeedError::InvalidQuote {
                    symbol,
                    reason: e.to_string(),
                })?;
            if !quote.is_consistent() {
                debug!(
                    "[Ticker] {} quote has mismatched change signs ({} / {}%)",
                    symbol, quote.change, quote.change_percent
                );
            }
            quotes.insert(symbol, quote);
        }

        Self::from_quotes(quotes, symbols)
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Quote> {
        self.quotes.get(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Quote)> {
        self.quotes.iter().map(|(s, q)| (*s, q))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Whether every symbol of `symbols` is present
    pub fn covers(&self, symbols: &SymbolSet) -> bool {
        symbols.iter().all(|s| self.quotes.contains_key(&s))
    }
}
