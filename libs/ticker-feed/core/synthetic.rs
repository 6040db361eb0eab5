//! Synthetic snapshot generation
//!
//! Used in place of real data when the snapshot endpoint is unusable. Each
//! quote is the symbol's base value plus a bounded random variation.

use crate::domain::{Quote, Snapshot, Symbol, SymbolSet};
use rand::Rng;
use std::collections::BTreeMap;

/// Round to two decimals, folding negative zero into zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Quote for `symbol` given a variation within `±max_variation`.
///
/// A move too small to show as a percentage is reported as unchanged, so
/// the signs of `change` and `change_percent` always agree.
pub fn quote_for(symbol: Symbol, variation: f64) -> Quote {
    let base = symbol.base_value();
    let mut change = round2(variation);
    let mut change_percent = round2(change / base * 100.0);

    if change_percent == 0.0 {
        change = 0.0;
        change_percent = 0.0;
    }

    Quote::new(round2(base + change), change, change_percent)
}

/// Generate a complete synthetic snapshot for `symbols`
pub fn synthesize<R: Rng + ?Sized>(symbols: &SymbolSet, rng: &mut R) -> Snapshot {
    let quotes: BTreeMap<Symbol, Quote> = symbols
        .iter()
        .map(|symbol| {
            let bound = symbol.max_variation();
            let variation = rng.gen_range(-bound..=bound);
            (symbol, quote_for(symbol, variation))
        })
        .collect();

    Snapshot::from_complete(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_quote_for_positive_move() {
        let quote = quote_for(Symbol::Kospi, 4.137);
        assert_eq!(quote.change, 4.14);
        assert_eq!(quote.price, 2604.14);
        assert_eq!(quote.change_percent, 0.16);
    }

    #[test]
    fn test_quote_for_negative_move() {
        let quote = quote_for(Symbol::UsdKrw, -1.996);
        assert_eq!(quote.change, -2.0);
        assert_eq!(quote.price, 1328.0);
        assert_eq!(quote.change_percent, -0.15);
    }

    #[test]
    fn test_tiny_move_reported_flat() {
        let quote = quote_for(Symbol::Kospi, 0.05);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
        assert_eq!(quote.price, 2600.0);
        assert!(quote.is_consistent());

        let quote = quote_for(Symbol::Kospi, -0.001);
        assert_eq!(quote.change.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn test_synthetic_snapshots_hold_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let set = SymbolSet::with_extended(Symbol::all());

        for _ in 0..2_000 {
            let snapshot = synthesize(&set, &mut rng);
            assert!(snapshot.covers(&set));
            for (symbol, quote) in snapshot.iter() {
                assert!(quote.is_finite());
                assert!(quote.is_consistent(), "{}: {:?}", symbol, quote);
                let band = symbol.max_variation() + 0.005;
                assert!((quote.price - symbol.base_value()).abs() <= band);
            }
        }
    }
}
