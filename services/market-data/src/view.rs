//! Per-symbol top-of-book view
//!
//! Mirrors the engine's book deltas into the latest quote per symbol. Sizes
//! and spreads here are in ticks and units; the wire layer scales them back
//! to decimals with the symbol's spec.

use std::collections::HashMap;
use std::fmt;

use matching_engine::book::TopOfBook;
use types::symbol::Symbol;

#[derive(Debug, Default)]
pub struct TopOfBookView {
    quotes: HashMap<Symbol, TopOfBook>,
}

impl TopOfBookView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, symbol: &Symbol, top: &TopOfBook) {
        self.quotes.insert(symbol.clone(), top.clone());
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&TopOfBook> {
        self.quotes.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.quotes.keys()
    }
}

impl fmt::Display for TopOfBookView {
    /// Compact diagnostic ladder, one symbol per line, prices in ticks.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols: Vec<&Symbol> = self.quotes.keys().collect();
        symbols.sort_by_key(|symbol| symbol.as_str());
        for symbol in symbols {
            let top = &self.quotes[symbol];
            let bid = top
                .best_bid
                .map_or("-".to_string(), |p| format!("{}x{}", p, top.bid_size));
            let ask = top
                .best_ask
                .map_or("-".to_string(), |p| format!("{}x{}", p, top.ask_size));
            writeln!(f, "{symbol}: {bid} | {ask}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::{Price, Quantity};

    #[test]
    fn test_apply_overwrites_quote() {
        let mut view = TopOfBookView::new();
        let symbol = Symbol::new("ACME");

        view.apply(
            &symbol,
            &TopOfBook {
                best_bid: Some(Price::new(9_900)),
                best_ask: None,
                bid_size: Quantity::new(10),
                ask_size: Quantity::ZERO,
            },
        );
        view.apply(
            &symbol,
            &TopOfBook {
                best_bid: Some(Price::new(9_950)),
                best_ask: Some(Price::new(10_050)),
                bid_size: Quantity::new(5),
                ask_size: Quantity::new(7),
            },
        );

        let top = view.get(&symbol).unwrap();
        assert_eq!(top.best_bid, Some(Price::new(9_950)));
        assert_eq!(top.spread(), Some(100));
    }

    #[test]
    fn test_display_renders_both_sides() {
        let mut view = TopOfBookView::new();
        view.apply(
            &Symbol::new("ACME"),
            &TopOfBook {
                best_bid: Some(Price::new(9_900)),
                best_ask: Some(Price::new(10_100)),
                bid_size: Quantity::new(10),
                ask_size: Quantity::new(5),
            },
        );

        assert_eq!(view.to_string(), "ACME: 9900x10 | 10100x5\n");
    }
}
