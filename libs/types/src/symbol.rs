//! Instrument tags and per-symbol tick specifications
//!
//! A `Symbol` is an opaque instrument tag. Its `SymbolSpec` carries the tick
//! size and is the only place decimal prices are converted to and from the
//! integer tick representation used inside the book.

use crate::numeric::Price;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque instrument tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Per-symbol trading specification
///
/// `tick` is the smallest permitted price increment; every admitted price
/// must be an exact multiple of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub symbol: Symbol,
    pub tick: Decimal,
}

impl SymbolSpec {
    /// Create a new spec
    ///
    /// # Panics
    /// Panics if the tick size is not strictly positive
    pub fn new(symbol: impl Into<Symbol>, tick: Decimal) -> Self {
        assert!(tick > Decimal::ZERO, "Tick size must be positive");
        Self {
            symbol: symbol.into(),
            tick,
        }
    }

    /// Quantize a decimal price to ticks.
    ///
    /// Returns None when the price is not strictly positive or does not sit
    /// exactly on the tick grid.
    pub fn to_ticks(&self, price: Decimal) -> Option<Price> {
        if price <= Decimal::ZERO {
            return None;
        }
        if !(price % self.tick).is_zero() {
            return None;
        }
        (price / self.tick).to_u64().and_then(Price::try_new)
    }

    /// Scale a tick price back to its decimal representation.
    pub fn to_decimal(&self, price: Price) -> Decimal {
        Decimal::from(price.ticks()) * self.tick
    }
}

impl From<Symbol> for SymbolSpec {
    /// Spec with a tick of 1 (integer-priced instrument).
    fn from(symbol: Symbol) -> Self {
        Self::new(symbol, Decimal::ONE)
    }
}

/// The set of instruments a session trades.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    specs: HashMap<Symbol, SymbolSpec>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: SymbolSpec) {
        self.specs.insert(spec.symbol.clone(), spec);
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&SymbolSpec> {
        self.specs.get(symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.specs.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.specs.keys()
    }

    pub fn specs(&self) -> impl Iterator<Item = &SymbolSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<SymbolSpec> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = SymbolSpec>>(iter: I) -> Self {
        let mut table = Self::new();
        for spec in iter {
            table.insert(spec);
        }
        table
    }
}
