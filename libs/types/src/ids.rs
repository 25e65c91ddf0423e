//! Identifier types for venue entities
//!
//! The engine emits `"O" + decimal` order ids and `"T" + decimal` trade ids
//! from session-scoped monotonic counters. Inbound identifiers are accepted
//! as opaque strings; an id the engine never issued simply fails lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an order
///
/// Opaque string, unique within a session. Engine-assigned ids are
/// `"O" + decimal`, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wrap an opaque identifier received from a client.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Engine-side constructor from the session order counter.
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("O{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for a trade
///
/// Engine-assigned ids are `"T" + decimal`, strictly increasing within a
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_seq(seq: u64) -> Self {
        Self(format!("T{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque originator tag carried on every order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_format() {
        assert_eq!(OrderId::from_seq(1).as_str(), "O1");
        assert_eq!(OrderId::from_seq(4096).as_str(), "O4096");
    }

    #[test]
    fn test_trade_id_format() {
        assert_eq!(TradeId::from_seq(7).as_str(), "T7");
    }

    #[test]
    fn test_opaque_ids_accepted() {
        let id = OrderId::new("client-supplied-id");
        assert_eq!(id.as_str(), "client-supplied-id");
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::from_seq(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"O42\"");

        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
