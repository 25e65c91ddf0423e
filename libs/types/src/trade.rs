//! Trade records
//!
//! A trade is the atomic exchange produced by one step of the matching loop.
//! Its price is always the resting (maker) order's price.

use crate::ids::{OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    /// Execution price: the passive side's price, in ticks.
    pub price: Price,
    pub quantity: Quantity,
    /// Arrival sequence of the resting party.
    pub maker_seq: u64,
    /// Arrival sequence of the aggressing party.
    pub taker_seq: u64,
    /// Commit timestamp, Unix milliseconds.
    pub executed_at: i64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trade_id: TradeId,
        symbol: Symbol,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        price: Price,
        quantity: Quantity,
        maker_seq: u64,
        taker_seq: u64,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id,
            symbol,
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            maker_seq,
            taker_seq,
            executed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_serialization() {
        let trade = Trade::new(
            TradeId::from_seq(1),
            Symbol::new("ACME"),
            OrderId::from_seq(2),
            OrderId::from_seq(1),
            Price::new(10_000),
            Quantity::new(50),
            1,
            2,
            1_708_123_456_789,
        );

        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }
}
