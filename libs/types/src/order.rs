//! Order lifecycle types

use crate::ids::{ClientId, OrderId};
use crate::numeric::{Price, Quantity};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// Order status
///
/// `Filled`, `Cancelled` and `Rejected` are terminal: an order reaches a
/// terminal status at most once and is dropped from the book when it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        }
    }
}

/// A single resting or in-flight limit order
///
/// `arrival_seq` is assigned on admission and is the secondary key for time
/// priority; within a price level, queue entries are strictly increasing in
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub client_id: ClientId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub filled: Quantity,
    pub status: OrderStatus,
    pub arrival_seq: u64,
}

impl Order {
    /// Create a new pending order
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        client_id: ClientId,
        symbol: Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
        arrival_seq: u64,
    ) -> Self {
        Self {
            order_id,
            client_id,
            symbol,
            side,
            price,
            quantity,
            filled: Quantity::ZERO,
            status: OrderStatus::Pending,
            arrival_seq,
        }
    }

    /// Unfilled remainder, `quantity - filled`.
    pub fn remaining(&self) -> Quantity {
        self.quantity - self.filled
    }

    pub fn is_filled(&self) -> bool {
        self.filled == self.quantity
    }

    pub fn has_fills(&self) -> bool {
        !self.filled.is_zero()
    }

    /// Record a fill and advance the status.
    ///
    /// # Panics
    /// Panics if the fill would exceed the order quantity or if the order is
    /// already terminal
    pub fn apply_fill(&mut self, quantity: Quantity) {
        assert!(!self.status.is_terminal(), "Cannot fill terminal order");
        assert!(
            self.filled + quantity <= self.quantity,
            "Fill would exceed order quantity"
        );

        self.filled += quantity;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// Transition to CANCELLED.
    ///
    /// # Panics
    /// Panics if the order is already terminal
    pub fn cancel(&mut self) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
    }
}
