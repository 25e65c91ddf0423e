//! Sequence-numbered event envelope
//!
//! Every emission leaving the engine through a [`crate::sink::ChannelSink`]
//! is wrapped with a per-session publish sequence. Consumers use it for
//! ordering checks and tape replay.

use matching_engine::book::TopOfBook;
use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::OrderStatus;
use types::symbol::Symbol;
use types::trade::Trade;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Monotonic publish sequence, gap-free within a session.
    pub sequence: u64,
    pub payload: MarketPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum MarketPayload {
    Trade(Trade),
    OrderStatus {
        order_id: OrderId,
        status: OrderStatus,
        remaining: Quantity,
    },
    BookDelta {
        symbol: Symbol,
        top: TopOfBook,
    },
}
