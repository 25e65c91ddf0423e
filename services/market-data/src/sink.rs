//! Channel-backed event sink
//!
//! Hands every emission off to an unbounded channel so the engine never
//! blocks on a consumer. The channel preserves the engine's emission order
//! and loses nothing while the receiver lives.

use matching_engine::book::TopOfBook;
use matching_engine::events::EventSink;
use tokio::sync::mpsc;
use tracing::warn;
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::OrderStatus;
use types::symbol::Symbol;
use types::trade::Trade;

use crate::events::{MarketEvent, MarketPayload};

pub struct ChannelSink {
    tx: mpsc::UnboundedSender<MarketEvent>,
    sequence: u64,
}

impl ChannelSink {
    /// Create the sink and the receiving end of its feed.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MarketEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, sequence: 0 }, rx)
    }

    fn publish(&mut self, payload: MarketPayload) {
        self.sequence += 1;
        let event = MarketEvent {
            sequence: self.sequence,
            payload,
        };
        if self.tx.send(event).is_err() {
            // receiver gone: the session is tearing down
            warn!(sequence = self.sequence, "market event dropped, feed closed");
        }
    }
}

impl EventSink for ChannelSink {
    fn on_trade(&mut self, trade: &Trade) {
        self.publish(MarketPayload::Trade(trade.clone()));
    }

    fn on_order_status(&mut self, order_id: &OrderId, status: OrderStatus, remaining: Quantity) {
        self.publish(MarketPayload::OrderStatus {
            order_id: order_id.clone(),
            status,
            remaining,
        });
    }

    fn on_book_delta(&mut self, symbol: &Symbol, top: &TopOfBook) {
        self.publish(MarketPayload::BookDelta {
            symbol: symbol.clone(),
            top: top.clone(),
        });
    }
}
