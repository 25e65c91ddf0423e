//! Event sink contract
//!
//! The engine publishes through this single interface. Delivery within a
//! session is totally ordered and matches emission order; the engine never
//! blocks on a sink, so implementations that perform I/O must buffer or
//! hand off internally.

use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::OrderStatus;
use types::symbol::Symbol;
use types::trade::Trade;

use crate::book::TopOfBook;

/// Consumer contract for engine emissions.
pub trait EventSink {
    /// A fill occurred. Emitted in the order fills happen, best level first.
    fn on_trade(&mut self, trade: &Trade);

    /// An order changed status. For a maker, emitted immediately after its
    /// contributing trade; the submitter's own event closes the operation.
    fn on_order_status(&mut self, order_id: &OrderId, status: OrderStatus, remaining: Quantity);

    /// The top of book changed.
    fn on_book_delta(&mut self, symbol: &Symbol, top: &TopOfBook);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_trade(&mut self, _trade: &Trade) {}
    fn on_order_status(&mut self, _order_id: &OrderId, _status: OrderStatus, _remaining: Quantity) {}
    fn on_book_delta(&mut self, _symbol: &Symbol, _top: &TopOfBook) {}
}

/// One recorded emission, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
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

/// In-memory sink that records the full emission stream.
///
/// Backs the emission-ordering and law tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trades(&self) -> Vec<&Trade> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Trade(trade) => Some(trade),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<(&OrderId, OrderStatus, Quantity)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::OrderStatus {
                    order_id,
                    status,
                    remaining,
                } => Some((order_id, *status, *remaining)),
                _ => None,
            })
            .collect()
    }

    pub fn last_delta(&self) -> Option<(&Symbol, &TopOfBook)> {
        self.events.iter().rev().find_map(|event| match event {
            SinkEvent::BookDelta { symbol, top } => Some((symbol, top)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn on_trade(&mut self, trade: &Trade) {
        self.events.push(SinkEvent::Trade(trade.clone()));
    }

    fn on_order_status(&mut self, order_id: &OrderId, status: OrderStatus, remaining: Quantity) {
        self.events.push(SinkEvent::OrderStatus {
            order_id: order_id.clone(),
            status,
            remaining,
        });
    }

    fn on_book_delta(&mut self, symbol: &Symbol, top: &TopOfBook) {
        self.events.push(SinkEvent::BookDelta {
            symbol: symbol.clone(),
            top: top.clone(),
        });
    }
}
