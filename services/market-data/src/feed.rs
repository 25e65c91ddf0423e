//! Feed consumer
//!
//! Applies the channel sink's event stream to the derived views. Enforces
//! the gap-free publish sequence on the way through; a gap means events were
//! lost between engine and consumer, which the contract forbids.

use tokio::sync::mpsc;
use tracing::debug;

use crate::events::{MarketEvent, MarketPayload};
use crate::tape::TradeTape;
use crate::view::TopOfBookView;

pub struct MarketFeed {
    pub tape: TradeTape,
    pub view: TopOfBookView,
    last_sequence: u64,
}

impl MarketFeed {
    pub fn new() -> Self {
        Self {
            tape: TradeTape::default(),
            view: TopOfBookView::new(),
            last_sequence: 0,
        }
    }

    /// Apply one event.
    ///
    /// # Panics
    /// Panics on a sequence gap; delivery from the engine is lossless by
    /// contract, so a gap is a wiring bug.
    pub fn apply(&mut self, event: MarketEvent) {
        assert_eq!(
            event.sequence,
            self.last_sequence + 1,
            "market feed sequence gap"
        );
        self.last_sequence = event.sequence;

        match event.payload {
            MarketPayload::Trade(trade) => {
                debug!(trade_id = %trade.trade_id, "tape append");
                self.tape.record(event.sequence, trade);
            }
            MarketPayload::BookDelta { symbol, top } => {
                self.view.apply(&symbol, &top);
            }
            MarketPayload::OrderStatus { .. } => {}
        }
    }

    /// Drain everything currently buffered in the feed channel.
    pub fn drain(&mut self, rx: &mut mpsc::UnboundedReceiver<MarketEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Publish sequence of the last applied event.
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }
}

impl Default for MarketFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use matching_engine::events::EventSink;
    use matching_engine::book::TopOfBook;
    use types::ids::{OrderId, TradeId};
    use types::numeric::{Price, Quantity};
    use types::symbol::Symbol;
    use types::trade::Trade;

    fn trade(seq: u64) -> Trade {
        Trade::new(
            TradeId::from_seq(seq),
            Symbol::new("ACME"),
            OrderId::from_seq(2),
            OrderId::from_seq(1),
            Price::new(10_000),
            Quantity::new(5),
            1,
            2,
            0,
        )
    }

    #[test]
    fn test_drain_applies_in_order() {
        let (mut sink, mut rx) = ChannelSink::new();
        let mut feed = MarketFeed::new();

        sink.on_trade(&trade(1));
        sink.on_book_delta(
            &Symbol::new("ACME"),
            &TopOfBook {
                best_bid: Some(Price::new(9_900)),
                best_ask: None,
                bid_size: Quantity::new(10),
                ask_size: Quantity::ZERO,
            },
        );
        sink.on_trade(&trade(2));

        assert_eq!(feed.drain(&mut rx), 3);
        assert_eq!(feed.tape.len(), 2);
        assert_eq!(feed.last_sequence(), 3);
        assert!(feed.view.get(&Symbol::new("ACME")).is_some());
    }

    #[test]
    #[should_panic(expected = "market feed sequence gap")]
    fn test_gap_detected() {
        let mut feed = MarketFeed::new();
        feed.apply(MarketEvent {
            sequence: 2,
            payload: MarketPayload::Trade(trade(1)),
        });
    }
}
