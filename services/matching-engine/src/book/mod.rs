//! Per-symbol order book
//!
//! Owns both side ladders and the cancel index, and keeps the derived
//! top-of-book projections in step with every mutation. All order state
//! lives here; the engine only drives the primitives.

mod ask_book;
mod bid_book;
mod price_level;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use types::errors::BookError;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, Side};
use types::symbol::Symbol;

use ask_book::AskBook;
use bid_book::BidBook;
use price_level::NodeHandle;

/// Derived top-of-book projections
///
/// `bid_size` / `ask_size` are the aggregate quantity at the best level.
/// Refreshed after every mutation; always equal to a fresh ladder scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub bid_size: Quantity,
    pub ask_size: Quantity,
}

impl TopOfBook {
    /// Spread in ticks, when both sides are live.
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(ask.ticks() - bid.ticks()),
            _ => None,
        }
    }
}

/// Location of a resting order: which side arena, which slot.
#[derive(Debug, Clone, Copy)]
struct BookHandle {
    side: Side,
    node: NodeHandle,
}

/// Order book for a single symbol
pub struct OrderBook {
    symbol: Symbol,
    bids: BidBook,
    asks: AskBook,
    /// O(1) cancel index. Scanning a level queue for an id is prohibited.
    index: HashMap<OrderId, BookHandle>,
    tops: TopOfBook,
    /// Optional cap on resting orders (`BOOK_FULL` when exceeded).
    capacity: Option<usize>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            index: HashMap::new(),
            tops: TopOfBook::default(),
            capacity: None,
        }
    }

    pub fn with_capacity(symbol: Symbol, capacity: usize) -> Self {
        let mut book = Self::new(symbol);
        book.capacity = Some(capacity);
        book
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Rest an order at the tail of its price level.
    ///
    /// The order must have remaining quantity and a live status; a reused id
    /// is a `DUPLICATE_ID` conflict.
    pub fn insert(&mut self, order: Order) -> Result<(), BookError> {
        debug_assert!(!order.remaining().is_zero());
        debug_assert!(!order.status.is_terminal());

        if self.index.contains_key(&order.order_id) {
            return Err(BookError::DuplicateId(order.order_id));
        }
        if let Some(capacity) = self.capacity {
            if self.index.len() >= capacity {
                return Err(BookError::BookFull { capacity });
            }
        }

        debug!(
            order_id = %order.order_id,
            side = order.side.as_str(),
            price = %order.price,
            remaining = %order.remaining(),
            "resting order"
        );

        let id = order.order_id.clone();
        let side = order.side;
        let node = match side {
            Side::Buy => self.bids.insert(order),
            Side::Sell => self.asks.insert(order),
        };
        self.index.insert(id, BookHandle { side, node });
        self.refresh_tops();
        Ok(())
    }

    /// Remove a resting order by id in O(1), returning its pre-removal state.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let handle = self.index.remove(order_id)?;
        let order = match handle.side {
            Side::Buy => self.bids.remove(handle.node),
            Side::Sell => self.asks.remove(handle.node),
        };
        debug!(order_id = %order_id, "unlinked order");
        self.refresh_tops();
        Some(order)
    }

    /// Top of book for one side without mutation: price, front order, level
    /// aggregate.
    pub fn best(&self, side: Side) -> Option<(Price, &Order, Quantity)> {
        match side {
            Side::Buy => self.bids.front(),
            Side::Sell => self.asks.front(),
        }
    }

    /// Fill the front order of the given side's best level; returns the
    /// maker's state after the fill.
    ///
    /// # Panics
    /// Panics if the side is empty; callers check [`OrderBook::best`] first.
    pub fn fill_front(&mut self, side: Side, quantity: Quantity) -> Order {
        let maker = match side {
            Side::Buy => self.bids.fill_front(quantity),
            Side::Sell => self.asks.fill_front(quantity),
        };
        self.refresh_tops();
        maker
    }

    /// If the head of the side's best level is fully filled, unlink it and
    /// drop it from the index.
    pub fn pop_front_if_filled(&mut self, side: Side) -> Option<Order> {
        let order = match side {
            Side::Buy => self.bids.pop_front_if_filled(),
            Side::Sell => self.asks.pop_front_if_filled(),
        }?;
        self.index.remove(&order.order_id);
        self.refresh_tops();
        Some(order)
    }

    /// Up to `n` levels of one side in priority order.
    pub fn depth(&self, side: Side, n: usize) -> Vec<(Price, Quantity)> {
        match side {
            Side::Buy => self.bids.depth(n),
            Side::Sell => self.asks.depth(n),
        }
    }

    /// Current derived projections.
    pub fn snapshot(&self) -> TopOfBook {
        self.tops.clone()
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    /// Fail fast when the resting-order cap is reached.
    pub fn ensure_capacity(&self) -> Result<(), BookError> {
        match self.capacity {
            Some(capacity) if self.index.len() >= capacity => {
                Err(BookError::BookFull { capacity })
            }
            _ => Ok(()),
        }
    }

    /// Read a resting order by id.
    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        let handle = self.index.get(order_id)?;
        let node = match handle.side {
            Side::Buy => &self.bids.arena()[handle.node],
            Side::Sell => &self.asks.arena()[handle.node],
        };
        Some(&node.order)
    }

    /// Total resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Resting orders of one side in priority order, front of queue first.
    /// Drives snapshots and invariant checks, not matching.
    pub fn side_orders(&self, side: Side) -> Vec<&Order> {
        match side {
            Side::Buy => self
                .bids
                .levels()
                .flat_map(|(_, level)| level.iter(self.bids.arena()).map(|(_, o)| o))
                .collect(),
            Side::Sell => self
                .asks
                .levels()
                .flat_map(|(_, level)| level.iter(self.asks.arena()).map(|(_, o)| o))
                .collect(),
        }
    }

    fn refresh_tops(&mut self) {
        let bid = self.bids.best();
        let ask = self.asks.best();
        self.tops = TopOfBook {
            best_bid: bid.map(|(price, _)| price),
            best_ask: ask.map(|(price, _)| price),
            bid_size: bid.map_or(Quantity::ZERO, |(_, qty)| qty),
            ask_size: ask.map_or(Quantity::ZERO, |(_, qty)| qty),
        };
    }

    /// Assert every structural invariant of the book.
    ///
    /// Diagnostic used by the randomized tests after every operation.
    ///
    /// # Panics
    /// Panics on the first violated invariant.
    pub fn check_invariants(&self) {
        // no crossed book
        if let (Some((bid, _, _)), Some((ask, _, _))) =
            (self.best(Side::Buy), self.best(Side::Sell))
        {
            assert!(bid < ask, "crossed book: bid {bid} >= ask {ask}");
        }

        let mut resting = 0usize;
        for side in [Side::Buy, Side::Sell] {
            let levels: Vec<_> = match side {
                Side::Buy => self.bids.levels().collect(),
                Side::Sell => self.asks.levels().collect(),
            };
            let arena = match side {
                Side::Buy => self.bids.arena(),
                Side::Sell => self.asks.arena(),
            };

            for (price, level) in levels {
                let mut sum = Quantity::ZERO;
                let mut count = 0usize;
                let mut last_seq = None;
                for (_, order) in level.iter(arena) {
                    assert_eq!(order.price, price, "order filed under wrong level");
                    assert_eq!(order.side, side, "order filed under wrong side");
                    assert!(
                        matches!(
                            order.status,
                            OrderStatus::Pending | OrderStatus::PartiallyFilled
                        ),
                        "terminal order resting on book: {}",
                        order.order_id
                    );
                    assert!(
                        !order.remaining().is_zero(),
                        "zero-remaining order resting on book: {}",
                        order.order_id
                    );
                    if let Some(prev) = last_seq {
                        assert!(
                            order.arrival_seq > prev,
                            "arrival_seq not increasing within level {price}"
                        );
                    }
                    last_seq = Some(order.arrival_seq);
                    assert!(
                        self.index.contains_key(&order.order_id),
                        "resting order missing from index: {}",
                        order.order_id
                    );
                    sum += order.remaining();
                    count += 1;
                }
                assert_eq!(level.total_qty(), sum, "level aggregate out of step");
                assert_eq!(level.order_count(), count, "level count out of step");
                assert!(count > 0, "empty level retained at {price}");
                resting += count;
            }
        }

        assert_eq!(
            self.index.len(),
            resting,
            "index cardinality does not match resting orders"
        );
        for (id, handle) in &self.index {
            let node = match handle.side {
                Side::Buy => &self.bids.arena()[handle.node],
                Side::Sell => &self.asks.arena()[handle.node],
            };
            assert_eq!(&node.order.order_id, id, "index handle points at wrong order");
        }

        // cached projections agree with a fresh scan
        let bid = self.bids.best();
        let ask = self.asks.best();
        assert_eq!(self.tops.best_bid, bid.map(|(p, _)| p));
        assert_eq!(self.tops.best_ask, ask.map(|(p, _)| p));
        assert_eq!(self.tops.bid_size, bid.map_or(Quantity::ZERO, |(_, q)| q));
        assert_eq!(self.tops.ask_size, ask.map_or(Quantity::ZERO, |(_, q)| q));
    }
}
