//! Bid (buy-side) ladder
//!
//! Price levels sorted so the highest bid is the front of the book. The
//! BTreeMap gives deterministic iteration; the slab arena owns the order
//! nodes so handles stay stable across mutations.

use std::collections::BTreeMap;

use slab::Slab;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::{NodeHandle, OrderNode, PriceLevel};

#[derive(Debug, Default)]
pub(crate) struct BidBook {
    arena: Slab<OrderNode>,
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order to the tail of its price level, creating the level if
    /// absent. Returns the stable arena handle for the cancel index.
    pub fn insert(&mut self, order: Order) -> NodeHandle {
        let level = self.levels.entry(order.price).or_default();
        level.push_back(&mut self.arena, order)
    }

    /// Unlink an order by handle, dropping its level if it empties.
    pub fn remove(&mut self, handle: NodeHandle) -> Order {
        let price = self.arena[handle].order.price;
        let level = self
            .levels
            .get_mut(&price)
            .expect("level exists for resting order");
        let order = level.unlink(&mut self.arena, handle);
        if level.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    /// Best bid price and its aggregate size.
    pub fn best(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next_back()
            .map(|(price, level)| (*price, level.total_qty()))
    }

    /// Top of book without mutation: best price, front order, level size.
    pub fn front(&self) -> Option<(Price, &Order, Quantity)> {
        let (price, level) = self.levels.iter().next_back()?;
        let handle = level.front().expect("level is never empty");
        Some((*price, &self.arena[handle].order, level.total_qty()))
    }

    /// Apply a fill to the front order of the best level and return the
    /// maker's state after the fill.
    pub fn fill_front(&mut self, quantity: Quantity) -> Order {
        let price = *self.levels.keys().next_back().expect("fill on empty side");
        let level = self.levels.get_mut(&price).expect("level exists");
        let handle = level.front().expect("level is never empty");

        let node = &mut self.arena[handle];
        node.order.apply_fill(quantity);
        level.reduce(quantity);
        node.order.clone()
    }

    /// Unlink the front of the best level if its remaining hit zero.
    pub fn pop_front_if_filled(&mut self) -> Option<Order> {
        let price = *self.levels.keys().next_back()?;
        let level = self.levels.get_mut(&price).expect("level exists");
        let handle = level.front().expect("level is never empty");

        if !self.arena[handle].order.remaining().is_zero() {
            return None;
        }

        let order = level.unlink(&mut self.arena, handle);
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(order)
    }

    /// Up to `n` levels in priority order (highest price first).
    pub fn depth(&self, n: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .rev()
            .take(n)
            .map(|(price, level)| (*price, level.total_qty()))
            .collect()
    }

    /// Levels in priority order, for diagnostics and invariant checks.
    pub fn levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().rev().map(|(price, level)| (*price, level))
    }

    pub fn arena(&self) -> &Slab<OrderNode> {
        &self.arena
    }

    /// Resting orders on this side.
    pub fn order_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{ClientId, OrderId};
    use types::order::Side;
    use types::symbol::Symbol;

    fn bid(seq: u64, price: u64, qty: u64) -> Order {
        Order::new(
            OrderId::from_seq(seq),
            ClientId::new("c1"),
            Symbol::new("ACME"),
            Side::Buy,
            Price::new(price),
            Quantity::new(qty),
            seq,
        )
    }

    #[test]
    fn test_best_is_highest_price() {
        let mut book = BidBook::new();
        book.insert(bid(1, 10_000, 10));
        book.insert(bid(2, 10_100, 20));
        book.insert(bid(3, 9_900, 15));

        let (price, qty) = book.best().unwrap();
        assert_eq!(price, Price::new(10_100));
        assert_eq!(qty, Quantity::new(20));
    }

    #[test]
    fn test_depth_descends() {
        let mut book = BidBook::new();
        book.insert(bid(1, 10_000, 10));
        book.insert(bid(2, 10_100, 20));
        book.insert(bid(3, 9_900, 15));
        book.insert(bid(4, 10_100, 5));

        let depth = book.depth(2);
        assert_eq!(
            depth,
            vec![
                (Price::new(10_100), Quantity::new(25)),
                (Price::new(10_000), Quantity::new(10)),
            ]
        );
    }

    #[test]
    fn test_remove_by_handle_drops_empty_level() {
        let mut book = BidBook::new();
        let handle = book.insert(bid(1, 10_000, 10));
        book.insert(bid(2, 9_900, 5));

        let removed = book.remove(handle);
        assert_eq!(removed.arrival_seq, 1);
        assert_eq!(book.best().unwrap().0, Price::new(9_900));
        assert_eq!(book.order_count(), 1);
    }

    #[test]
    fn test_fill_front_then_pop() {
        let mut book = BidBook::new();
        book.insert(bid(1, 10_000, 10));
        book.insert(bid(2, 10_000, 20));

        let maker = book.fill_front(Quantity::new(10));
        assert!(maker.remaining().is_zero());
        assert_eq!(book.best().unwrap().1, Quantity::new(20));

        let popped = book.pop_front_if_filled().unwrap();
        assert_eq!(popped.arrival_seq, 1);
        assert!(book.pop_front_if_filled().is_none());
        assert_eq!(book.order_count(), 1);
    }
}
