//! Ask (sell-side) ladder
//!
//! Mirror of the bid side with the lowest ask at the front of the book.

use std::collections::BTreeMap;

use slab::Slab;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::{NodeHandle, OrderNode, PriceLevel};

#[derive(Debug, Default)]
pub(crate) struct AskBook {
    arena: Slab<OrderNode>,
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
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

    /// Best ask price and its aggregate size.
    pub fn best(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next()
            .map(|(price, level)| (*price, level.total_qty()))
    }

    /// Top of book without mutation: best price, front order, level size.
    pub fn front(&self) -> Option<(Price, &Order, Quantity)> {
        let (price, level) = self.levels.iter().next()?;
        let handle = level.front().expect("level is never empty");
        Some((*price, &self.arena[handle].order, level.total_qty()))
    }

    /// Apply a fill to the front order of the best level and return the
    /// maker's state after the fill.
    pub fn fill_front(&mut self, quantity: Quantity) -> Order {
        let price = *self.levels.keys().next().expect("fill on empty side");
        let level = self.levels.get_mut(&price).expect("level exists");
        let handle = level.front().expect("level is never empty");

        let node = &mut self.arena[handle];
        node.order.apply_fill(quantity);
        level.reduce(quantity);
        node.order.clone()
    }

    /// Unlink the front of the best level if its remaining hit zero.
    pub fn pop_front_if_filled(&mut self) -> Option<Order> {
        let price = *self.levels.keys().next()?;
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

    /// Up to `n` levels in priority order (lowest price first).
    pub fn depth(&self, n: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .take(n)
            .map(|(price, level)| (*price, level.total_qty()))
            .collect()
    }

    /// Levels in priority order, for diagnostics and invariant checks.
    pub fn levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().map(|(price, level)| (*price, level))
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
