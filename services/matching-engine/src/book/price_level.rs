//! Price level with an intrusive FIFO queue
//!
//! A price level is one rung of the ladder: all live orders at a single
//! price, in arrival order. Orders live as nodes in the side's slab arena;
//! the level itself only holds the list ends and cached aggregates, so
//! unlinking any node is O(1) given its handle.

use slab::Slab;
use types::numeric::Quantity;
use types::order::Order;

/// Stable handle into a side's order arena.
pub(crate) type NodeHandle = usize;

/// A resting order plus its intrusive queue links.
#[derive(Debug)]
pub(crate) struct OrderNode {
    pub order: Order,
    pub prev: Option<NodeHandle>,
    pub next: Option<NodeHandle>,
}

/// FIFO queue of resting orders at a single price
///
/// Invariant: `total_qty` equals the sum of `remaining()` over the queue,
/// and queue entries are strictly increasing in `arrival_seq`.
#[derive(Debug, Default)]
pub(crate) struct PriceLevel {
    head: Option<NodeHandle>,
    tail: Option<NodeHandle>,
    total_qty: Quantity,
    count: usize,
}

impl PriceLevel {
    /// Append an order at the back of the queue (time priority).
    pub fn push_back(&mut self, arena: &mut Slab<OrderNode>, order: Order) -> NodeHandle {
        let remaining = order.remaining();
        let handle = arena.insert(OrderNode {
            order,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => arena[tail].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.count += 1;
        self.total_qty += remaining;
        handle
    }

    /// Unlink a node anywhere in the queue and reclaim its arena slot.
    pub fn unlink(&mut self, arena: &mut Slab<OrderNode>, handle: NodeHandle) -> Order {
        let (prev, next, remaining) = {
            let node = &arena[handle];
            (node.prev, node.next, node.order.remaining())
        };

        match prev {
            Some(p) => arena[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => arena[n].prev = prev,
            None => self.tail = prev,
        }
        self.count -= 1;
        self.total_qty -= remaining;
        arena.remove(handle).order
    }

    /// Handle of the order at the front of the queue.
    pub fn front(&self) -> Option<NodeHandle> {
        self.head
    }

    /// Shrink the aggregate after a fill against one of this level's orders.
    pub fn reduce(&mut self, quantity: Quantity) {
        self.total_qty -= quantity;
    }

    pub fn total_qty(&self) -> Quantity {
        self.total_qty
    }

    pub fn order_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate handles and orders front to back.
    pub fn iter<'a>(&self, arena: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            arena,
            cursor: self.head,
        }
    }
}

pub(crate) struct LevelIter<'a> {
    arena: &'a Slab<OrderNode>,
    cursor: Option<NodeHandle>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (NodeHandle, &'a Order);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let node = &self.arena[handle];
        self.cursor = node.next;
        Some((handle, &node.order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{ClientId, OrderId};
    use types::numeric::Price;
    use types::order::Side;
    use types::symbol::Symbol;

    fn order(seq: u64, qty: u64) -> Order {
        Order::new(
            OrderId::from_seq(seq),
            ClientId::new("c1"),
            Symbol::new("ACME"),
            Side::Sell,
            Price::new(10_000),
            Quantity::new(qty),
            seq,
        )
    }

    #[test]
    fn test_push_back_keeps_fifo() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::default();

        level.push_back(&mut arena, order(1, 10));
        level.push_back(&mut arena, order(2, 20));
        level.push_back(&mut arena, order(3, 30));

        let seqs: Vec<u64> = level.iter(&arena).map(|(_, o)| o.arrival_seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(level.total_qty(), Quantity::new(60));
        assert_eq!(level.order_count(), 3);
    }

    #[test]
    fn test_unlink_middle() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::default();

        level.push_back(&mut arena, order(1, 10));
        let middle = level.push_back(&mut arena, order(2, 20));
        level.push_back(&mut arena, order(3, 30));

        let removed = level.unlink(&mut arena, middle);
        assert_eq!(removed.arrival_seq, 2);

        let seqs: Vec<u64> = level.iter(&arena).map(|(_, o)| o.arrival_seq).collect();
        assert_eq!(seqs, vec![1, 3]);
        assert_eq!(level.total_qty(), Quantity::new(40));
    }

    #[test]
    fn test_unlink_front_and_back() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::default();

        let first = level.push_back(&mut arena, order(1, 10));
        level.push_back(&mut arena, order(2, 20));
        let last = level.push_back(&mut arena, order(3, 30));

        level.unlink(&mut arena, first);
        assert_eq!(level.front(), level.iter(&arena).next().map(|(h, _)| h));

        level.unlink(&mut arena, last);
        let seqs: Vec<u64> = level.iter(&arena).map(|(_, o)| o.arrival_seq).collect();
        assert_eq!(seqs, vec![2]);
    }

    #[test]
    fn test_unlink_last_empties_level() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::default();

        let only = level.push_back(&mut arena, order(1, 10));
        level.unlink(&mut arena, only);

        assert!(level.is_empty());
        assert!(level.front().is_none());
        assert!(level.total_qty().is_zero());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn test_reduce_tracks_partial_fill() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::default();

        let front = level.push_back(&mut arena, order(1, 50));
        arena[front].order.apply_fill(Quantity::new(20));
        level.reduce(Quantity::new(20));

        assert_eq!(level.total_qty(), Quantity::new(30));
        let (_, o) = level.iter(&arena).next().unwrap();
        assert_eq!(o.remaining(), Quantity::new(30));
    }
}
