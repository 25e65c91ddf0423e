//! Id allocation and trade construction
//!
//! Owns the three session counters: arrival sequence, order id, trade id.
//! They advance only inside engine operations, so sequence numbers match
//! commit order by construction.

use types::ids::{OrderId, TradeId};
use types::numeric::Quantity;
use types::order::{Order, Side};
use types::trade::Trade;

/// Session-scoped counters and trade factory
#[derive(Debug, Default)]
pub struct MatchExecutor {
    order_seq: u64,
    trade_seq: u64,
    arrival_seq: u64,
}

impl MatchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next engine-assigned order id (`"O" + decimal`, strictly increasing).
    pub fn next_order_id(&mut self) -> OrderId {
        self.order_seq += 1;
        OrderId::from_seq(self.order_seq)
    }

    /// Next admission sequence, the secondary key for time priority.
    pub fn next_arrival_seq(&mut self) -> u64 {
        self.arrival_seq += 1;
        self.arrival_seq
    }

    /// Build the trade for one fill between an aggressor and the maker at
    /// the front of the opposite book.
    ///
    /// The execution price is the maker's price, always.
    pub fn execute_trade(
        &mut self,
        taker: &Order,
        maker: &Order,
        quantity: Quantity,
        executed_at: i64,
    ) -> Trade {
        self.trade_seq += 1;
        let (buy, sell) = match taker.side {
            Side::Buy => (taker, maker),
            Side::Sell => (maker, taker),
        };
        Trade::new(
            TradeId::from_seq(self.trade_seq),
            maker.symbol.clone(),
            buy.order_id.clone(),
            sell.order_id.clone(),
            maker.price,
            quantity,
            maker.arrival_seq,
            taker.arrival_seq,
            executed_at,
        )
    }

    /// Orders admitted this session (the order counter's current value).
    pub fn total_orders(&self) -> u64 {
        self.order_seq
    }

    /// Counter values, for state export.
    pub fn counters(&self) -> (u64, u64, u64) {
        (self.order_seq, self.trade_seq, self.arrival_seq)
    }

    /// Restore counter values from exported state.
    pub fn restore_counters(order_seq: u64, trade_seq: u64, arrival_seq: u64) -> Self {
        Self {
            order_seq,
            trade_seq,
            arrival_seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::ClientId;
    use types::numeric::Price;
    use types::symbol::Symbol;

    fn order(seq: u64, side: Side, price: u64) -> Order {
        Order::new(
            OrderId::from_seq(seq),
            ClientId::new("c1"),
            Symbol::new("ACME"),
            side,
            Price::new(price),
            Quantity::new(100),
            seq,
        )
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut executor = MatchExecutor::new();
        assert_eq!(executor.next_order_id().as_str(), "O1");
        assert_eq!(executor.next_order_id().as_str(), "O2");
        assert_eq!(executor.next_arrival_seq(), 1);
        assert_eq!(executor.next_arrival_seq(), 2);
    }

    #[test]
    fn test_trade_uses_maker_price() {
        let mut executor = MatchExecutor::new();
        let maker = order(1, Side::Sell, 10_000);
        let taker = order(2, Side::Buy, 10_100);

        let trade = executor.execute_trade(&taker, &maker, Quantity::new(50), 0);

        assert_eq!(trade.trade_id.as_str(), "T1");
        assert_eq!(trade.price, Price::new(10_000));
        assert_eq!(trade.buy_order_id, taker.order_id);
        assert_eq!(trade.sell_order_id, maker.order_id);
        assert_eq!(trade.maker_seq, 1);
        assert_eq!(trade.taker_seq, 2);
    }

    #[test]
    fn test_trade_sides_orient_by_taker() {
        let mut executor = MatchExecutor::new();
        let maker = order(1, Side::Buy, 10_000);
        let taker = order(2, Side::Sell, 9_900);

        let trade = executor.execute_trade(&taker, &maker, Quantity::new(10), 0);

        assert_eq!(trade.buy_order_id, maker.order_id);
        assert_eq!(trade.sell_order_id, taker.order_id);
        assert_eq!(trade.price, Price::new(10_000));
    }
}
