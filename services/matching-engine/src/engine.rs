//! Matching engine core
//!
//! Stateless policy over the per-symbol books: each admitted order crosses
//! the opposite side until it is exhausted or no matchable liquidity
//! remains, then any residual rests. All counters advance inside these
//! operations, so sequence numbers match commit order.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use types::errors::{EngineError, LookupError, ValidationError};
use types::ids::{ClientId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, Side};
use types::symbol::{Symbol, SymbolTable};

use crate::book::{OrderBook, TopOfBook};
use crate::events::EventSink;
use crate::matching::crossing;
use crate::matching::executor::MatchExecutor;

/// One order admission, as carried by [`MatchingEngine::batch`].
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub side: Side,
    pub price: Decimal,
    pub quantity: u64,
    pub symbol: Symbol,
    pub client_id: ClientId,
}

/// Terminal record kept after an order leaves the book, so a later cancel
/// can answer `ALREADY_TERMINAL` instead of `UNKNOWN_ID`.
#[derive(Debug, Clone, Copy)]
struct RetiredOrder {
    status: OrderStatus,
    remaining: Quantity,
}

/// Price-time priority continuous matching engine
///
/// Generic over the sink so tests can record emissions in memory while the
/// session hands them off to a channel.
pub struct MatchingEngine<S> {
    books: HashMap<Symbol, OrderBook>,
    symbols: SymbolTable,
    executor: MatchExecutor,
    retired: HashMap<OrderId, RetiredOrder>,
    sink: S,
}

impl<S: EventSink> MatchingEngine<S> {
    /// Create an engine trading the given symbols.
    pub fn new(symbols: SymbolTable, sink: S) -> Self {
        let books = symbols
            .symbols()
            .map(|symbol| (symbol.clone(), OrderBook::new(symbol.clone())))
            .collect();
        Self {
            books,
            symbols,
            executor: MatchExecutor::new(),
            retired: HashMap::new(),
            sink,
        }
    }

    /// Create an engine with a per-book resting-order cap.
    pub fn with_book_capacity(symbols: SymbolTable, sink: S, capacity: usize) -> Self {
        let books = symbols
            .symbols()
            .map(|symbol| {
                (
                    symbol.clone(),
                    OrderBook::with_capacity(symbol.clone(), capacity),
                )
            })
            .collect();
        Self {
            books,
            symbols,
            executor: MatchExecutor::new(),
            retired: HashMap::new(),
            sink,
        }
    }

    /// Admit a limit order: validate, assign ids, match, rest the residual.
    ///
    /// Returns the engine-assigned order id. On a validation error nothing
    /// is mutated and no event is emitted.
    pub fn submit(
        &mut self,
        side: Side,
        price: Decimal,
        quantity: u64,
        symbol: Symbol,
        client_id: ClientId,
        now_ms: i64,
    ) -> Result<OrderId, EngineError> {
        let spec = self.symbols.get(&symbol).ok_or_else(|| {
            warn!(symbol = %symbol, "submit for unknown symbol");
            ValidationError::UnknownSymbol(symbol.clone())
        })?;
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity(quantity.to_string()).into());
        }
        let ticks = spec
            .to_ticks(price)
            .ok_or_else(|| ValidationError::InvalidPrice(price.to_string()))?;

        let book = self.books.get(&symbol).expect("book exists for registered symbol");
        book.ensure_capacity()?;

        let order_id = self.executor.next_order_id();
        let arrival_seq = self.executor.next_arrival_seq();
        debug!(
            order_id = %order_id,
            side = side.as_str(),
            price = %price,
            quantity,
            symbol = %symbol,
            arrival_seq,
            "order admitted"
        );

        let order = Order::new(
            order_id.clone(),
            client_id,
            symbol,
            side,
            ticks,
            Quantity::new(quantity),
            arrival_seq,
        );
        self.run_match(order, now_ms)?;
        Ok(order_id)
    }

    /// Remove a resting order and transition it to CANCELLED.
    pub fn cancel(&mut self, order_id: &OrderId) -> Result<(), EngineError> {
        let Some(symbol) = self.locate(order_id) else {
            return Err(if self.retired.contains_key(order_id) {
                LookupError::AlreadyTerminal(order_id.clone()).into()
            } else {
                LookupError::UnknownId(order_id.clone()).into()
            });
        };

        let book = self.books.get_mut(&symbol).expect("book exists for located order");
        let before = book.snapshot();
        let mut order = book.remove(order_id).expect("located order is resting");
        order.cancel();
        info!(order_id = %order_id, symbol = %symbol, "order cancelled");

        self.retired.insert(
            order_id.clone(),
            RetiredOrder {
                status: OrderStatus::Cancelled,
                remaining: order.remaining(),
            },
        );
        self.sink
            .on_order_status(order_id, OrderStatus::Cancelled, order.remaining());

        let after = book.snapshot();
        if after != before {
            self.sink.on_book_delta(&symbol, &after);
        }
        Ok(())
    }

    /// Cancel and reissue under the same id with the new price and quantity.
    ///
    /// The reissued order gets a fresh `arrival_seq`: queue priority at the
    /// old price is deliberately lost. If the cancel or the validation of
    /// the new values fails, nothing is mutated.
    pub fn modify(
        &mut self,
        order_id: &OrderId,
        new_price: Decimal,
        new_quantity: u64,
        now_ms: i64,
    ) -> Result<(), EngineError> {
        let Some(symbol) = self.locate(order_id) else {
            return Err(if self.retired.contains_key(order_id) {
                LookupError::AlreadyTerminal(order_id.clone()).into()
            } else {
                LookupError::UnknownId(order_id.clone()).into()
            });
        };

        let spec = self.symbols.get(&symbol).expect("spec exists for booked symbol");
        if new_quantity == 0 {
            return Err(ValidationError::InvalidQuantity(new_quantity.to_string()).into());
        }
        let ticks = spec
            .to_ticks(new_price)
            .ok_or_else(|| ValidationError::InvalidPrice(new_price.to_string()))?;

        let book = self.books.get_mut(&symbol).expect("book exists for located order");
        let mut old = book.remove(order_id).expect("located order is resting");
        let side = old.side;
        let client_id = old.client_id.clone();
        old.cancel();
        info!(order_id = %order_id, symbol = %symbol, "order modified");
        self.sink
            .on_order_status(order_id, OrderStatus::Cancelled, old.remaining());

        let arrival_seq = self.executor.next_arrival_seq();
        let order = Order::new(
            order_id.clone(),
            client_id,
            symbol,
            side,
            ticks,
            Quantity::new(new_quantity),
            arrival_seq,
        );
        self.retired.remove(order_id);
        self.run_match(order, now_ms)
    }

    /// Admit a sequence of orders in list order with per-submit semantics.
    pub fn batch(
        &mut self,
        requests: Vec<SubmitRequest>,
        now_ms: i64,
    ) -> Vec<Result<OrderId, EngineError>> {
        requests
            .into_iter()
            .map(|request| {
                self.submit(
                    request.side,
                    request.price,
                    request.quantity,
                    request.symbol,
                    request.client_id,
                    now_ms,
                )
            })
            .collect()
    }

    /// The authoritative matching loop: cross against the opposite side
    /// best-first, emit a trade and the maker's status per fill, rest any
    /// residual, close with the submitter's status and a book delta.
    fn run_match(&mut self, mut order: Order, now_ms: i64) -> Result<(), EngineError> {
        let book = self
            .books
            .get_mut(&order.symbol)
            .expect("book exists for registered symbol");
        let before = book.snapshot();
        let opposite = order.side.opposite();

        while !order.remaining().is_zero() {
            let Some((maker_price, maker, _)) = book.best(opposite) else {
                break;
            };
            if !crossing::crosses(order.side, order.price, maker_price) {
                break;
            }
            let fill = order.remaining().min(maker.remaining());

            let maker = book.fill_front(opposite, fill);
            order.apply_fill(fill);

            let trade = self.executor.execute_trade(&order, &maker, fill, now_ms);
            debug!(
                trade_id = %trade.trade_id,
                price = %trade.price,
                quantity = %trade.quantity,
                "trade executed"
            );
            self.sink.on_trade(&trade);
            self.sink
                .on_order_status(&maker.order_id, maker.status, maker.remaining());

            if let Some(done) = book.pop_front_if_filled(opposite) {
                self.retired.insert(
                    done.order_id.clone(),
                    RetiredOrder {
                        status: done.status,
                        remaining: Quantity::ZERO,
                    },
                );
            }
        }

        if order.remaining().is_zero() {
            self.retired.insert(
                order.order_id.clone(),
                RetiredOrder {
                    status: order.status,
                    remaining: Quantity::ZERO,
                },
            );
        } else {
            book.insert(order.clone())?;
        }
        self.sink
            .on_order_status(&order.order_id, order.status, order.remaining());

        let after = book.snapshot();
        if after != before {
            self.sink.on_book_delta(&order.symbol, &after);
        }
        Ok(())
    }

    fn locate(&self, order_id: &OrderId) -> Option<Symbol> {
        self.books
            .iter()
            .find(|(_, book)| book.contains(order_id))
            .map(|(symbol, _)| symbol.clone())
    }

    /// Top-of-book projections for a symbol.
    pub fn book_snapshot(&self, symbol: &Symbol) -> Option<TopOfBook> {
        self.books.get(symbol).map(|book| book.snapshot())
    }

    /// Up to `n` levels of one side in priority order.
    pub fn depth(&self, symbol: &Symbol, side: Side, n: usize) -> Vec<(Price, Quantity)> {
        self.books
            .get(symbol)
            .map(|book| book.depth(side, n))
            .unwrap_or_default()
    }

    /// Status and remaining of any order this session has seen.
    pub fn order_status(&self, order_id: &OrderId) -> Option<(OrderStatus, Quantity)> {
        for book in self.books.values() {
            if let Some(order) = book.get(order_id) {
                return Some((order.status, order.remaining()));
            }
        }
        self.retired
            .get(order_id)
            .map(|retired| (retired.status, retired.remaining))
    }

    /// Resting orders across all books.
    pub fn active_orders(&self) -> usize {
        self.books.values().map(|book| book.order_count()).sum()
    }

    /// Orders admitted this session.
    pub fn total_orders(&self) -> u64 {
        self.executor.total_orders()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn book(&self, symbol: &Symbol) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub(crate) fn parts(
        &self,
    ) -> (&HashMap<Symbol, OrderBook>, &SymbolTable, &MatchExecutor) {
        (&self.books, &self.symbols, &self.executor)
    }

    pub(crate) fn from_parts(
        books: HashMap<Symbol, OrderBook>,
        symbols: SymbolTable,
        executor: MatchExecutor,
        sink: S,
    ) -> Self {
        Self {
            books,
            symbols,
            executor,
            retired: HashMap::new(),
            sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{RecordingSink, SinkEvent};
    use std::str::FromStr;

    fn table() -> SymbolTable {
        [types::symbol::SymbolSpec::new(
            "ACME",
            Decimal::from_str("0.01").unwrap(),
        )]
        .into_iter()
        .collect()
    }

    fn engine() -> MatchingEngine<RecordingSink> {
        MatchingEngine::new(table(), RecordingSink::new())
    }

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn submit(
        engine: &mut MatchingEngine<RecordingSink>,
        side: Side,
        px: &str,
        qty: u64,
    ) -> OrderId {
        engine
            .submit(
                side,
                price(px),
                qty,
                Symbol::new("ACME"),
                ClientId::new("c1"),
                0,
            )
            .unwrap()
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut engine = engine();
        assert_eq!(submit(&mut engine, Side::Buy, "99.00", 10).as_str(), "O1");
        assert_eq!(submit(&mut engine, Side::Buy, "98.00", 10).as_str(), "O2");
        assert_eq!(engine.total_orders(), 2);
        assert_eq!(engine.active_orders(), 2);
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let mut engine = engine();
        let err = engine
            .submit(
                Side::Buy,
                price("100.00"),
                10,
                Symbol::new("GADG"),
                ClientId::new("c1"),
                0,
            )
            .unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_SYMBOL");
        assert!(engine.sink().events.is_empty());
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let mut engine = engine();
        let err = engine
            .submit(
                Side::Buy,
                price("100.00"),
                0,
                Symbol::new("ACME"),
                ClientId::new("c1"),
                0,
            )
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_QUANTITY");
    }

    #[test]
    fn test_off_tick_price_rejected() {
        let mut engine = engine();
        let err = engine
            .submit(
                Side::Buy,
                price("100.005"),
                10,
                Symbol::new("ACME"),
                ClientId::new("c1"),
                0,
            )
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PRICE");

        let err = engine
            .submit(
                Side::Buy,
                price("-1"),
                10,
                Symbol::new("ACME"),
                ClientId::new("c1"),
                0,
            )
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PRICE");
    }

    #[test]
    fn test_full_cross_executes_at_maker_price() {
        let mut engine = engine();
        let sell = submit(&mut engine, Side::Sell, "100.00", 100);
        let buy = submit(&mut engine, Side::Buy, "101.00", 100);

        let trades = engine.sink().trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Price::new(10_000));
        assert_eq!(trades[0].quantity, Quantity::new(100));
        assert_eq!(trades[0].buy_order_id, buy);
        assert_eq!(trades[0].sell_order_id, sell);

        assert_eq!(engine.active_orders(), 0);
        let tops = engine.book_snapshot(&Symbol::new("ACME")).unwrap();
        assert_eq!(tops.best_bid, None);
        assert_eq!(tops.best_ask, None);
    }

    #[test]
    fn test_partial_fill_rests_residual() {
        let mut engine = engine();
        submit(&mut engine, Side::Sell, "100.00", 50);
        let buy = submit(&mut engine, Side::Buy, "100.00", 100);

        assert_eq!(
            engine.order_status(&buy),
            Some((OrderStatus::PartiallyFilled, Quantity::new(50)))
        );
        let tops = engine.book_snapshot(&Symbol::new("ACME")).unwrap();
        assert_eq!(tops.best_bid, Some(Price::new(10_000)));
        assert_eq!(tops.bid_size, Quantity::new(50));
        assert_eq!(tops.best_ask, None);
    }

    #[test]
    fn test_cancel_taxonomy() {
        let mut engine = engine();
        let sell = submit(&mut engine, Side::Sell, "100.00", 50);

        engine.cancel(&sell).unwrap();
        assert_eq!(
            engine.order_status(&sell),
            Some((OrderStatus::Cancelled, Quantity::new(50)))
        );

        let err = engine.cancel(&sell).unwrap_err();
        assert_eq!(err.code(), "ALREADY_TERMINAL");

        let err = engine.cancel(&OrderId::new("O999")).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_ID");
    }

    #[test]
    fn test_cancel_of_filled_order_is_terminal() {
        let mut engine = engine();
        let sell = submit(&mut engine, Side::Sell, "100.00", 50);
        submit(&mut engine, Side::Buy, "100.00", 50);

        let err = engine.cancel(&sell).unwrap_err();
        assert_eq!(err.code(), "ALREADY_TERMINAL");
    }

    #[test]
    fn test_modify_keeps_id_and_loses_priority() {
        let mut engine = engine();
        let first = submit(&mut engine, Side::Sell, "100.00", 50);
        let second = submit(&mut engine, Side::Sell, "100.00", 50);

        engine.modify(&first, price("100.00"), 60, 0).unwrap();

        // the modified order re-queued behind the untouched one
        let book = engine.book(&Symbol::new("ACME")).unwrap();
        let queue: Vec<&OrderId> = book
            .side_orders(Side::Sell)
            .iter()
            .map(|o| &o.order_id)
            .collect();
        assert_eq!(queue, vec![&second, &first]);

        assert_eq!(
            engine.order_status(&first),
            Some((OrderStatus::Pending, Quantity::new(60)))
        );
    }

    #[test]
    fn test_modify_validation_has_no_side_effect() {
        let mut engine = engine();
        let sell = submit(&mut engine, Side::Sell, "100.00", 50);

        let err = engine.modify(&sell, price("100.005"), 60, 0).unwrap_err();
        assert_eq!(err.code(), "INVALID_PRICE");
        assert_eq!(
            engine.order_status(&sell),
            Some((OrderStatus::Pending, Quantity::new(50)))
        );

        let err = engine.modify(&OrderId::new("nope"), price("100.00"), 60, 0).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_ID");
    }

    #[test]
    fn test_batch_preserves_list_order() {
        let mut engine = engine();
        let results = engine.batch(
            vec![
                SubmitRequest {
                    side: Side::Sell,
                    price: price("100.00"),
                    quantity: 30,
                    symbol: Symbol::new("ACME"),
                    client_id: ClientId::new("c1"),
                },
                SubmitRequest {
                    side: Side::Buy,
                    price: price("100.00"),
                    quantity: 30,
                    symbol: Symbol::new("ACME"),
                    client_id: ClientId::new("c2"),
                },
                SubmitRequest {
                    side: Side::Buy,
                    price: price("0"),
                    quantity: 30,
                    symbol: Symbol::new("ACME"),
                    client_id: ClientId::new("c3"),
                },
            ],
            0,
        );

        assert_eq!(results[0].as_ref().unwrap().as_str(), "O1");
        assert_eq!(results[1].as_ref().unwrap().as_str(), "O2");
        assert_eq!(results[2].as_ref().unwrap_err().code(), "INVALID_PRICE");
        assert_eq!(engine.sink().trades().len(), 1);
    }

    #[test]
    fn test_book_full_rejects_before_matching() {
        let mut engine = MatchingEngine::with_book_capacity(table(), RecordingSink::new(), 1);
        submit(&mut engine, Side::Sell, "100.00", 10);

        let err = engine
            .submit(
                Side::Sell,
                price("101.00"),
                10,
                Symbol::new("ACME"),
                ClientId::new("c1"),
                0,
            )
            .unwrap_err();
        assert_eq!(err.code(), "BOOK_FULL");
        assert_eq!(engine.active_orders(), 1);
    }

    #[test]
    fn test_no_delta_when_top_unchanged() {
        let mut engine = engine();
        submit(&mut engine, Side::Buy, "99.00", 10);
        engine.sink_mut().clear();

        // deeper bid does not move the top
        submit(&mut engine, Side::Buy, "98.00", 10);
        assert!(engine
            .sink()
            .events
            .iter()
            .all(|event| !matches!(event, SinkEvent::BookDelta { .. })));
    }
}
