//! Engine state export and restore
//!
//! Serializable image of the resting book: per symbol and side, the ordered
//! sequence of levels with their queues in arrival order, plus the session
//! counters. Restoring replays the insertions, so queue order survives
//! exactly. The encoding and storage of the state is the caller's concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use types::errors::{EngineError, ValidationError};
use types::ids::{ClientId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::symbol::{Symbol, SymbolSpec, SymbolTable};

use crate::book::OrderBook;
use crate::engine::MatchingEngine;
use crate::events::EventSink;
use crate::matching::executor::MatchExecutor;

/// Full engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub order_seq: u64,
    pub trade_seq: u64,
    pub arrival_seq: u64,
    pub symbols: Vec<SymbolSpec>,
    pub books: Vec<BookState>,
}

/// One symbol's resting orders, sides in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookState {
    pub symbol: Symbol,
    pub bids: Vec<LevelState>,
    pub asks: Vec<LevelState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelState {
    pub price: Price,
    /// Queue order, front first.
    pub orders: Vec<RestingOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub client_id: ClientId,
    pub remaining: Quantity,
    pub arrival_seq: u64,
}

fn export_side(book: &OrderBook, side: Side) -> Vec<LevelState> {
    let mut levels: Vec<LevelState> = Vec::new();
    for order in book.side_orders(side) {
        let resting = RestingOrder {
            order_id: order.order_id.clone(),
            client_id: order.client_id.clone(),
            remaining: order.remaining(),
            arrival_seq: order.arrival_seq,
        };
        match levels.last_mut() {
            Some(level) if level.price == order.price => level.orders.push(resting),
            _ => levels.push(LevelState {
                price: order.price,
                orders: vec![resting],
            }),
        }
    }
    levels
}

impl<S: EventSink> MatchingEngine<S> {
    /// Export the resting book and counters.
    pub fn export_state(&self) -> EngineState {
        let (books, symbols, executor) = self.parts();
        let (order_seq, trade_seq, arrival_seq) = executor.counters();

        let mut symbol_specs: Vec<SymbolSpec> = symbols.specs().cloned().collect();
        symbol_specs.sort_by(|a, b| a.symbol.as_str().cmp(b.symbol.as_str()));

        let mut book_states: Vec<BookState> = books
            .values()
            .map(|book| BookState {
                symbol: book.symbol().clone(),
                bids: export_side(book, Side::Buy),
                asks: export_side(book, Side::Sell),
            })
            .collect();
        book_states.sort_by(|a, b| a.symbol.as_str().cmp(b.symbol.as_str()));

        EngineState {
            order_seq,
            trade_seq,
            arrival_seq,
            symbols: symbol_specs,
            books: book_states,
        }
    }

    /// Rebuild an engine from exported state.
    ///
    /// Restored orders re-enter the ladder in the exported queue order with
    /// their original `arrival_seq`, so priority is preserved exactly.
    pub fn restore(state: EngineState, sink: S) -> Result<Self, EngineError> {
        let symbols: SymbolTable = state.symbols.iter().cloned().collect();
        let mut books: HashMap<Symbol, OrderBook> = symbols
            .symbols()
            .map(|symbol| (symbol.clone(), OrderBook::new(symbol.clone())))
            .collect();

        for book_state in &state.books {
            let book = books
                .get_mut(&book_state.symbol)
                .ok_or_else(|| ValidationError::UnknownSymbol(book_state.symbol.clone()))?;
            for (side, levels) in [(Side::Buy, &book_state.bids), (Side::Sell, &book_state.asks)] {
                for level in levels {
                    for resting in &level.orders {
                        let order = Order::new(
                            resting.order_id.clone(),
                            resting.client_id.clone(),
                            book_state.symbol.clone(),
                            side,
                            level.price,
                            resting.remaining,
                            resting.arrival_seq,
                        );
                        book.insert(order)?;
                    }
                }
            }
        }

        let executor =
            MatchExecutor::restore_counters(state.order_seq, state.trade_seq, state.arrival_seq);
        Ok(MatchingEngine::from_parts(books, symbols, executor, sink))
    }
}
