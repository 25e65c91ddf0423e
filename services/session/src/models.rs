//! Wire messages
//!
//! The stable request/response contract of the session. A `type` field
//! discriminates both directions; prices cross this boundary as decimals
//! and are quantized to ticks inside the engine.

use matching_engine::book::TopOfBook;
use market_data::events::{MarketEvent, MarketPayload};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::errors::{EngineError, ValidationError};
use types::ids::{OrderId, TradeId};
use types::order::{OrderStatus, Side};
use types::symbol::{Symbol, SymbolTable};

/// Inbound request kinds.
///
/// `side` and sizes are deliberately loose here; admission turns them into
/// taxonomy errors instead of letting serde reject the envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "SUBMIT")]
    Submit {
        side: String,
        price: Decimal,
        quantity: i64,
        symbol: String,
        client_id: String,
    },
    #[serde(rename = "CANCEL")]
    Cancel { order_id: String },
    #[serde(rename = "MODIFY")]
    Modify {
        order_id: String,
        new_price: Decimal,
        new_quantity: i64,
    },
}

/// Decode a request, surfacing any decode failure as `MALFORMED_REQUEST`.
/// A request is never silently dropped.
pub fn parse_request(text: &str) -> Result<Request, ValidationError> {
    serde_json::from_str(text).map_err(|err| ValidationError::MalformedRequest(err.to_string()))
}

pub fn parse_side(side: &str) -> Result<Side, ValidationError> {
    match side {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        other => Err(ValidationError::InvalidSide(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Success,
    Rejected,
    Failed,
}

/// Outbound messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    OrderSubmitted {
        order_id: Option<OrderId>,
        status: AckStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    OrderCancelled {
        order_id: OrderId,
        status: AckStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Trade {
        trade_id: TradeId,
        symbol: Symbol,
        price: Decimal,
        quantity: u64,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        server_timestamp_ms: i64,
    },
    OrderbookUpdate {
        symbol: Symbol,
        best_bid: Decimal,
        best_ask: Decimal,
        bid_size: u64,
        ask_size: u64,
        spread: Decimal,
    },
    OrderStatus {
        order_id: OrderId,
        status: OrderStatus,
        remaining: u64,
    },
    Error {
        message: String,
    },
}

impl Response {
    pub fn submitted(order_id: OrderId) -> Self {
        Response::OrderSubmitted {
            order_id: Some(order_id),
            status: AckStatus::Success,
            reason: None,
        }
    }

    pub fn submit_rejected(err: &EngineError) -> Self {
        Response::OrderSubmitted {
            order_id: None,
            status: AckStatus::Rejected,
            reason: Some(err.code().to_string()),
        }
    }

    /// Modify acks echo the reissued order's id.
    pub fn modified(order_id: OrderId) -> Self {
        Response::submitted(order_id)
    }

    /// Rejection that can still echo the id the client named.
    pub fn rejected_with_id(order_id: OrderId, err: &EngineError) -> Self {
        Response::OrderSubmitted {
            order_id: Some(order_id),
            status: AckStatus::Rejected,
            reason: Some(err.code().to_string()),
        }
    }

    pub fn cancelled(order_id: OrderId) -> Self {
        Response::OrderCancelled {
            order_id,
            status: AckStatus::Success,
            reason: None,
        }
    }

    pub fn cancel_failed(order_id: OrderId, err: &EngineError) -> Self {
        Response::OrderCancelled {
            order_id,
            status: AckStatus::Failed,
            reason: Some(err.code().to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    /// Render the §6 `orderbook_update` projection. Absent sides surface as
    /// zero, matching the original wire contract.
    pub fn orderbook_update(symbol: &Symbol, top: &TopOfBook, symbols: &SymbolTable) -> Self {
        let spec = symbols.get(symbol).expect("event symbol is registered");
        let best_bid = top.best_bid.map_or(Decimal::ZERO, |p| spec.to_decimal(p));
        let best_ask = top.best_ask.map_or(Decimal::ZERO, |p| spec.to_decimal(p));
        let spread = match (top.best_bid, top.best_ask) {
            (Some(_), Some(_)) => best_ask - best_bid,
            _ => Decimal::ZERO,
        };
        Response::OrderbookUpdate {
            symbol: symbol.clone(),
            best_bid,
            best_ask,
            bid_size: top.bid_size.units(),
            ask_size: top.ask_size.units(),
            spread,
        }
    }

    /// Translate an engine event into its outward message.
    pub fn from_event(event: &MarketEvent, symbols: &SymbolTable) -> Self {
        match &event.payload {
            MarketPayload::Trade(trade) => {
                let spec = symbols.get(&trade.symbol).expect("event symbol is registered");
                Response::Trade {
                    trade_id: trade.trade_id.clone(),
                    symbol: trade.symbol.clone(),
                    price: spec.to_decimal(trade.price),
                    quantity: trade.quantity.units(),
                    buy_order_id: trade.buy_order_id.clone(),
                    sell_order_id: trade.sell_order_id.clone(),
                    server_timestamp_ms: trade.executed_at,
                }
            }
            MarketPayload::OrderStatus {
                order_id,
                status,
                remaining,
            } => Response::OrderStatus {
                order_id: order_id.clone(),
                status: *status,
                remaining: remaining.units(),
            },
            MarketPayload::BookDelta { symbol, top } => {
                Response::orderbook_update(symbol, top, symbols)
            }
        }
    }
}
