//! Session worker and request admission
//!
//! One dedicated worker thread owns the engine and all its counters and
//! drains typed commands in FIFO order; that drain order is the commit
//! order. Requests are validated here before they are enqueued, so
//! malformed input never reaches the engine, and every admitted request is
//! answered through its oneshot reply exactly once.
//!
//! A `DUPLICATE_ID` surfacing from the engine is an invariant breach: the
//! worker logs it and aborts the session instead of masking it.

use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use matching_engine::book::TopOfBook;
use matching_engine::{MatchingEngine, SubmitRequest};
use market_data::events::MarketEvent;
use market_data::sink::ChannelSink;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};
use types::errors::{EngineError, ValidationError};
use types::ids::{ClientId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{OrderStatus, Side};
use types::symbol::{Symbol, SymbolTable};

use crate::config::SessionConfig;
use crate::models::{parse_request, parse_side, Request, Response};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("session closed")]
    Closed,
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Engine(err.into())
    }
}

enum Command {
    Submit {
        side: Side,
        price: Decimal,
        quantity: u64,
        symbol: Symbol,
        client_id: ClientId,
        reply: oneshot::Sender<Result<OrderId, EngineError>>,
    },
    Cancel {
        order_id: OrderId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Modify {
        order_id: OrderId,
        new_price: Decimal,
        new_quantity: u64,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Batch {
        requests: Vec<SubmitRequest>,
        reply: oneshot::Sender<Vec<Result<OrderId, EngineError>>>,
    },
    Snapshot {
        symbol: Symbol,
        reply: oneshot::Sender<Option<TopOfBook>>,
    },
    Depth {
        symbol: Symbol,
        side: Side,
        levels: usize,
        reply: oneshot::Sender<Vec<(Price, Quantity)>>,
    },
    OrderStatus {
        order_id: OrderId,
        reply: oneshot::Sender<Option<(OrderStatus, Quantity)>>,
    },
}

/// Handle to a running session.
///
/// Cloneless by design: the admission layer is the single producer into the
/// command queue. Dropping the handle closes the queue and stops the worker.
pub struct Session {
    commands: mpsc::UnboundedSender<Command>,
    symbols: SymbolTable,
    depth_levels: usize,
    worker: Option<thread::JoinHandle<()>>,
}

impl Session {
    /// Start the engine worker. Returns the session handle and the
    /// market-data feed carrying every engine emission in order.
    pub fn start(config: &SessionConfig) -> (Self, mpsc::UnboundedReceiver<MarketEvent>) {
        let symbols = config.symbol_table();
        let (sink, events) = ChannelSink::new();
        let engine = match config.book_capacity {
            Some(capacity) => MatchingEngine::with_book_capacity(symbols.clone(), sink, capacity),
            None => MatchingEngine::new(symbols.clone(), sink),
        };

        let (commands, rx) = mpsc::unbounded_channel();
        let worker = thread::Builder::new()
            .name("engine-worker".into())
            .spawn(move || run_worker(engine, rx))
            .expect("spawn engine worker");

        info!(symbols = symbols.len(), "session started");
        (
            Self {
                commands,
                symbols,
                depth_levels: config.depth_levels,
                worker: Some(worker),
            },
            events,
        )
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Admit a limit order. Returns the engine-assigned id.
    pub async fn submit(
        &self,
        side: Side,
        price: Decimal,
        quantity: u64,
        symbol: Symbol,
        client_id: ClientId,
    ) -> Result<OrderId, SessionError> {
        self.validate_submit(&symbol, price, quantity as i64, client_id.as_str())?;
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Submit {
                side,
                price,
                quantity,
                symbol,
                client_id,
                reply,
            })
            .map_err(|_| SessionError::Closed)?;
        rx.await
            .map_err(|_| SessionError::Closed)?
            .map_err(SessionError::Engine)
    }

    pub async fn cancel(&self, order_id: OrderId) -> Result<(), SessionError> {
        if order_id.as_str().is_empty() {
            return Err(ValidationError::MalformedRequest("empty order_id".into()).into());
        }
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Cancel { order_id, reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await
            .map_err(|_| SessionError::Closed)?
            .map_err(SessionError::Engine)
    }

    pub async fn modify(
        &self,
        order_id: OrderId,
        new_price: Decimal,
        new_quantity: i64,
    ) -> Result<(), SessionError> {
        if order_id.as_str().is_empty() {
            return Err(ValidationError::MalformedRequest("empty order_id".into()).into());
        }
        if new_quantity <= 0 {
            return Err(ValidationError::InvalidQuantity(new_quantity.to_string()).into());
        }
        if new_price <= Decimal::ZERO {
            return Err(ValidationError::InvalidPrice(new_price.to_string()).into());
        }
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Modify {
                order_id,
                new_price,
                new_quantity: new_quantity as u64,
                reply,
            })
            .map_err(|_| SessionError::Closed)?;
        rx.await
            .map_err(|_| SessionError::Closed)?
            .map_err(SessionError::Engine)
    }

    /// Admit a sequence of orders in list order with per-submit semantics.
    pub async fn batch(
        &self,
        requests: Vec<SubmitRequest>,
    ) -> Result<Vec<Result<OrderId, EngineError>>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Batch { requests, reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn snapshot(&self, symbol: Symbol) -> Result<Option<TopOfBook>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { symbol, reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn depth(
        &self,
        symbol: Symbol,
        side: Side,
    ) -> Result<Vec<(Price, Quantity)>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Depth {
                symbol,
                side,
                levels: self.depth_levels,
                reply,
            })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn order_status(
        &self,
        order_id: OrderId,
    ) -> Result<Option<(OrderStatus, Quantity)>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::OrderStatus { order_id, reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Decode and serve one wire request, producing exactly one response.
    pub async fn handle_text(&self, text: &str) -> Response {
        match parse_request(text) {
            Ok(request) => self.handle(request).await,
            Err(err) => Response::error(err.to_string()),
        }
    }

    /// Serve one decoded request.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Submit {
                side,
                price,
                quantity,
                symbol,
                client_id,
            } => {
                let side = match parse_side(&side) {
                    Ok(side) => side,
                    Err(err) => return Response::submit_rejected(&err.into()),
                };
                let symbol = Symbol::new(symbol);
                if let Err(err) = self.validate_submit(&symbol, price, quantity, &client_id) {
                    return Response::submit_rejected(&err.into());
                }
                match self
                    .submit(side, price, quantity as u64, symbol, ClientId::new(client_id))
                    .await
                {
                    Ok(order_id) => Response::submitted(order_id),
                    Err(SessionError::Engine(err)) => Response::submit_rejected(&err),
                    Err(SessionError::Closed) => Response::error("session closed"),
                }
            }
            Request::Cancel { order_id } => {
                let order_id = OrderId::new(order_id);
                match self.cancel(order_id.clone()).await {
                    Ok(()) => Response::cancelled(order_id),
                    Err(SessionError::Engine(err)) => Response::cancel_failed(order_id, &err),
                    Err(SessionError::Closed) => Response::error("session closed"),
                }
            }
            Request::Modify {
                order_id,
                new_price,
                new_quantity,
            } => {
                let order_id = OrderId::new(order_id);
                match self
                    .modify(order_id.clone(), new_price, new_quantity)
                    .await
                {
                    Ok(()) => Response::modified(order_id),
                    Err(SessionError::Engine(err)) => Response::rejected_with_id(order_id, &err),
                    Err(SessionError::Closed) => Response::error("session closed"),
                }
            }
        }
    }

    /// Pre-engine validation: the engine is never invoked for input that
    /// fails here.
    fn validate_submit(
        &self,
        symbol: &Symbol,
        price: Decimal,
        quantity: i64,
        client_id: &str,
    ) -> Result<(), ValidationError> {
        if client_id.is_empty() {
            return Err(ValidationError::MalformedRequest("empty client_id".into()));
        }
        if !self.symbols.contains(symbol) {
            return Err(ValidationError::UnknownSymbol(symbol.clone()));
        }
        if quantity <= 0 {
            return Err(ValidationError::InvalidQuantity(quantity.to_string()));
        }
        if price <= Decimal::ZERO {
            return Err(ValidationError::InvalidPrice(price.to_string()));
        }
        Ok(())
    }

    /// Stop the worker and wait for it to drain.
    pub fn shutdown(self) {
        let Session {
            commands, worker, ..
        } = self;
        drop(commands);
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

fn run_worker(mut engine: MatchingEngine<ChannelSink>, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.blocking_recv() {
        let now_ms = now_ms();
        match command {
            Command::Submit {
                side,
                price,
                quantity,
                symbol,
                client_id,
                reply,
            } => {
                let result = engine.submit(side, price, quantity, symbol, client_id, now_ms);
                abort_on_conflict(&result);
                let _ = reply.send(result);
            }
            Command::Cancel { order_id, reply } => {
                let _ = reply.send(engine.cancel(&order_id));
            }
            Command::Modify {
                order_id,
                new_price,
                new_quantity,
                reply,
            } => {
                let result = engine.modify(&order_id, new_price, new_quantity, now_ms);
                abort_on_conflict(&result);
                let _ = reply.send(result);
            }
            Command::Batch { requests, reply } => {
                let results = engine.batch(requests, now_ms);
                for result in &results {
                    abort_on_conflict(result);
                }
                let _ = reply.send(results);
            }
            Command::Snapshot { symbol, reply } => {
                let _ = reply.send(engine.book_snapshot(&symbol));
            }
            Command::Depth {
                symbol,
                side,
                levels,
                reply,
            } => {
                let _ = reply.send(engine.depth(&symbol, side, levels));
            }
            Command::OrderStatus { order_id, reply } => {
                let _ = reply.send(engine.order_status(&order_id));
            }
        }
    }
    info!("session worker stopped");
}

/// Conflict-category errors indicate a matching bug; abort instead of
/// answering the client as if the book were still trustworthy.
fn abort_on_conflict<T>(result: &Result<T, EngineError>) {
    if let Err(err) = result {
        if err.is_fatal() {
            error!(error = %err, "engine invariant breach, aborting session");
            panic!("engine invariant breach: {err}");
        }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
