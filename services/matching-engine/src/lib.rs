//! Matching engine for a single-venue limit order book
//!
//! Implements continuous price-time priority matching over per-symbol order
//! books. The book keeps an ordered ladder per side with per-price FIFO
//! queues in a slab arena, an O(1) cancel index of stable handles, and
//! cached top-of-book projections. The engine crosses each admitted order
//! against the opposite side, rests any residual, and publishes trades,
//! order statuses, and book deltas through an [`events::EventSink`].
//!
//! **Key invariants:**
//! - The book never crosses: best bid < best ask when both sides are live
//! - Level aggregates always equal the sum of resting remainders
//! - Trades execute at the resting (maker) order's price
//! - A terminal order is gone from the ladder and the cancel index

pub mod book;
pub mod engine;
pub mod events;
pub mod matching;
pub mod snapshot;

pub use book::{OrderBook, TopOfBook};
pub use engine::{MatchingEngine, SubmitRequest};
pub use events::{EventSink, NullSink, RecordingSink, SinkEvent};
pub use snapshot::EngineState;
