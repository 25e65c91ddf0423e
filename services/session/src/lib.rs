//! Session and admission layer
//!
//! Outermost boundary of the venue core: validates requests, serializes
//! them into the engine through a command queue, and returns exactly one
//! acknowledgment per request. Wire messages live in [`models`]; the
//! network transport that would carry them is out of scope.

pub mod config;
pub mod models;
pub mod session;

pub use config::{SessionConfig, SymbolConfig};
pub use models::{Request, Response};
pub use session::{Session, SessionError};
