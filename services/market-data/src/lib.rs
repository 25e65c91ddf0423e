//! Market data service
//!
//! Consumes the engine's emission stream and derives the views downstream
//! clients read: a sequence-numbered event feed, a bounded trade tape, and
//! per-symbol top-of-book quotes. The transport that carries these to
//! clients is out of scope; everything here is in-process.

pub mod events;
pub mod feed;
pub mod sink;
pub mod tape;
pub mod view;

pub use events::{MarketEvent, MarketPayload};
pub use feed::MarketFeed;
pub use sink::ChannelSink;
pub use tape::TradeTape;
pub use view::TopOfBookView;
