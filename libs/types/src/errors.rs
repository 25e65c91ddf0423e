//! Error taxonomy
//!
//! Every failure surfaced by admission or the engine belongs to one of three
//! categories: validation (rejected before any state change), lookup
//! (cancel/modify against an id that is absent or terminal), and conflict
//! (internal invariant breaches, fatal by policy). Each error maps to a
//! stable wire code via [`EngineError::code`].

use crate::ids::OrderId;
use crate::symbol::Symbol;
use thiserror::Error;

/// Rejected at admission; no engine state change.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid side: {0}")]
    InvalidSide(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(Symbol),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// Surfaced on cancel/modify.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("unknown order id: {0}")]
    UnknownId(OrderId),

    #[error("order already terminal: {0}")]
    AlreadyTerminal(OrderId),
}

/// Book-level failures. `DuplicateId` is an engine invariant breach and is
/// fatal to the session; it must never be masked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("duplicate order id: {0}")]
    DuplicateId(OrderId),

    #[error("book capacity exceeded ({capacity} resting orders)")]
    BookFull { capacity: usize },
}

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Book(#[from] BookError),
}

impl EngineError {
    /// Stable wire code for the §6 `reason` field.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(ValidationError::InvalidPrice(_)) => "INVALID_PRICE",
            EngineError::Validation(ValidationError::InvalidQuantity(_)) => "INVALID_QUANTITY",
            EngineError::Validation(ValidationError::InvalidSide(_)) => "INVALID_SIDE",
            EngineError::Validation(ValidationError::UnknownSymbol(_)) => "UNKNOWN_SYMBOL",
            EngineError::Validation(ValidationError::MalformedRequest(_)) => "MALFORMED_REQUEST",
            EngineError::Lookup(LookupError::UnknownId(_)) => "UNKNOWN_ID",
            EngineError::Lookup(LookupError::AlreadyTerminal(_)) => "ALREADY_TERMINAL",
            EngineError::Book(BookError::DuplicateId(_)) => "DUPLICATE_ID",
            EngineError::Book(BookError::BookFull { .. }) => "BOOK_FULL",
        }
    }

    /// Conflict-category errors abort the session rather than being returned
    /// to a client.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Book(BookError::DuplicateId(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err: EngineError = ValidationError::InvalidPrice("0".into()).into();
        assert_eq!(err.code(), "INVALID_PRICE");

        let err: EngineError = LookupError::AlreadyTerminal(OrderId::from_seq(3)).into();
        assert_eq!(err.code(), "ALREADY_TERMINAL");
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let err: EngineError = BookError::DuplicateId(OrderId::from_seq(1)).into();
        assert!(err.is_fatal());

        let err: EngineError = LookupError::UnknownId(OrderId::from_seq(1)).into();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_display_carries_context() {
        let err = ValidationError::UnknownSymbol(Symbol::new("GADG"));
        assert_eq!(err.to_string(), "unknown symbol: GADG");
    }
}
