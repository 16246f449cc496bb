//! Domain error types.

use common::{AggregateId, GameId};
use event_store::EventStoreError;
use thiserror::Error;

use crate::value_objects::Money;

/// Business rule rejections.
///
/// Every variant is terminal: the operation that produced it wrote nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommerceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: Money },

    /// Adding `amount` to `current` does not fit in the money range.
    #[error("Amount too large: {current} plus {amount} overflows")]
    AmountOverflow { current: Money, amount: Money },

    #[error("Game already in cart: {name}")]
    DuplicateInCart { name: String },

    #[error("Game already owned: {name}")]
    AlreadyOwned { name: String },

    #[error("Game not in cart: {game_id}")]
    NotInCart { game_id: GameId },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Money, required: Money },

    #[error("Purchase already refunded: {purchase_id}")]
    AlreadyRefunded { purchase_id: AggregateId },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A game named {name} already exists")]
    GameAlreadyExists { name: String },
}

impl CommerceError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        CommerceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CommerceError::InvalidInput(message.into())
    }

    /// Short stable label, used as a metrics tag.
    pub fn kind(&self) -> &'static str {
        match self {
            CommerceError::NotFound { .. } => "not_found",
            CommerceError::InvalidAmount { .. } => "invalid_amount",
            CommerceError::AmountOverflow { .. } => "amount_overflow",
            CommerceError::DuplicateInCart { .. } => "duplicate_in_cart",
            CommerceError::AlreadyOwned { .. } => "already_owned",
            CommerceError::NotInCart { .. } => "not_in_cart",
            CommerceError::EmptyCart => "empty_cart",
            CommerceError::InsufficientFunds { .. } => "insufficient_funds",
            CommerceError::AlreadyRefunded { .. } => "already_refunded",
            CommerceError::InvalidInput(_) => "invalid_input",
            CommerceError::GameAlreadyExists { .. } => "game_already_exists",
        }
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A business rule rejected the command.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns the business error, if this is one.
    pub fn as_commerce(&self) -> Option<&CommerceError> {
        match self {
            DomainError::Commerce(e) => Some(e),
            _ => None,
        }
    }

    /// True when a commit lost an optimistic concurrency race.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_message_carries_both_amounts() {
        let err = CommerceError::InsufficientFunds {
            balance: Money::from_cents(1000),
            required: Money::from_cents(7000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: balance $10.00, required $70.00"
        );
    }

    #[test]
    fn commerce_error_converts_transparently() {
        let err: DomainError = CommerceError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cart is empty");
        assert_eq!(err.as_commerce(), Some(&CommerceError::EmptyCart));
        assert!(!err.is_conflict());
    }
}
