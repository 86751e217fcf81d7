//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

use super::AmountError;

/// Domain-specific errors
///
/// These errors represent missing records and business rule violations.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Account lookup (by id or account number) found nothing
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Transaction not found
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Supplied PIN does not match the stored PIN
    #[error("Incorrect PIN provided")]
    IncorrectPin,

    /// PIN does not have the required format
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    /// Balance does not cover a debit
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// Invalid amount (zero, negative or malformed)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transfer to same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    /// Required field missing or malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Uniqueness or referential constraint rejected by the store
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Check if this error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::UserNotFound(_) | Self::TransactionNotFound(_)
        )
    }

    /// Check if this is a client error (user's fault)
    pub fn is_client_error(&self) -> bool {
        !self.is_not_found() && !matches!(self, Self::ConstraintViolation(_))
    }
}

impl From<AmountError> for DomainError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}
