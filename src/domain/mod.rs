//! Domain module
//!
//! Core domain types and business rules.

pub mod amount;
pub mod credentials;
pub mod error;
pub mod models;
pub mod pin;

pub use amount::{Amount, AmountError, Balance};
pub use error::DomainError;
pub use models::{Account, Direction, Transaction, User};
pub use pin::Pin;
