//! Banking Ledger Library
//!
//! Accounts, PINs, deposits, withdrawals and transfers over PostgreSQL.
//! Re-exports modules for integration testing and the server binary.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod service;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Account, Amount, AmountError, Balance, DomainError, Pin, Transaction, User};
pub use error::{AppError, AppResult};
