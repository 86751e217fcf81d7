//! Services module
//!
//! Business operations over the ledger store. Each service is constructed
//! with the shared connection pool.

mod account_service;
mod commands;
mod transaction_service;
mod user_service;

pub use account_service::AccountService;
pub use commands::*;
pub use transaction_service::TransactionService;
pub use user_service::UserService;
