//! Ledger Store
//!
//! Repositories over the `users`, `accounts` and `transactions` tables.

mod account_repository;
mod transaction_repository;
mod user_repository;

pub use account_repository::{AccountRepository, NewAccountRow};
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;
