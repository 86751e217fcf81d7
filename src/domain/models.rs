//! Ledger records
//!
//! Row types for the `users`, `accounts` and `transactions` tables.
//! Relations are plain foreign keys; collections are fetched on demand.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::{Balance, Pin};

/// A bank account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub account_number: String,
    #[sqlx(try_from = "String")]
    pub pin: Pin,
    pub account_login_number: String,
    /// Salted digest, see [`crate::domain::credentials`]
    pub account_login_password: String,
    #[sqlx(try_from = "Decimal")]
    pub balance: Balance,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Exact comparison of a caller-supplied PIN against the stored one
    pub fn pin_matches(&self, candidate: &str) -> bool {
        self.pin.matches(candidate)
    }
}

/// An account holder.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Salted digest, see [`crate::domain::credentials`]
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A completed money movement between two accounts. Never updated.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub sender_id: i64,
    pub receiver_id: i64,
}

impl Transaction {
    /// Direction of this transaction relative to `account_id`
    pub fn direction_for(&self, account_id: i64) -> Option<Direction> {
        if self.sender_id == account_id {
            Some(Direction::Sent)
        } else if self.receiver_id == account_id {
            Some(Direction::Received)
        } else {
            None
        }
    }
}

/// Side of a transaction an account is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}
