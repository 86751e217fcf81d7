//! Transaction Repository
//!
//! Append-only access to the `transactions` table. There is no
//! update or delete here.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::domain::{Amount, Transaction};

/// Repository for the `transactions` table
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    /// Create a new TransactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a transaction row inside the caller's database transaction
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        sender_id: i64,
        receiver_id: i64,
        amount: &Amount,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (amount, timestamp, sender_id, receiver_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, amount, timestamp, sender_id, receiver_id
            "#,
        )
        .bind(amount.value())
        .bind(timestamp)
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(conn)
        .await
    }

    /// Get a transaction by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            "SELECT id, amount, timestamp, sender_id, receiver_id FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Transactions where the account is the sender
    pub async fn find_sent(&self, account_id: i64) -> Result<Vec<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, amount, timestamp, sender_id, receiver_id
            FROM transactions
            WHERE sender_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Transactions where the account is the receiver
    pub async fn find_received(&self, account_id: i64) -> Result<Vec<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, amount, timestamp, sender_id, receiver_id
            FROM transactions
            WHERE receiver_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Sent and received transactions, newest first
    pub async fn find_for_account(&self, account_id: i64) -> Result<Vec<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, amount, timestamp, sender_id, receiver_id
            FROM transactions
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Number of transactions between an ordered pair of accounts
    pub async fn count_between(&self, sender_id: i64, receiver_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE sender_id = $1 AND receiver_id = $2",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await
    }
}
