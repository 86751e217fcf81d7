//! Account Repository
//!
//! Reads and writes rows of the `accounts` table.
//!
//! Reads that feed a balance or PIN mutation take a row lock
//! (`SELECT ... FOR UPDATE`) on a connection that belongs to an open
//! transaction, so concurrent read-modify-write cycles on one account are
//! serialized by the database instead of overwriting each other.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::domain::{Account, Balance, Pin};

/// Fields required to insert an account
#[derive(Debug, Clone)]
pub struct NewAccountRow<'a> {
    pub account_number: &'a str,
    pub pin: &'a Pin,
    pub account_login_number: &'a str,
    pub account_login_password_hash: &'a str,
    pub balance: Balance,
    pub user_id: i64,
}

/// Repository for the `accounts` table
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new AccountRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an account and return the stored row
    pub async fn insert(&self, conn: &mut PgConnection, row: NewAccountRow<'_>) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts
                (account_number, pin, account_login_number, account_login_password, balance, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, account_number, pin, account_login_number, account_login_password,
                      balance, user_id, created_at, updated_at
            "#,
        )
        .bind(row.account_number)
        .bind(row.pin.as_str())
        .bind(row.account_login_number)
        .bind(row.account_login_password_hash)
        .bind(row.balance.value())
        .bind(row.user_id)
        .fetch_one(conn)
        .await
    }

    /// Get an account by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_number, pin, account_login_number, account_login_password,
                   balance, user_id, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// All accounts in primary-key order
    pub async fn find_all(&self) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_number, pin, account_login_number, account_login_password,
                   balance, user_id, created_at, updated_at
            FROM accounts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Accounts owned by a user
    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_number, pin, account_login_number, account_login_password,
                   balance, user_id, created_at, updated_at
            FROM accounts
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Delete an account; its transactions go with it (ON DELETE CASCADE).
    /// Returns the number of rows removed.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Load and lock one account for the rest of the surrounding transaction
    pub async fn lock_by_id(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_number, pin, account_login_number, account_login_password,
                   balance, user_id, created_at, updated_at
            FROM accounts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Load and lock every account whose number is listed.
    ///
    /// Rows are locked in id order within a single statement, so two
    /// transfers over the same pair of accounts in opposite directions
    /// acquire their locks in the same order and cannot deadlock.
    pub async fn lock_by_account_numbers(
        &self,
        conn: &mut PgConnection,
        account_numbers: &[String],
    ) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_number, pin, account_login_number, account_login_password,
                   balance, user_id, created_at, updated_at
            FROM accounts
            WHERE account_number = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(account_numbers)
        .fetch_all(conn)
        .await
    }

    /// Persist a new balance
    pub async fn update_balance(&self, conn: &mut PgConnection, id: i64, balance: Balance) -> Result<(), sqlx::Error> {
        let new_value: Decimal = balance.value();

        sqlx::query(
            r#"
            UPDATE accounts
            SET balance = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_value)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Persist a new PIN
    pub async fn update_pin(&self, conn: &mut PgConnection, id: i64, pin: &Pin) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET pin = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(pin.as_str())
        .execute(conn)
        .await?;

        Ok(())
    }
}
