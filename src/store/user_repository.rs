//! User Repository

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::User;

/// Repository for the `users` table
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user and return the stored row
    pub async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        email: &str,
        birthdate: NaiveDate,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, full_name, email, birthdate)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password, full_name, email, birthdate, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(email)
        .bind(birthdate)
        .fetch_one(&self.pool)
        .await
    }

    /// Get a user by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, full_name, email, birthdate, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Check that a user row exists
    pub async fn exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Delete a user together with their accounts (ON DELETE CASCADE).
    /// Returns the number of rows removed.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
