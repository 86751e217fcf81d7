//! Common test utilities
#![allow(dead_code)]

use banking_ledger::domain::{Account, User};
use banking_ledger::service::{AccountService, CreateAccountCommand, CreateUserCommand, UserService};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// PIN given to every fixture account
pub const TEST_PIN: &str = "1234";

/// Connect to `DATABASE_URL` and apply migrations.
///
/// Returns `None` (and the calling test returns early) when no database is
/// configured. Tests never truncate tables: every fixture uses unique
/// account numbers, so tests can run in parallel against one database.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    banking_ledger::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Unique identifier with a readable prefix
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Insert a user with a unique username
pub async fn create_user(pool: &PgPool) -> User {
    UserService::new(pool.clone())
        .create_user(CreateUserCommand::new(
            unique("user"),
            "password123".to_string(),
            "Test User".to_string(),
            "test@example.com".to_string(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        ))
        .await
        .expect("Failed to create user")
}

/// Insert an account with PIN [`TEST_PIN`] and the given opening balance
pub async fn create_account(pool: &PgPool, user_id: i64, balance: Decimal) -> Account {
    AccountService::new(pool.clone())
        .create_account(
            CreateAccountCommand::new(
                user_id,
                unique("ACC"),
                TEST_PIN.to_string(),
                unique("login"),
                "password123".to_string(),
            )
            .with_opening_balance(balance),
        )
        .await
        .expect("Failed to create account")
}
