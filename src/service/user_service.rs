//! User Service
//!
//! Registration and lookup of account holders.

use chrono::Utc;
use sqlx::PgPool;

use crate::domain::credentials::hash_secret;
use crate::domain::{Account, DomainError, User};
use crate::error::AppError;
use crate::store::{AccountRepository, UserRepository};

use super::CreateUserCommand;

/// Service for user operations
#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
    accounts: AccountRepository,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            accounts: AccountRepository::new(pool),
        }
    }

    /// Register a user; a taken username surfaces as a constraint violation
    pub async fn create_user(&self, command: CreateUserCommand) -> Result<User, AppError> {
        command.validate(Utc::now().date_naive())?;

        let password_hash = hash_secret(&command.password);
        let user = self
            .users
            .insert(
                command.username.trim(),
                &password_hash,
                &command.full_name,
                &command.email,
                command.birthdate,
            )
            .await?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Get a user by id
    pub async fn get_user(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()).into())
    }

    /// Accounts owned by a user
    pub async fn list_accounts(&self, id: i64) -> Result<Vec<Account>, AppError> {
        if !self.users.exists(id).await? {
            return Err(DomainError::UserNotFound(id.to_string()).into());
        }
        Ok(self.accounts.find_by_user(id).await?)
    }

    /// Delete a user together with their accounts and transactions
    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        if self.users.delete(id).await? == 0 {
            return Err(DomainError::UserNotFound(id.to_string()).into());
        }

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
