//! Account Service
//!
//! Account lifecycle, PIN management and single-account balance mutations.
//!
//! Every mutation runs in its own database transaction and starts by locking
//! the account row, so the read-modify-write of a balance or PIN cannot
//! interleave with another request on the same account.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::credentials::hash_secret;
use crate::domain::{Account, Amount, Balance, DomainError, Pin, Transaction};
use crate::error::AppError;
use crate::store::{AccountRepository, NewAccountRow, TransactionRepository, UserRepository};

use super::CreateAccountCommand;

/// Service for account operations
#[derive(Debug, Clone)]
pub struct AccountService {
    accounts: AccountRepository,
    users: UserRepository,
    transactions: TransactionRepository,
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            pool,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open an account for an existing user
    pub async fn create_account(&self, command: CreateAccountCommand) -> Result<Account, AppError> {
        let (pin, balance) = command.validate()?;

        if !self.users.exists(command.user_id).await? {
            return Err(DomainError::UserNotFound(command.user_id.to_string()).into());
        }

        let password_hash = hash_secret(&command.account_login_password);

        let mut tx = self.pool.begin().await?;
        let account = self
            .accounts
            .insert(
                &mut *tx,
                NewAccountRow {
                    account_number: &command.account_number,
                    pin: &pin,
                    account_login_number: &command.account_login_number,
                    account_login_password_hash: &password_hash,
                    balance,
                    user_id: command.user_id,
                },
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            account_id = account.id,
            user_id = account.user_id,
            "Account created"
        );

        Ok(account)
    }

    /// Get an account by id
    pub async fn get_account(&self, id: i64) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::AccountNotFound(id.to_string()).into())
    }

    /// All accounts, in id order
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.accounts.find_all().await?)
    }

    /// Delete an account and, by cascade, its transactions.
    /// Deleting an id that does not exist reports NotFound.
    pub async fn delete_account(&self, id: i64) -> Result<(), AppError> {
        if self.accounts.delete(id).await? == 0 {
            return Err(DomainError::AccountNotFound(id.to_string()).into());
        }

        tracing::info!(account_id = id, "Account deleted");
        Ok(())
    }

    // =========================================================================
    // PIN management
    // =========================================================================

    /// Compare a candidate PIN with the stored one
    pub async fn check_pin(&self, id: i64, candidate: &str) -> Result<bool, AppError> {
        let account = self.get_account(id).await?;
        Ok(account.pin_matches(candidate))
    }

    /// Overwrite the PIN without checking the old one.
    /// Callers are expected to gate this behind their own access control.
    pub async fn create_pin(&self, id: i64, new_pin: &str) -> Result<(), AppError> {
        let new_pin = Pin::new(new_pin)?;

        let mut tx = self.pool.begin().await?;
        self.lock_account(&mut tx, id).await?;
        self.accounts.update_pin(&mut *tx, id, &new_pin).await?;
        tx.commit().await?;

        tracing::info!(account_id = id, "PIN created");
        Ok(())
    }

    /// Replace the PIN after verifying the old one
    pub async fn update_pin(&self, id: i64, old_pin: &str, new_pin: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let account = self.lock_account(&mut tx, id).await?;

        if !account.pin_matches(old_pin) {
            tracing::warn!(account_id = id, "PIN update rejected: incorrect old PIN");
            return Err(DomainError::IncorrectPin.into());
        }

        let new_pin = Pin::new(new_pin)?;
        self.accounts.update_pin(&mut *tx, id, &new_pin).await?;
        tx.commit().await?;

        tracing::info!(account_id = id, "PIN updated");
        Ok(())
    }

    // =========================================================================
    // Balance operations
    // =========================================================================

    /// Add a positive amount to the balance, returning the new balance
    pub async fn deposit(&self, id: i64, amount: Decimal) -> Result<Balance, AppError> {
        let amount = Amount::new(amount)?;

        let mut tx = self.pool.begin().await?;
        let account = self.lock_account(&mut tx, id).await?;
        let new_balance = account.balance.credit(&amount)?;
        self.accounts.update_balance(&mut *tx, id, new_balance).await?;
        tx.commit().await?;

        tracing::debug!(account_id = id, amount = %amount, balance = %new_balance, "Deposit applied");
        Ok(new_balance)
    }

    /// Withdraw without PIN verification (internal call path)
    pub async fn withdraw(&self, id: i64, amount: Decimal) -> Result<Balance, AppError> {
        self.apply_withdrawal(id, None, amount).await
    }

    /// Withdraw after verifying the account PIN (request call path)
    pub async fn withdraw_with_pin(&self, id: i64, pin: &str, amount: Decimal) -> Result<Balance, AppError> {
        self.apply_withdrawal(id, Some(pin), amount).await
    }

    async fn apply_withdrawal(&self, id: i64, pin: Option<&str>, amount: Decimal) -> Result<Balance, AppError> {
        let amount = Amount::new(amount)?;

        let mut tx = self.pool.begin().await?;
        let account = self.lock_account(&mut tx, id).await?;

        if let Some(pin) = pin {
            if !account.pin_matches(pin) {
                tracing::warn!(account_id = id, "Withdrawal rejected: incorrect PIN");
                return Err(DomainError::IncorrectPin.into());
            }
        }

        let new_balance = account.balance.debit(&amount)?;
        self.accounts.update_balance(&mut *tx, id, new_balance).await?;
        tx.commit().await?;

        tracing::debug!(account_id = id, amount = %amount, balance = %new_balance, "Withdrawal applied");
        Ok(new_balance)
    }

    /// Current balance; NotFound for an unknown id, never a default zero
    pub async fn check_balance(&self, id: i64) -> Result<Decimal, AppError> {
        Ok(self.get_account(id).await?.balance.value())
    }

    /// Sent and received transactions of an account, newest first
    pub async fn transaction_history(&self, id: i64) -> Result<Vec<Transaction>, AppError> {
        self.get_account(id).await?;
        Ok(self.transactions.find_for_account(id).await?)
    }

    async fn lock_account(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
    ) -> Result<Account, AppError> {
        self.accounts
            .lock_by_id(&mut **tx, id)
            .await?
            .ok_or_else(|| DomainError::AccountNotFound(id.to_string()).into())
    }
}
