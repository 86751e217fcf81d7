//! Transaction Service
//!
//! Moves money between two accounts and records the movement.

use chrono::Utc;
use sqlx::PgPool;

use crate::domain::{Account, DomainError, Transaction};
use crate::error::AppError;
use crate::store::{AccountRepository, TransactionRepository};

use super::TransferCommand;

/// Service for peer-to-peer transfers
#[derive(Debug, Clone)]
pub struct TransactionService {
    accounts: AccountRepository,
    transactions: TransactionRepository,
    pool: PgPool,
}

impl TransactionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            pool,
        }
    }

    /// Transfer money between two accounts identified by account number.
    ///
    /// Both accounts are resolved and locked before any arithmetic. The
    /// sender debit, receiver credit and transaction row are committed in
    /// one database transaction; on any failure none of them is applied.
    pub async fn transfer(&self, command: TransferCommand) -> Result<Transaction, AppError> {
        let amount = command.validate()?;

        let mut tx = self.pool.begin().await?;

        let locked = self
            .accounts
            .lock_by_account_numbers(
                &mut *tx,
                &[
                    command.sender_account_number.clone(),
                    command.receiver_account_number.clone(),
                ],
            )
            .await?;

        let sender = resolve(&locked, &command.sender_account_number)?;
        let receiver = resolve(&locked, &command.receiver_account_number)?;

        if sender.id == receiver.id {
            return Err(DomainError::SameAccountTransfer.into());
        }

        let sender_balance = sender.balance.debit(&amount).map_err(|e| {
            tracing::warn!(
                sender = %command.sender_account_number,
                amount = %amount,
                "Transfer rejected: sender doesn't have sufficient balance"
            );
            e
        })?;
        let receiver_balance = receiver.balance.credit(&amount)?;

        self.accounts.update_balance(&mut *tx, sender.id, sender_balance).await?;
        self.accounts.update_balance(&mut *tx, receiver.id, receiver_balance).await?;
        let record = self
            .transactions
            .insert(&mut *tx, sender.id, receiver.id, &amount, Utc::now())
            .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = record.id,
            "Transaction successful: {} transferred from account {} to account {}",
            amount,
            command.sender_account_number,
            command.receiver_account_number
        );

        Ok(record)
    }

    /// Get a transaction by id
    pub async fn get_transaction(&self, id: i64) -> Result<Transaction, AppError> {
        self.transactions
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::TransactionNotFound(id.to_string()).into())
    }
}

fn resolve<'a>(accounts: &'a [Account], account_number: &str) -> Result<&'a Account, DomainError> {
    accounts
        .iter()
        .find(|account| account.account_number == account_number)
        .ok_or_else(|| DomainError::AccountNotFound(account_number.to_string()))
}
