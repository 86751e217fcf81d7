//! Service-level ledger tests
//!
//! Balance, PIN and transfer rules against a real PostgreSQL database.

use banking_ledger::domain::DomainError;
use banking_ledger::service::{AccountService, CreateAccountCommand, TransactionService, TransferCommand};
use banking_ledger::store::TransactionRepository;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod common;

use common::TEST_PIN;

fn domain_error(err: banking_ledger::AppError) -> DomainError {
    err.as_domain().cloned().unwrap_or_else(|| panic!("expected domain error, got {err:?}"))
}

#[tokio::test]
async fn test_deposit_then_withdraw_round_trip() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(1000)).await;
    let service = AccountService::new(pool);

    let after_deposit = service.deposit(account.id, dec!(500)).await.unwrap();
    assert_eq!(after_deposit.value(), dec!(1500));

    let after_withdraw = service.withdraw(account.id, dec!(500)).await.unwrap();
    assert_eq!(after_withdraw.value(), dec!(1000));
    assert_eq!(service.check_balance(account.id).await.unwrap(), dec!(1000));
}

#[tokio::test]
async fn test_deposit_rejects_non_positive_amount() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(10)).await;
    let service = AccountService::new(pool);

    for amount in [Decimal::ZERO, dec!(-5)] {
        let err = service.deposit(account.id, amount).await.unwrap_err();
        assert!(matches!(domain_error(err), DomainError::InvalidAmount(_)));
    }
    assert_eq!(service.check_balance(account.id).await.unwrap(), dec!(10));
}

#[tokio::test]
async fn test_withdraw_insufficient_funds_leaves_balance() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(1000)).await;
    let service = AccountService::new(pool);

    let err = service.withdraw(account.id, dec!(1500)).await.unwrap_err();
    assert_eq!(
        domain_error(err),
        DomainError::insufficient_funds(dec!(1500), dec!(1000))
    );
    assert_eq!(service.check_balance(account.id).await.unwrap(), dec!(1000));
}

#[tokio::test]
async fn test_withdraw_call_paths_differ_in_pin_check() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(100)).await;
    let service = AccountService::new(pool);

    let err = service.withdraw_with_pin(account.id, "9999", dec!(10)).await.unwrap_err();
    assert_eq!(domain_error(err), DomainError::IncorrectPin);
    assert_eq!(service.check_balance(account.id).await.unwrap(), dec!(100));

    service.withdraw_with_pin(account.id, TEST_PIN, dec!(10)).await.unwrap();
    // The internal path does not verify the PIN at all
    service.withdraw(account.id, dec!(10)).await.unwrap();
    assert_eq!(service.check_balance(account.id).await.unwrap(), dec!(80));
}

#[tokio::test]
async fn test_update_pin_with_wrong_old_pin_keeps_pin() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(0)).await;
    let service = AccountService::new(pool);

    let err = service.update_pin(account.id, "0000", "5678").await.unwrap_err();
    assert_eq!(domain_error(err), DomainError::IncorrectPin);
    assert!(service.check_pin(account.id, TEST_PIN).await.unwrap());
    assert!(!service.check_pin(account.id, "5678").await.unwrap());

    service.update_pin(account.id, TEST_PIN, "5678").await.unwrap();
    assert!(service.check_pin(account.id, "5678").await.unwrap());
}

#[tokio::test]
async fn test_create_pin_overwrites_and_validates() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(0)).await;
    let service = AccountService::new(pool);

    service.create_pin(account.id, "4321").await.unwrap();
    assert!(service.check_pin(account.id, "4321").await.unwrap());

    let err = service.create_pin(account.id, "43a1").await.unwrap_err();
    assert!(matches!(domain_error(err), DomainError::InvalidPin(_)));
    assert!(service.check_pin(account.id, "4321").await.unwrap());
}

#[tokio::test]
async fn test_missing_account_is_not_found() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(0)).await;
    let service = AccountService::new(pool);

    service.delete_account(account.id).await.unwrap();

    let expected = DomainError::AccountNotFound(account.id.to_string());
    assert_eq!(domain_error(service.check_balance(account.id).await.unwrap_err()), expected);
    assert_eq!(domain_error(service.check_pin(account.id, TEST_PIN).await.unwrap_err()), expected);
    assert_eq!(domain_error(service.create_pin(account.id, "1111").await.unwrap_err()), expected);
    assert_eq!(
        domain_error(service.update_pin(account.id, TEST_PIN, "1111").await.unwrap_err()),
        expected
    );
    assert_eq!(domain_error(service.deposit(account.id, dec!(1)).await.unwrap_err()), expected);
    assert_eq!(domain_error(service.withdraw(account.id, dec!(1)).await.unwrap_err()), expected);
    assert_eq!(domain_error(service.delete_account(account.id).await.unwrap_err()), expected);
}

#[tokio::test]
async fn test_duplicate_account_number_is_constraint_violation() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(0)).await;
    let service = AccountService::new(pool);

    let duplicate = CreateAccountCommand::new(
        user.id,
        account.account_number.clone(),
        TEST_PIN.to_string(),
        common::unique("login"),
        "password123".to_string(),
    );

    let err = service.create_account(duplicate).await.unwrap_err();
    assert!(matches!(domain_error(err), DomainError::ConstraintViolation(_)));
}

#[tokio::test]
async fn test_transfer_moves_balances_and_records_one_transaction() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let a = common::create_account(&pool, user.id, dec!(1000)).await;
    let b = common::create_account(&pool, user.id, dec!(200)).await;

    let transfers = TransactionService::new(pool.clone());
    let accounts = AccountService::new(pool.clone());

    let record = transfers
        .transfer(TransferCommand::new(a.account_number.clone(), b.account_number.clone(), dec!(100)))
        .await
        .unwrap();

    assert_eq!(record.amount, dec!(100));
    assert_eq!(record.sender_id, a.id);
    assert_eq!(record.receiver_id, b.id);
    assert_eq!(accounts.check_balance(a.id).await.unwrap(), dec!(900));
    assert_eq!(accounts.check_balance(b.id).await.unwrap(), dec!(300));

    let repo = TransactionRepository::new(pool);
    assert_eq!(repo.count_between(a.id, b.id).await.unwrap(), 1);
    assert_eq!(repo.find_sent(a.id).await.unwrap(), vec![record.clone()]);
    assert_eq!(repo.find_received(b.id).await.unwrap(), vec![record.clone()]);
    assert_eq!(transfers.get_transaction(record.id).await.unwrap(), record);
}

#[tokio::test]
async fn test_transfer_insufficient_funds_changes_nothing() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let a = common::create_account(&pool, user.id, dec!(50)).await;
    let b = common::create_account(&pool, user.id, dec!(200)).await;

    let transfers = TransactionService::new(pool.clone());
    let accounts = AccountService::new(pool.clone());

    let err = transfers
        .transfer(TransferCommand::new(a.account_number.clone(), b.account_number.clone(), dec!(100)))
        .await
        .unwrap_err();

    assert!(matches!(domain_error(err), DomainError::InsufficientFunds { .. }));
    assert_eq!(accounts.check_balance(a.id).await.unwrap(), dec!(50));
    assert_eq!(accounts.check_balance(b.id).await.unwrap(), dec!(200));
    assert_eq!(TransactionRepository::new(pool).count_between(a.id, b.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_transfer_to_unknown_account_is_not_found() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let a = common::create_account(&pool, user.id, dec!(500)).await;
    let missing = common::unique("ACC");

    let transfers = TransactionService::new(pool.clone());
    let accounts = AccountService::new(pool);

    let err = transfers
        .transfer(TransferCommand::new(a.account_number.clone(), missing.clone(), dec!(100)))
        .await
        .unwrap_err();
    assert_eq!(domain_error(err), DomainError::AccountNotFound(missing.clone()));

    let err = transfers
        .transfer(TransferCommand::new(missing.clone(), a.account_number.clone(), dec!(100)))
        .await
        .unwrap_err();
    assert_eq!(domain_error(err), DomainError::AccountNotFound(missing));

    assert_eq!(accounts.check_balance(a.id).await.unwrap(), dec!(500));
}

#[tokio::test]
async fn test_transfer_to_same_account_rejected() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let a = common::create_account(&pool, user.id, dec!(500)).await;

    let err = TransactionService::new(pool)
        .transfer(TransferCommand::new(a.account_number.clone(), a.account_number.clone(), dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(domain_error(err), DomainError::SameAccountTransfer);
}

#[tokio::test]
async fn test_delete_account_cascades_transactions() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let a = common::create_account(&pool, user.id, dec!(100)).await;
    let b = common::create_account(&pool, user.id, dec!(0)).await;

    let record = TransactionService::new(pool.clone())
        .transfer(TransferCommand::new(a.account_number.clone(), b.account_number.clone(), dec!(25)))
        .await
        .unwrap();

    let accounts = AccountService::new(pool.clone());
    assert_eq!(accounts.transaction_history(b.id).await.unwrap().len(), 1);

    accounts.delete_account(a.id).await.unwrap();

    assert!(TransactionRepository::new(pool).find_by_id(record.id).await.unwrap().is_none());
    assert!(accounts.transaction_history(b.id).await.unwrap().is_empty());
    // The receiver keeps the money it already received
    assert_eq!(accounts.check_balance(b.id).await.unwrap(), dec!(25));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_withdrawals_do_not_lose_updates() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let account = common::create_account(&pool, user.id, dec!(60)).await;
    let service = AccountService::new(pool);

    let first = tokio::spawn({
        let service = service.clone();
        async move { service.withdraw(account.id, dec!(50)).await }
    });
    let second = tokio::spawn({
        let service = service.clone();
        async move { service.withdraw(account.id, dec!(50)).await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let insufficient = results
        .iter()
        .filter(|r| {
            matches!(
                r.as_ref().err().and_then(|e| e.as_domain()),
                Some(DomainError::InsufficientFunds { .. })
            )
        })
        .count();

    assert_eq!(successes, 1);
    assert_eq!(insufficient, 1);
    assert_eq!(service.check_balance(account.id).await.unwrap(), dec!(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_opposing_transfers_preserve_total() {
    let Some(pool) = common::setup_test_db().await else { return };
    let user = common::create_user(&pool).await;
    let a = common::create_account(&pool, user.id, dec!(100)).await;
    let b = common::create_account(&pool, user.id, dec!(100)).await;
    let transfers = TransactionService::new(pool.clone());

    let mut handles = Vec::new();
    for i in 0..10 {
        let transfers = transfers.clone();
        let (from, to) = if i % 2 == 0 {
            (a.account_number.clone(), b.account_number.clone())
        } else {
            (b.account_number.clone(), a.account_number.clone())
        };
        handles.push(tokio::spawn(async move {
            transfers.transfer(TransferCommand::new(from, to, dec!(7.5))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let accounts = AccountService::new(pool);
    let total = accounts.check_balance(a.id).await.unwrap() + accounts.check_balance(b.id).await.unwrap();
    assert_eq!(total, dec!(200));
    assert_eq!(accounts.check_balance(a.id).await.unwrap(), dec!(100));
}
