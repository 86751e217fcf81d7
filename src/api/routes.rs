//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{Account, Amount, Balance, Direction, Transaction, User};
use crate::error::AppError;
use crate::service::{
    AccountService, CreateAccountCommand, CreateUserCommand, TransactionService, TransferCommand,
    UserService,
};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub birthdate: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            birthdate: user.birthdate,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: i64,
    pub account_number: String,
    pub pin: String,
    pub account_login_number: String,
    pub account_login_password: String,
    /// Opening balance as a decimal string; zero when absent
    #[serde(default)]
    pub balance: Option<String>,
}

/// Account as exposed over HTTP; PIN and login password are never included
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub account_number: String,
    pub account_login_number: String,
    pub balance: Decimal,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            account_number: account.account_number,
            account_login_number: account.account_login_number,
            balance: account.balance.value(),
            user_id: account.user_id,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PinQuery {
    pub pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinQuery {
    pub old_pin: String,
    pub new_pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinQuery {
    pub new_pin: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawQuery {
    pub pin: String,
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender_account_number: String,
    pub receiver_account_number: String,
    /// Decimal string, e.g. "100.50"
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub sender_id: i64,
    pub receiver_id: i64,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            timestamp: tx.timestamp,
            sender_id: tx.sender_id,
            receiver_id: tx.receiver_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub transaction: TransactionResponse,
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub account_id: i64,
    pub entries: Vec<HistoryEntry>,
}

fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    Ok(raw.parse::<Amount>()?.value())
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Users
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user).delete(delete_user))
        .route("/users/:id/accounts", get(get_user_accounts))
        // Accounts
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/:id", get(get_account).delete(delete_account))
        .route("/accounts/:id/check-pin", put(check_pin))
        .route("/accounts/:id/update-pin", put(update_pin))
        .route("/accounts/:id/create-pin", put(create_pin))
        .route("/accounts/:id/deposit", put(deposit))
        .route("/accounts/:id/withdraw", put(withdraw))
        .route("/accounts/:id/balance", get(check_balance))
        .route("/accounts/:id/transactions", get(get_account_transactions))
        // Transfers
        .route("/transactions", post(transfer))
        .route("/transactions/:id", get(get_transaction))
}

// =========================================================================
// Users
// =========================================================================

/// Register a user
async fn create_user(
    State(pool): State<PgPool>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let command = CreateUserCommand::new(
        request.username,
        request.password,
        request.full_name,
        request.email,
        request.birthdate,
    );

    let user = UserService::new(pool).create_user(command).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get user by ID
async fn get_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::new(pool).get_user(id).await?;
    Ok(Json(user.into()))
}

/// Delete a user with all of their accounts
async fn delete_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    UserService::new(pool).delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accounts owned by a user
async fn get_user_accounts(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = UserService::new(pool).list_accounts(id).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

// =========================================================================
// Accounts
// =========================================================================

/// Open an account
async fn create_account(
    State(pool): State<PgPool>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let opening_balance = match request.balance.as_deref() {
        Some(raw) => raw.parse::<Balance>()?.value(),
        None => Decimal::ZERO,
    };

    let command = CreateAccountCommand::new(
        request.user_id,
        request.account_number,
        request.pin,
        request.account_login_number,
        request.account_login_password,
    )
    .with_opening_balance(opening_balance);

    let account = AccountService::new(pool).create_account(command).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// All accounts
async fn list_accounts(State(pool): State<PgPool>) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = AccountService::new(pool).list_accounts().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Get account by ID
async fn get_account(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = AccountService::new(pool).get_account(id).await?;
    Ok(Json(account.into()))
}

/// Delete an account and its transactions
async fn delete_account(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    AccountService::new(pool).delete_account(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /accounts/:id/check-pin?pin=
async fn check_pin(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(query): Query<PinQuery>,
) -> Result<Json<bool>, AppError> {
    let matches = AccountService::new(pool).check_pin(id, &query.pin).await?;
    Ok(Json(matches))
}

/// PUT /accounts/:id/update-pin?oldPin=&newPin=
async fn update_pin(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(query): Query<UpdatePinQuery>,
) -> Result<StatusCode, AppError> {
    AccountService::new(pool)
        .update_pin(id, &query.old_pin, &query.new_pin)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /accounts/:id/create-pin?newPin=
async fn create_pin(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(query): Query<CreatePinQuery>,
) -> Result<StatusCode, AppError> {
    AccountService::new(pool).create_pin(id, &query.new_pin).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /accounts/:id/deposit?amount=
async fn deposit(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(query): Query<AmountQuery>,
) -> Result<StatusCode, AppError> {
    let amount = parse_amount(&query.amount)?;
    AccountService::new(pool).deposit(id, amount).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /accounts/:id/withdraw?pin=&amount=
async fn withdraw(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Query(query): Query<WithdrawQuery>,
) -> Result<StatusCode, AppError> {
    let amount = parse_amount(&query.amount)?;
    AccountService::new(pool)
        .withdraw_with_pin(id, &query.pin, amount)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /accounts/:id/balance
async fn check_balance(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Json<Decimal>, AppError> {
    let balance = AccountService::new(pool).check_balance(id).await?;
    Ok(Json(balance))
}

/// Sent and received transactions of an account
async fn get_account_transactions(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Json<HistoryResponse>, AppError> {
    let transactions = AccountService::new(pool).transaction_history(id).await?;

    let entries = transactions
        .into_iter()
        .filter_map(|tx| {
            let direction = tx.direction_for(id)?;
            Some(HistoryEntry {
                transaction: tx.into(),
                direction,
            })
        })
        .collect();

    Ok(Json(HistoryResponse {
        account_id: id,
        entries,
    }))
}

// =========================================================================
// Transfers
// =========================================================================

/// Transfer money between two accounts by account number
async fn transfer(
    State(pool): State<PgPool>,
    Json(request): Json<TransferRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let amount = parse_amount(&request.amount)?;
    let command = TransferCommand::new(
        request.sender_account_number,
        request.receiver_account_number,
        amount,
    );

    let transaction = TransactionService::new(pool).transfer(command).await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// Get transaction by ID
async fn get_transaction(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = TransactionService::new(pool).get_transaction(id).await?;
    Ok(Json(transaction.into()))
}
