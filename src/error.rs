//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// PostgreSQL SQLSTATE codes surfaced as constraint violations
const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors (4xx)
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    /// Constraint failures reported by the store become `ConstraintViolation`;
    /// everything else stays a database error.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let code = db_err.code();
            if matches!(
                code.as_deref(),
                Some(PG_UNIQUE_VIOLATION | PG_FOREIGN_KEY_VIOLATION | PG_CHECK_VIOLATION)
            ) {
                let detail = db_err
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db_err.message().to_string());
                return AppError::Domain(DomainError::ConstraintViolation(detail));
            }
        }
        AppError::Database(err)
    }
}

impl From<crate::domain::AmountError> for AppError {
    fn from(err: crate::domain::AmountError) -> Self {
        AppError::Domain(err.into())
    }
}

impl AppError {
    /// Domain error carried by this error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status and stable error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Domain(domain_err) => match domain_err {
                DomainError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "account_not_found"),
                DomainError::UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found"),
                DomainError::TransactionNotFound(_) => {
                    (StatusCode::NOT_FOUND, "transaction_not_found")
                }
                DomainError::IncorrectPin => (StatusCode::FORBIDDEN, "incorrect_pin"),
                DomainError::InvalidPin(_) => (StatusCode::BAD_REQUEST, "invalid_pin"),
                DomainError::InsufficientFunds { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_funds")
                }
                DomainError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "invalid_amount"),
                DomainError::SameAccountTransfer => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "same_account_transfer")
                }
                DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                DomainError::ConstraintViolation(_) => (StatusCode::CONFLICT, "constraint_violation"),
            },
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        // Server-side failures are logged in full and hidden from the caller
        let (error, details) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Internal server error".to_string(), None)
            }
            AppError::Domain(domain_err) => {
                if domain_err.is_client_error() {
                    tracing::debug!(error_code, "Request rejected: {}", domain_err);
                }
                let details = match domain_err {
                    DomainError::AccountNotFound(key)
                    | DomainError::UserNotFound(key)
                    | DomainError::TransactionNotFound(key) => Some(key.clone()),
                    DomainError::ConstraintViolation(constraint) => Some(constraint.clone()),
                    _ => None,
                };
                (self.to_string(), details)
            }
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
