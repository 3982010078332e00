//! Error types for the lending server

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric codes returned alongside every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotLoggedIn = 2,
    DbFailure = 3,
    NoSuchData = 4,
    OutOfStock = 5,
    MaxLoansReached = 6,
    LoanAlreadyEnded = 7,
    PaymentFailure = 8,
    BadValue = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Loan limit exceeded: {0}")]
    LoanLimitExceeded(String),

    #[error("Not logged in: {0}")]
    NotLoggedIn(String),

    #[error("Loan already ended: {0}")]
    AlreadyEnded(String),

    #[error("Payment gateway failure: {0}")]
    PaymentGateway(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and stable code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::OutOfStock(_) => (StatusCode::CONFLICT, ErrorCode::OutOfStock),
            AppError::LoanLimitExceeded(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::MaxLoansReached)
            }
            AppError::NotLoggedIn(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotLoggedIn),
            AppError::AlreadyEnded(_) => (StatusCode::CONFLICT, ErrorCode::LoanAlreadyEnded),
            AppError::PaymentGateway(_) => (StatusCode::BAD_GATEWAY, ErrorCode::PaymentFailure),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::NotFound(msg)
            | AppError::OutOfStock(msg)
            | AppError::LoanLimitExceeded(msg)
            | AppError::NotLoggedIn(msg)
            | AppError::AlreadyEnded(msg)
            | AppError::PaymentGateway(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg) => msg,
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
