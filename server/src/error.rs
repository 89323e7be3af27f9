use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{auth::AuthError, checkout::CheckoutError, store::StoreError};

/// Every failure a handler can report. Each variant carries its wire
/// message through `Display` and maps to one status code, so no error
/// escapes as an unhandled fault.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Empty message.")]
    EmptyMessage,

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Too many requests. Try again later.")]
    RateLimited,

    #[error("Invalid amount. Amount must be greater than 0.")]
    InvalidAmount,

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Failed to create checkout")]
    Checkout(#[from] CheckoutError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::EmptyMessage | AppError::InvalidBody | AppError::InvalidAmount => {
                StatusCode::BAD_REQUEST
            }
            AppError::Auth { .. } => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Checkout { .. } => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
