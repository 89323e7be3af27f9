use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    checkout::{
        self, CheckoutOrder, CheckoutRequest, DEFAULT_CURRENCY, DEFAULT_DESCRIPTION,
        DEFAULT_RETURN_URL,
    },
    error::AppError,
    state::AppState,
};

#[derive(Deserialize)]
struct NewMessage {
    content: Option<String>,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_messages_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let messages = state.store.list().await?;

    debug!("Listed {} messages", messages.len());
    Ok(Json(messages))
}

pub async fn post_message_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if !state.limiter.try_acquire(addr.ip()) {
        warn!("Rate limited {}", addr.ip());
        return Err(AppError::RateLimited);
    }

    let content = parse_submission(&body)?;
    state.store.insert(&content).await?;

    Ok(Json(json!({ "success": true })))
}

/// Body of a submission, reduced to its trimmed content. The shape and
/// the blank check fail differently on the wire, in that order.
fn parse_submission(body: &[u8]) -> Result<String, AppError> {
    let payload: NewMessage =
        serde_json::from_slice(body).map_err(|_| AppError::InvalidBody)?;

    let content = payload.content.unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::EmptyMessage);
    }

    Ok(content.to_string())
}

pub async fn auth_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth.sign_in_anonymously().await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn checkout_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request: CheckoutRequest =
        serde_json::from_slice(&body).map_err(|_| AppError::InvalidBody)?;

    let amount = request.amount.unwrap_or(0.0);
    if amount <= 0.0 {
        return Err(AppError::InvalidAmount);
    }

    let order = CheckoutOrder {
        checkout_reference: checkout::new_reference(),
        amount,
        currency: request.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        description: request
            .description
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        return_url: request
            .return_url
            .unwrap_or_else(|| DEFAULT_RETURN_URL.to_string()),
    };

    let created = state
        .checkout
        .create_checkout(&order)
        .await
        .inspect_err(|e| warn!("Checkout failed: {e}"))?;

    Ok(Json(json!({
        "checkout_id": created.checkout_id,
        "checkout_reference": created.checkout_reference,
    })))
}
