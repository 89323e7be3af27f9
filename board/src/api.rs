//! HTTP client for the site's message endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use crate::{Api, ApiError, Message};

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/messages", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(server_error(response, "Failed to fetch messages").await);
        }

        let messages: Vec<Message> = response.json().await?;
        debug!("Fetched {} messages", messages.len());
        Ok(messages)
    }

    async fn post_message(&self, content: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/api/messages", self.base_url))
            .json(&json!({ "content": content }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(server_error(response, "Failed to post message").await);
        }

        Ok(())
    }
}

/// The server's `error` field, or `fallback` when the body has none.
async fn server_error(response: reqwest::Response, fallback: &str) -> ApiError {
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error")?.as_str().map(str::to_string));

    ApiError::Server(message.unwrap_or_else(|| fallback.to_string()))
}
