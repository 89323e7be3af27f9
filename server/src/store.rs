//! # Message Store
//!
//! Gateway to the hosted datastore holding the guest book.
//!
//! Core purpose is appending new messages and reading the whole board
//! back, newest first. Messages are immutable once written and never
//! deleted, so the collection is append-only and every read is a full
//! scan.
//!
//! ## Wire shape
//!
//! The hosted service exposes the collection over a PostgREST-style API:
//!
//! - `GET  {base}/rest/v1/messages?select=*&order=created_at.desc`
//! - `POST {base}/rest/v1/messages` with a one-element array body and
//!   `Prefer: return=minimal`
//!
//! Both carry the project api key as the `apikey` header and again as a
//! bearer token. Failures surface the service's own `message` field so
//! the endpoint can pass it through.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MESSAGES_PATH: &str = "rest/v1/messages";

/// One guest-book entry, as stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one message. The content is stored as given.
    async fn insert(&self, content: &str) -> Result<(), StoreError>;

    /// All messages, ordered by creation time descending.
    async fn list(&self) -> Result<Vec<Message>, StoreError>;
}

pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct NewRow<'a> {
    content: &'a str,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/{MESSAGES_PATH}", self.base_url)
    }
}

#[async_trait]
impl MessageStore for RestStore {
    async fn insert(&self, content: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&[NewRow { content }])
            .send()
            .await?;

        check_backend(response).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        let response = self
            .client
            .get(self.messages_url())
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let response = check_backend(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_backend(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let message = error_message(response)
        .await
        .unwrap_or_else(|| format!("store responded with {status}"));

    Err(StoreError::Backend(message))
}

async fn error_message(response: Response) -> Option<String> {
    let body: serde_json::Value = response.json().await.ok()?;
    body.get("message")?.as_str().map(str::to_string)
}

/// In-process store for tests and local development. Ids are assigned
/// monotonically; insertion order stands in for creation time, so two
/// messages written in the same instant still list back in a stable
/// order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    messages: Vec<Message>,
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(&self, content: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        inner.next_id += 1;
        let message = Message {
            id: inner.next_id,
            content: content.to_string(),
            created_at: Utc::now(),
            user_id: None,
        };
        inner.messages.push(message);

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let mut messages = inner.messages.clone();
        messages.reverse();
        Ok(messages)
    }
}
