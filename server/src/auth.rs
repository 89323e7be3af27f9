//! Anonymous sign-in, delegated to the hosted identity service.
//!
//! The site never manages credentials itself. A visitor who wants a
//! session gets an anonymous one from the same hosted project that
//! stores the messages, and the endpoint passes the provider's user
//! object through untouched.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an anonymous session, returning the provider's user object.
    async fn sign_in_anonymously(&self) -> Result<Value, AuthError>;
}

pub struct RestAuth {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestAuth {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl AuthProvider for RestAuth {
    async fn sign_in_anonymously(&self) -> Result<Value, AuthError> {
        // Signup with an empty body creates an anonymous user.
        let response = self
            .client
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response)
                .await
                .unwrap_or_else(|| format!("auth responded with {status}"));
            return Err(AuthError::Provider(message));
        }

        let body: Value = response.json().await?;
        let user = body.get("user").cloned().unwrap_or(body);
        Ok(user)
    }
}

async fn error_message(response: reqwest::Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    for key in ["msg", "error_description", "message"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }
    None
}
