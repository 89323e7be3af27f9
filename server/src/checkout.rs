//! Donation checkout, delegated to the hosted payments API.
//!
//! The server never touches card data. It builds a uniquely referenced
//! order from the visitor's amount and hands it to the payment
//! provider, which hosts the actual checkout. Without a configured api
//! key the feature stays disabled and every attempt reports failure.

use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DEFAULT_DESCRIPTION: &str = "Donation to Pista";
pub const DEFAULT_RETURN_URL: &str = "https://pista.dance";

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub return_url: Option<String>,
}

pub struct CheckoutOrder {
    pub checkout_reference: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub return_url: String,
}

pub struct CreatedCheckout {
    pub checkout_id: String,
    pub checkout_reference: String,
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("no checkout provider configured")]
    Disabled,

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_checkout(&self, order: &CheckoutOrder) -> Result<CreatedCheckout, CheckoutError>;
}

/// Order reference of the form `donation-<millis>-<suffix>`, unique
/// enough for the provider to dedupe on.
pub fn new_reference() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();

    format!("donation-{millis}-{}", suffix.to_lowercase())
}

pub struct RestCheckout {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ProviderOrder<'a> {
    checkout_reference: &'a str,
    amount: f64,
    currency: &'a str,
    description: &'a str,
    return_url: &'a str,
}

#[derive(Deserialize)]
struct ProviderResponse {
    id: String,
    checkout_reference: String,
}

impl RestCheckout {
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl CheckoutProvider for RestCheckout {
    async fn create_checkout(&self, order: &CheckoutOrder) -> Result<CreatedCheckout, CheckoutError> {
        let response = self
            .client
            .post(self.url.as_str())
            .bearer_auth(&self.api_key)
            .json(&ProviderOrder {
                checkout_reference: &order.checkout_reference,
                amount: order.amount,
                currency: &order.currency,
                description: &order.description,
                return_url: &order.return_url,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Provider(format!(
                "payments api responded with {status}: {body}"
            )));
        }

        let created: ProviderResponse = response.json().await?;
        Ok(CreatedCheckout {
            checkout_id: created.id,
            checkout_reference: created.checkout_reference,
        })
    }
}

/// Stands in when no checkout key is configured.
pub struct DisabledCheckout;

#[async_trait]
impl CheckoutProvider for DisabledCheckout {
    async fn create_checkout(&self, _order: &CheckoutOrder) -> Result<CreatedCheckout, CheckoutError> {
        Err(CheckoutError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_the_expected_shape() {
        let reference = new_reference();
        let parts: Vec<&str> = reference.splitn(3, '-').collect();

        assert_eq!(parts[0], "donation");
        assert!(parts[1].parse::<i64>().is_ok(), "got: {reference}");
        assert_eq!(parts[2].len(), 7, "got: {reference}");
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
            "got: {reference}"
        );
    }

    #[test]
    fn references_are_unique() {
        let a = new_reference();
        let b = new_reference();
        assert_ne!(a, b);
    }
}
