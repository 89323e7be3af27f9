use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub store_url: String,
    pub store_key: String,
    pub checkout_url: String,
    pub checkout_key: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PISTA_PORT", "8080"),
            store_url: try_load("STORE_URL", "http://localhost:54321"),
            store_key: read_secret("STORE_API_KEY"),
            checkout_url: try_load("CHECKOUT_URL", "https://api.sumup.com/v0.1/checkouts"),
            checkout_key: maybe_secret("CHECKOUT_API_KEY"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// Docker-style secret from `/run/secrets/<NAME>`, falling back to an
/// environment variable of the same name for local runs.
fn maybe_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    if let Ok(contents) = read_to_string(&path) {
        return Some(contents.trim().to_string());
    }

    match env::var(secret_name) {
        Ok(value) => Some(value.trim().to_string()),
        Err(_) => {
            warn!("No secret file or environment value for {secret_name}");
            None
        }
    }
}

fn read_secret(secret_name: &str) -> String {
    maybe_secret(secret_name).expect("Secrets misconfigured!")
}
