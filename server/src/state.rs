use std::sync::Arc;

use crate::{
    auth::{AuthProvider, RestAuth},
    checkout::{CheckoutProvider, DisabledCheckout, RestCheckout},
    config::Config,
    ratelimit::{MAX_REQUESTS, RateLimiter, WINDOW},
    store::{MessageStore, RestStore},
};

pub struct AppState {
    pub config: Config,
    pub store: Box<dyn MessageStore>,
    pub auth: Box<dyn AuthProvider>,
    pub checkout: Box<dyn CheckoutProvider>,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let store = Box::new(RestStore::new(&config.store_url, &config.store_key));
        let auth = Box::new(RestAuth::new(&config.store_url, &config.store_key));
        let checkout: Box<dyn CheckoutProvider> = match &config.checkout_key {
            Some(key) => Box::new(RestCheckout::new(&config.checkout_url, key)),
            None => Box::new(DisabledCheckout),
        };

        Self::with_parts(
            config,
            store,
            auth,
            checkout,
            RateLimiter::new(MAX_REQUESTS, WINDOW),
        )
    }

    /// State from explicit collaborators, so tests and local tooling can
    /// swap in their own.
    pub fn with_parts(
        config: Config,
        store: Box<dyn MessageStore>,
        auth: Box<dyn AuthProvider>,
        checkout: Box<dyn CheckoutProvider>,
        limiter: RateLimiter,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            auth,
            checkout,
            limiter,
        })
    }
}
