//! Documentation of the Pista community site backend.
//!
//!
//!
//! # General Infrastructure
//! - Static site talks to this server for everything dynamic: the guest
//!   book, anonymous sign-in, and donation checkouts
//! - The server fronts a hosted database project over its REST API, no
//!   database runs on our machines
//! - Payment checkouts are delegated to the payment provider's hosted
//!   API, cards never touch this process
//! - One container, one port, reverse proxied by the host
//!
//!
//!
//! # Guarding the Guest Book
//!
//! **Goal**: keep drive-by spam out of the board without accounts or
//! captchas.
//!
//! - Every submission counts against a fixed 60 second window per
//!   client address, five per window
//! - The counter lives in this process; a second instance counts on its
//!   own (acceptable at this scale, the proxy pins a single instance)
//! - Content is validated before the store sees it: body must be JSON,
//!   content must be non-blank after trimming
//! - Rendering of stored Markdown happens client side through the
//!   render crate, so the store only ever holds the visitor's raw text
//!
//!
//!
//! # Notes
//!
//! ## Hosted store
//! We could run our own Postgres and own the schema end to end. But the
//! guest book is one append-only collection with a handful of reads per
//! minute; a managed project with a REST API over it removes the backup
//! and migration story entirely. The wire format is PostgREST-style, so
//! swapping in a self-hosted instance later stays possible without
//! touching handlers.
//!
//! Storage is unbounded by choice. Messages are never edited or
//! deleted, and the whole collection is returned on every read. At the
//! observed write rate this outlives the hardware.
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run against a local hosted-store emulator.
//! ```sh
//! STORE_API_KEY=dev cargo run
//! ```
use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod routes;
pub mod state;
pub mod store;

use config::Config;
use routes::{
    auth_handler, checkout_handler, get_messages_handler, health_handler, post_message_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/messages",
            get(get_messages_handler).post(post_message_handler),
        )
        .route("/api/auth", post(auth_handler))
        .route("/api/checkout", post(checkout_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new(Config::load());

    info!("Starting server...");

    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
