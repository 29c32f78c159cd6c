//! HTTP surface of the chat relay.
//!
//! Routes:
//! - `GET  /`                                 — liveness probe
//! - `POST /api/v1/chat/stream`               — SSE chat relay
//! - `POST /api/v1/agent/analyze`             — query classification
//! - `POST /api/v1/agent/analyze_and_search`  — classification + retrieval

use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

pub use error_handler::AppError;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tokio::signal;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tracing::info;

use crate::{
    core::app_state::AppState,
    routes::{
        agent::{
            analyze_and_search_route::analyze_and_search_route, analyze_route::analyze_route,
        },
        chat::chat_stream_route::chat_stream_route,
        root_route::backend_running,
    },
};

const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_ORIGINS: &str = "https://jobs-chatbot.vercel.app,http://localhost:3000";

pub async fn start() -> Result<(), AppError> {
    let state = Arc::new(AppState::from_env()?);

    let v1 = Router::new()
        .route("/chat/stream", post(chat_stream_route))
        .route("/agent/analyze", post(analyze_route))
        .route("/agent/analyze_and_search", post(analyze_and_search_route));

    let app = Router::new()
        .route("/", get(backend_running))
        .nest("/api/v1", v1)
        .layer(cors_layer()?)
        .with_state(state);

    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.into());

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;

    info!(address = %host_url, "chat relay listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Browser CORS policy for the chat frontend.
///
/// Origins come from `CORS_ALLOWED_ORIGINS` (comma-separated). Credentials
/// are allowed, so origins and methods must be listed explicitly rather
/// than wildcarded.
fn cors_layer() -> Result<CorsLayer, AppError> {
    let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.into());

    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| AppError::InvalidOrigin(origin.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    // Wait for the Ctrl+C signal
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
