//! Axum HTTP surface of the gateway.
//!
//! ## URL layout
//!
//! ```text
//! GET  /      → welcome text + usage example
//! POST /ask   → topic check, then answer from the reference data file
//! ```
//!
//! Both routes require an `X-Forwarded-For` header, which identifies the
//! client in log lines. It is not an authentication mechanism.

mod api;
pub mod error;
pub mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::TopicConfig;
use crate::error::AppError;
use crate::llm::LlmProvider;
use crate::logger::SERVER_CLIENT;

pub use api::CLIENT_HEADER;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler. Built once at startup and
/// never mutated afterwards.
#[derive(Debug)]
pub struct GatewayState {
    pub topic: TopicConfig,
    /// Reference data file, re-read on every `/ask`.
    pub data_path: PathBuf,
    pub llm: LlmProvider,
}

impl GatewayState {
    pub fn new(topic: TopicConfig, data_path: impl Into<PathBuf>, llm: LlmProvider) -> Arc<Self> {
        Arc::new(Self { topic, data_path: data_path.into(), llm })
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(api::home))
        .route("/ask", post(api::ask))
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn serve(
    bind_addr: &str,
    state: Arc<GatewayState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(client = %SERVER_CLIENT, %bind_addr, "API server running");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!(client = %SERVER_CLIENT, "API server shut down");
    Ok(())
}
