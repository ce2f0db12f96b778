//! Axum handlers for `/` and `/ask`.
//!
//! Each handler receives the shared [`GatewayState`] via
//! [`axum::extract::State`]. Requests are independent: at most one file read
//! and two sequential inference calls, nothing retried.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::GatewayState;
use super::error::ApiError;
use super::prompt;
use crate::logger::SERVER_CLIENT;

pub const CLIENT_HEADER: &str = "x-forwarded-for";
const DEFAULT_QUERY: &str = "Hello";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(super) struct AskRequest {
    #[serde(default)]
    query: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Client identifier from `X-Forwarded-For`. Only used for logging.
fn client_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CLIENT_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

fn access(client: &str, action: &str) {
    info!(client = %client, "{action}");
}

/// Client id or a logged 400 naming the rejected route.
fn require_client(headers: &HeaderMap, path: &'static str) -> Result<String, ApiError> {
    client_id(headers).ok_or_else(|| {
        warn!(client = %SERVER_CLIENT, "Rejected {path}: missing X-Forwarded-For header");
        ApiError::missing_client_header(path)
    })
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET / — welcome text and usage example.
pub(super) async fn home(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let client = require_client(&headers, "/")?;
    access(&client, "Request: /");

    Ok(Json(prompt::welcome_body(&state.topic)))
}

/// POST /ask — classify the query against the topic, then answer it from
/// the reference data file.
pub(super) async fn ask(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let client = require_client(&headers, "/ask")?;

    let req: AskRequest = if body.is_empty() {
        AskRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            warn!(client = %client, error = %e, "Rejected /ask: malformed JSON body");
            ApiError::BadRequest {
                message: format!("Malformed JSON request body: {e}"),
                path: "/ask",
            }
        })?
    };
    let query = req.query.as_deref().unwrap_or(DEFAULT_QUERY);

    access(&client, "Processing /ask request");

    let data = match tokio::fs::read_to_string(&state.data_path).await {
        Ok(data) => data,
        Err(e) => {
            warn!(client = %SERVER_CLIENT, path = %state.data_path.display(), "Error reading the file: {e}");
            return Err(ApiError::DataFile);
        }
    };

    let verdict = state
        .llm
        .ask(&prompt::classification_prompt(&state.topic, query))
        .await
        .map_err(|e| {
            warn!(client = %client, error = %e, "classification call failed");
            ApiError::inference(e, "/ask")
        })?;

    if !prompt::is_on_topic(&verdict) {
        access(&client, "Rejected off-topic query");
        return Err(ApiError::off_topic(&state.topic.topic, "/ask"));
    }

    let answer = state
        .llm
        .ask(&prompt::answer_prompt(&state.topic, &data, query))
        .await
        .map_err(|e| {
            warn!(client = %client, error = %e, "answer call failed");
            ApiError::inference(e, "/ask")
        })?;

    Ok(Json(json!({ "response": answer })))
}
