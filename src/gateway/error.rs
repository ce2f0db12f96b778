//! API-layer errors and their JSON bodies.
//!
//! Header, topic and inference failures share the structured body
//! `{timestamp, status, error, message, path}`. A missing data file answers
//! with the bare `{"error": ...}` object instead; clients depend on that shape.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::llm::ProviderError;

pub const MISSING_CLIENT_HEADER: &str = "The 'X-Forwarded-For' header is required.";
pub const DATA_FILE_UNREADABLE: &str = "Data file is missing or cannot be read.";

#[derive(Debug)]
pub enum ApiError {
    /// 400 — user-correctable input problem.
    BadRequest { message: String, path: &'static str },

    /// 500 — the inference backend failed.
    Internal { message: String, path: &'static str },

    /// Reference data file could not be read.
    DataFile,
}

impl ApiError {
    pub fn missing_client_header(path: &'static str) -> Self {
        ApiError::BadRequest { message: MISSING_CLIENT_HEADER.into(), path }
    }

    pub fn off_topic(topic: &str, path: &'static str) -> Self {
        ApiError::BadRequest {
            message: format!("This API only responds to questions about {topic}"),
            path,
        }
    }

    pub fn inference(err: ProviderError, path: &'static str) -> Self {
        ApiError::Internal { message: err.to_string(), path }
    }
}

/// Structured error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    timestamp: String,
    status: u16,
    error: &'static str,
    message: String,
    path: &'static str,
}

impl ErrorBody {
    fn new(status: StatusCode, message: String, path: &'static str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error"),
            message,
            path,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, path) = match self {
            ApiError::BadRequest { message, path } => (StatusCode::BAD_REQUEST, message, path),
            ApiError::Internal { message, path } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, path)
            }
            ApiError::DataFile => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": DATA_FILE_UNREADABLE })))
                    .into_response();
            }
        };

        (status, Json(ErrorBody::new(status, message, path))).into_response()
    }
}
