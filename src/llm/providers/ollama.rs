//! Ollama text-generation provider (`POST /api/generate`).
//!
//! One non-streaming round-trip per call: the full text is collected by the
//! server and returned in a single JSON body. Wire types are private to this
//! module.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::ProviderError;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for an Ollama server.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    generate_url: String,
    model: String,
    raw: bool,
}

impl OllamaProvider {
    /// `base_url` is the server root (`http://localhost:11434/`); a trailing
    /// slash is optional.
    pub fn new(
        base_url: &str,
        model: String,
        timeout_seconds: u64,
        raw: bool,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let generate_url = format!("{base_url}/api/generate");

        Ok(Self { client, base_url, generate_url, model, raw })
    }

    /// Lightweight reachability probe against the server root.
    ///
    /// Any HTTP response means the server is reachable; only a transport
    /// failure is an error. Uses its own short timeout.
    pub async fn ping(&self) -> Result<(), ProviderError> {
        self.client
            .get(&self.base_url)
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| ProviderError::Request(format!("unreachable: {e}")))
    }

    /// Send `prompt` and return the generated text, or `None` when the
    /// server answered without a `response` field or with an empty one.
    pub async fn generate(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let payload = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            raw: self.raw,
            options: GenerateOptions {},
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending generate request");
        trace!(prompt, "full generate prompt");

        let response = self
            .client
            .post(&self.generate_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.generate_url, error = %e, timeout = e.is_timeout(), "generate request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<GenerateResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize generate response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(
            done = parsed.done,
            has_text = parsed.response.as_deref().is_some_and(|t| !t.is_empty()),
            "received generate response"
        );

        Ok(parsed.response.filter(|t| !t.is_empty()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    raw: bool,
    options: GenerateOptions,
}

/// Sampling options; left empty so the model's defaults apply.
#[derive(Debug, Serialize)]
struct GenerateOptions {}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => env.error,
        Err(_) => body,
    };

    error!(%status, %message, "generate request returned HTTP error");
    Err(ProviderError::Status { status: status.as_u16(), message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, timeout_seconds: u64) -> OllamaProvider {
        OllamaProvider::new(&format!("{}/", server.uri()), "deepseek-r1:8b".into(), timeout_seconds, true)
            .unwrap()
    }

    #[tokio::test]
    async fn generate_sends_non_streaming_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "deepseek-r1:8b",
                "prompt": "Hola",
                "stream": false,
                "raw": true,
                "options": {}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "deepseek-r1:8b",
                "response": "  Buenas ",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server, 5).generate("Hola").await.unwrap();
        assert_eq!(text.as_deref(), Some("  Buenas "));
    }

    #[tokio::test]
    async fn missing_response_field_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
            .mount(&server)
            .await;

        assert_eq!(provider(&server, 5).generate("x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_response_field_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "", "done": true })))
            .mount(&server)
            .await;

        assert_eq!(provider(&server, 5).generate("x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn http_error_uses_ollama_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "error": "model 'deepseek-r1:8b' not found" })),
            )
            .mount(&server)
            .await;

        let err = provider(&server, 5).generate("x").await.unwrap_err();
        match err {
            ProviderError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "model 'deepseek-r1:8b' not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(&server, 5).generate("x").await.unwrap_err();
        assert!(err.to_string().contains("failed to parse response body"));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "late" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = provider(&server, 1).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }

    #[tokio::test]
    async fn ping_reachable_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ollama is running"))
            .mount(&server)
            .await;

        assert!(provider(&server, 5).ping().await.is_ok());
    }

    #[tokio::test]
    async fn ping_unreachable_server() {
        let p = OllamaProvider::new("http://127.0.0.1:1/", "m".into(), 1, true).unwrap();
        let err = p.ping().await.unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }
}
