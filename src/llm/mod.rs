//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Each call is one independent round-trip; nothing is retried.

pub mod providers;

use thiserror::Error;

/// Returned in place of model text when the backend produced nothing.
pub const NO_RESPONSE: &str = "No response received.";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Ollama(providers::ollama::OllamaProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// Short backend name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Ollama(_) => "ollama",
            LlmProvider::Dummy(_) => "dummy",
        }
    }

    /// Send `prompt` and return the raw model text, `None` when the backend
    /// answered without any.
    pub async fn generate(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.generate(prompt).await,
            LlmProvider::Dummy(p) => p.generate(prompt).await,
        }
    }

    /// Send `prompt` and return the normalised reply, see [`normalize`].
    pub async fn ask(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generate(prompt).await.map(normalize)
    }

    /// Reachability probe. Always succeeds for offline backends.
    pub async fn ping(&self) -> Result<(), ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.ping().await,
            LlmProvider::Dummy(_) => Ok(()),
        }
    }
}

/// Trim and lowercase model text. Missing or blank text becomes
/// [`NO_RESPONSE`], which is returned as-is.
pub fn normalize(text: Option<String>) -> String {
    text.map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}
