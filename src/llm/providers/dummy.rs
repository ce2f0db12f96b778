//! Dummy LLM provider — echoes input back prefixed with `[echo]`.
//! Lets the gateway run end-to-end without an Ollama server.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn generate(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        Ok(Some(format!("[echo] {prompt}")))
    }
}
