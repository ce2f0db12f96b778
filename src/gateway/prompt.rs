//! Prompt templates sent to the inference backend, plus the welcome text
//! that advertises them.

use serde_json::{Value, json};

use crate::config::TopicConfig;

/// Yes/no question asking whether `query` belongs to the configured topic.
pub fn classification_prompt(cfg: &TopicConfig, query: &str) -> String {
    format!(
        "Be concise, respond only in {}. Is the following query related to \"{}\"? Respond with \"yes\" or \"no\". Query: {}",
        cfg.language, cfg.topic, query
    )
}

/// Answer prompt carrying the whole reference file as context.
pub fn answer_prompt(cfg: &TopicConfig, data: &str, query: &str) -> String {
    format!(
        "Directives: Be as brief and concise as possible, language only {}. Data: {}. Query: {}.",
        cfg.language, data, query
    )
}

/// Relevance verdict from a normalised classification reply.
pub fn is_on_topic(reply: &str) -> bool {
    reply.contains("yes")
}

/// `GET /` payload: what the gateway answers about, and how to ask.
pub fn welcome_body(cfg: &TopicConfig) -> Value {
    let TopicConfig { topic, language } = cfg;
    json!({
        "message": format!(
            "Welcome to the DeepSeek AI API! This API provides answers in {language} about {topic}."
        ),
        "usage": {
            "endpoint": "/ask",
            "method": "POST",
            "body": { "query": "Your question here" },
            "example": { "query": format!("Cómo hacer unas {topic}?") },
            "response": { "response": format!("Step-by-step instructions in {language}.") }
        }
    })
}
