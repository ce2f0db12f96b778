//! Topic gateway — a small HTTP front for a local Ollama model that only
//! answers questions about one topic, in one language, from one reference
//! text file.

pub mod config;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod logger;
