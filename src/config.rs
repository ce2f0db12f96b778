//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the file named by `GATEWAY_CONFIG`), then applies `DATA_FILE_PATH`,
//! `GATEWAY_BIND` and `GATEWAY_LOG_LEVEL` env overrides.
//!
//! The topic and language the gateway answers about are not configured
//! directly: they are derived from the data file name, see [`TopicConfig`].

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const DEFAULT_DATA_FILE: &str = "arepas_reina_pepiada.spanish.txt";

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the listener to.
    pub bind: String,
    pub log_level: String,
}

/// Ollama provider configuration, from `[llm.ollama]`.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server root, e.g. `http://localhost:11434/`. `api/generate` is appended.
    pub base_url: String,
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Send prompts without the model's chat template applied.
    pub raw: bool,
}

/// LLM subsystem configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"ollama"` or `"dummy"`).
    pub provider: String,
    pub ollama: OllamaConfig,
}

/// Fully-resolved gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// Reference data file; its name also encodes topic and language.
    pub data_file: PathBuf,
    pub llm: LlmConfig,
}

/// Env-var overrides applied on top of the TOML values.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub data_file: Option<String>,
    pub bind: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            data_file: env::var("DATA_FILE_PATH").ok(),
            bind: env::var("GATEWAY_BIND").ok(),
            log_level: env::var("GATEWAY_LOG_LEVEL").ok(),
        }
    }
}

/// Subject and answer language, derived once from `{topic}.{language}.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    pub topic: String,
    pub language: String,
}

impl TopicConfig {
    /// Derive topic and language from the basename of `path`.
    ///
    /// `arepas_reina_pepiada.spanish.txt` yields topic `arepas reina pepiada`
    /// and language `Spanish`. Anything other than exactly two non-empty
    /// dot-separated segments is rejected.
    pub fn from_data_path(path: &Path) -> Result<Self, AppError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| invalid_name(path))?;
        let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);

        let parts: Vec<&str> = stem.split('.').collect();
        match parts.as_slice() {
            [topic, language] if !topic.is_empty() && !language.is_empty() => Ok(Self {
                topic: topic.replace('_', " "),
                language: capitalize(language),
            }),
            _ => Err(invalid_name(path)),
        }
    }
}

fn invalid_name(path: &Path) -> AppError {
    AppError::Config(format!(
        "Invalid file name format. Expected {{topic}}.{{language}}.txt, got '{}'",
        path.display()
    ))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    data: RawData,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawData {
    #[serde(default = "default_data_file")]
    file_path: String,
}

impl Default for RawData {
    fn default() -> Self {
        Self { file_path: default_data_file() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    ollama: RawOllamaConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), ollama: RawOllamaConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    base_url: String,
    #[serde(default = "default_ollama_model")]
    model: String,
    #[serde(default = "default_ollama_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_true")]
    raw: bool,
}

impl Default for RawOllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            timeout_seconds: default_ollama_timeout_seconds(),
            raw: true,
        }
    }
}

fn default_bind() -> String { "0.0.0.0:8080".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_data_file() -> String { DEFAULT_DATA_FILE.to_string() }
fn default_llm_provider() -> String { "ollama".to_string() }
fn default_ollama_base_url() -> String { "http://localhost:11434/".to_string() }
fn default_ollama_model() -> String { "deepseek-r1:8b".to_string() }
fn default_ollama_timeout_seconds() -> u64 { 120 }

fn default_true() -> bool {
    true
}

/// Load config from `GATEWAY_CONFIG` or `config/default.toml`, then apply
/// env-var overrides. A missing default file falls back to built-in values;
/// a file named explicitly through `GATEWAY_CONFIG` must exist.
pub fn load() -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();
    match env::var("GATEWAY_CONFIG") {
        Ok(path) => load_from(Path::new(&path), &overrides),
        Err(_) => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_from(default_path, &overrides)
            } else {
                Ok(resolve(RawConfig::default(), &overrides))
            }
        }
    }
}

/// Internal loader — accepts an explicit path and overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    Ok(resolve(parsed, overrides))
}

fn resolve(parsed: RawConfig, overrides: &EnvOverrides) -> Config {
    let o = parsed.llm.ollama;
    Config {
        server: ServerConfig {
            bind: overrides.bind.clone().unwrap_or(parsed.server.bind),
            log_level: overrides.log_level.clone().unwrap_or(parsed.server.log_level),
        },
        data_file: PathBuf::from(
            overrides.data_file.clone().unwrap_or(parsed.data.file_path),
        ),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            ollama: OllamaConfig {
                base_url: o.base_url,
                model: o.model,
                timeout_seconds: o.timeout_seconds,
                raw: o.raw,
            },
        },
    }
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `LlmConfig` for unit tests — dummy provider, no external calls.
#[cfg(test)]
impl LlmConfig {
    pub fn test_default() -> Self {
        Self {
            provider: "dummy".into(),
            ollama: OllamaConfig {
                base_url: "http://localhost:0/".into(),
                model: "test-model".into(),
                timeout_seconds: 1,
                raw: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn topic_and_language_from_file_name() {
        let cfg = TopicConfig::from_data_path(Path::new("arepas_reina_pepiada.spanish.txt")).unwrap();
        assert_eq!(cfg.topic, "arepas reina pepiada");
        assert_eq!(cfg.language, "Spanish");
    }

    #[test]
    fn topic_uses_basename_only() {
        let cfg = TopicConfig::from_data_path(Path::new("/srv/data.v2/tango_history.english.txt")).unwrap();
        assert_eq!(cfg.topic, "tango history");
        assert_eq!(cfg.language, "English");
    }

    #[test]
    fn capitalize_only_touches_first_char() {
        let cfg = TopicConfig::from_data_path(Path::new("sushi.portuguese_BR.txt")).unwrap();
        assert_eq!(cfg.language, "Portuguese_BR");
    }

    #[test]
    fn single_segment_rejected() {
        let err = TopicConfig::from_data_path(Path::new("badname.txt")).unwrap_err();
        assert!(err.to_string().contains("Invalid file name format"));
    }

    #[test]
    fn three_segments_rejected() {
        assert!(TopicConfig::from_data_path(Path::new("a.b.c.txt")).is_err());
    }

    #[test]
    fn empty_segment_rejected() {
        assert!(TopicConfig::from_data_path(Path::new("topic..txt")).is_err());
        assert!(TopicConfig::from_data_path(Path::new(".spanish.txt")).is_err());
    }

    #[test]
    fn parse_full_config() {
        let f = write_toml(
            r#"
[server]
bind = "127.0.0.1:9000"
log_level = "debug"

[data]
file_path = "data/tacos.english.txt"

[llm]
default = "dummy"

[llm.ollama]
base_url = "http://ollama:11434/"
model = "llama3:8b"
timeout_seconds = 30
raw = false
"#,
        );
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        assert_eq!(cfg.server.log_level, "debug");
        assert_eq!(cfg.data_file, PathBuf::from("data/tacos.english.txt"));
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.llm.ollama.base_url, "http://ollama:11434/");
        assert_eq!(cfg.llm.ollama.model, "llama3:8b");
        assert_eq!(cfg.llm.ollama.timeout_seconds, 30);
        assert!(!cfg.llm.ollama.raw);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(cfg.llm.provider, "ollama");
        assert_eq!(cfg.llm.ollama.model, "deepseek-r1:8b");
        assert_eq!(cfg.llm.ollama.timeout_seconds, 120);
        assert!(cfg.llm.ollama.raw);
    }

    #[test]
    fn env_overrides_win() {
        let f = write_toml("[server]\nbind = \"127.0.0.1:1\"\n");
        let overrides = EnvOverrides {
            data_file: Some("/tmp/empanadas.spanish.txt".into()),
            bind: Some("127.0.0.1:2".into()),
            log_level: Some("trace".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:2");
        assert_eq!(cfg.server.log_level, "trace");
        assert_eq!(cfg.data_file, PathBuf::from("/tmp/empanadas.spanish.txt"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &EnvOverrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn malformed_toml_errors() {
        let f = write_toml("[server\nbind = ");
        let msg = load_from(f.path(), &EnvOverrides::default()).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }
}
