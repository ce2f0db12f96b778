//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after config is resolved. Output goes to
//! stdout so the per-request access lines sit alongside the server banner.

use std::env;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Client identifier used for lines that do not originate from a request.
pub const SERVER_CLIENT: &str = "SERVER";

/// Initialise the global tracing subscriber.
///
/// `level` is the configured filter (`[server] log_level` or
/// `GATEWAY_LOG_LEVEL`). A set `RUST_LOG` replaces it for ad-hoc debugging.
pub fn init(level: &str) -> Result<(), AppError> {
    let rust_log = env::var("RUST_LOG").ok();
    let filter = resolve_filter(level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Pick the filter directive: a non-blank `rust_log` wins over the
/// configured `level`. Either way the winner must parse.
pub fn resolve_filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| AppError::Logger(format!("invalid RUST_LOG '{directive}': {e}"))),
        None => parse_filter(level),
    }
}

/// Validate a configured filter. Accepts bare levels (`debug`) as well as
/// per-target directives (`topic_gateway=debug,tower=warn`).
pub fn parse_filter(level: &str) -> Result<EnvFilter, AppError> {
    if level.trim().is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    EnvFilter::try_new(level)
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}
