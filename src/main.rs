//! Topic gateway — HTTP entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at the configured level
//!   4. Derive topic + language from the data file name (fatal if malformed)
//!   5. Build the inference provider and probe it
//!   6. Serve until Ctrl-C

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use topic_gateway::config::{self, TopicConfig};
use topic_gateway::error::AppError;
use topic_gateway::gateway::{self, GatewayState};
use topic_gateway::llm::providers;
use topic_gateway::logger::{self, SERVER_CLIENT};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.server.log_level)?;

    let topic = TopicConfig::from_data_path(&config.data_file)?;

    info!(
        client = %SERVER_CLIENT,
        topic = %topic.topic,
        language = %topic.language,
        data_file = %config.data_file.display(),
        "config loaded"
    );

    let llm = providers::build(&config.llm)
        .map_err(|e| AppError::Config(e.to_string()))?;

    if let Err(e) = llm.ping().await {
        warn!(client = %SERVER_CLIENT, provider = llm.name(), "inference backend not reachable yet: {e}");
    }

    let state = GatewayState::new(topic, config.data_file.clone(), llm);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!(client = %SERVER_CLIENT, "shutdown requested");
                signal_token.cancel();
            }
            Err(e) => warn!(client = %SERVER_CLIENT, "cannot listen for Ctrl-C: {e}"),
        }
    });

    gateway::serve(&config.server.bind, state, shutdown).await
}
