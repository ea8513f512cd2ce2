mod config;
mod embedding;
mod errors;
mod llm_client;
mod mapping;
mod models;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::HttpEmbedder;
use crate::llm_client::LlmClient;
use crate::mapping::reasoning::LlmReasoner;
use crate::mapping::{MappingEngine, MappingOutcome};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mapper v{}", env!("CARGO_PKG_VERSION"));

    // Reasoning backend
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Embedding backend
    let embedder = HttpEmbedder::new(
        config.embedding_api_url.clone(),
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
    )?;
    info!("Embedding client initialized (model: {})", embedder.model());

    let engine = MappingEngine::new(
        Arc::new(embedder),
        Arc::new(LlmReasoner(llm)),
        config.engine_options(),
    );

    match engine.generate_mappings(&config.mapping_paths()).await {
        Ok(MappingOutcome::Written {
            path,
            requirements,
            matches,
        }) => {
            info!(
                "Mapped {} requirements to {} matches in '{}'",
                requirements,
                matches,
                path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(MappingOutcome::NothingToMap(reason)) => {
            warn!("Nothing to map: {reason}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Mapping failed: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
