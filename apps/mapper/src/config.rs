use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::mapping::reasoning::{
    AnnotatorOptions, DEFAULT_MAX_CONCURRENCY, DEFAULT_REASONING_TIMEOUT,
};
use crate::mapping::similarity::DEFAULT_TOP_K;
use crate::mapping::{EngineOptions, MappingPaths};

const DEFAULT_EMBEDDING_API_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub embedding_api_key: String,
    pub embedding_api_url: String,
    pub embedding_model: String,
    pub personal_data_path: PathBuf,
    pub job_data_path: PathBuf,
    pub mappings_path: PathBuf,
    pub reasoning_prompt_path: PathBuf,
    pub top_k: usize,
    pub max_concurrency: usize,
    pub reasoning_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            embedding_api_key: require_env("EMBEDDING_API_KEY")?,
            embedding_api_url: env_or("EMBEDDING_API_URL", DEFAULT_EMBEDDING_API_URL),
            embedding_model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            personal_data_path: env_or("PERSONAL_DATA_PATH", "data/personal_data.json").into(),
            job_data_path: env_or("JOB_DATA_PATH", "data/job_data.json").into(),
            mappings_path: env_or("MAPPINGS_PATH", "data/mappings.json").into(),
            reasoning_prompt_path: env_or("REASONING_PROMPT_PATH", "prompts/reasoning_prompt.txt")
                .into(),
            top_k: parse_env("MAPPER_TOP_K", DEFAULT_TOP_K)?,
            max_concurrency: parse_env("MAPPER_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?,
            reasoning_timeout_secs: parse_env(
                "MAPPER_REASONING_TIMEOUT_SECS",
                DEFAULT_REASONING_TIMEOUT.as_secs(),
            )?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn mapping_paths(&self) -> MappingPaths {
        MappingPaths {
            personal_data: self.personal_data_path.clone(),
            job_data: self.job_data_path.clone(),
            output: self.mappings_path.clone(),
            reasoning_prompt: self.reasoning_prompt_path.clone(),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            top_k: self.top_k,
            annotator: AnnotatorOptions {
                max_concurrency: self.max_concurrency,
                timeout: Duration::from_secs(self.reasoning_timeout_secs),
            },
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
}
