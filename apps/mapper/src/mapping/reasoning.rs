//! Reasoning Annotator: attaches a short causal justification to every
//! selected (requirement, experience) pair.
//!
//! Failures are isolated per match: a failed or timed-out call turns into an
//! `"Error generating reasoning: ..."` string in that match only.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::llm_client::{CallOptions, LlmClient, LlmError};
use crate::mapping::corpus::ExperienceItem;
use crate::mapping::prompts::{
    build_reasoning_prompt, REASONING_ERROR_PREFIX, REASONING_MAX_TOKENS, REASONING_TEMPERATURE,
};
use crate::mapping::similarity::ScoredIndex;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_REASONING_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("annotation task failed: {0}")]
    Task(String),
}

/// Generative backend for match justifications.
///
/// `system_prompt` is the contents of the reasoning prompt file, loaded once
/// per run by the engine.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn explain(
        &self,
        system_prompt: &str,
        requirement: &str,
        experience: &ExperienceItem,
    ) -> Result<String, ReasoningError>;
}

/// Production reasoner: one Claude call per pair.
pub struct LlmReasoner(pub LlmClient);

#[async_trait]
impl Reasoner for LlmReasoner {
    async fn explain(
        &self,
        system_prompt: &str,
        requirement: &str,
        experience: &ExperienceItem,
    ) -> Result<String, ReasoningError> {
        let prompt = build_reasoning_prompt(requirement, &experience.text);
        let options = CallOptions {
            max_tokens: REASONING_MAX_TOKENS,
            temperature: Some(REASONING_TEMPERATURE),
        };
        Ok(self.0.call_text(&prompt, system_prompt, options).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnnotatorOptions {
    pub max_concurrency: usize,
    pub timeout: Duration,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: DEFAULT_REASONING_TIMEOUT,
        }
    }
}

/// The visible text stored in a match whose annotation failed.
pub fn reasoning_error_text(err: &ReasoningError) -> String {
    format!("{REASONING_ERROR_PREFIX}: {err}")
}

/// Annotates every ranked match.
///
/// Returns one reasoning string per entry of `ranked`, shaped exactly like it:
/// `result[r][k]` explains `ranked[r][k]`. Calls run as independent tasks, at
/// most `max_concurrency` at a time, and each is bounded by `timeout`. Results
/// are written back by slot, so completion order never affects rank order.
pub async fn annotate_matches(
    reasoner: Arc<dyn Reasoner>,
    system_prompt: Arc<str>,
    requirements: &[String],
    experiences: &[ExperienceItem],
    ranked: &[Vec<ScoredIndex>],
    options: AnnotatorOptions,
) -> Vec<Vec<String>> {
    let mut slots: Vec<Vec<Option<String>>> =
        ranked.iter().map(|row| vec![None; row.len()]).collect();

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (r, row) in ranked.iter().enumerate() {
        for (k, pick) in row.iter().enumerate() {
            let reasoner = Arc::clone(&reasoner);
            let system_prompt = Arc::clone(&system_prompt);
            let semaphore = Arc::clone(&semaphore);
            let requirement = requirements[r].clone();
            let experience = experiences[pick.index].clone();
            let timeout = options.timeout;

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => tokio::time::timeout(
                        timeout,
                        reasoner.explain(&system_prompt, &requirement, &experience),
                    )
                    .await
                    .unwrap_or(Err(ReasoningError::Timeout(timeout))),
                    Err(e) => Err(ReasoningError::Task(e.to_string())),
                };
                (r, k, result)
            });
        }
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((r, k, Ok(reasoning))) => {
                debug!("Annotated requirement #{r} match #{k}");
                slots[r][k] = Some(reasoning);
            }
            Ok((r, k, Err(e))) => {
                warn!(
                    "Reasoning failed for {:?} match #{}: {}",
                    requirements[r], k, e
                );
                slots[r][k] = Some(reasoning_error_text(&e));
            }
            Err(e) => warn!("Annotation task panicked or was cancelled: {e}"),
        }
    }

    // A slot is only empty if its task died before reporting back.
    slots
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|slot| {
                    slot.unwrap_or_else(|| {
                        reasoning_error_text(&ReasoningError::Task(
                            "task ended without a result".to_string(),
                        ))
                    })
                })
                .collect()
        })
        .collect()
}
