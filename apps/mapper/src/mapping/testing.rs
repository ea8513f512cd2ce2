//! Deterministic stand-ins for the embedding and reasoning services.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::embedding::{Embedder, EmbeddingError};
use crate::llm_client::LlmError;
use crate::mapping::corpus::ExperienceItem;
use crate::mapping::reasoning::{Reasoner, ReasoningError};

const BAG_OF_WORDS_DIM: usize = 256;

/// Bag-of-words embedder: each lowercase word bumps one bucket chosen by
/// FNV-1a. Texts sharing words get higher cosine similarity.
#[derive(Default)]
pub struct BagOfWordsEmbedder {
    pub calls: AtomicUsize,
}

pub fn bag_of_words(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; BAG_OF_WORDS_DIM];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let hash = word
            .to_lowercase()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
                (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3)
            });
        vector[(hash % BAG_OF_WORDS_DIM as u64) as usize] += 1.0;
    }
    vector
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| bag_of_words(t)).collect())
    }
}

/// Embedder whose service is always down.
pub struct UnavailableEmbedder;

#[async_trait]
impl Embedder for UnavailableEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

/// Embedder that returns one vector too few.
pub struct ShortEmbedder;

#[async_trait]
impl Embedder for ShortEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().skip(1).map(|t| bag_of_words(t)).collect())
    }
}

/// Embedder whose vectors for any text containing "overflow" hold an infinity,
/// the way an out-of-range JSON number decodes.
pub struct NonFiniteEmbedder;

#[async_trait]
impl Embedder for NonFiniteEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut vector = bag_of_words(t);
                if t.contains("overflow") {
                    vector[0] = f32::INFINITY;
                }
                vector
            })
            .collect())
    }
}

/// Reasoner that echoes `"<requirement> <- <experience text>"`.
pub struct StubReasoner;

#[async_trait]
impl Reasoner for StubReasoner {
    async fn explain(
        &self,
        _system_prompt: &str,
        requirement: &str,
        experience: &ExperienceItem,
    ) -> Result<String, ReasoningError> {
        Ok(format!("{requirement} <- {}", experience.text))
    }
}

/// Like `StubReasoner`, but fails for one (requirement, experience text) pair.
pub struct FailingReasoner {
    pub requirement: String,
    pub experience_text: String,
}

#[async_trait]
impl Reasoner for FailingReasoner {
    async fn explain(
        &self,
        system_prompt: &str,
        requirement: &str,
        experience: &ExperienceItem,
    ) -> Result<String, ReasoningError> {
        if requirement == self.requirement && experience.text == self.experience_text {
            return Err(ReasoningError::Llm(LlmError::Api {
                status: 500,
                message: "overloaded".to_string(),
            }));
        }
        StubReasoner
            .explain(system_prompt, requirement, experience)
            .await
    }
}

/// Reasoner that never answers within any sensible timeout.
pub struct SlowReasoner(pub Duration);

#[async_trait]
impl Reasoner for SlowReasoner {
    async fn explain(
        &self,
        _system_prompt: &str,
        _requirement: &str,
        _experience: &ExperienceItem,
    ) -> Result<String, ReasoningError> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_string())
    }
}

/// Echoing reasoner that sleeps a per-experience delay and records how many
/// calls were in flight at once and the order in which they finished.
#[derive(Default)]
pub struct StaggeredReasoner {
    pub delays: HashMap<String, Duration>,
    pub default_delay: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub finished: Mutex<Vec<String>>,
}

impl StaggeredReasoner {
    pub fn new(delays: &[(&str, Duration)], default_delay: Duration) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(text, delay)| (text.to_string(), *delay))
                .collect(),
            default_delay,
            ..Self::default()
        }
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reasoner for StaggeredReasoner {
    async fn explain(
        &self,
        _system_prompt: &str,
        requirement: &str,
        experience: &ExperienceItem,
    ) -> Result<String, ReasoningError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(&experience.text)
            .copied()
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let text = format!("{requirement} <- {}", experience.text);
        self.finished.lock().unwrap().push(text.clone());
        Ok(text)
    }
}
