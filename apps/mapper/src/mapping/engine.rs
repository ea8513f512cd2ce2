//! Mapping run orchestration.
//!
//! Flow: load inputs → build corpora → embed (two batch calls) → cosine matrix
//! → top-K per requirement → reasoning annotation → assemble → write.
//!
//! Anything before the write either succeeds completely or aborts the run with
//! no output file. Reasoning failures degrade single matches only.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::embedding::{common_dimension, Embedder, EmbeddingError};
use crate::errors::MappingError;
use crate::mapping::assembler::{assemble, write_mappings};
use crate::mapping::corpus::{Corpus, EmptyCorpus};
use crate::mapping::reasoning::{annotate_matches, AnnotatorOptions, Reasoner};
use crate::mapping::similarity::{rank_matches, similarity_matrix, DEFAULT_TOP_K};
use crate::models::job::JobData;
use crate::models::personal::PersonalData;

/// The four files a mapping run touches.
#[derive(Debug, Clone)]
pub struct MappingPaths {
    pub personal_data: PathBuf,
    pub job_data: PathBuf,
    pub output: PathBuf,
    pub reasoning_prompt: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Matches kept per requirement (capped by the experience corpus size).
    pub top_k: usize,
    pub annotator: AnnotatorOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            annotator: AnnotatorOptions::default(),
        }
    }
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingOutcome {
    Written {
        path: PathBuf,
        requirements: usize,
        matches: usize,
    },
    /// One corpus was empty; nothing was embedded and nothing was written.
    NothingToMap(EmptyCorpus),
}

/// Semantic mapping engine. Owns its embedding and reasoning backends for
/// the lifetime of the engine; no process-wide clients.
pub struct MappingEngine {
    embedder: Arc<dyn Embedder>,
    reasoner: Arc<dyn Reasoner>,
    options: EngineOptions,
}

impl MappingEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        reasoner: Arc<dyn Reasoner>,
        options: EngineOptions,
    ) -> Self {
        Self {
            embedder,
            reasoner,
            options,
        }
    }

    /// Runs one mapping and writes the result to `paths.output`.
    pub async fn generate_mappings(
        &self,
        paths: &MappingPaths,
    ) -> Result<MappingOutcome, MappingError> {
        let run_id = Uuid::new_v4();
        self.run(paths)
            .instrument(info_span!("mapping_run", %run_id))
            .await
    }

    async fn run(&self, paths: &MappingPaths) -> Result<MappingOutcome, MappingError> {
        info!("Loading data for mapping...");
        let personal: PersonalData = load_json(&paths.personal_data).await?;
        let job: JobData = load_json(&paths.job_data).await?;
        let system_prompt = load_prompt(&paths.reasoning_prompt).await?;

        let corpus = match Corpus::build(&personal, &job) {
            Ok(corpus) => corpus,
            Err(empty) => {
                warn!("{empty}");
                return Ok(MappingOutcome::NothingToMap(empty));
            }
        };
        info!(
            "Corpus built: {} experience items, {} requirements",
            corpus.experiences.len(),
            corpus.requirements.len()
        );

        let experience_embeddings = self.embed(&corpus.experience_texts()).await?;
        let requirement_embeddings = self.embed(&corpus.requirements).await?;
        common_dimension(experience_embeddings.iter().chain(&requirement_embeddings))?;

        info!("Computing semantic similarities...");
        let matrix = similarity_matrix(&requirement_embeddings, &experience_embeddings);
        let ranked = rank_matches(&matrix, self.options.top_k);

        let pair_count: usize = ranked.iter().map(Vec::len).sum();
        info!("Generating reasoning for {pair_count} matches...");
        let reasoning = annotate_matches(
            Arc::clone(&self.reasoner),
            system_prompt,
            &corpus.requirements,
            &corpus.experiences,
            &ranked,
            self.options.annotator,
        )
        .await;

        let mappings = assemble(
            &corpus.requirements,
            &corpus.experiences,
            &ranked,
            reasoning,
        );
        if mappings.is_empty() {
            warn!("No matches were produced; writing an empty mappings document");
        }

        write_mappings(&paths.output, &mappings).await?;
        info!(
            "Successfully generated and saved mappings to '{}'.",
            paths.output.display()
        );

        Ok(MappingOutcome::Written {
            path: paths.output.clone(),
            requirements: mappings.len(),
            matches: mappings.match_count(),
        })
    }

    /// One batch call; the service must return a vector per input.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MappingError> {
        let vectors = self.embedder.embed(texts).await?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: vectors.len(),
            }
            .into());
        }
        Ok(vectors)
    }
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, MappingError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MappingError::from_read(path, e))?;
    serde_json::from_str(&raw).map_err(|source| MappingError::InvalidInput {
        path: path.to_path_buf(),
        source,
    })
}

async fn load_prompt(path: &Path) -> Result<Arc<str>, MappingError> {
    let prompt = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MappingError::from_read(path, e))?;
    Ok(Arc::from(prompt))
}
