// Semantic mapping engine: matches applicant experience against job requirements.
// Corpus builder → embedding + cosine top-K → per-match reasoning → assembled mappings.
// All Claude calls go through llm_client; all embedding calls through embedding.

pub mod assembler;
pub mod corpus;
pub mod engine;
pub mod prompts;
pub mod reasoning;
pub mod similarity;

#[cfg(test)]
mod testing;

pub use engine::{EngineOptions, MappingEngine, MappingOutcome, MappingPaths};
