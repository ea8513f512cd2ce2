//! Embedding: turns text corpora into comparable vectors.
//!
//! `MappingEngine` holds an `Arc<dyn Embedder>`. The production backend is
//! `HttpEmbedder` (OpenAI-compatible `/v1/embeddings`); tests plug in a
//! deterministic stub.

use async_trait::async_trait;
use thiserror::Error;

pub mod http;

pub use http::HttpEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding API returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },

    #[error("Embedding dimensions disagree: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Embedding API returned an empty vector")]
    EmptyVector,

    #[error("Embedding API returned a non-finite value")]
    NonFinite,
}

/// Batch embedding backend. One call per corpus; the returned vectors are
/// parallel to `texts`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Checks that every vector has the same non-zero length and holds only finite
/// values, and returns that length.
pub fn common_dimension<'a, I>(vectors: I) -> Result<Option<usize>, EmbeddingError>
where
    I: IntoIterator<Item = &'a Vec<f32>>,
{
    let mut dimension: Option<usize> = None;
    for vector in vectors {
        if vector.is_empty() {
            return Err(EmbeddingError::EmptyVector);
        }
        if !vector.iter().all(|v| v.is_finite()) {
            return Err(EmbeddingError::NonFinite);
        }
        match dimension {
            None => dimension = Some(vector.len()),
            Some(expected) if expected != vector.len() => {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(dimension)
}
