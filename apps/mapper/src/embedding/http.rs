use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Embedder, EmbeddingError};
use crate::llm_client::backoff_delay;

const MAX_RETRIES: u32 = 3;
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible embeddings endpoint.
/// The whole corpus goes out in a single request.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(api_url: String, api_key: String, model: String) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            api_url,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: EmbeddingResponse = response.json().await?;
            let vectors = order_by_index(parsed.data, texts.len())?;

            debug!(
                "Embedded {} texts with model {} (dim={})",
                vectors.len(),
                self.model,
                vectors.first().map(Vec::len).unwrap_or(0)
            );

            return Ok(vectors);
        }

        Err(last_error.unwrap_or(EmbeddingError::Api {
            status: 429,
            message: format!("rate limited after {MAX_RETRIES} retries"),
        }))
    }
}

/// The API may return rows out of order; restore input order by `index` and
/// reject responses that do not cover every input exactly once.
fn order_by_index(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mismatch = EmbeddingError::CountMismatch {
        expected,
        got: data.len(),
    };
    if data.len() != expected {
        return Err(mismatch);
    }
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(mismatch);
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}
