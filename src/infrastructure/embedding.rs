//! Embedding model seam and the Ollama `/api/embed` client.
//!
//! Queries and documents must share one embedding space, so the same
//! [`Embedder`] instance serves both ingestion and retrieval. Vectors are
//! length-normalized client-side, which lets the index reduce cosine
//! distance to `1 - dot`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("network error calling embedding model '{model}': {source}")]
    Network {
        model: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("embedding model '{model}' returned invalid response: {reason}")]
    InvalidResponse { model: String, reason: String },
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one normalized vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Embedding client backed by Ollama's batched `/api/embed` endpoint.
#[derive(Clone)]
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    fn network(&self, source: reqwest::Error) -> EmbedError {
        EmbedError::Network {
            model: self.model.clone(),
            source,
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.endpoint.trim_end_matches('/'));
        let payload = EmbedRequest {
            model: &self.model,
            input: texts,
            truncate: true,
        };

        info!(
            model = self.model.as_str(),
            inputs = texts.len(),
            "Requesting embeddings from Ollama"
        );

        let response: EmbedResponse = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.network(e))?
            .error_for_status()
            .map_err(|e| self.network(e))?
            .json()
            .await
            .map_err(|e| self.network(e))?;

        if response.embeddings.len() != texts.len() {
            return Err(EmbedError::InvalidResponse {
                model: self.model.clone(),
                reason: format!(
                    "{} embeddings returned for {} inputs",
                    response.embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(response
            .embeddings
            .into_iter()
            .map(normalize)
            .collect())
    }
}

/// Scale a vector to unit length. Zero vectors are returned unchanged.
pub fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}
