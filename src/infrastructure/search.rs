//! Web search seam and the SearxNG JSON client.

use crate::domain::SearchHit;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("network error calling search provider: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a web search, returning at most `max_results` hits. No retries;
    /// timeouts are whatever the provider enforces.
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<SearchHit>, SearchError>;
}

/// Search client for a SearxNG instance's JSON API.
#[derive(Clone)]
pub struct SearxClient {
    endpoint: String,
    http: reqwest::Client,
}

impl SearxClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SearchProvider for SearxClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!("{}/search", self.endpoint.trim_end_matches('/'));

        info!(query, max_results, "Dispatching web search");
        let response: SearxResponse = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|source| SearchError::Network { source })?
            .error_for_status()
            .map_err(|source| SearchError::Network { source })?
            .json()
            .await
            .map_err(|source| SearchError::Network { source })?;

        Ok(response
            .results
            .into_iter()
            .take(max_results)
            .map(|result| SearchHit {
                title: result.title,
                url: result.url,
                snippet: result.content.unwrap_or_default(),
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    content: Option<String>,
}
