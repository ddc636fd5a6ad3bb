//! Vector index seam and the durable on-disk implementation.

mod store;

pub use store::JsonlIndex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector index at {path:?} could not be opened: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to append to vector index at {path:?}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize index entry '{id}': {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One stored chunk: text, provenance metadata, and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub source: String,
    pub chunk_index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A query hit. `distance` is cosine distance in `[0, 2]`; lower is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub id: String,
    pub source: String,
    pub chunk_index: usize,
    pub text: String,
    pub distance: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Append entries to the index. There is no dedup or upsert; callers own
    /// id uniqueness.
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError>;

    /// Nearest-neighbor search, at most `k` matches in ascending distance
    /// order. An empty index yields an empty result.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<IndexMatch>, IndexError>;
}
