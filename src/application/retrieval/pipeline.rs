use super::chunker::{self, DEFAULT_CHUNK_WORDS};
use super::loader;
use super::RetrievalError;
use crate::domain::RetrievalResult;
use crate::infrastructure::embedding::Embedder;
use crate::infrastructure::index::{IndexEntry, VectorIndex};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use walkdir::WalkDir;

/// Outcome of one ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub files: usize,
    pub chunks: usize,
}

/// Document ingestion and similarity retrieval over the vector index.
///
/// Collaborators arrive by injection; the composing process opens the index
/// once and shares it. Re-ingesting a folder appends duplicate chunks; there
/// is no upsert by source and index.
pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunk_words: usize,
}

impl RetrievalPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            chunk_words: DEFAULT_CHUNK_WORDS,
        }
    }

    pub fn with_chunk_budget(mut self, chunk_words: usize) -> Self {
        self.chunk_words = chunk_words;
        self
    }

    /// Ingest every recognized document under `folder`. The folder is created
    /// if missing. Files that yield no chunks still count as processed.
    pub async fn ingest(&self, folder: &Path) -> Result<IngestReport, RetrievalError> {
        fs::create_dir_all(folder).map_err(|source| RetrievalError::Folder {
            path: folder.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = entry.map_err(|source| RetrievalError::Scan { source })?;
            if entry.file_type().is_file() && loader::is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }

        info!(folder = %folder.display(), files = files.len(), "Starting document ingest");

        let mut chunks_added = 0;
        for path in &files {
            let text = loader::load_text(path);
            let chunks = chunker::chunk(&text, self.chunk_words);
            if chunks.is_empty() {
                debug!(path = %path.display(), "Document yielded no chunks");
                continue;
            }

            let embeddings = self.embedder.embed(&chunks).await?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let source = path.to_string_lossy().into_owned();

            let entries: Vec<IndexEntry> = chunks
                .into_iter()
                .zip(embeddings)
                .enumerate()
                .map(|(chunk_index, (text, embedding))| IndexEntry {
                    id: chunk_id(&file_name, chunk_index),
                    source: source.clone(),
                    chunk_index,
                    text,
                    embedding,
                })
                .collect();

            debug!(path = %path.display(), chunks = entries.len(), "Indexing document chunks");
            chunks_added += entries.len();
            self.index.add(entries).await?;
        }

        info!(files = files.len(), chunks = chunks_added, "Ingest finished");
        Ok(IngestReport {
            files: files.len(),
            chunks: chunks_added,
        })
    }

    /// Retrieve the top `k` chunks for a query, highest similarity first.
    /// `score = 1 - distance`, assuming the index's bounded cosine metric.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        let embeddings = self.embedder.embed(&[query.to_string()]).await?;
        let Some(query_embedding) = embeddings.into_iter().next() else {
            return Ok(Vec::new());
        };

        let matches = self.index.query(&query_embedding, k).await?;
        Ok(matches
            .into_iter()
            .map(|hit| RetrievalResult {
                source: hit.source,
                chunk_index: hit.chunk_index,
                text: hit.text,
                score: 1.0 - hit.distance,
            })
            .collect())
    }
}

fn chunk_id(file_name: &str, chunk_index: usize) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{file_name}-{chunk_index}-{}", &uuid[..8])
}
