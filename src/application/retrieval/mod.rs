//! # Retrieval Pipeline
//!
//! Chunks local documents, embeds the chunks, and stores them in the vector
//! index; answers similarity queries for the `retrieve` tool.

mod chunker;
mod loader;
mod pipeline;

pub use chunker::{DEFAULT_CHUNK_WORDS, chunk};
pub use pipeline::{IngestReport, RetrievalPipeline};

use crate::infrastructure::embedding::EmbedError;
use crate::infrastructure::index::IndexError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to prepare documents folder {path:?}: {source}")]
    Folder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to scan documents folder: {source}")]
    Scan {
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Embed(#[from] EmbedError),
    #[error(transparent)]
    Index(#[from] IndexError),
}
