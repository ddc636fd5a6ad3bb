use super::{IndexEntry, IndexError, IndexMatch, VectorIndex};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Durable vector index: one JSON record per line, loaded fully into memory
/// at open, appended on add, brute-force cosine scan on query.
///
/// The in-memory entries are guarded by a mutex so an ingest running in the
/// same process interleaves safely with queries from a live agent turn.
pub struct JsonlIndex {
    path: PathBuf,
    entries: Mutex<Vec<IndexEntry>>,
}

impl JsonlIndex {
    /// Open or create the index file. Failure here is fatal to the retrieval
    /// pipeline; no operation can proceed without the index.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| IndexError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut entries = Vec::new();
        if path.exists() {
            let file = fs::File::open(path).map_err(|source| IndexError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            for (number, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|source| IndexError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<IndexEntry>(&line) {
                    Ok(entry) => entries.push(entry),
                    Err(err) => {
                        warn!(line = number + 1, %err, "Skipping unreadable index record");
                    }
                }
            }
        } else {
            fs::File::create(path).map_err(|source| IndexError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        }

        info!(path = %path.display(), entries = entries.len(), "Vector index opened");
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("index lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorIndex for JsonlIndex {
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for entry in &entries {
            let line =
                serde_json::to_string(entry).map_err(|source| IndexError::Serialize {
                    id: entry.id.clone(),
                    source,
                })?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| IndexError::Append {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(buffer.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| IndexError::Append {
                path: self.path.clone(),
                source,
            })?;

        debug!(added = entries.len(), "Index entries appended");
        self.entries.lock().expect("index lock").extend(entries);
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<IndexMatch>, IndexError> {
        let entries = self.entries.lock().expect("index lock");

        let mut matches: Vec<IndexMatch> = entries
            .iter()
            .map(|entry| IndexMatch {
                id: entry.id.clone(),
                source: entry.source.clone(),
                chunk_index: entry.chunk_index,
                text: entry.text.clone(),
                distance: cosine_distance(embedding, &entry.embedding),
            })
            .collect();

        // Stable sort keeps insertion order for equal distances.
        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }
}

/// Cosine distance assuming both vectors are unit-normalized. Mismatched or
/// empty vectors count as fully dissimilar.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    1.0 - dot
}
