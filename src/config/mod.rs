//! Application configuration loaded from `config/sibyl.toml`.
//!
//! A missing file at the default path falls back to built-in defaults; an
//! explicitly passed path must exist.

use crate::application::agent::{DEFAULT_MAX_ITERS, SYSTEM_PROMPT};
use crate::application::retrieval::DEFAULT_CHUNK_WORDS;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/sibyl.toml";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://127.0.0.1:11434";
pub const DEFAULT_CHAT_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "http://127.0.0.1:8888";
pub const DEFAULT_INDEX_PATH: &str = "vectorstore/index.jsonl";
pub const DEFAULT_DOCS_DIR: &str = "docs";

static ENV_LOADER: Once = Once::new();

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = dotenvy::from_filename("config/.env");
    });
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ollama_url: String,
    pub chat_model: String,
    pub embed_model: String,
    pub search_url: String,
    pub index_path: PathBuf,
    pub docs_dir: PathBuf,
    pub system_prompt: String,
    pub reflection: bool,
    pub max_iters: usize,
    pub chunk_words: usize,
    pub num_ctx: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    ollama_url: Option<String>,
    chat_model: Option<String>,
    embed_model: Option<String>,
    search_url: Option<String>,
    index_path: Option<String>,
    docs_dir: Option<String>,
    system_prompt: Option<String>,
    reflection: Option<bool>,
    max_iters: Option<usize>,
    chunk_words: Option<usize>,
    num_ctx: Option<u32>,
    temperature: Option<f32>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        ensure_env_loaded();
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(RawConfig::default().into())
            }
            Err(other) => Err(other),
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            ollama_url: raw
                .ollama_url
                .unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string()),
            chat_model: raw
                .chat_model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embed_model: raw
                .embed_model
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
            search_url: raw
                .search_url
                .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            index_path: expand_path(raw.index_path.as_deref().unwrap_or(DEFAULT_INDEX_PATH)),
            docs_dir: expand_path(raw.docs_dir.as_deref().unwrap_or(DEFAULT_DOCS_DIR)),
            system_prompt: raw
                .system_prompt
                .unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
            reflection: raw.reflection.unwrap_or(false),
            max_iters: raw.max_iters.unwrap_or(DEFAULT_MAX_ITERS),
            chunk_words: raw.chunk_words.unwrap_or(DEFAULT_CHUNK_WORDS),
            num_ctx: raw.num_ctx.unwrap_or(8192),
            temperature: raw.temperature.unwrap_or(0.2),
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parsed.into())
}
