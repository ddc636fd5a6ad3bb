//! LLM backend clients and the provider seam the agent talks through.

mod ollama;
mod traits;
mod types;

pub use ollama::OllamaClient;
pub use traits::ModelProvider;
pub use types::{GenerationOptions, ModelError, ModelRequest, ModelResponse};
