//! # Tool Registry & Dispatcher
//!
//! Three built-in tools are advertised to the model: `calculator`,
//! `web_search`, and `retrieve`. Dispatch goes through a closed
//! [`ToolRequest`] variant rather than open-ended name lookup, so an unknown
//! name is an explicit error, not a fall-through.
//!
//! The dispatcher boundary is total: [`Toolbox::execute`] always returns a
//! serialized payload. Failures of any kind become `{"error": ..., "trace":
//! [...]}` so the agent loop can continue deterministically.

pub mod calculator;
mod error;

pub use error::ToolError;

use crate::application::retrieval::RetrievalPipeline;
use crate::infrastructure::search::SearchProvider;
use serde_json::{Map, Value, json};
use std::error::Error as _;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_SEARCH_RESULTS: usize = 5;
pub const DEFAULT_RETRIEVE_K: usize = 5;

/// JSON-schema tool descriptors advertised to the LLM backend.
pub fn tool_schema() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": "calculator",
                "description": "Evaluate a safe arithmetic expression (+,-,*,/,**,%,//, parentheses).",
                "parameters": {
                    "type": "object",
                    "properties": {"expression": {"type": "string"}},
                    "required": ["expression"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "web_search",
                "description": "Search the web; returns JSON list of results.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "max_results": {"type": "integer"}
                    },
                    "required": ["query"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "retrieve",
                "description": "Retrieve top matching snippets from local docs. Returns JSON with source, chunk_index, text, score.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "k": {"type": "integer"}
                    },
                    "required": ["query"]
                }
            }
        }),
    ]
}

/// A validated tool invocation. Closed over the three built-in tools.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Calculator { expression: String },
    WebSearch { query: String, max_results: usize },
    Retrieve { query: String, k: usize },
}

impl ToolRequest {
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, ToolError> {
        let arguments = normalize_arguments(arguments);
        match name {
            "calculator" => Ok(ToolRequest::Calculator {
                expression: require_str(&arguments, "calculator", "expression")?,
            }),
            "web_search" => Ok(ToolRequest::WebSearch {
                query: require_str(&arguments, "web_search", "query")?,
                max_results: optional_count(
                    &arguments,
                    "web_search",
                    "max_results",
                    DEFAULT_SEARCH_RESULTS,
                )?,
            }),
            "retrieve" => Ok(ToolRequest::Retrieve {
                query: require_str(&arguments, "retrieve", "query")?,
                k: optional_count(&arguments, "retrieve", "k", DEFAULT_RETRIEVE_K)?,
            }),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

/// Normalize the argument payload into a mapping. Providers deliver either a
/// native object or a JSON-encoded string; anything malformed or absent
/// defaults to an empty mapping rather than failing the call.
fn normalize_arguments(arguments: &Value) -> Map<String, Value> {
    match arguments {
        Value::Object(map) => map.clone(),
        Value::String(raw) if !raw.trim().is_empty() => {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            }
        }
        _ => Map::new(),
    }
}

fn require_str(
    arguments: &Map<String, Value>,
    tool: &'static str,
    argument: &'static str,
) -> Result<String, ToolError> {
    match arguments.get(argument) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(ToolError::InvalidArgument {
            tool,
            argument,
            reason: format!("expected a string, got {other}"),
        }),
        None => Err(ToolError::MissingArgument { tool, argument }),
    }
}

fn optional_count(
    arguments: &Map<String, Value>,
    tool: &'static str,
    argument: &'static str,
    default: usize,
) -> Result<usize, ToolError> {
    match arguments.get(argument) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(number)) => {
            number
                .as_u64()
                .map(|value| value as usize)
                .ok_or_else(|| ToolError::InvalidArgument {
                    tool,
                    argument,
                    reason: format!("expected a non-negative integer, got {number}"),
                })
        }
        Some(Value::String(raw)) => {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| ToolError::InvalidArgument {
                    tool,
                    argument,
                    reason: format!("expected a non-negative integer, got '{raw}'"),
                })
        }
        Some(other) => Err(ToolError::InvalidArgument {
            tool,
            argument,
            reason: format!("expected a non-negative integer, got {other}"),
        }),
    }
}

/// The dispatcher. Holds its collaborators by injection; the composing
/// process owns their lifecycle.
pub struct Toolbox {
    search: Arc<dyn SearchProvider>,
    retrieval: Arc<RetrievalPipeline>,
}

impl Toolbox {
    pub fn new(search: Arc<dyn SearchProvider>, retrieval: Arc<RetrievalPipeline>) -> Self {
        Self { search, retrieval }
    }

    /// Execute a tool call and serialize the outcome. This boundary never
    /// errors: failures degrade to an error payload the model can narrate.
    pub async fn execute(&self, name: &str, arguments: &Value) -> String {
        match self.dispatch(name, arguments).await {
            Ok(result) => {
                info!(tool = name, success = true, "Tool executed");
                result.to_string()
            }
            Err(err) => {
                warn!(tool = name, %err, "Tool execution failed");
                error_payload(&err)
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let request = ToolRequest::parse(name, arguments)?;
        debug!(?request, "Dispatching tool request");
        match request {
            ToolRequest::Calculator { expression } => {
                let result = calculator::evaluate(&expression)?;
                Ok(json!({ "result": result }))
            }
            ToolRequest::WebSearch { query, max_results } => {
                let hits = self.search.search(&query, max_results).await?;
                Ok(serde_json::to_value(hits).unwrap_or(Value::Null))
            }
            ToolRequest::Retrieve { query, k } => {
                let results = self.retrieval.retrieve(&query, k).await?;
                Ok(serde_json::to_value(results).unwrap_or(Value::Null))
            }
        }
    }
}

/// Serialize a tool failure with its source chain as the diagnostic trace.
fn error_payload(err: &ToolError) -> String {
    let mut trace = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push(cause.to_string());
        source = cause.source();
    }
    json!({ "error": err.to_string(), "trace": trace }).to_string()
}
