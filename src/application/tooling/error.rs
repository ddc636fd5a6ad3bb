use super::calculator::EvalError;
use crate::application::retrieval::RetrievalError;
use crate::infrastructure::search::SearchError;
use thiserror::Error;

/// Failures inside the tool layer. None of these cross the dispatcher
/// boundary as errors; `Toolbox::execute` serializes them into an
/// error-shaped payload instead.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("missing required argument '{argument}' for tool '{tool}'")]
    MissingArgument {
        tool: &'static str,
        argument: &'static str,
    },
    #[error("invalid argument '{argument}' for tool '{tool}': {reason}")]
    InvalidArgument {
        tool: &'static str,
        argument: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("web search failed")]
    Search(#[from] SearchError),
    #[error("retrieval failed")]
    Retrieval(#[from] RetrievalError),
}
