use crate::infrastructure::model::ModelError;
use thiserror::Error;

/// Failures that abort an agent turn. Tool and reflection failures never
/// surface here; both are recovered locally and degrade to best-effort
/// output.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
        }
    }
}
