//! # Agent Module
//!
//! The agent drives a bounded loop against the model provider: send the
//! conversation plus the advertised tool schema, execute any requested tool
//! calls through the dispatcher, fold the results back in, and repeat until
//! the model answers without tools or the iteration budget runs out. An
//! optional reflection pass critiques the draft answer before it is returned.

mod errors;
mod reflection;
mod runner;

#[cfg(test)]
mod tests;

pub use errors::AgentError;
pub use reflection::ReflectionOutcome;
pub use runner::{Agent, AgentConfig, DEFAULT_MAX_ITERS, SYSTEM_PROMPT};
