use super::reflection::{self, ReflectionOutcome};
use super::errors::AgentError;
use crate::application::conversation::Conversation;
use crate::application::tooling::{Toolbox, tool_schema};
use crate::infrastructure::model::{GenerationOptions, ModelProvider, ModelRequest};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ITERS: usize = 6;

pub const SYSTEM_PROMPT: &str = "You are an expert assistant. Plan privately, use tools when \
     helpful, and NEVER reveal chain-of-thought. Be concise and correct. When using the \
     retrieve tool, quote short snippets and include [source] after facts.";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub system_prompt: String,
    pub reflection: bool,
    pub max_iters: usize,
    pub options: GenerationOptions,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            reflection: false,
            max_iters: DEFAULT_MAX_ITERS,
            options: GenerationOptions::default(),
        }
    }
}

/// The agent: conversation state plus the bounded model/tool loop.
///
/// One instance owns one conversation for the process lifetime; turns run
/// strictly one at a time.
pub struct Agent<P: ModelProvider> {
    provider: Arc<P>,
    toolbox: Toolbox,
    config: AgentConfig,
    history: Conversation,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: Arc<P>, toolbox: Toolbox, config: AgentConfig) -> Self {
        let history = Conversation::new(config.system_prompt.clone());
        Self {
            provider,
            toolbox,
            config,
            history,
        }
    }

    pub fn history(&self) -> &Conversation {
        &self.history
    }

    /// Run one turn: append the user input, loop through model calls and
    /// tool executions, then optionally reflect on the draft.
    ///
    /// Only a model failure aborts the turn. Tool failures come back as
    /// error payloads in tool messages, and exhausting the iteration budget
    /// returns the last response content as a best-effort answer.
    pub async fn ask(&mut self, input: &str) -> Result<String, AgentError> {
        info!("Agent turn started");
        self.history.push_user(input);

        let schema = tool_schema();
        let mut last_content = String::new();
        let mut answered = false;

        for iteration in 0..self.config.max_iters {
            let request = ModelRequest {
                model: self.config.model.clone(),
                messages: self.history.messages().to_vec(),
                tools: Some(schema.clone()),
                options: self.config.options,
            };
            let response = self.provider.chat(request).await?;

            if response.tool_calls.is_empty() {
                self.history.push_assistant(&response.content);
                answered = true;
                break;
            }

            debug!(
                iteration,
                calls = response.tool_calls.len(),
                "Model requested tool execution"
            );
            last_content = response.content;
            for call in &response.tool_calls {
                let result = self.toolbox.execute(&call.name, &call.arguments).await;
                self.history.push_tool(&call.name, result);
            }
        }

        if !answered {
            // Bounded-resource safety valve: surface whatever content the
            // last response carried, which may be empty.
            warn!(
                max_iters = self.config.max_iters,
                "Iteration budget exhausted before a final answer; returning best effort"
            );
            self.history.push_assistant(&last_content);
        }

        if self.config.reflection {
            if let Some(draft) = self.history.last_assistant().map(str::to_string) {
                let outcome = reflection::review(
                    self.provider.as_ref(),
                    &self.config.model,
                    self.config.options,
                    &draft,
                )
                .await;
                if let ReflectionOutcome::Revise(answer) = outcome {
                    info!("Reflection revised the draft answer");
                    self.history.replace_last_assistant(answer);
                }
            }
        }

        let answer = self.history.last_assistant().unwrap_or("").to_string();
        info!("Agent turn finished");
        Ok(answer)
    }
}
