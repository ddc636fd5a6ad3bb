//! Stateless self-critique of a draft answer.
//!
//! A fresh two-message exchange, independent of the main conversation and
//! with no tools. Interpretation of the reply is total: the model's output
//! is untrusted input, so parsing never fails the turn.

use crate::infrastructure::model::{GenerationOptions, ModelProvider, ModelRequest};
use crate::domain::{ChatMessage, MessageRole};
use serde_json::Value;
use tracing::{debug, warn};

const REVIEWER_SYSTEM_PROMPT: &str = "You are a meticulous editor.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectionOutcome {
    Keep,
    Revise(String),
}

impl ReflectionOutcome {
    /// Interpret a critique reply. Strict JSON first; if the reply is not
    /// valid JSON, fall back to a heuristic: an "OK"-prefixed reply keeps the
    /// draft, anything else becomes the revised answer verbatim.
    pub fn from_reply(reply: &str) -> Self {
        let reply = reply.trim();

        if let Ok(value) = serde_json::from_str::<Value>(reply) {
            if let Value::Object(map) = value {
                if map.get("verdict").and_then(Value::as_str) == Some("revise") {
                    if let Some(answer) = map.get("answer").and_then(Value::as_str) {
                        if !answer.is_empty() {
                            return ReflectionOutcome::Revise(answer.to_string());
                        }
                    }
                }
            }
            // Any other well-formed JSON (including {"verdict":"ok"}) keeps
            // the draft.
            return ReflectionOutcome::Keep;
        }

        if reply.to_uppercase().starts_with("OK") {
            ReflectionOutcome::Keep
        } else {
            ReflectionOutcome::Revise(reply.to_string())
        }
    }
}

/// Run the reflection pass. Provider failures keep the draft; nothing from
/// this layer is allowed to abort the turn.
pub(super) async fn review<P: ModelProvider>(
    provider: &P,
    model: &str,
    options: GenerationOptions,
    draft: &str,
) -> ReflectionOutcome {
    let prompt = format!(
        "Review the DRAFT for clarity/correctness.\n\
         Return JSON only:\n\
         {{\"verdict\":\"ok\"}}  OR  {{\"verdict\":\"revise\",\"answer\":\"<improved final answer>\"}}\n\
         DRAFT:\n{draft}"
    );

    let request = ModelRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::new(MessageRole::System, REVIEWER_SYSTEM_PROMPT),
            ChatMessage::new(MessageRole::User, prompt),
        ],
        tools: None,
        options,
    };

    match provider.chat(request).await {
        Ok(response) => {
            let outcome = ReflectionOutcome::from_reply(&response.content);
            debug!(revised = matches!(outcome, ReflectionOutcome::Revise(_)), "Reflection pass finished");
            outcome
        }
        Err(err) => {
            warn!(%err, "Reflection call failed; keeping draft");
            ReflectionOutcome::Keep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_verdict_keeps_the_draft() {
        assert_eq!(
            ReflectionOutcome::from_reply(r#"{"verdict":"ok"}"#),
            ReflectionOutcome::Keep
        );
    }

    #[test]
    fn revise_verdict_replaces_the_draft() {
        assert_eq!(
            ReflectionOutcome::from_reply(r#"{"verdict":"revise","answer":"X"}"#),
            ReflectionOutcome::Revise("X".into())
        );
    }

    #[test]
    fn revise_without_answer_keeps_the_draft() {
        assert_eq!(
            ReflectionOutcome::from_reply(r#"{"verdict":"revise"}"#),
            ReflectionOutcome::Keep
        );
        assert_eq!(
            ReflectionOutcome::from_reply(r#"{"verdict":"revise","answer":""}"#),
            ReflectionOutcome::Keep
        );
    }

    #[test]
    fn unexpected_json_shapes_keep_the_draft() {
        assert_eq!(ReflectionOutcome::from_reply("[1, 2]"), ReflectionOutcome::Keep);
        assert_eq!(
            ReflectionOutcome::from_reply(r#"{"something":"else"}"#),
            ReflectionOutcome::Keep
        );
    }

    #[test]
    fn non_json_ok_prefix_keeps_the_draft() {
        assert_eq!(
            ReflectionOutcome::from_reply("OK, this looks good to me."),
            ReflectionOutcome::Keep
        );
        assert_eq!(
            ReflectionOutcome::from_reply("okay, ship it"),
            ReflectionOutcome::Keep
        );
    }

    #[test]
    fn other_non_json_replies_become_the_revision_verbatim() {
        assert_eq!(
            ReflectionOutcome::from_reply("  Here is a better answer.  "),
            ReflectionOutcome::Revise("Here is a better answer.".into())
        );
    }
}
