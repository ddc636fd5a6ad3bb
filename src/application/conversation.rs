//! Append-only conversation history forming the model's working memory.
//!
//! The first message is always the single immutable system prompt. Entries
//! are never mutated after append, with one exception: the reflection pass
//! may replace the content of the final assistant message, at most once per
//! turn, via [`Conversation::replace_last_assistant`].

use crate::domain::{ChatMessage, MessageRole};

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::new(MessageRole::System, system_prompt)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(MessageRole::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages
            .push(ChatMessage::new(MessageRole::Assistant, content));
    }

    pub fn push_tool(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.messages.push(ChatMessage::tool(name, content));
    }

    /// Content of the final message when it is assistant-role.
    pub fn last_assistant(&self) -> Option<&str> {
        self.messages.last().and_then(|message| {
            (message.role == MessageRole::Assistant).then_some(message.content.as_str())
        })
    }

    /// Replace the content of the final assistant message. Returns false and
    /// leaves the history untouched when the final message is not
    /// assistant-role.
    pub fn replace_last_assistant(&mut self, content: impl Into<String>) -> bool {
        match self.messages.last_mut() {
            Some(message) if message.role == MessageRole::Assistant => {
                message.content = content.into();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_the_system_prompt() {
        let conversation = Conversation::new("be helpful");
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].role, MessageRole::System);
        assert_eq!(conversation.messages()[0].content, "be helpful");
    }

    #[test]
    fn appends_in_order_and_tags_tool_messages() {
        let mut conversation = Conversation::new("sys");
        conversation.push_user("hi");
        conversation.push_tool("calculator", r#"{"result":4.0}"#);
        conversation.push_assistant("four");

        let messages = conversation.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].name.as_deref(), Some("calculator"));
        assert_eq!(conversation.last_assistant(), Some("four"));
    }

    #[test]
    fn replace_last_assistant_only_touches_assistant_tail() {
        let mut conversation = Conversation::new("sys");
        conversation.push_user("hi");
        assert!(!conversation.replace_last_assistant("nope"));

        conversation.push_assistant("draft");
        assert!(conversation.replace_last_assistant("revised"));
        assert_eq!(conversation.last_assistant(), Some("revised"));
    }
}
