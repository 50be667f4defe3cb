
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Message author, serialized in the chat-completion wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation history
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Conversation history with a bounded number of turns
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    max_turns: usize,
}

impl ChatSession {
    /// Create a session holding at most `max_turns` question/answer pairs
    #[inline]
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns,
        }
    }

    #[inline]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append the rendered prompt for a new question
    #[inline]
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Append a completed answer, then prune history beyond the turn cap
    #[inline]
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
        self.prune();
    }

    /// Drop the most recent message; used to roll back a failed turn
    #[inline]
    pub fn pop_last(&mut self) -> Option<ChatMessage> {
        self.messages.pop()
    }

    fn prune(&mut self) {
        let max_messages = self.max_turns * 2;
        if self.messages.len() > max_messages {
            let excess = self.messages.len() - max_messages;
            self.messages.drain(..excess);
        }
    }
}
