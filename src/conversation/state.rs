//! Conversation state types

use crate::llm::{LlmMessage, MessageRole};
use serde::Serialize;

/// One message in the conversation, tagged by speaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for LlmMessage {
    fn from(turn: &Turn) -> Self {
        LlmMessage {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Everything a renderer needs to draw the conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    /// Append-only during a session, in conversation order
    pub turns: Vec<Turn>,
    /// True while exactly one submission is outstanding
    pub pending: bool,
    /// Failure of the most recent submission, cleared when the next one starts
    pub last_error: Option<String>,
    /// Input buffer, cleared when a submission is accepted
    pub draft: String,
}

impl ConversationState {
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
