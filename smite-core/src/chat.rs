//! Chat messages and the message sink capability.

use crate::dice::RollResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A chat message describing one token's damage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who the message is attributed to (the damaged token's name).
    pub speaker: String,
    /// The descriptive line, e.g. `Goblin takes 5 fire damage!`.
    pub flavor: String,
    /// The shared damage roll, for the dice breakdown in the transcript.
    pub roll: RollResult,
}

impl ChatMessage {
    pub fn new(speaker: impl Into<String>, flavor: impl Into<String>, roll: RollResult) -> Self {
        Self {
            speaker: speaker.into(),
            flavor: flavor.into(),
            roll,
        }
    }

    /// One-line transcript form: flavor plus the roll breakdown.
    pub fn transcript_line(&self) -> String {
        format!("{} ({})", self.flavor, self.roll)
    }
}

/// Error from a message sink.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat delivery failed: {0}")]
    Delivery(String),
}

/// Capability for posting chat messages. Posts are awaited one at a time;
/// the workflow never fans out across tokens.
#[async_trait]
pub trait MessageSink: Send {
    async fn post(&mut self, message: ChatMessage) -> Result<(), ChatError>;
}

/// In-memory chat log. Backs the TUI transcript pane and the tests.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[async_trait]
impl MessageSink for ChatLog {
    async fn post(&mut self, message: ChatMessage) -> Result<(), ChatError> {
        self.messages.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_roll(total: i32) -> RollResult {
        RollResult {
            notation: total.to_string(),
            term_rolls: Vec::new(),
            modifier: total,
            total,
        }
    }

    #[tokio::test]
    async fn chat_log_accumulates_posts() {
        let mut log = ChatLog::new();
        assert!(log.is_empty());

        log.post(ChatMessage::new(
            "Goblin",
            "Goblin takes 5 fire damage!",
            flat_roll(5),
        ))
        .await
        .unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].speaker, "Goblin");
    }

    #[test]
    fn transcript_line_includes_breakdown() {
        let message = ChatMessage::new("Ogre", "Ogre takes 11 cold damage!", flat_roll(11));
        assert_eq!(
            message.transcript_line(),
            "Ogre takes 11 cold damage! (11 = 11)"
        );
    }
}
