//! Boundary to the chat platform.

use async_trait::async_trait;

use crate::{Result, codec::emoji_matches};

/// Address of a message on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageRef {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.message_id)
    }
}

/// Aggregated copies of one emoji on a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTally {
    pub emoji: String,
    pub count: u64,
    /// Whether one of the copies belongs to the bot itself.
    pub includes_own: bool,
}

impl ReactionTally {
    /// Copies placed by users other than the bot.
    pub fn user_count(&self) -> u64 {
        self.count.saturating_sub(u64::from(self.includes_own))
    }
}

/// A message as freshly read from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub reference: MessageRef,
    pub author_id: String,
    pub content: String,
    pub reactions: Vec<ReactionTally>,
}

impl ChatMessage {
    pub fn reaction(&self, emoji: &str) -> Option<&ReactionTally> {
        self.reactions
            .iter()
            .find(|r| emoji_matches(emoji, &r.emoji))
    }

    /// Users other than the bot currently reacting with `emoji`.
    pub fn user_reactions(&self, emoji: &str) -> u64 {
        self.reaction(emoji).map_or(0, ReactionTally::user_count)
    }
}

/// Commands the reconciler issues against the chat platform.
///
/// Every call is a network round-trip and may fail; callers log and drop.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<MessageRef>;

    async fn edit_message(&self, target: &MessageRef, text: &str) -> Result<()>;

    async fn delete_message(&self, target: &MessageRef) -> Result<()>;

    /// Add the bot's own reaction.
    async fn add_reaction(&self, target: &MessageRef, emoji: &str) -> Result<()>;

    /// Remove every copy of `emoji`, whoever placed it.
    async fn remove_reaction_emoji(&self, target: &MessageRef, emoji: &str) -> Result<()>;

    async fn fetch_message(&self, target: &MessageRef) -> Result<ChatMessage>;
}
