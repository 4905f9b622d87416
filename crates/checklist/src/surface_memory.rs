//! In-memory chat surface for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    Error, Result,
    event::{InboundMessage, ReactionEvent},
    surface::{ChatMessage, ChatSurface, MessageRef, ReactionTally},
};

/// A recorded surface call, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Send { channel_id: String, text: String },
    Edit { target: MessageRef, text: String },
    Delete { target: MessageRef },
    AddReaction { target: MessageRef, emoji: String },
    RemoveReactionEmoji { target: MessageRef, emoji: String },
    Fetch { target: MessageRef },
}

struct StoredMessage {
    reference: MessageRef,
    author_id: String,
    content: String,
    /// Emoji in first-use order, each with the users reacting with it.
    reactions: Vec<(String, Vec<String>)>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    messages: Vec<StoredMessage>,
    ops: Vec<SurfaceOp>,
    fail_sends: bool,
}

/// Chat platform simulated in memory. No network, for tests only.
///
/// Messages sent through [`ChatSurface`] are authored by `bot_user_id`;
/// the `post`/`react`/`unreact` helpers act as other users and return the
/// event the platform would deliver.
pub struct InMemorySurface {
    bot_user_id: String,
    state: Mutex<State>,
}

impl InMemorySurface {
    pub fn new(bot_user_id: impl Into<String>) -> Self {
        Self {
            bot_user_id: bot_user_id.into(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `send_message` fail until reset.
    pub fn set_fail_sends(&self, fail: bool) {
        self.lock().fail_sends = fail;
    }

    /// A user posts `content` in `channel_id`.
    pub fn post(&self, channel_id: &str, author_id: &str, content: &str) -> InboundMessage {
        let mut state = self.lock();
        let reference = state.insert(channel_id, author_id, content);
        InboundMessage {
            reference,
            author_id: author_id.to_string(),
            author_name: None,
            content: content.to_string(),
        }
    }

    /// A user adds `emoji` to `target`.
    pub fn react(&self, target: &MessageRef, user_id: &str, emoji: &str) -> ReactionEvent {
        let mut state = self.lock();
        if let Some(msg) = state.find_mut(target) {
            msg.add_reaction(user_id, emoji);
        }
        reaction_event(target, user_id, emoji)
    }

    /// A user removes their `emoji` from `target`.
    pub fn unreact(&self, target: &MessageRef, user_id: &str, emoji: &str) -> ReactionEvent {
        let mut state = self.lock();
        if let Some(msg) = state.find_mut(target) {
            msg.remove_reaction(Some(user_id), emoji);
        }
        reaction_event(target, user_id, emoji)
    }

    pub fn get(&self, target: &MessageRef) -> Option<ChatMessage> {
        let state = self.lock();
        state
            .messages
            .iter()
            .find(|m| &m.reference == target)
            .map(|m| m.snapshot(&self.bot_user_id))
    }

    /// Live messages in `channel_id`, oldest first.
    pub fn channel_messages(&self, channel_id: &str) -> Vec<ChatMessage> {
        let state = self.lock();
        state
            .messages
            .iter()
            .filter(|m| m.reference.channel_id == channel_id)
            .map(|m| m.snapshot(&self.bot_user_id))
            .collect()
    }

    pub fn operations(&self) -> Vec<SurfaceOp> {
        self.lock().ops.clone()
    }

    pub fn clear_operations(&self) {
        self.lock().ops.clear();
    }
}

fn reaction_event(target: &MessageRef, user_id: &str, emoji: &str) -> ReactionEvent {
    ReactionEvent {
        target: target.clone(),
        user_id: user_id.to_string(),
        user_name: None,
        emoji: emoji.to_string(),
    }
}

impl State {
    fn insert(&mut self, channel_id: &str, author_id: &str, content: &str) -> MessageRef {
        self.next_id += 1;
        let reference = MessageRef::new(channel_id, format!("m{}", self.next_id));
        self.messages.push(StoredMessage {
            reference: reference.clone(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            reactions: Vec::new(),
        });
        reference
    }

    fn find_mut(&mut self, target: &MessageRef) -> Option<&mut StoredMessage> {
        self.messages.iter_mut().find(|m| &m.reference == target)
    }

    fn existing_mut(&mut self, target: &MessageRef) -> Result<&mut StoredMessage> {
        self.find_mut(target).ok_or_else(|| Error::not_found(target))
    }
}

impl StoredMessage {
    fn add_reaction(&mut self, user_id: &str, emoji: &str) {
        match self.reactions.iter_mut().find(|(e, _)| e == emoji) {
            Some((_, users)) => {
                if !users.iter().any(|u| u == user_id) {
                    users.push(user_id.to_string());
                }
            },
            None => self
                .reactions
                .push((emoji.to_string(), vec![user_id.to_string()])),
        }
    }

    /// Remove one user's copy, or every copy when `user_id` is `None`.
    fn remove_reaction(&mut self, user_id: Option<&str>, emoji: &str) {
        if let Some((_, users)) = self.reactions.iter_mut().find(|(e, _)| e == emoji) {
            match user_id {
                Some(user_id) => users.retain(|u| u != user_id),
                None => users.clear(),
            }
        }
        self.reactions.retain(|(_, users)| !users.is_empty());
    }

    fn snapshot(&self, bot_user_id: &str) -> ChatMessage {
        ChatMessage {
            reference: self.reference.clone(),
            author_id: self.author_id.clone(),
            content: self.content.clone(),
            reactions: self
                .reactions
                .iter()
                .map(|(emoji, users)| ReactionTally {
                    emoji: emoji.clone(),
                    count: users.len() as u64,
                    includes_own: users.iter().any(|u| u == bot_user_id),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ChatSurface for InMemorySurface {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<MessageRef> {
        let mut state = self.lock();
        state.ops.push(SurfaceOp::Send {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });
        if state.fail_sends {
            return Err(Error::message("send rejected"));
        }
        Ok(state.insert(channel_id, &self.bot_user_id, text))
    }

    async fn edit_message(&self, target: &MessageRef, text: &str) -> Result<()> {
        let mut state = self.lock();
        state.ops.push(SurfaceOp::Edit {
            target: target.clone(),
            text: text.to_string(),
        });
        let msg = state.existing_mut(target)?;
        if msg.author_id != self.bot_user_id {
            return Err(Error::message("cannot edit a message authored by another user"));
        }
        msg.content = text.to_string();
        Ok(())
    }

    async fn delete_message(&self, target: &MessageRef) -> Result<()> {
        let mut state = self.lock();
        state.ops.push(SurfaceOp::Delete {
            target: target.clone(),
        });
        state.existing_mut(target)?;
        state.messages.retain(|m| &m.reference != target);
        Ok(())
    }

    async fn add_reaction(&self, target: &MessageRef, emoji: &str) -> Result<()> {
        let mut state = self.lock();
        state.ops.push(SurfaceOp::AddReaction {
            target: target.clone(),
            emoji: emoji.to_string(),
        });
        state
            .existing_mut(target)?
            .add_reaction(&self.bot_user_id, emoji);
        Ok(())
    }

    async fn remove_reaction_emoji(&self, target: &MessageRef, emoji: &str) -> Result<()> {
        let mut state = self.lock();
        state.ops.push(SurfaceOp::RemoveReactionEmoji {
            target: target.clone(),
            emoji: emoji.to_string(),
        });
        state.existing_mut(target)?.remove_reaction(None, emoji);
        Ok(())
    }

    async fn fetch_message(&self, target: &MessageRef) -> Result<ChatMessage> {
        let mut state = self.lock();
        state.ops.push(SurfaceOp::Fetch {
            target: target.clone(),
        });
        let bot = self.bot_user_id.clone();
        state.existing_mut(target).map(|m| m.snapshot(&bot))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tallies_track_own_and_user_copies() {
        let surface = InMemorySurface::new("bot");
        let item = surface.send_message("c", "◻ milk").await.unwrap();
        surface.add_reaction(&item, "🛒").await.unwrap();
        surface.react(&item, "alice", "🛒");
        surface.react(&item, "alice", "🛒");

        let msg = surface.fetch_message(&item).await.unwrap();
        let tally = msg.reaction("🛒").unwrap();
        assert_eq!(tally.count, 2);
        assert!(tally.includes_own);
        assert_eq!(tally.user_count(), 1);

        surface.remove_reaction_emoji(&item, "🛒").await.unwrap();
        assert!(surface.get(&item).unwrap().reaction("🛒").is_none());
    }

    #[tokio::test]
    async fn deleted_messages_cannot_be_fetched() {
        let surface = InMemorySurface::new("bot");
        let item = surface.send_message("c", "◻ milk").await.unwrap();
        surface.delete_message(&item).await.unwrap();

        let err = surface.fetch_message(&item).await.unwrap_err();
        assert!(matches!(err, Error::MessageNotFound { .. }));
        assert!(surface.channel_messages("c").is_empty());
    }

    #[tokio::test]
    async fn user_messages_are_not_editable() {
        let surface = InMemorySurface::new("bot");
        let posted = surface.post("c", "alice", "hello");
        assert!(surface.edit_message(&posted.reference, "x").await.is_err());
    }
}
