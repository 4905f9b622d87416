//! [`ChatSurface`] over the Discord REST API.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serenity::all::{
        ChannelId, CreateMessage, EditMessage, Http, Message, MessageId, MessageReaction,
        ReactionType,
    },
    tracing::debug,
};

use cartlist_checklist::{ChatMessage, ChatSurface, MessageRef, ReactionTally};

use crate::error::{Error, Result};

/// Outbound Discord calls. Cheap to clone; shares the client's HTTP pool.
#[derive(Clone)]
pub struct DiscordSurface {
    http: Arc<Http>,
}

impl DiscordSurface {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn parse_snowflake(kind: &'static str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(Error::invalid_id(kind, value)),
        Ok(id) => Ok(id),
    }
}

pub(crate) fn channel_id(value: &str) -> Result<ChannelId> {
    parse_snowflake("channel", value).map(ChannelId::new)
}

pub(crate) fn message_id(value: &str) -> Result<MessageId> {
    parse_snowflake("message", value).map(MessageId::new)
}

fn target_ids(target: &MessageRef) -> Result<(ChannelId, MessageId)> {
    Ok((channel_id(&target.channel_id)?, message_id(&target.message_id)?))
}

/// Name the reconciler matches control glyphs against.
///
/// Unicode emoji map to themselves, custom emoji to their name.
pub(crate) fn emoji_name(reaction: &ReactionType) -> Option<String> {
    match reaction {
        ReactionType::Unicode(emoji) => Some(emoji.clone()),
        ReactionType::Custom { name, .. } => name.clone(),
        _ => None,
    }
}

fn tally(reaction: &MessageReaction) -> Option<ReactionTally> {
    Some(ReactionTally {
        emoji: emoji_name(&reaction.reaction_type)?,
        count: reaction.count,
        includes_own: reaction.me,
    })
}

pub(crate) fn message_ref(message: &Message) -> MessageRef {
    MessageRef::new(message.channel_id.to_string(), message.id.to_string())
}

fn to_chat_message(message: &Message) -> ChatMessage {
    ChatMessage {
        reference: message_ref(message),
        author_id: message.author.id.to_string(),
        content: message.content.clone(),
        reactions: message.reactions.iter().filter_map(tally).collect(),
    }
}

#[async_trait]
impl ChatSurface for DiscordSurface {
    async fn send_message(
        &self,
        channel: &str,
        text: &str,
    ) -> cartlist_checklist::Result<MessageRef> {
        let sent = channel_id(channel)?
            .send_message(&*self.http, CreateMessage::new().content(text))
            .await
            .map_err(Error::from)?;
        debug!(target = %message_ref(&sent), "sent discord message");
        Ok(message_ref(&sent))
    }

    async fn edit_message(&self, target: &MessageRef, text: &str) -> cartlist_checklist::Result<()> {
        let (channel, message) = target_ids(target)?;
        channel
            .edit_message(&*self.http, message, EditMessage::new().content(text))
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn delete_message(&self, target: &MessageRef) -> cartlist_checklist::Result<()> {
        let (channel, message) = target_ids(target)?;
        channel
            .delete_message(&*self.http, message)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn add_reaction(&self, target: &MessageRef, emoji: &str) -> cartlist_checklist::Result<()> {
        let (channel, message) = target_ids(target)?;
        channel
            .create_reaction(&*self.http, message, ReactionType::Unicode(emoji.to_string()))
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn remove_reaction_emoji(
        &self,
        target: &MessageRef,
        emoji: &str,
    ) -> cartlist_checklist::Result<()> {
        let (channel, message) = target_ids(target)?;
        channel
            .delete_reaction_emoji(&*self.http, message, ReactionType::Unicode(emoji.to_string()))
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn fetch_message(&self, target: &MessageRef) -> cartlist_checklist::Result<ChatMessage> {
        let (channel, message) = target_ids(target)?;
        let fetched = channel
            .message(&*self.http, message)
            .await
            .map_err(Error::from)?;
        Ok(to_chat_message(&fetched))
    }
}
