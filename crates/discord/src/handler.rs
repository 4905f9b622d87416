//! Discord event handler for serenity.
//!
//! Translates gateway events into checklist events and queues them for the
//! reconciler. No checklist logic runs on the gateway task.

use {
    serenity::{
        all::{Context, EventHandler, GatewayIntents, Message, Reaction, Ready},
        async_trait,
    },
    tracing::{debug, info, warn},
};

use cartlist_checklist::{ChatEvent, EventSender, InboundMessage, MessageRef, ReactionEvent};

use crate::surface::{emoji_name, message_ref};

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    events: EventSender,
}

impl DiscordHandler {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::MESSAGE_CONTENT
    }

    async fn forward(&self, event: ChatEvent) {
        if !self.events.dispatch(event).await {
            warn!("discord event dropped, reconciler is not running");
        }
    }
}

pub(crate) fn inbound_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        reference: message_ref(msg),
        author_id: msg.author.id.to_string(),
        author_name: Some(msg.author.name.clone()),
        content: msg.content.clone(),
    }
}

/// `None` for reactions the checklist cannot name or attribute.
pub(crate) fn reaction_event(reaction: &Reaction) -> Option<ReactionEvent> {
    let user_id = reaction.user_id?;
    Some(ReactionEvent {
        target: MessageRef::new(
            reaction.channel_id.to_string(),
            reaction.message_id.to_string(),
        ),
        user_id: user_id.to_string(),
        user_name: None,
        emoji: emoji_name(&reaction.emoji)?,
    })
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        self.forward(ChatEvent::Connected {
            bot_user_id: ready.user.id.to_string(),
        })
        .await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        debug!(
            channel_id = %msg.channel_id,
            author = %msg.author.name,
            "discord message received"
        );
        self.forward(ChatEvent::MessageCreated(inbound_message(&msg)))
            .await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        match reaction_event(&reaction) {
            Some(event) => self.forward(ChatEvent::ReactionAdded(event)).await,
            None => debug!(message_id = %reaction.message_id, "ignoring unnamed reaction"),
        }
    }

    async fn reaction_remove(&self, _ctx: Context, reaction: Reaction) {
        match reaction_event(&reaction) {
            Some(event) => self.forward(ChatEvent::ReactionRemoved(event)).await,
            None => debug!(message_id = %reaction.message_id, "ignoring unnamed reaction"),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, cartlist_checklist::event_channel};

    #[test]
    fn intents_cover_messages_and_reactions() {
        let intents = DiscordHandler::intents();
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGE_REACTIONS));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(!intents.contains(GatewayIntents::DIRECT_MESSAGES));
    }

    #[tokio::test]
    async fn forward_reports_stopped_reconciler() {
        let (tx, rx) = event_channel(1);
        drop(rx);
        let handler = DiscordHandler::new(tx);
        handler
            .forward(ChatEvent::Connected {
                bot_user_id: "1".into(),
            })
            .await;
        assert!(handler.events.is_closed());
    }
}
