//! Dispatch from chat events to item and edit-session transitions.

use std::sync::Arc;

use {
    cartlist_channels::ChannelRegistry,
    cartlist_config::ChecklistConfig,
    tracing::{debug, info, warn},
};

use crate::{
    Result,
    codec::{self, ControlReaction, ItemState},
    command::{
        Command, REPLY_CHANNEL_ADDED, REPLY_CHANNEL_ALREADY_ADDED, REPLY_CHANNEL_NOT_TRACKED,
        REPLY_CHANNEL_REMOVED,
    },
    event::{ChatEvent, InboundMessage, ReactionEvent},
    session::{BeginOutcome, EditSlot},
    surface::{ChatMessage, ChatSurface, MessageRef},
};

/// Owns the channel registry and the edit slot and applies events to them
/// one at a time.
///
/// The reconciler keeps no copy of item state: every decision is made from
/// a fresh read of the target message.
pub struct Reconciler {
    surface: Arc<dyn ChatSurface>,
    registry: ChannelRegistry,
    session: EditSlot,
    config: ChecklistConfig,
    bot_user_id: Option<String>,
}

impl Reconciler {
    pub fn new(
        surface: Arc<dyn ChatSurface>,
        registry: ChannelRegistry,
        config: ChecklistConfig,
    ) -> Self {
        Self {
            surface,
            registry,
            session: EditSlot::new(),
            config,
            bot_user_id: None,
        }
    }

    /// Set the bot identity up front instead of waiting for `Connected`.
    #[must_use]
    pub fn with_bot_user_id(mut self, bot_user_id: impl Into<String>) -> Self {
        self.bot_user_id = Some(bot_user_id.into());
        self
    }

    pub fn session(&self) -> &EditSlot {
        &self.session
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn bot_user_id(&self) -> Option<&str> {
        self.bot_user_id.as_deref()
    }

    /// Apply `event`, logging and dropping any failure.
    pub async fn handle(&mut self, event: ChatEvent) {
        let kind = event.kind();
        if let Err(e) = self.apply(event).await {
            warn!(event = kind, error = %e, "failed to apply chat event");
        }
    }

    /// Apply `event`. Surface calls already issued are not rolled back on error.
    ///
    /// Events other than `Connected` are dropped until the bot identity is known.
    pub async fn apply(&mut self, event: ChatEvent) -> Result<()> {
        if self.bot_user_id.is_none() && !matches!(event, ChatEvent::Connected { .. }) {
            debug!(event = event.kind(), "bot identity unknown, dropping event");
            return Ok(());
        }

        match event {
            ChatEvent::Connected { bot_user_id } => {
                info!(bot_user_id, "chat session connected");
                self.bot_user_id = Some(bot_user_id);
                Ok(())
            },
            ChatEvent::MessageCreated(msg) => self.on_message(msg).await,
            ChatEvent::ReactionAdded(reaction) => self.on_reaction_added(reaction).await,
            ChatEvent::ReactionRemoved(reaction) => self.on_reaction_removed(reaction).await,
        }
    }

    fn is_self(&self, user_id: &str) -> bool {
        self.bot_user_id.as_deref() == Some(user_id)
    }

    fn starts_with_marker(text: &str, marker: &str) -> bool {
        !marker.is_empty() && text.starts_with(marker)
    }

    async fn on_message(&mut self, msg: InboundMessage) -> Result<()> {
        if self.is_self(&msg.author_id)
            || Self::starts_with_marker(&msg.content, &self.config.comment_marker)
        {
            return Ok(());
        }

        if let Some(command) = Command::parse(&self.config.command_prefix, &msg.content) {
            return self.run_command(&msg, command).await;
        }

        if !self.registry.is_tracked(msg.channel_id()) {
            return Ok(());
        }

        if self.session.prompt_in(msg.channel_id()) {
            return self.consume_replacement(&msg).await;
        }

        self.expand_items(&msg).await
    }

    async fn run_command(&mut self, msg: &InboundMessage, command: Command) -> Result<()> {
        let channel_id = msg.channel_id();
        let reply = match command {
            Command::AddChannel => {
                if self.registry.add(channel_id).await? {
                    REPLY_CHANNEL_ADDED
                } else {
                    REPLY_CHANNEL_ALREADY_ADDED
                }
            },
            Command::RemoveChannel => {
                if self.registry.remove(channel_id).await? {
                    if self.session.prompt_in(channel_id) {
                        self.session
                            .cancel(self.surface.as_ref(), &self.config.glyphs)
                            .await?;
                        info!(channel_id, "edit cancelled, channel no longer tracked");
                    }
                    REPLY_CHANNEL_REMOVED
                } else {
                    REPLY_CHANNEL_NOT_TRACKED
                }
            },
            Command::Unknown(token) => {
                info!(command = %token, channel_id, user = msg.author_label(), "unknown command");
                return Ok(());
            },
        };

        self.surface.send_message(channel_id, reply).await?;
        Ok(())
    }

    async fn consume_replacement(&mut self, msg: &InboundMessage) -> Result<()> {
        let text = msg.content.trim();
        if text.is_empty() {
            debug!(channel_id = msg.channel_id(), "ignoring empty replacement text");
            return self.surface.delete_message(&msg.reference).await;
        }

        let committed = self
            .session
            .commit(self.surface.as_ref(), &self.config.glyphs, text)
            .await;
        let deleted = self.surface.delete_message(&msg.reference).await;

        if let Some(session) = committed? {
            info!(
                from = %session.original_text,
                to = text,
                channel_id = msg.channel_id(),
                user = msg.author_label(),
                "edited item"
            );
        }
        deleted
    }

    /// Turn each non-empty line into a heading or a new unchecked item, then
    /// remove the source message. A failed send keeps the source message.
    async fn expand_items(&self, msg: &InboundMessage) -> Result<()> {
        let glyphs = &self.config.glyphs;
        let channel_id = msg.channel_id();

        for line in msg.content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if Self::starts_with_marker(line, &self.config.heading_marker) {
                self.surface
                    .send_message(channel_id, &codec::render_heading(line))
                    .await?;
                continue;
            }

            let item = self
                .surface
                .send_message(channel_id, &codec::render(glyphs, ItemState::Unchecked, line))
                .await?;
            for control in ControlReaction::ALL {
                self.surface.add_reaction(&item, control.emoji(glyphs)).await?;
            }
            info!(item = line, channel_id, user = msg.author_label(), "added item");
        }

        self.surface.delete_message(&msg.reference).await
    }

    /// Resolve a reaction to a control, or `None` when the event is not ours
    /// to handle. The item under edit stays reachable even if its channel is
    /// no longer tracked.
    fn control_for(&self, reaction: &ReactionEvent) -> Option<ControlReaction> {
        let reachable = self.registry.is_tracked(&reaction.target.channel_id)
            || self.session.targets(&reaction.target);
        if self.is_self(&reaction.user_id) || !reachable {
            return None;
        }
        ControlReaction::from_emoji(&self.config.glyphs, &reaction.emoji)
    }

    /// Fetch `target` fresh, returning it only if it is an item the bot owns.
    async fn fetch_item(&self, target: &MessageRef) -> Result<Option<ChatMessage>> {
        let message = self.surface.fetch_message(target).await?;
        if !self.is_self(&message.author_id) || !codec::is_item(&self.config.glyphs, &message.content) {
            debug!(target = %target, "reaction on a non-item message");
            return Ok(None);
        }
        Ok(Some(message))
    }

    async fn set_state(&self, message: &ChatMessage, state: ItemState) -> Result<()> {
        let item = codec::decode(&self.config.glyphs, &message.content);
        let body = codec::render(&self.config.glyphs, state, &item.text);
        if body == message.content {
            return Ok(());
        }
        self.surface.edit_message(&message.reference, &body).await
    }

    async fn on_reaction_added(&mut self, reaction: ReactionEvent) -> Result<()> {
        let Some(control) = self.control_for(&reaction) else {
            return Ok(());
        };
        let Some(message) = self.fetch_item(&reaction.target).await? else {
            return Ok(());
        };
        let text = codec::decode(&self.config.glyphs, &message.content).text;
        let editing_this = self.session.targets(&message.reference);

        match control {
            ControlReaction::Check => {
                if editing_this {
                    self.session
                        .cancel(self.surface.as_ref(), &self.config.glyphs)
                        .await?;
                }
                self.set_state(&message, ItemState::Checked).await?;
                info!(item = %text, target = %message.reference, user = reaction.user_label(), "checked item");
            },
            ControlReaction::Delete => {
                if editing_this {
                    self.session.discard(self.surface.as_ref()).await?;
                }
                self.surface.delete_message(&message.reference).await?;
                info!(item = %text, target = %message.reference, user = reaction.user_label(), "removed item");
            },
            ControlReaction::Edit => {
                if editing_this {
                    return Ok(());
                }
                let outcome = self
                    .session
                    .begin(
                        self.surface.as_ref(),
                        &self.config.glyphs,
                        &reaction.user_id,
                        &message,
                    )
                    .await?;
                match outcome {
                    BeginOutcome::Started(_) => {
                        info!(item = %text, target = %message.reference, user = reaction.user_label(), "editing item");
                    },
                    BeginOutcome::Busy(active) => {
                        debug!(
                            target = %message.reference,
                            active = %active.item,
                            "edit already in progress"
                        );
                    },
                }
            },
        }
        Ok(())
    }

    async fn on_reaction_removed(&mut self, reaction: ReactionEvent) -> Result<()> {
        let Some(control) = self.control_for(&reaction) else {
            return Ok(());
        };

        match control {
            ControlReaction::Check => {
                let Some(message) = self.fetch_item(&reaction.target).await? else {
                    return Ok(());
                };
                if message.user_reactions(&self.config.glyphs.check) == 0 {
                    self.set_state(&message, ItemState::Unchecked).await?;
                    let text = codec::decode(&self.config.glyphs, &message.content).text;
                    info!(item = %text, target = %message.reference, user = reaction.user_label(), "unchecked item");
                }
            },
            ControlReaction::Edit => {
                if self.session.targets(&reaction.target) {
                    self.session
                        .cancel(self.surface.as_ref(), &self.config.glyphs)
                        .await?;
                }
            },
            ControlReaction::Delete => {},
        }
        Ok(())
    }
}
