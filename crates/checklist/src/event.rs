use crate::surface::MessageRef;

/// A message posted to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub reference: MessageRef,
    pub author_id: String,
    pub author_name: Option<String>,
    pub content: String,
}

impl InboundMessage {
    pub fn channel_id(&self) -> &str {
        &self.reference.channel_id
    }

    /// Name for log lines: display name when known, else the id.
    pub fn author_label(&self) -> &str {
        self.author_name.as_deref().unwrap_or(&self.author_id)
    }
}

/// A reaction added to or removed from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub target: MessageRef,
    pub user_id: String,
    pub user_name: Option<String>,
    pub emoji: String,
}

impl ReactionEvent {
    pub fn user_label(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Inbound chat platform events, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The platform session is up; carries the bot's own user id.
    Connected { bot_user_id: String },
    MessageCreated(InboundMessage),
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
}

impl ChatEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::MessageCreated(_) => "message_created",
            Self::ReactionAdded(_) => "reaction_added",
            Self::ReactionRemoved(_) => "reaction_removed",
        }
    }
}
