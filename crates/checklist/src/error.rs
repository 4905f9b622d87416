use std::error::Error as StdError;

use crate::surface::MessageRef;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A chat surface call failed.
    #[error("{context}: {source}")]
    Surface {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The referenced message no longer exists.
    #[error("message {message_id} not found in channel {channel_id}")]
    MessageNotFound {
        channel_id: String,
        message_id: String,
    },

    #[error(transparent)]
    Registry(#[from] cartlist_channels::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn surface(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Surface {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn not_found(target: &MessageRef) -> Self {
        Self::MessageNotFound {
            channel_id: target.channel_id.clone(),
            message_id: target.message_id.clone(),
        }
    }
}
