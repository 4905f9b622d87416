use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::Result;

/// A channel with checklist tracking enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedChannel {
    pub id: String,
}

impl TrackedChannel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// On-disk registry document: `{ "channels": [ { "id": "..." } ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryFile {
    pub channels: Vec<TrackedChannel>,
}

/// Durable storage for the tracked channel set.
///
/// `save` always receives the complete set; stores rewrite it in full.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn load(&self) -> Result<Vec<TrackedChannel>>;
    async fn save(&self, channels: &[TrackedChannel]) -> Result<()>;
}
