use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    Error, Result,
    store::{ChannelStore, TrackedChannel},
};

/// Set of channels with checklist tracking enabled.
///
/// Membership is unique. Every mutation is persisted before the in-memory
/// view changes, so a failed write leaves the registry as it was.
pub struct ChannelRegistry {
    channels: Vec<TrackedChannel>,
    store: Arc<dyn ChannelStore>,
}

impl ChannelRegistry {
    /// Load the registry from its store. Duplicate entries are collapsed.
    pub async fn load(store: Arc<dyn ChannelStore>) -> Result<Self> {
        let loaded = store.load().await?;
        let before = loaded.len();

        let mut channels: Vec<TrackedChannel> = Vec::with_capacity(before);
        for channel in loaded {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        if channels.len() != before {
            warn!(
                duplicates = before - channels.len(),
                "channel registry contained duplicate entries"
            );
        }

        info!(count = channels.len(), "channel registry loaded");
        Ok(Self { channels, store })
    }

    pub fn is_tracked(&self, channel_id: &str) -> bool {
        self.channels.iter().any(|c| c.id == channel_id)
    }

    /// Start tracking `channel_id`. Returns `false` if it was already tracked.
    pub async fn add(&mut self, channel_id: &str) -> Result<bool> {
        if channel_id.trim().is_empty() {
            return Err(Error::invalid_input("channel id is empty"));
        }
        if self.is_tracked(channel_id) {
            return Ok(false);
        }

        let mut next = self.channels.clone();
        next.push(TrackedChannel::new(channel_id));
        self.store.save(&next).await?;
        self.channels = next;

        info!(channel_id, "added channel");
        Ok(true)
    }

    /// Stop tracking `channel_id`. Returns `false` if it was not tracked.
    pub async fn remove(&mut self, channel_id: &str) -> Result<bool> {
        if !self.is_tracked(channel_id) {
            return Ok(false);
        }

        let next: Vec<TrackedChannel> = self
            .channels
            .iter()
            .filter(|c| c.id != channel_id)
            .cloned()
            .collect();
        self.store.save(&next).await?;
        self.channels = next;

        info!(channel_id, "removed channel");
        Ok(true)
    }

    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
