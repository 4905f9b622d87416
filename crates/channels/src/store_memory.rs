//! In-memory store for testing.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    Error, Result,
    store::{ChannelStore, TrackedChannel},
};

/// Registry store backed by a `Vec`. No persistence, for tests only.
#[derive(Default)]
pub struct InMemoryChannelStore {
    channels: Mutex<Vec<TrackedChannel>>,
    saves: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given channel ids.
    pub fn with_channels<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: Mutex::new(ids.into_iter().map(TrackedChannel::new).collect()),
            ..Self::default()
        }
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent `save` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of what was last persisted.
    pub fn persisted(&self) -> Vec<TrackedChannel> {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChannelStore for InMemoryChannelStore {
    async fn load(&self) -> Result<Vec<TrackedChannel>> {
        Ok(self.persisted())
    }

    async fn save(&self, channels: &[TrackedChannel]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::unavailable("writes disabled"));
        }
        let mut stored = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        *stored = channels.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
