//! Serial task that owns the [`Reconciler`].
//!
//! Platform handlers run concurrently; they only enqueue events here. A
//! single task drains the queue, so registry and edit-slot transitions never
//! interleave.

use {
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, info, warn},
};

use crate::{event::ChatEvent, reconciler::Reconciler};

/// Cloneable handle for enqueueing events.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ChatEvent>,
}

pub struct EventReceiver {
    rx: mpsc::Receiver<ChatEvent>,
}

/// Bounded event queue. Senders wait when `capacity` events are pending.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}

impl EventSender {
    /// Enqueue `event`. Returns `false` if the reconciler task has stopped.
    pub async fn dispatch(&self, event: ChatEvent) -> bool {
        let kind = event.kind();
        match self.tx.send(event).await {
            Ok(()) => true,
            Err(_) => {
                warn!(event = kind, "reconciler stopped, dropping chat event");
                false
            },
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Run `reconciler` over every queued event, in order.
///
/// The task ends once every [`EventSender`] is dropped and hands the
/// reconciler back.
pub fn spawn_reconciler(
    mut reconciler: Reconciler,
    receiver: EventReceiver,
) -> JoinHandle<Reconciler> {
    let EventReceiver { mut rx } = receiver;
    tokio::spawn(async move {
        info!("reconciler started");
        while let Some(event) = rx.recv().await {
            debug!(event = event.kind(), "processing chat event");
            reconciler.handle(event).await;
        }
        info!("reconciler stopped");
        reconciler
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use {
        super::*,
        crate::{ChatSurface, surface_memory::InMemorySurface},
        cartlist_channels::{ChannelRegistry, InMemoryChannelStore},
        cartlist_config::ChecklistConfig,
    };

    async fn reconciler(surface: &Arc<InMemorySurface>) -> Reconciler {
        let registry = ChannelRegistry::load(Arc::new(InMemoryChannelStore::new()))
            .await
            .unwrap();
        Reconciler::new(
            Arc::clone(surface) as Arc<dyn ChatSurface>,
            registry,
            ChecklistConfig::default(),
        )
    }

    #[tokio::test]
    async fn task_returns_reconciler_when_senders_drop() {
        let surface = Arc::new(InMemorySurface::new("bot"));
        let (tx, rx) = event_channel(8);
        let handle = spawn_reconciler(reconciler(&surface).await, rx);

        assert!(
            tx.dispatch(ChatEvent::Connected {
                bot_user_id: "bot".into(),
            })
            .await
        );
        drop(tx);

        let reconciler = handle.await.unwrap();
        assert_eq!(reconciler.bot_user_id(), Some("bot"));
    }

    #[tokio::test]
    async fn dispatch_after_stop_reports_failure() {
        let (tx, rx) = event_channel(1);
        drop(rx);

        assert!(tx.is_closed());
        assert!(
            !tx.dispatch(ChatEvent::Connected {
                bot_user_id: "bot".into(),
            })
            .await
        );
    }
}
