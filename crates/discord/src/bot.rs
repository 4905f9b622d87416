use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    serenity::{Client, all::ShardManager},
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{error, info},
};

use cartlist_checklist::EventSender;

use crate::{error::Result, handler::DiscordHandler, surface::DiscordSurface};

/// A configured, not yet connected Discord client.
pub struct DiscordClient {
    client: Client,
}

impl DiscordClient {
    /// Build the gateway client. Events are queued on `events`.
    pub async fn build(token: &Secret<String>, events: EventSender) -> Result<Self> {
        let client = Client::builder(token.expose_secret(), DiscordHandler::intents())
            .event_handler(DiscordHandler::new(events))
            .await?;
        Ok(Self { client })
    }

    /// The bot's own user id, read over REST before the gateway connects.
    pub async fn bot_user_id(&self) -> Result<String> {
        let user = self.client.http.get_current_user().await?;
        Ok(user.id.to_string())
    }

    /// REST surface sharing this client's HTTP pool.
    pub fn surface(&self) -> DiscordSurface {
        DiscordSurface::new(Arc::clone(&self.client.http))
    }

    /// Connect to the gateway on a background task.
    ///
    /// The task runs until the gateway fails or the returned handle is shut
    /// down.
    pub fn start(self) -> GatewayHandle {
        let cancel = CancellationToken::new();
        let shard_manager: Arc<ShardManager> = Arc::clone(&self.client.shard_manager);
        let mut client = self.client;

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            info!("connecting to discord gateway");
            tokio::select! {
                result = client.start() => {
                    if let Err(e) = result {
                        error!(error = %e, "discord gateway error");
                    }
                },
                () = task_cancel.cancelled() => {
                    shard_manager.shutdown_all().await;
                },
            }
            task_cancel.cancel();
            info!("discord gateway stopped");
        });

        GatewayHandle { cancel, task }
    }
}

/// Running gateway connection.
pub struct GatewayHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl GatewayHandle {
    /// Resolves once the gateway has stopped, for any reason.
    pub async fn stopped(&self) {
        self.cancel.cancelled().await;
    }

    /// Close every shard and wait for the gateway task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "discord gateway task panicked");
        }
        info!("discord shut down");
    }
}
