//! CLI subcommands for the channel registry.

use std::{path::Path, sync::Arc};

use {
    anyhow::{Context, Result},
    cartlist_channels::{ChannelRegistry, FileChannelStore},
    clap::Subcommand,
};

#[derive(Subcommand)]
pub enum ChannelAction {
    /// List tracked channel ids.
    List,
    /// Start tracking a channel.
    Add {
        /// Discord channel id.
        id: String,
    },
    /// Stop tracking a channel.
    Remove {
        /// Discord channel id.
        id: String,
    },
}

pub async fn handle_channels(action: ChannelAction, registry_path: &Path) -> Result<()> {
    let store = Arc::new(FileChannelStore::new(registry_path));
    let mut registry = ChannelRegistry::load(store).await.with_context(|| {
        format!("failed to load channel registry {}", registry_path.display())
    })?;

    match action {
        ChannelAction::List => {
            if registry.is_empty() {
                println!("No tracked channels.");
            }
            for id in registry.list() {
                println!("{id}");
            }
        },
        ChannelAction::Add { id } => {
            let id = id.trim();
            if registry.add(id).await? {
                println!("Tracking channel {id}.");
            } else {
                println!("Channel {id} is already tracked.");
            }
        },
        ChannelAction::Remove { id } => {
            let id = id.trim();
            if registry.remove(id).await? {
                println!("Stopped tracking channel {id}.");
            } else {
                println!("Channel {id} is not tracked.");
            }
        },
    }
    Ok(())
}
