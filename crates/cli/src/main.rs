mod channel_commands;

use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    anyhow::Context,
    cartlist_channels::{ChannelRegistry, FileChannelStore},
    cartlist_checklist::{ChatSurface, Reconciler, event_channel, spawn_reconciler},
    cartlist_config::CartlistConfig,
    cartlist_discord::DiscordClient,
    clap::{Parser, Subcommand},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

/// Events buffered between the gateway and the reconciler.
const EVENT_QUEUE_CAPACITY: usize = 256;

/// How long to wait for queued events to drain on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "cartlist", about = "Cartlist: reaction-driven checklists for Discord", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and ~/.config/cartlist/).
    #[arg(long, global = true, env = "CARTLIST_CONFIG")]
    config: Option<PathBuf>,

    /// File holding the Discord bot token (overrides config value).
    #[arg(long, global = true, env = "CARTLIST_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Channel registry file (overrides config value).
    #[arg(long, global = true, env = "CARTLIST_REGISTRY")]
    registry: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and run the bot (default when no subcommand is provided).
    Run,
    /// Inspect or edit the channel registry without connecting.
    Channels {
        #[command(subcommand)]
        action: channel_commands::ChannelAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load the config file and apply command-line overrides.
fn load_settings(cli: &Cli) -> anyhow::Result<CartlistConfig> {
    let mut config = match &cli.config {
        Some(path) => cartlist_config::load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => cartlist_config::discover_and_load().context("failed to load config")?,
    };

    if let Some(path) = &cli.token_file {
        config.discord.token_file = path.clone();
    }
    if let Some(path) = &cli.registry {
        config.registry.path = path.clone();
    }
    Ok(config)
}

async fn run(config: CartlistConfig) -> anyhow::Result<()> {
    let token = config.discord.resolve_token().context("failed to read discord token")?;

    let store = Arc::new(FileChannelStore::new(&config.registry.path));
    let registry = ChannelRegistry::load(store).await.with_context(|| {
        format!(
            "failed to load channel registry {}",
            config.registry.path.display()
        )
    })?;

    let (events, queue) = event_channel(EVENT_QUEUE_CAPACITY);
    let client = DiscordClient::build(&token, events)
        .await
        .context("failed to build discord client")?;

    let bot_user_id = client
        .bot_user_id()
        .await
        .context("failed to read discord bot identity")?;

    let surface: Arc<dyn ChatSurface> = Arc::new(client.surface());
    let reconciler =
        Reconciler::new(surface, registry, config.checklist).with_bot_user_id(bot_user_id);
    let reconciler_task = spawn_reconciler(reconciler, queue);

    let gateway = client.start();

    tokio::select! {
        () = shutdown_signal() => info!("shutdown requested"),
        () = gateway.stopped() => warn!("discord gateway stopped unexpectedly"),
    }

    gateway.shutdown().await;
    match tokio::time::timeout(DRAIN_TIMEOUT, reconciler_task).await {
        Ok(Ok(reconciler)) => {
            info!(channels = reconciler.registry().len(), "reconciler drained");
        },
        Ok(Err(e)) => warn!(error = %e, "reconciler task failed"),
        Err(_) => warn!("timed out waiting for reconciler to drain"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = load_settings(&cli)?;

    match cli.command {
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "cartlist starting");
            run(config).await
        },
        Some(Commands::Channels { action }) => {
            channel_commands::handle_channels(action, &config.registry.path).await
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_replace_config_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("cartlist.toml");
        std::fs::write(
            &config_path,
            "[discord]\ntoken_file = \"from-config\"\n[registry]\npath = \"from-config.json\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "cartlist",
            "--config",
            config_path.to_str().unwrap(),
            "--registry",
            "override.json",
        ]);
        let config = load_settings(&cli).unwrap();

        assert_eq!(config.discord.token_file, PathBuf::from("from-config"));
        assert_eq!(config.registry.path, PathBuf::from("override.json"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli::parse_from(["cartlist", "--config", "/nonexistent/cartlist.toml"]);
        assert!(load_settings(&cli).is_err());
    }

    #[test]
    fn channels_subcommand_parses() {
        let cli = Cli::parse_from(["cartlist", "channels", "add", "123"]);
        assert!(matches!(cli.command, Some(Commands::Channels { .. })));
    }
}
