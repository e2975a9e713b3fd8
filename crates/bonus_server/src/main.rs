//! Bonus Games - CLI entry point.

#![warn(missing_docs)]

use anyhow::Result;
use bonus_server::cli::{Cli, Command};
use bonus_server::{
    AppState, ChatSender, GameSession, RelayNotifier, ServerConfig, SessionManager,
    StartCommandListener, TelegramClient, controller_factory, play, router,
};
use bonus_tictactoe::{GameController, LogNotifier, OutcomeNotifier, PolicyKind};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::Play {
            relay_url,
            chat_id,
            seed,
            policy,
        } => run_play(relay_url, chat_id, seed, policy).await,
    }
}

/// Run the relay server and hosted games.
#[instrument]
async fn run_server(config_path: PathBuf, host: Option<String>, port: Option<u16>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bonus_server=debug")),
        )
        .init();

    let mut config = ServerConfig::load(Some(config_path.as_path()))?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    let token = config.require_bot_token()?;

    let telegram = Arc::new(TelegramClient::new(config.api_base(), token));
    let chat: Arc<dyn ChatSender> = telegram.clone();
    let sessions = SessionManager::new(controller_factory(&config, Arc::clone(&chat)));
    let app = router(AppState::new(chat, sessions), config.webapp_url().as_deref());

    tokio::spawn(StartCommandListener::new(telegram, config.greeting().clone()).run());

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(address = %listener.local_addr()?, "Server ready");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Play one session in the terminal.
#[instrument]
async fn run_play(
    relay_url: Option<String>,
    chat_id: Option<i64>,
    seed: Option<u64>,
    policy: PolicyKind,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let notifier: Arc<dyn OutcomeNotifier> = match (relay_url, chat_id) {
        (Some(url), Some(chat_id)) => {
            info!(%url, chat_id, "Reporting outcomes to relay");
            Arc::new(RelayNotifier::new(&url, chat_id))
        }
        _ => Arc::new(LogNotifier),
    };

    let seed = seed.unwrap_or_else(rand::random);
    let controller = GameController::seeded(policy.build(seed), notifier, seed);
    let session = GameSession::new(chat_id.unwrap_or_default(), controller);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    play::run(&session, stdin, &mut std::io::stdout()).await?;

    // Let a pending relay delivery finish before the runtime shuts down.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    Ok(())
}
