//! Tsukiyo Bot - Binary Entry Point
//!
//! Reads gateway events as JSON lines on stdin and writes actions as JSON
//! lines on stdout. Logs go to stderr.

use tokio::io::{self, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tsukiyo_bot::bot::handlers::register_all_handlers;
use tsukiyo_bot::{bootstrap, BotConfig, Dispatcher, DocumentStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env()?;
    info!(target: "init", "Starting {} v{}", tsukiyo_bot::NAME, tsukiyo_bot::VERSION);
    if config.bot_token.is_none() {
        warn!(target: "init", "BOT_TOKEN is not set");
    }

    let store = DocumentStore::new(config.store_config());
    bootstrap(&store).await?;

    let mut dispatcher = Dispatcher::new();
    register_all_handlers(&mut dispatcher, store, &config);
    info!(target: "init", "Registered {} handlers", dispatcher.handler_count());

    dispatcher
        .run(BufReader::new(io::stdin()), io::stdout())
        .await?;

    info!(target: "init", "Event stream closed, shutting down");
    Ok(())
}
