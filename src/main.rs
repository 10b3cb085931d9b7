use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;

use yasami::cli::{Cli, Commands};
use yasami::core::config;
use yasami::core::logging::{init_logger, log_startup_configuration};
use yasami::storage::db::create_pool;
use yasami::telegram::session::SessionStore;
use yasami::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up global panic handler to catch panics in dispatcher
    // This allows us to log the panic instead of silently terminating
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger()?;

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Migrate) => run_migrations(),
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Apply database migrations and exit
fn run_migrations() -> Result<()> {
    log::info!("Applying migrations to {}", config::DATABASE_PATH.as_str());
    // Pool creation runs embedded migrations on the first connection
    let _pool = create_pool(&config::DATABASE_PATH)?;
    log::info!("Migrations applied");
    Ok(())
}

/// Run the bot in long polling mode
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration();

    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }

    let bot = create_bot()?;

    // Get bot information; retry if the Bot API is still initializing
    let bot_info = {
        let max_retries = 12;
        let mut retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    retry += 1;
                    if retry >= max_retries {
                        return Err(anyhow::anyhow!("Failed to connect to Bot API after {} retries: {}", retry, e));
                    }
                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                        retry,
                        max_retries,
                        e
                    );
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    let bot_username = bot_info.username.clone();
    let bot_id = bot_info.id;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, bot_id);

    setup_bot_commands(&bot).await?;

    // Create database connection pool (runs migrations)
    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH)
            .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );

    let sessions = Arc::new(SessionStore::new());

    let handler_deps = HandlerDeps::new(Arc::clone(&db_pool), Arc::clone(&sessions), bot_username, bot_id);
    let handler = schema(handler_deps);

    log::info!("Starting bot in long polling mode");

    // Drop pending updates on start so a restart does not replay old wizards
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
