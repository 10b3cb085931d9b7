//! Bot initialization and command definitions
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command registration in the Telegram UI

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "мой профиль")]
    Profile,
    #[command(description = "создать мероприятие")]
    Create,
    #[command(description = "мероприятия моего города")]
    Events,
    #[command(description = "оценить участников прошедших мероприятий")]
    Rate,
    #[command(description = "справка")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// The token comes from `config::BOT_TOKEN`, the same value the startup
/// check validates.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, network issues, etc.)
pub fn create_bot() -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;

    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::with_client(config::BOT_TOKEN.clone(), client).set_api_url(url)
    } else {
        Bot::with_client(config::BOT_TOKEN.clone(), client)
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// # Arguments
/// * `bot` - Bot instance to configure
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "начать работу с ботом"),
        BotCommand::new("profile", "мой профиль"),
        BotCommand::new("create", "создать мероприятие"),
        BotCommand::new("events", "мероприятия моего города"),
        BotCommand::new("rate", "оценить участников прошедших мероприятий"),
        BotCommand::new("help", "справка"),
    ])
    .await?;

    Ok(())
}
