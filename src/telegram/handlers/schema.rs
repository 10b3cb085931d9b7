//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChatKind, Message, ParseMode};

use super::events::{
    handle_create_command, handle_event_text, handle_events_command, on_age_limits_selected,
    on_audience_selected, on_browse_city_selected, on_create_city_selected, on_event_confirmation,
    on_purpose_selected, on_register, on_rules_agreed, on_unregister,
};
use super::profile::{
    handle_profile_command, handle_profile_text, handle_start_command, on_city_selected,
    on_edit_profile_field, on_gender_selected, on_profile_action, on_topup,
};
use super::ratings::{handle_rate_command, on_rate_event_selected, on_stars_selected};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::texts;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The same schema is used in production and can be used in
/// integration tests.
///
/// # Arguments
/// * `deps` - Handler dependencies (database pool, session store, bot identity)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_callback = deps.clone();
    let deps_text = deps.clone();

    dptree::entry()
        // Command handler
        .branch(command_handler(deps_commands))
        // Callback query handler (inline keyboards)
        .branch(callback_handler(deps_callback))
        // Text handler feeding the active wizard
        .branch(text_handler(deps_text))
}

/// Handler for bot commands (/start, /profile, /create, /events, /rate, /help)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => {
                        handle_start_command(&bot, &msg, &deps).await?;
                    }
                    Command::Profile => {
                        handle_profile_command(&bot, msg.chat.id, &deps).await?;
                    }
                    Command::Create => {
                        handle_create_command(&bot, msg.chat.id, &deps).await?;
                    }
                    Command::Events => {
                        handle_events_command(&bot, msg.chat.id, &deps).await?;
                    }
                    Command::Rate => {
                        handle_rate_command(&bot, msg.chat.id, &deps).await?;
                    }
                    Command::Help => {
                        bot.send_message(msg.chat.id, texts::HELP).await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for callback queries (inline keyboard buttons)
///
/// Callback data follows the `prefix:value` convention; unknown prefixes
/// are answered and ignored.
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let callback_id = q.id.clone();
            let _ = bot.answer_callback_query(callback_id).await;

            let Some(data) = q.data else {
                return Ok(());
            };
            let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
                return Ok(());
            };

            let (prefix, value) = data.split_once(':').unwrap_or((data.as_str(), ""));
            log::debug!("Callback {}:{} from chat {}", prefix, value, chat_id);

            if let Err(e) = route_callback(&bot, chat_id, &deps, prefix, value).await {
                log::error!("Callback {}:{} failed for chat {}: {}", prefix, value, chat_id, e);
                let _ = bot
                    .send_message(chat_id, "Произошла ошибка. Попробуйте позже.")
                    .await;
            }
            Ok(())
        }
    })
}

async fn route_callback(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    prefix: &str,
    value: &str,
) -> Result<(), HandlerError> {
    match prefix {
        "menu" => match value {
            "profile" => handle_profile_command(bot, chat_id, deps).await?,
            "create" => handle_create_command(bot, chat_id, deps).await?,
            "events" => handle_events_command(bot, chat_id, deps).await?,
            "rate" => handle_rate_command(bot, chat_id, deps).await?,
            "rules_creation" => {
                bot.send_message(chat_id, texts::CREATION_RULES)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
            "rules_registration" => {
                bot.send_message(chat_id, texts::REGISTRATION_RULES)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
            "rating_info" => {
                bot.send_message(chat_id, texts::RATING_INFO)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
            _ => {}
        },
        "city" => on_city_selected(bot, chat_id, deps, value).await?,
        "gender" => on_gender_selected(bot, chat_id, deps, value).await?,
        "profile" => on_profile_action(bot, chat_id, deps, value).await?,
        "editprofile" => on_edit_profile_field(bot, chat_id, deps, value).await?,
        "topup" => on_topup(bot, chat_id, deps, value).await?,
        "rules" if value == "agree" => on_rules_agreed(bot, chat_id, deps).await?,
        "eventcity" => on_browse_city_selected(bot, chat_id, deps, value).await?,
        "createcity" => on_create_city_selected(bot, chat_id, deps, value).await?,
        "purpose" => on_purpose_selected(bot, chat_id, deps, value).await?,
        "audience" => on_audience_selected(bot, chat_id, deps, value).await?,
        "agelimit" => on_age_limits_selected(bot, chat_id, deps, value).await?,
        "confirm" => on_event_confirmation(bot, chat_id, deps, value).await?,
        "register" => on_register(bot, chat_id, deps, value).await?,
        "unregister" => on_unregister(bot, chat_id, deps, value).await?,
        "rateevent" => on_rate_event_selected(bot, chat_id, deps, value).await?,
        "ratestars" => on_stars_selected(bot, chat_id, deps, value).await?,
        _ => {
            log::warn!("Unknown callback prefix: {}", prefix);
        }
    }
    Ok(())
}

/// Handler for plain text messages: feeds the active wizard step, if any.
fn text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            matches!(msg.chat.kind, ChatKind::Private(_))
                && msg.text().map(|t| !t.starts_with('/')).unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(state) = deps.sessions.get(msg.chat.id.0) else {
                    bot.send_message(msg.chat.id, "Не понимаю. Отправьте /help, чтобы посмотреть команды.")
                        .await?;
                    return Ok(());
                };

                if handle_profile_text(&bot, &msg, &deps, state.clone()).await? {
                    return Ok(());
                }
                if handle_event_text(&bot, &msg, &deps, state).await? {
                    return Ok(());
                }

                // Состояние есть, но текст на этом шаге не ожидается
                bot.send_message(msg.chat.id, "Пожалуйста, используйте кнопки выше.")
                    .await?;
                Ok(())
            }
        })
}
