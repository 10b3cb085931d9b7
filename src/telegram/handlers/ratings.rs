//! Выставление оценок со-участникам прошедших мероприятий.
//!
//! Цикл мастера: выбрать мероприятие, затем оценивать участников по одному,
//! пока рабочий список не опустеет. Список каждый раз пересчитывается из
//! базы, поэтому перезапуск бота не теряет прогресс.

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use super::profile::{local_now, registered_user};
use super::types::{HandlerDeps, HandlerError};
use crate::core::rating;
use crate::core::registration;
use crate::storage::db::get_connection;
use crate::telegram::keyboards;

/// Обработчик /rate: список прошедших мероприятий пользователя.
pub async fn handle_rate_command(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(
            chat_id,
            "Для оценки участников необходимо сначала заполнить профиль. Отправьте /start.",
        )
        .await?;
        return Ok(());
    };

    let conn = get_connection(&deps.db_pool)?;
    let attended = registration::list_pending_rating_events(&conn, user.id, local_now())?;

    if attended.is_empty() {
        bot.send_message(
            chat_id,
            "У вас нет мероприятий для оценки. Оценивать можно участников уже прошедших мероприятий.",
        )
        .await?;
        return Ok(());
    }

    bot.send_message(chat_id, "Выберите мероприятие для оценки участников:")
        .reply_markup(keyboards::rating_events_keyboard(&attended))
        .await?;
    Ok(())
}

/// Callback выбора мероприятия (`rateevent:<event_id>`).
pub async fn on_rate_event_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        return Ok(());
    };
    let Ok(event_id) = value.parse::<i64>() else {
        return Ok(());
    };

    prompt_next_unrated(bot, chat_id, deps, event_id, user.id).await
}

/// Callback оценки (`ratestars:<event_id>:<rated_id>:<score>`).
pub async fn on_stars_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        return Ok(());
    };

    let mut parts = value.splitn(3, ':');
    let (Some(event_id), Some(rated_id), Some(score)) = (parts.next(), parts.next(), parts.next()) else {
        return Ok(());
    };
    let (Ok(event_id), Ok(rated_id), Ok(score)) =
        (event_id.parse::<i64>(), rated_id.parse::<i64>(), score.parse::<u8>())
    else {
        return Ok(());
    };

    let mut conn = get_connection(&deps.db_pool)?;
    match rating::submit_rating(&mut conn, event_id, user.id, rated_id, score, None) {
        Ok(()) => {
            bot.send_message(chat_id, format!("Спасибо за оценку! Вы поставили {score} звезд."))
                .await?;
        }
        Err(e) => {
            bot.send_message(chat_id, e.user_message()).await?;
        }
    }
    drop(conn);

    prompt_next_unrated(bot, chat_id, deps, event_id, user.id).await
}

/// Показывает следующего неоцененного со-участника или завершает цикл.
async fn prompt_next_unrated(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    event_id: i64,
    rater_id: i64,
) -> Result<(), HandlerError> {
    let conn = get_connection(&deps.db_pool)?;
    let worklist = rating::list_unrated_co_participants(&conn, event_id, rater_id)?;

    match worklist.first() {
        Some(next) => {
            bot.send_message(
                chat_id,
                format!(
                    "Оцените участника <b>{}</b> по шкале от 1 до 5 звезд:",
                    next.display_name
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::stars_keyboard(event_id, next.id))
            .await?;
        }
        None => {
            bot.send_message(chat_id, "Вы оценили всех участников этого мероприятия. Спасибо!")
                .await?;
        }
    }
    Ok(())
}
