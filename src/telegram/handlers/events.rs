//! Создание мероприятий и каталог по городу: мастер создания, просмотр,
//! запись и отмена записи.

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use super::profile::{local_now, registered_user};
use super::types::{HandlerDeps, HandlerError};
use crate::core::config;
use crate::core::registration;
use crate::core::types::{EventPurpose, TargetAudience};
use crate::core::validation;
use crate::storage::db::get_connection;
use crate::storage::events::{self, Event};
use crate::telegram::keyboards;
use crate::telegram::session::{DialogState, EventDraft};
use crate::telegram::texts;

/// Обработчик /create: проверка рейтинга и согласие с правилами.
pub async fn handle_create_command(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
            .await?;
        return Ok(());
    };

    if !user.can_create_events() {
        bot.send_message(
            chat_id,
            format!(
                "Ваш рейтинг ({}) ниже порога для создания мероприятий ({}).",
                user.rating,
                *config::rating::MIN_RATING_TO_CREATE
            ),
        )
        .await?;
        return Ok(());
    }

    deps.sessions.set(chat_id.0, DialogState::EventAwaitingRules);
    bot.send_message(chat_id, texts::CREATE_INTRO).await?;
    bot.send_message(chat_id, texts::CREATION_RULES)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::rules_agreement_keyboard())
        .await?;
    Ok(())
}

/// Callback согласия с правилами (`rules:agree`).
pub async fn on_rules_agreed(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(DialogState::EventAwaitingRules) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };
    let Some(user) = registered_user(deps, chat_id)? else {
        return Ok(());
    };

    deps.sessions
        .set(chat_id.0, DialogState::EventAwaitingCity(EventDraft::default()));
    bot.send_message(
        chat_id,
        format!(
            "Выберите город проведения мероприятия.\nПо умолчанию — ваш город: {}",
            user.city
        ),
    )
    .reply_markup(keyboards::cities_keyboard_with_current("createcity", &user.city))
    .await?;
    Ok(())
}

/// Callback выбора города мероприятия (`createcity:<name>` или
/// `createcity:other`).
pub async fn on_create_city_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(DialogState::EventAwaitingCity(mut draft)) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };

    if value == "other" {
        bot.send_message(chat_id, "Введите название города:").await?;
        return Ok(());
    }

    draft.city = Some(value.to_string());
    deps.sessions.set(chat_id.0, DialogState::EventAwaitingTitle(draft));
    bot.send_message(chat_id, "Введите название мероприятия:").await?;
    Ok(())
}

/// Текстовый шаг мастера создания мероприятия.
///
/// Возвращает `true`, если текст относился к активному состоянию мастера.
pub async fn handle_event_text(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    state: DialogState,
) -> Result<bool, HandlerError> {
    let chat_id = msg.chat.id;
    let text = msg.text().unwrap_or_default();

    match state {
        DialogState::BrowseAwaitingCity => match validation::validate_city(text) {
            Ok(city) => {
                deps.sessions.clear(chat_id.0);
                if let Some(user) = registered_user(deps, chat_id)? {
                    show_city_events(bot, chat_id, deps, &user, &city).await?;
                }
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::EventAwaitingCity(mut draft) => match validation::validate_city(text) {
            Ok(city) => {
                draft.city = Some(city);
                deps.sessions.set(chat_id.0, DialogState::EventAwaitingTitle(draft));
                bot.send_message(chat_id, "Введите название мероприятия:").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::EventAwaitingTitle(mut draft) => match validation::validate_event_title(text) {
            Ok(title) => {
                draft.title = Some(title);
                deps.sessions.set(chat_id.0, DialogState::EventAwaitingDescription(draft));
                bot.send_message(chat_id, "Введите описание мероприятия:").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::EventAwaitingDescription(mut draft) => {
            match validation::validate_event_description(text) {
                Ok(description) => {
                    draft.description = Some(description);
                    deps.sessions.set(chat_id.0, DialogState::EventAwaitingDate(draft));
                    bot.send_message(
                        chat_id,
                        "Укажите дату и время в формате ДД.ММ.ГГГГ ЧЧ:ММ, например: 15.06.2025 18:00",
                    )
                    .await?;
                }
                Err(e) => {
                    bot.send_message(chat_id, e.to_string()).await?;
                }
            }
        }
        DialogState::EventAwaitingDate(mut draft) => {
            match validation::validate_event_datetime(text, local_now()) {
                Ok(event_date) => {
                    draft.event_date = Some(event_date);
                    deps.sessions.set(chat_id.0, DialogState::EventAwaitingPurpose(draft));
                    bot.send_message(chat_id, "Выберите цель мероприятия:")
                        .reply_markup(keyboards::purpose_keyboard())
                        .await?;
                }
                Err(e) => {
                    bot.send_message(chat_id, e.to_string()).await?;
                }
            }
        }
        DialogState::EventAwaitingCustomAgeLimits(mut draft) => match parse_age_range(text) {
            Some((min, max)) => {
                draft.min_age = Some(min);
                draft.max_age = Some(max);
                deps.sessions
                    .set(chat_id.0, DialogState::EventAwaitingMaxParticipants(draft));
                ask_max_participants(bot, chat_id).await?;
            }
            None => {
                bot.send_message(
                    chat_id,
                    "Укажите диапазон в формате МИН-МАКС, например: 18-30.",
                )
                .await?;
            }
        },
        DialogState::EventAwaitingMaxParticipants(mut draft) => {
            match validation::validate_max_participants(text) {
                Ok(max) => {
                    draft.max_participants = max;
                    let summary = draft_summary(&draft);
                    deps.sessions
                        .set(chat_id.0, DialogState::EventAwaitingConfirmation(draft));
                    bot.send_message(chat_id, summary)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(keyboards::confirmation_keyboard())
                        .await?;
                }
                Err(e) => {
                    bot.send_message(chat_id, e.to_string()).await?;
                }
            }
        }
        _ => return Ok(false),
    }

    Ok(true)
}

/// Callback выбора цели (`purpose:<value>`).
pub async fn on_purpose_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(DialogState::EventAwaitingPurpose(mut draft)) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };
    let Ok(purpose) = value.parse::<EventPurpose>() else {
        return Ok(());
    };

    draft.purpose = Some(purpose);
    deps.sessions.set(chat_id.0, DialogState::EventAwaitingAudience(draft));
    bot.send_message(chat_id, "Для кого это мероприятие?")
        .reply_markup(keyboards::audience_keyboard())
        .await?;
    Ok(())
}

/// Callback выбора аудитории (`audience:<value>`).
pub async fn on_audience_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(DialogState::EventAwaitingAudience(mut draft)) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };
    let Ok(audience) = value.parse::<TargetAudience>() else {
        return Ok(());
    };

    draft.target_audience = Some(audience);
    deps.sessions.set(chat_id.0, DialogState::EventAwaitingAgeLimits(draft));
    bot.send_message(chat_id, "Возрастные ограничения:")
        .reply_markup(keyboards::age_limits_keyboard())
        .await?;
    Ok(())
}

/// Callback возрастных ограничений (`agelimit:<value>`).
pub async fn on_age_limits_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(DialogState::EventAwaitingAgeLimits(mut draft)) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };

    match value {
        "none" => {
            draft.min_age = None;
            draft.max_age = None;
        }
        "18plus" => {
            draft.min_age = Some(18);
            draft.max_age = None;
        }
        "21plus" => {
            draft.min_age = Some(21);
            draft.max_age = None;
        }
        "custom" => {
            deps.sessions
                .set(chat_id.0, DialogState::EventAwaitingCustomAgeLimits(draft));
            bot.send_message(chat_id, "Укажите диапазон в формате МИН-МАКС, например: 18-30.")
                .await?;
            return Ok(());
        }
        _ => return Ok(()),
    }

    deps.sessions
        .set(chat_id.0, DialogState::EventAwaitingMaxParticipants(draft));
    ask_max_participants(bot, chat_id).await?;
    Ok(())
}

/// Callback подтверждения создания (`confirm:yes` / `confirm:no`).
pub async fn on_event_confirmation(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(DialogState::EventAwaitingConfirmation(draft)) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };

    deps.sessions.clear(chat_id.0);

    if value != "yes" {
        bot.send_message(chat_id, "Создание мероприятия отменено.").await?;
        return Ok(());
    }

    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
            .await?;
        return Ok(());
    };

    // Все поля заполнены предыдущими шагами мастера
    let (Some(city), Some(title), Some(description), Some(event_date), Some(purpose), Some(audience)) = (
        draft.city.clone(),
        draft.title.clone(),
        draft.description.clone(),
        draft.event_date,
        draft.purpose,
        draft.target_audience,
    ) else {
        bot.send_message(chat_id, "Мастер прерван. Отправьте /create, чтобы начать заново.")
            .await?;
        return Ok(());
    };

    let conn = get_connection(&deps.db_pool)?;
    let event = events::create_event(
        &conn,
        user.id,
        &title,
        &city,
        purpose,
        audience,
        draft.min_age,
        draft.max_age,
        &description,
        event_date,
        draft.max_participants,
    )?;

    log::info!("User {} created event {} ({})", user.id, event.id, event.title);
    bot.send_message(
        chat_id,
        format!(
            "Мероприятие «{}» создано на {}.\nУчастники из города {} увидят его в каталоге.",
            event.title,
            event.event_date.format("%d.%m.%Y %H:%M"),
            event.city
        ),
    )
    .await?;
    Ok(())
}

/// Обработчик /events: сначала выбор города, по умолчанию — город профиля.
pub async fn handle_events_command(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
            .await?;
        return Ok(());
    };

    if !user.can_view_events() {
        bot.send_message(chat_id, "Ваш рейтинг слишком низкий для просмотра мероприятий.")
            .await?;
        return Ok(());
    }

    bot.send_message(
        chat_id,
        format!(
            "Выберите город для просмотра мероприятий.\nПо умолчанию — ваш город: {}",
            user.city
        ),
    )
    .reply_markup(keyboards::cities_keyboard_with_current("eventcity", &user.city))
    .await?;
    Ok(())
}

/// Callback выбора города каталога (`eventcity:<name>` или `eventcity:other`).
pub async fn on_browse_city_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        return Ok(());
    };

    if value == "other" {
        deps.sessions.set(chat_id.0, DialogState::BrowseAwaitingCity);
        bot.send_message(chat_id, "Введите название города:").await?;
        return Ok(());
    }

    show_city_events(bot, chat_id, deps, &user, value).await
}

/// Каталог предстоящих мероприятий выбранного города.
async fn show_city_events(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    user: &crate::storage::users::User,
    city: &str,
) -> Result<(), HandlerError> {
    let conn = get_connection(&deps.db_pool)?;
    let catalog = registration::list_events_by_city(&conn, city, local_now())?;

    if catalog.is_empty() {
        bot.send_message(
            chat_id,
            format!("В городе {city} пока нет предстоящих мероприятий."),
        )
        .await?;
        return Ok(());
    }

    bot.send_message(chat_id, format!("Мероприятия в городе {city}:")).await?;

    for event in &catalog {
        let count = events::participant_count(&conn, event.id)?;
        let is_registered = events::is_participant(&conn, user.id, event.id)?;
        bot.send_message(chat_id, event_card(event, count))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::event_actions_keyboard(event.id, is_registered))
            .await?;
    }
    Ok(())
}

/// Callback записи на мероприятие (`register:<event_id>`).
pub async fn on_register(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps, value: &str) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
            .await?;
        return Ok(());
    };
    let Ok(event_id) = value.parse::<i64>() else {
        return Ok(());
    };

    let mut conn = get_connection(&deps.db_pool)?;
    match registration::register_for_event(&mut conn, user.id, event_id, local_now()) {
        Ok(()) => {
            bot.send_message(chat_id, "Вы зарегистрированы на мероприятие!")
                .await?;
        }
        Err(e) => {
            bot.send_message(chat_id, e.user_message()).await?;
        }
    }
    Ok(())
}

/// Callback отмены записи (`unregister:<event_id>`).
pub async fn on_unregister(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps, value: &str) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
            .await?;
        return Ok(());
    };
    let Ok(event_id) = value.parse::<i64>() else {
        return Ok(());
    };

    let mut conn = get_connection(&deps.db_pool)?;
    match registration::unregister_from_event(&mut conn, user.id, event_id) {
        Ok(()) => {
            bot.send_message(chat_id, "Запись на мероприятие отменена.").await?;
        }
        Err(e) => {
            bot.send_message(chat_id, e.user_message()).await?;
        }
    }
    Ok(())
}

async fn ask_max_participants(bot: &Bot, chat_id: ChatId) -> Result<(), HandlerError> {
    bot.send_message(
        chat_id,
        "Максимальное количество участников (0 — без ограничения):",
    )
    .await?;
    Ok(())
}

fn parse_age_range(text: &str) -> Option<(u32, u32)> {
    let (min, max) = text.trim().split_once('-')?;
    let min: u32 = min.trim().parse().ok()?;
    let max: u32 = max.trim().parse().ok()?;
    if min > max || max > crate::core::config::moderation::MAX_USER_AGE {
        return None;
    }
    Some((min, max))
}

fn draft_summary(draft: &EventDraft) -> String {
    let age_limits = match (draft.min_age, draft.max_age) {
        (Some(min), Some(max)) => format!("{min}-{max}"),
        (Some(min), None) => format!("{min}+"),
        _ => "без ограничений".to_string(),
    };
    let max_participants = draft
        .max_participants
        .map(|n| n.to_string())
        .unwrap_or_else(|| "без ограничения".to_string());

    format!(
        "<b>Проверьте данные мероприятия</b>\n\n\
         <b>Город:</b> {}\n\
         <b>Название:</b> {}\n\
         <b>Описание:</b> {}\n\
         <b>Дата и время:</b> {}\n\
         <b>Цель:</b> {}\n\
         <b>Аудитория:</b> {}\n\
         <b>Возраст:</b> {}\n\
         <b>Максимум участников:</b> {}",
        draft.city.as_deref().unwrap_or("—"),
        draft.title.as_deref().unwrap_or("—"),
        draft.description.as_deref().unwrap_or("—"),
        draft
            .event_date
            .map(|d| d.format("%d.%m.%Y %H:%M").to_string())
            .unwrap_or_else(|| "—".to_string()),
        draft.purpose.map(|p| p.display_name().to_string()).unwrap_or_else(|| "—".to_string()),
        draft
            .target_audience
            .map(|a| a.display_name().to_string())
            .unwrap_or_else(|| "—".to_string()),
        age_limits,
        max_participants,
    )
}

fn event_card(event: &Event, participant_count: u32) -> String {
    let capacity = match event.max_participants {
        Some(max) => format!("{participant_count}/{max}"),
        None => format!("{participant_count} (без лимита)"),
    };
    let age_limits = match (event.min_age, event.max_age) {
        (Some(min), Some(max)) => format!("{min}-{max}"),
        (Some(min), None) => format!("{min}+"),
        (None, Some(max)) => format!("до {max}"),
        (None, None) => "без ограничений".to_string(),
    };

    format!(
        "<b>{}</b>\n\n\
         {}\n\n\
         <b>Когда:</b> {}\n\
         <b>Цель:</b> {}\n\
         <b>Аудитория:</b> {}\n\
         <b>Возраст:</b> {}\n\
         <b>Участники:</b> {}",
        event.title,
        event.description,
        event.event_date.format("%d.%m.%Y %H:%M"),
        event.purpose.display_name(),
        event.target_audience.display_name(),
        age_limits,
        capacity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_summary_shows_selected_city() {
        let draft = EventDraft {
            city: Some("Казань".to_string()),
            title: Some("Прогулка".to_string()),
            ..EventDraft::default()
        };
        let summary = draft_summary(&draft);
        assert!(summary.contains("<b>Город:</b> Казань"));
        assert!(summary.contains("Прогулка"));
    }

    #[test]
    fn test_parse_age_range() {
        assert_eq!(parse_age_range("18-30"), Some((18, 30)));
        assert_eq!(parse_age_range(" 21 - 45 "), Some((21, 45)));
        assert_eq!(parse_age_range("30-18"), None);
        assert_eq!(parse_age_range("18"), None);
        assert_eq!(parse_age_range("18-200"), None);
    }
}
