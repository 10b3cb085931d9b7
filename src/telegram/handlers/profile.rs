//! Анкета нового пользователя, просмотр и редактирование профиля,
//! VIP-статус и баланс токенов.

use chrono::NaiveDateTime;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use super::types::{HandlerDeps, HandlerError};
use crate::core::error::DomainError;
use crate::core::types::Gender;
use crate::core::validation;
use crate::core::vip;
use crate::storage::db::get_connection;
use crate::storage::events::{self, Event};
use crate::storage::transactions;
use crate::storage::users::{self, User};
use crate::telegram::keyboards;
use crate::telegram::session::{DialogState, ProfileDraft};
use crate::telegram::texts;

pub(crate) fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Пользователь с заполненной анкетой, если она есть.
pub(crate) fn registered_user(deps: &HandlerDeps, chat_id: ChatId) -> Result<Option<User>, HandlerError> {
    let conn = get_connection(&deps.db_pool)?;
    Ok(users::get_user_by_telegram_id(&conn, chat_id.0)?)
}

/// Обработчик /start: главное меню для знакомых пользователей, анкета для
/// новых.
pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;

    if registered_user(deps, chat_id)?.is_some() {
        deps.sessions.clear(chat_id.0);
        show_main_menu(bot, chat_id).await?;
        return Ok(());
    }

    log::info!("New user {} started profile wizard", chat_id.0);
    deps.sessions
        .set(chat_id.0, DialogState::ProfileAwaitingCity(ProfileDraft::default()));

    bot.send_message(chat_id, texts::WELCOME).await?;
    bot.send_message(chat_id, "Выберите ваш город:")
        .reply_markup(keyboards::cities_keyboard("city"))
        .await?;
    Ok(())
}

/// Отправляет главное меню.
pub async fn show_main_menu(bot: &Bot, chat_id: ChatId) -> Result<(), HandlerError> {
    bot.send_message(chat_id, "Главное меню:")
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

/// Обработчик /profile: карточка профиля с рейтингом и балансом.
pub async fn handle_profile_command(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> Result<(), HandlerError> {
    match registered_user(deps, chat_id)? {
        Some(user) => show_profile(bot, chat_id, &user).await,
        None => {
            bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
                .await?;
            Ok(())
        }
    }
}

pub async fn show_profile(bot: &Bot, chat_id: ChatId, user: &User) -> Result<(), HandlerError> {
    let now = local_now();
    let vip_status = if user.is_vip(now) { "активен" } else { "нет" };
    let vip_until = user
        .vip_until
        .filter(|_| user.is_vip(now))
        .map(|until| until.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| "—".to_string());

    let text = format!(
        "<b>Ваш профиль</b>\n\n\
         <b>Имя:</b> {}\n\
         <b>Город:</b> {}\n\
         <b>Возраст:</b> {}\n\
         <b>Пол:</b> {}\n\
         <b>О себе:</b> {}\n\n\
         <b>Рейтинг:</b> {}\n\
         <b>Токены:</b> {}\n\
         <b>VIP-статус:</b> {}\n\
         <b>VIP до:</b> {}",
        user.display_name,
        user.city,
        user.age,
        user.gender.display_name(),
        user.about.as_deref().unwrap_or("—"),
        user.rating,
        user.tokens,
        vip_status,
        vip_until,
    );

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::profile_keyboard())
        .await?;
    Ok(())
}

/// Текстовый шаг анкеты или редактирования профиля.
///
/// Возвращает `true`, если текст относился к активному состоянию профиля
/// и был обработан.
pub async fn handle_profile_text(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    state: DialogState,
) -> Result<bool, HandlerError> {
    let chat_id = msg.chat.id;
    let text = msg.text().unwrap_or_default();

    match state {
        DialogState::ProfileAwaitingCity(mut draft) => match validation::validate_city(text) {
            Ok(city) => {
                draft.city = Some(city);
                deps.sessions.set(chat_id.0, DialogState::ProfileAwaitingName(draft));
                bot.send_message(chat_id, "Как вас называть? Введите имя:").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::ProfileAwaitingName(mut draft) => match validation::validate_display_name(text) {
            Ok(name) => {
                draft.display_name = Some(name);
                deps.sessions.set(chat_id.0, DialogState::ProfileAwaitingAge(draft));
                bot.send_message(chat_id, "Сколько вам лет?").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::ProfileAwaitingAge(mut draft) => match validation::validate_age(text) {
            Ok(age) => {
                draft.age = Some(age);
                deps.sessions.set(chat_id.0, DialogState::ProfileAwaitingGender(draft));
                bot.send_message(chat_id, "Укажите ваш пол:")
                    .reply_markup(keyboards::gender_keyboard())
                    .await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::ProfileAwaitingGender(_) => {
            bot.send_message(chat_id, "Пожалуйста, выберите пол кнопкой выше.")
                .await?;
        }
        DialogState::ProfileAwaitingAbout(mut draft) => match validation::validate_about(text) {
            Ok(about) => {
                draft.about = about;
                finish_profile_wizard(bot, msg, deps, draft).await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::EditingName => match validation::validate_display_name(text) {
            Ok(name) => {
                if let Some(user) = registered_user(deps, chat_id)? {
                    let conn = get_connection(&deps.db_pool)?;
                    users::update_user_display_name(&conn, user.id, &name)?;
                }
                deps.sessions.clear(chat_id.0);
                bot.send_message(chat_id, "Имя обновлено.").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::EditingCity => match validation::validate_city(text) {
            Ok(city) => {
                if let Some(user) = registered_user(deps, chat_id)? {
                    let conn = get_connection(&deps.db_pool)?;
                    users::update_user_city(&conn, user.id, &city)?;
                }
                deps.sessions.clear(chat_id.0);
                bot.send_message(chat_id, "Город обновлен.").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::EditingAge => match validation::validate_age(text) {
            Ok(age) => {
                if let Some(user) = registered_user(deps, chat_id)? {
                    let conn = get_connection(&deps.db_pool)?;
                    users::update_user_age(&conn, user.id, age)?;
                }
                deps.sessions.clear(chat_id.0);
                bot.send_message(chat_id, "Возраст обновлен.").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        DialogState::EditingAbout => match validation::validate_about(text) {
            Ok(about) => {
                if let Some(user) = registered_user(deps, chat_id)? {
                    let conn = get_connection(&deps.db_pool)?;
                    users::update_user_about(&conn, user.id, about.as_deref())?;
                }
                deps.sessions.clear(chat_id.0);
                bot.send_message(chat_id, "Информация о себе обновлена.").await?;
            }
            Err(e) => {
                bot.send_message(chat_id, e.to_string()).await?;
            }
        },
        _ => return Ok(false),
    }

    Ok(true)
}

async fn finish_profile_wizard(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    draft: ProfileDraft,
) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;

    // Все поля заполнены предыдущими шагами мастера
    let (Some(city), Some(name), Some(age), Some(gender)) =
        (draft.city, draft.display_name, draft.age, draft.gender)
    else {
        deps.sessions.clear(chat_id.0);
        bot.send_message(chat_id, "Анкета прервана. Отправьте /start, чтобы начать заново.")
            .await?;
        return Ok(());
    };

    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());
    let first_name = msg.from.as_ref().map(|u| u.first_name.as_str());
    let last_name = msg.from.as_ref().and_then(|u| u.last_name.as_deref());

    let conn = get_connection(&deps.db_pool)?;
    let user = users::create_user(
        &conn,
        chat_id.0,
        username,
        first_name,
        last_name,
        &city,
        &name,
        age,
        gender,
        draft.about.as_deref(),
    )?;
    deps.sessions.clear(chat_id.0);

    log::info!("Created profile for user {} in {}", user.telegram_id, user.city);
    bot.send_message(
        chat_id,
        format!("Анкета заполнена, {}! Добро пожаловать.", user.display_name),
    )
    .await?;
    show_main_menu(bot, chat_id).await
}

/// Callback выбора города (`city:<name>` или `city:other`) в анкете.
pub async fn on_city_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(DialogState::ProfileAwaitingCity(mut draft)) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };

    if value == "other" {
        bot.send_message(chat_id, "Введите название вашего города:").await?;
        return Ok(());
    }

    draft.city = Some(value.to_string());
    deps.sessions.set(chat_id.0, DialogState::ProfileAwaitingName(draft));
    bot.send_message(chat_id, "Как вас называть? Введите имя:").await?;
    Ok(())
}

/// Callback выбора пола (`gender:male` / `gender:female`) в анкете.
pub async fn on_gender_selected(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    value: &str,
) -> Result<(), HandlerError> {
    let Some(DialogState::ProfileAwaitingGender(mut draft)) = deps.sessions.get(chat_id.0) else {
        return Ok(());
    };

    let Ok(gender) = value.parse::<Gender>() else {
        return Ok(());
    };

    draft.gender = Some(gender);
    deps.sessions.set(chat_id.0, DialogState::ProfileAwaitingAbout(draft));
    bot.send_message(chat_id, "Расскажите о себе (или отправьте «-», чтобы пропустить):")
        .await?;
    Ok(())
}

/// Callback-действия меню профиля (`profile:<action>`).
pub async fn on_profile_action(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    action: &str,
) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
            .await?;
        return Ok(());
    };

    match action {
        "edit" => {
            bot.send_message(chat_id, "Что изменить?")
                .reply_markup(keyboards::edit_profile_keyboard())
                .await?;
        }
        "vip" => {
            let mut conn = get_connection(&deps.db_pool)?;
            match vip::purchase_vip(&mut conn, user.id, local_now()) {
                Ok(until) => {
                    bot.send_message(
                        chat_id,
                        format!(
                            "Поздравляем! Вы приобрели VIP-статус до {}.",
                            until.format("%d.%m.%Y")
                        ),
                    )
                    .await?;
                }
                Err(e @ DomainError::InsufficientTokens { .. }) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                    bot.send_message(chat_id, texts::VIP_INFO)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(keyboards::topup_keyboard())
                        .await?;
                }
                Err(e) => {
                    log::error!("VIP purchase failed for user {}: {}", user.id, e);
                    bot.send_message(chat_id, e.user_message()).await?;
                }
            }
        }
        "myevents" => {
            let conn = get_connection(&deps.db_pool)?;
            let created = events::list_events_by_creator(&conn, user.id)?
                .into_iter()
                .map(|event| {
                    let participants = events::list_participants(&conn, event.id)?;
                    Ok((event, participants))
                })
                .collect::<Result<Vec<_>, rusqlite::Error>>()?;
            let registrations = events::list_registered_events(&conn, user.id, local_now())?;

            bot.send_message(chat_id, my_events_overview(&created, &registrations))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        "topup" => {
            bot.send_message(chat_id, "Выберите сумму пополнения:")
                .reply_markup(keyboards::topup_keyboard())
                .await?;
        }
        "history" => {
            let conn = get_connection(&deps.db_pool)?;
            let entries = transactions::list_transactions(&conn, user.id, 10)?;
            if entries.is_empty() {
                bot.send_message(chat_id, "Операций пока не было.").await?;
            } else {
                let lines = entries
                    .iter()
                    .map(|t| format!("{:+} — {}", t.amount, t.description))
                    .collect::<Vec<_>>()
                    .join("\n");
                bot.send_message(chat_id, format!("Последние операции:\n{lines}"))
                    .await?;
            }
        }
        _ => {}
    }

    Ok(())
}

/// Сводка «Мои мероприятия»: созданные события с их участниками и
/// предстоящие записи пользователя.
fn my_events_overview(created: &[(Event, Vec<User>)], registrations: &[Event]) -> String {
    let mut sections = vec!["<b>Мои мероприятия</b>".to_string()];

    if created.is_empty() {
        sections.push("Вы пока не создали ни одного мероприятия.".to_string());
    } else {
        let lines = created
            .iter()
            .map(|(event, participants)| {
                let names = if participants.is_empty() {
                    "пока никого".to_string()
                } else {
                    participants
                        .iter()
                        .map(|p| p.display_name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!(
                    "• {} — {} (участники: {})",
                    event.title,
                    event.event_date.format("%d.%m.%Y %H:%M"),
                    names
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("<b>Созданные:</b>\n{lines}"));
    }

    if registrations.is_empty() {
        sections.push("Предстоящих записей нет.".to_string());
    } else {
        let lines = registrations
            .iter()
            .map(|event| {
                format!("• {} — {}", event.title, event.event_date.format("%d.%m.%Y %H:%M"))
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("<b>Мои записи:</b>\n{lines}"));
    }

    sections.join("\n\n")
}

/// Callback выбора поля для редактирования (`editprofile:<field>`).
pub async fn on_edit_profile_field(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    field: &str,
) -> Result<(), HandlerError> {
    let (state, prompt) = match field {
        "name" => (DialogState::EditingName, "Введите новое имя:"),
        "city" => (DialogState::EditingCity, "Введите новый город:"),
        "age" => (DialogState::EditingAge, "Введите ваш возраст:"),
        "about" => (
            DialogState::EditingAbout,
            "Расскажите о себе (или отправьте «-», чтобы очистить):",
        ),
        _ => return Ok(()),
    };

    deps.sessions.set(chat_id.0, state);
    bot.send_message(chat_id, prompt).await?;
    Ok(())
}

/// Callback пополнения баланса (`topup:<amount>`).
///
/// Платежная интеграция остается заглушкой: сумма зачисляется сразу, но
/// проходит через тот же сервисный слой и журнал операций.
pub async fn on_topup(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps, value: &str) -> Result<(), HandlerError> {
    let Some(user) = registered_user(deps, chat_id)? else {
        bot.send_message(chat_id, "Сначала заполните профиль: отправьте /start.")
            .await?;
        return Ok(());
    };

    let Ok(amount) = value.parse::<i64>() else {
        return Ok(());
    };
    if amount <= 0 {
        return Ok(());
    }

    let mut conn = get_connection(&deps.db_pool)?;
    match vip::top_up_tokens(&mut conn, user.id, amount, "Пополнение баланса") {
        Ok(()) => {
            bot.send_message(chat_id, format!("Баланс пополнен на {amount} токенов."))
                .await?;
        }
        Err(e) => {
            log::error!("Top-up failed for user {}: {}", user.id, e);
            bot.send_message(chat_id, e.user_message()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EventPurpose, TargetAudience};
    use crate::storage::events::{create_event, insert_participant_guarded};
    use crate::storage::migrations::run_migrations_for_test;
    use crate::storage::users::create_user;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations_for_test(&mut conn).unwrap();
        conn
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn make_user(conn: &Connection, telegram_id: i64, name: &str) -> User {
        create_user(conn, telegram_id, None, None, None, "Москва", name, 30, Gender::Male, None).unwrap()
    }

    #[test]
    fn test_my_events_overview_lists_created_and_registrations() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, "Алексей");
        let guest = make_user(&conn, 2, "Марина");

        let own = create_event(
            &conn,
            creator.id,
            "Прогулка в парке",
            "Москва",
            EventPurpose::Walk,
            TargetAudience::All,
            None,
            None,
            "Просто гуляем",
            now() + chrono::Duration::days(2),
            Some(10),
        )
        .unwrap();
        assert!(insert_participant_guarded(&conn, guest.id, own.id, now()).unwrap());

        let foreign = create_event(
            &conn,
            guest.id,
            "Настолки",
            "Москва",
            EventPurpose::Party,
            TargetAudience::All,
            None,
            None,
            "Вечер настольных игр",
            now() + chrono::Duration::days(5),
            None,
        )
        .unwrap();
        assert!(insert_participant_guarded(&conn, creator.id, foreign.id, now()).unwrap());

        let created = events::list_events_by_creator(&conn, creator.id)
            .unwrap()
            .into_iter()
            .map(|event| {
                let participants = events::list_participants(&conn, event.id).unwrap();
                (event, participants)
            })
            .collect::<Vec<_>>();
        let registrations = events::list_registered_events(&conn, creator.id, now()).unwrap();

        let text = my_events_overview(&created, &registrations);
        assert!(text.contains("<b>Созданные:</b>"));
        assert!(text.contains("Прогулка в парке"));
        assert!(text.contains("участники: Марина"));
        assert!(text.contains("<b>Мои записи:</b>"));
        assert!(text.contains("Настолки"));
    }

    #[test]
    fn test_my_events_overview_without_events() {
        let text = my_events_overview(&[], &[]);
        assert!(text.contains("Вы пока не создали ни одного мероприятия."));
        assert!(text.contains("Предстоящих записей нет."));
    }
}
