//! Журнал регистраций: запись и отмена участия в мероприятиях.
//!
//! Все проверки и вставка выполняются внутри одной IMMEDIATE-транзакции,
//! чтобы конкурирующие регистрации на последнее место не прошли обе.

use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};

use crate::core::error::DomainError;
use crate::storage::events::{self, Event};
use crate::storage::users;

/// Регистрирует пользователя на мероприятие.
///
/// Порядок отказов фиксированный: мероприятие не найдено, мероприятие
/// заполнено, пользователь не найден, собственное мероприятие, возраст,
/// пол, повторная регистрация. Финальная вставка условная, поэтому
/// проигравший гонку за последнее место получает `Full`, а не лишнюю
/// строку в журнале.
pub fn register_for_event(
    conn: &mut Connection,
    user_id: i64,
    event_id: i64,
    now: NaiveDateTime,
) -> Result<(), DomainError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let event = events::get_event_by_id(&tx, event_id)?.ok_or(DomainError::NotFound)?;

    let count = events::participant_count(&tx, event_id)?;
    if event.is_full(count) {
        return Err(DomainError::Full);
    }

    let user = users::get_user_by_id(&tx, user_id)?.ok_or(DomainError::NotFound)?;

    event.registration_check(&user)?;

    if events::is_participant(&tx, user_id, event_id)? {
        return Err(DomainError::AlreadyRegistered);
    }

    if !events::insert_participant_guarded(&tx, user_id, event_id, now)? {
        return Err(DomainError::Full);
    }

    tx.commit()?;
    log::info!("User {} registered for event {}", user_id, event_id);
    Ok(())
}

/// Отменяет регистрацию пользователя на мероприятие.
///
/// Место освобождается сразу и может быть занято другим участником.
pub fn unregister_from_event(
    conn: &mut Connection,
    user_id: i64,
    event_id: i64,
) -> Result<(), DomainError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if events::get_event_by_id(&tx, event_id)?.is_none() {
        return Err(DomainError::NotFound);
    }

    if !events::delete_participant(&tx, user_id, event_id)? {
        return Err(DomainError::NotRegistered);
    }

    tx.commit()?;
    log::info!("User {} unregistered from event {}", user_id, event_id);
    Ok(())
}

/// Каталог предстоящих мероприятий города.
pub fn list_events_by_city(
    conn: &Connection,
    city: &str,
    now: NaiveDateTime,
) -> Result<Vec<Event>, DomainError> {
    Ok(events::list_events_by_city(conn, city, now)?)
}

/// Прошедшие мероприятия пользователя, доступные для выставления оценок.
pub fn list_pending_rating_events(
    conn: &Connection,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<Vec<Event>, DomainError> {
    Ok(events::list_attended_past_events(conn, user_id, now)?)
}
