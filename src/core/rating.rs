//! Движок оценок: перевод баллов 1..=5 в изменение репутации.
//!
//! Влияние балла задается статической таблицей `config::rating::impact`.
//! Повторная оценка того же участника за то же мероприятие перезаписывает
//! балл, а к репутации применяется разница влияний нового и старого баллов,
//! так что итог эквивалентен одной оценке последним баллом.

use rusqlite::{Connection, TransactionBehavior};

use crate::core::config;
use crate::core::error::DomainError;
use crate::storage::ratings;
use crate::storage::users::{self, User};

/// Сохраняет оценку и применяет изменение репутации одним действием.
///
/// # Errors
///
/// * `InvalidScore` — балл вне 1..=5, ничего не записывается;
/// * `NotFound` — оцениваемый пользователь не существует;
/// * `Storage` — отказ базы, транзакция откачена целиком.
pub fn submit_rating(
    conn: &mut Connection,
    event_id: i64,
    rater_id: i64,
    rated_id: i64,
    score: u8,
    comment: Option<&str>,
) -> Result<(), DomainError> {
    if !(1..=5).contains(&score) {
        return Err(DomainError::InvalidScore(score));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if users::get_user_by_id(&tx, rated_id)?.is_none() {
        return Err(DomainError::NotFound);
    }

    let delta = match ratings::get_rating(&tx, event_id, rater_id, rated_id)? {
        Some(existing) => {
            ratings::update_rating_score(&tx, existing.id, score, comment)?;
            config::rating::impact(score) - config::rating::impact(existing.score)
        }
        None => {
            ratings::insert_rating(&tx, event_id, rater_id, rated_id, score, comment)?;
            config::rating::impact(score)
        }
    };

    if delta != 0 {
        users::adjust_rating(&tx, rated_id, delta)?;
    }

    tx.commit()?;
    log::info!(
        "User {} rated user {} with {} stars for event {} (delta {})",
        rater_id,
        rated_id,
        score,
        event_id,
        delta
    );
    Ok(())
}

/// Рабочий список мастера оценок: со-участники мероприятия, которых
/// оценивающий еще не оценил. Пустой список завершает сессию оценивания.
pub fn list_unrated_co_participants(
    conn: &Connection,
    event_id: i64,
    rater_id: i64,
) -> Result<Vec<User>, DomainError> {
    Ok(ratings::list_unrated_co_participants(conn, event_id, rater_id)?)
}
