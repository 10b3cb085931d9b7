//! Доступ к таблицам `events` и `event_participants` (журнал регистраций).

use chrono::NaiveDateTime;
use rusqlite::{Connection, Result};

use crate::core::error::DomainError;
use crate::core::types::{EventPurpose, TargetAudience};
use crate::storage::db::{fmt_ts, parse_ts};
use crate::storage::users::User;

/// Структура, представляющая мероприятие в базе данных.
#[derive(Debug, Clone)]
pub struct Event {
    /// Внутренний ID (первичный ключ)
    pub id: i64,
    /// ID создателя (users.id)
    pub creator_id: i64,
    /// Название мероприятия
    pub title: String,
    /// Город проведения
    pub city: String,
    /// Цель мероприятия
    pub purpose: EventPurpose,
    /// Целевая аудитория
    pub target_audience: TargetAudience,
    /// Минимальный возраст участников (None — без ограничения)
    pub min_age: Option<u32>,
    /// Максимальный возраст участников (None — без ограничения)
    pub max_age: Option<u32>,
    /// Описание
    pub description: String,
    /// Дата и время проведения
    pub event_date: NaiveDateTime,
    /// Максимум участников (None — без лимита)
    pub max_participants: Option<u32>,
    /// Скрыто ли мероприятие из каталога
    pub is_hidden: bool,
    /// Дата создания записи
    pub created_at: Option<NaiveDateTime>,
}

impl Event {
    /// Заполнено ли мероприятие при `count` текущих участниках.
    pub fn is_full(&self, count: u32) -> bool {
        match self.max_participants {
            Some(max) => count >= max,
            None => false,
        }
    }

    /// Проверяет соответствие пользователя ограничениям мероприятия.
    ///
    /// Возвращает первый нарушенный критерий: собственное мероприятие,
    /// возраст, затем пол. В `IneligibleAge` выставляется только
    /// нарушенная граница, чтобы сообщение пользователю называло именно ее.
    pub fn registration_check(&self, user: &User) -> std::result::Result<(), DomainError> {
        if user.id == self.creator_id {
            return Err(DomainError::OwnEvent);
        }

        if let Some(min) = self.min_age {
            if user.age < min {
                return Err(DomainError::IneligibleAge {
                    min_age: Some(min),
                    max_age: None,
                });
            }
        }
        if let Some(max) = self.max_age {
            if user.age > max {
                return Err(DomainError::IneligibleAge {
                    min_age: None,
                    max_age: Some(max),
                });
            }
        }

        if !self.target_audience.admits(user.gender) {
            return Err(DomainError::IneligibleGender);
        }

        Ok(())
    }
}

const EVENT_COLUMNS: &str = "id, creator_id, title, city, purpose, target_audience, min_age, \
                             max_age, description, event_date, max_participants, is_hidden, created_at";

fn row_to_event(row: &rusqlite::Row<'_>) -> Result<Event> {
    let event_date: String = row.get(9)?;
    Ok(Event {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        title: row.get(2)?,
        city: row.get(3)?,
        purpose: row.get(4)?,
        target_audience: row.get(5)?,
        min_age: row.get(6)?,
        max_age: row.get(7)?,
        description: row.get(8)?,
        event_date: parse_ts(&event_date).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                9,
                rusqlite::types::Type::Text,
                format!("bad event_date: {event_date}").into(),
            )
        })?,
        max_participants: row.get(10)?,
        is_hidden: row.get::<_, i64>(11)? != 0,
        created_at: row.get::<_, Option<String>>(12)?.as_deref().and_then(parse_ts),
    })
}

/// Создает мероприятие.
///
/// # Returns
///
/// Возвращает созданное мероприятие (перечитанное из базы).
#[allow(clippy::too_many_arguments)]
pub fn create_event(
    conn: &Connection,
    creator_id: i64,
    title: &str,
    city: &str,
    purpose: EventPurpose,
    target_audience: TargetAudience,
    min_age: Option<u32>,
    max_age: Option<u32>,
    description: &str,
    event_date: NaiveDateTime,
    max_participants: Option<u32>,
) -> Result<Event> {
    conn.execute(
        "INSERT INTO events (creator_id, title, city, purpose, target_audience, min_age, max_age, description, event_date, max_participants)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            creator_id,
            title,
            city,
            purpose,
            target_audience,
            min_age,
            max_age,
            description,
            fmt_ts(event_date),
            max_participants,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_event_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Получает мероприятие по ID.
pub fn get_event_by_id(conn: &Connection, id: i64) -> Result<Option<Event>> {
    let mut stmt = conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"))?;
    let mut rows = stmt.query_map([id], row_to_event)?;

    rows.next().transpose()
}

/// Предстоящие мероприятия города, не скрытые, отсортированные по дате.
///
/// Сопоставление города точное (строки нормализуются на входе анкеты).
pub fn list_events_by_city(conn: &Connection, city: &str, now: NaiveDateTime) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events
         WHERE city = ?1 AND event_date > ?2 AND is_hidden = 0
         ORDER BY event_date ASC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![city, fmt_ts(now)], row_to_event)?;

    rows.collect()
}

/// Мероприятия, созданные пользователем, по дате проведения.
pub fn list_events_by_creator(conn: &Connection, creator_id: i64) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE creator_id = ?1 ORDER BY event_date ASC"
    ))?;
    let rows = stmt.query_map([creator_id], row_to_event)?;

    rows.collect()
}

/// Текущее количество участников мероприятия.
pub fn participant_count(conn: &Connection, event_id: i64) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM event_participants WHERE event_id = ?1",
        [event_id],
        |row| row.get(0),
    )
}

/// Зарегистрирован ли пользователь на мероприятие.
pub fn is_participant(conn: &Connection, user_id: i64, event_id: i64) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM event_participants WHERE user_id = ?1 AND event_id = ?2",
        [user_id, event_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Вставляет запись регистрации, если лимит участников не исчерпан.
///
/// Проверка вместимости и вставка выполняются одним оператором, поэтому
/// два конкурирующих кандидата на последнее место не могут пройти оба:
/// для проигравшего запрос не затрагивает ни одной строки.
///
/// # Returns
///
/// Возвращает `Ok(true)` если запись вставлена, `Ok(false)` если мероприятие
/// уже заполнено.
///
/// # Errors
///
/// Нарушение первичного ключа (повторная регистрация) возвращается как
/// ошибка SQLite и обрабатывается уровнем выше.
pub fn insert_participant_guarded(
    conn: &Connection,
    user_id: i64,
    event_id: i64,
    now: NaiveDateTime,
) -> Result<bool> {
    let affected = conn.execute(
        "INSERT INTO event_participants (user_id, event_id, registration_time)
         SELECT ?1, ?2, ?3
         WHERE (SELECT max_participants FROM events WHERE id = ?2) IS NULL
            OR (SELECT COUNT(*) FROM event_participants WHERE event_id = ?2)
               < (SELECT max_participants FROM events WHERE id = ?2)",
        rusqlite::params![user_id, event_id, fmt_ts(now)],
    )?;
    Ok(affected > 0)
}

/// Удаляет запись регистрации.
///
/// # Returns
///
/// Возвращает `Ok(true)` если запись была удалена, `Ok(false)` если пары
/// (user, event) в журнале не было.
pub fn delete_participant(conn: &Connection, user_id: i64, event_id: i64) -> Result<bool> {
    let affected = conn.execute(
        "DELETE FROM event_participants WHERE user_id = ?1 AND event_id = ?2",
        [user_id, event_id],
    )?;
    Ok(affected > 0)
}

/// Предстоящие мероприятия, на которые пользователь зарегистрирован.
pub fn list_registered_events(
    conn: &Connection,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events e
         JOIN event_participants ep ON ep.event_id = e.id
         WHERE ep.user_id = ?1 AND e.event_date > ?2
         ORDER BY e.event_date ASC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user_id, fmt_ts(now)], |row| row_to_event(row))?;

    rows.collect()
}

/// Прошедшие мероприятия, в которых пользователь участвовал.
///
/// Используется мастером выставления оценок: оценивать можно только
/// со-участников уже состоявшихся мероприятий.
pub fn list_attended_past_events(
    conn: &Connection,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events e
         JOIN event_participants ep ON ep.event_id = e.id
         WHERE ep.user_id = ?1 AND e.event_date <= ?2
         ORDER BY e.event_date DESC, e.id ASC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user_id, fmt_ts(now)], |row| row_to_event(row))?;

    rows.collect()
}

/// Участники мероприятия в порядке регистрации.
pub fn list_participants(conn: &Connection, event_id: i64) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.telegram_id, u.username, u.first_name, u.last_name, u.city, u.display_name,
                u.age, u.gender, u.about, u.rating, u.tokens, u.user_type, u.vip_until, u.created_at
         FROM users u
         JOIN event_participants ep ON ep.user_id = u.id
         WHERE ep.event_id = ?1
         ORDER BY ep.registration_time ASC, u.id ASC",
    )?;
    let rows = stmt.query_map([event_id], crate::storage::users::row_to_user)?;

    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Gender;
    use crate::storage::migrations::run_migrations_for_test;
    use crate::storage::users::create_user;
    use chrono::NaiveDate;

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

    fn make_user(conn: &Connection, telegram_id: i64, age: u32, gender: Gender) -> User {
        create_user(
            conn,
            telegram_id,
            None,
            None,
            None,
            "Москва",
            "Тест",
            age,
            gender,
            None,
        )
        .unwrap()
    }

    fn make_event(conn: &Connection, creator_id: i64, max: Option<u32>) -> Event {
        create_event(
            conn,
            creator_id,
            "Прогулка в парке",
            "Москва",
            EventPurpose::Walk,
            TargetAudience::All,
            None,
            None,
            "Просто гуляем",
            now() + chrono::Duration::days(3),
            max,
        )
        .unwrap()
    }

    #[test]
    fn test_list_events_by_city_filters_and_orders() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);

        let later = create_event(
            &conn,
            creator.id,
            "Позже",
            "Москва",
            EventPurpose::Meet,
            TargetAudience::All,
            None,
            None,
            "-",
            now() + chrono::Duration::days(5),
            None,
        )
        .unwrap();
        let sooner = create_event(
            &conn,
            creator.id,
            "Раньше",
            "Москва",
            EventPurpose::Meet,
            TargetAudience::All,
            None,
            None,
            "-",
            now() + chrono::Duration::days(1),
            None,
        )
        .unwrap();
        // Другой город и прошедшее мероприятие не попадают в выдачу
        create_event(
            &conn,
            creator.id,
            "Питер",
            "Санкт-Петербург",
            EventPurpose::Meet,
            TargetAudience::All,
            None,
            None,
            "-",
            now() + chrono::Duration::days(1),
            None,
        )
        .unwrap();
        create_event(
            &conn,
            creator.id,
            "Прошло",
            "Москва",
            EventPurpose::Meet,
            TargetAudience::All,
            None,
            None,
            "-",
            now() - chrono::Duration::days(1),
            None,
        )
        .unwrap();

        let events = list_events_by_city(&conn, "Москва", now()).unwrap();
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }

    #[test]
    fn test_guarded_insert_respects_capacity() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let a = make_user(&conn, 2, 25, Gender::Female);
        let b = make_user(&conn, 3, 25, Gender::Female);
        let c = make_user(&conn, 4, 25, Gender::Male);
        let event = make_event(&conn, creator.id, Some(2));

        assert!(insert_participant_guarded(&conn, a.id, event.id, now()).unwrap());
        assert!(insert_participant_guarded(&conn, b.id, event.id, now()).unwrap());
        assert!(!insert_participant_guarded(&conn, c.id, event.id, now()).unwrap());
        assert_eq!(participant_count(&conn, event.id).unwrap(), 2);
    }

    #[test]
    fn test_guarded_insert_unlimited_event() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let event = make_event(&conn, creator.id, None);

        for i in 0..20 {
            let u = make_user(&conn, 100 + i, 25, Gender::Male);
            assert!(insert_participant_guarded(&conn, u.id, event.id, now()).unwrap());
        }
        assert_eq!(participant_count(&conn, event.id).unwrap(), 20);
    }

    #[test]
    fn test_duplicate_registration_hits_primary_key() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let user = make_user(&conn, 2, 25, Gender::Female);
        let event = make_event(&conn, creator.id, None);

        assert!(insert_participant_guarded(&conn, user.id, event.id, now()).unwrap());
        assert!(insert_participant_guarded(&conn, user.id, event.id, now()).is_err());
    }

    #[test]
    fn test_delete_participant_frees_slot() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let a = make_user(&conn, 2, 25, Gender::Female);
        let b = make_user(&conn, 3, 25, Gender::Male);
        let event = make_event(&conn, creator.id, Some(1));

        assert!(insert_participant_guarded(&conn, a.id, event.id, now()).unwrap());
        assert!(!insert_participant_guarded(&conn, b.id, event.id, now()).unwrap());

        assert!(delete_participant(&conn, a.id, event.id).unwrap());
        assert!(!delete_participant(&conn, a.id, event.id).unwrap());

        assert!(insert_participant_guarded(&conn, b.id, event.id, now()).unwrap());
    }

    #[test]
    fn test_registration_check_order_and_bounds() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let event = create_event(
            &conn,
            creator.id,
            "Вечеринка",
            "Москва",
            EventPurpose::Party,
            TargetAudience::Female,
            Some(18),
            Some(30),
            "-",
            now() + chrono::Duration::days(3),
            None,
        )
        .unwrap();

        // Создатель отклоняется раньше остальных проверок
        assert!(matches!(
            event.registration_check(&creator),
            Err(DomainError::OwnEvent)
        ));

        let young = make_user(&conn, 2, 16, Gender::Female);
        assert!(matches!(
            event.registration_check(&young),
            Err(DomainError::IneligibleAge {
                min_age: Some(18),
                max_age: None
            })
        ));

        let old = make_user(&conn, 3, 40, Gender::Female);
        assert!(matches!(
            event.registration_check(&old),
            Err(DomainError::IneligibleAge {
                min_age: None,
                max_age: Some(30)
            })
        ));

        let man = make_user(&conn, 4, 25, Gender::Male);
        assert!(matches!(
            event.registration_check(&man),
            Err(DomainError::IneligibleGender)
        ));

        let ok = make_user(&conn, 5, 25, Gender::Female);
        assert!(event.registration_check(&ok).is_ok());
    }

    #[test]
    fn test_list_participants_in_registration_order() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let first = make_user(&conn, 2, 25, Gender::Female);
        let second = make_user(&conn, 3, 25, Gender::Male);
        let event = make_event(&conn, creator.id, None);

        insert_participant_guarded(&conn, second.id, event.id, now()).unwrap();
        insert_participant_guarded(&conn, first.id, event.id, now() - chrono::Duration::hours(1))
            .unwrap();

        let participants = list_participants(&conn, event.id).unwrap();
        let ids: Vec<i64> = participants.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn test_list_events_by_creator() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let other = make_user(&conn, 2, 30, Gender::Female);

        let mine = make_event(&conn, creator.id, None);
        make_event(&conn, other.id, None);

        let events = list_events_by_creator(&conn, creator.id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, mine.id);
    }

    #[test]
    fn test_attended_past_events() {
        let conn = test_conn();
        let creator = make_user(&conn, 1, 30, Gender::Male);
        let user = make_user(&conn, 2, 25, Gender::Female);

        let past = create_event(
            &conn,
            creator.id,
            "Прошло",
            "Москва",
            EventPurpose::Meet,
            TargetAudience::All,
            None,
            None,
            "-",
            now() - chrono::Duration::days(2),
            None,
        )
        .unwrap();
        let future = make_event(&conn, creator.id, None);

        insert_participant_guarded(&conn, user.id, past.id, now() - chrono::Duration::days(3))
            .unwrap();
        insert_participant_guarded(&conn, user.id, future.id, now()).unwrap();

        let attended = list_attended_past_events(&conn, user.id, now()).unwrap();
        assert_eq!(attended.len(), 1);
        assert_eq!(attended[0].id, past.id);

        let upcoming = list_registered_events(&conn, user.id, now()).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, future.id);
    }
}
