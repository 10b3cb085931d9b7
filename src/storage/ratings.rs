//! Доступ к таблице `ratings`.
//!
//! Пара (event_id, rater_id, rated_id) уникальна: повторная оценка того же
//! участника за то же мероприятие перезаписывает балл, а не добавляет строку.

use chrono::NaiveDateTime;
use rusqlite::{Connection, Result};

use crate::storage::db::parse_ts;
use crate::storage::users::User;

/// Строка таблицы `ratings`.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: i64,
    pub event_id: i64,
    pub rater_id: i64,
    pub rated_id: i64,
    /// Балл 1..=5
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

fn row_to_rating(row: &rusqlite::Row<'_>) -> Result<Rating> {
    Ok(Rating {
        id: row.get(0)?,
        event_id: row.get(1)?,
        rater_id: row.get(2)?,
        rated_id: row.get(3)?,
        score: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get::<_, Option<String>>(6)?.as_deref().and_then(parse_ts),
    })
}

/// Получает существующую оценку для пары (event, rater, rated).
pub fn get_rating(
    conn: &Connection,
    event_id: i64,
    rater_id: i64,
    rated_id: i64,
) -> Result<Option<Rating>> {
    let mut stmt = conn.prepare(
        "SELECT id, event_id, rater_id, rated_id, score, comment, created_at
         FROM ratings WHERE event_id = ?1 AND rater_id = ?2 AND rated_id = ?3",
    )?;
    let mut rows = stmt.query_map([event_id, rater_id, rated_id], row_to_rating)?;

    rows.next().transpose()
}

/// Вставляет новую оценку.
pub fn insert_rating(
    conn: &Connection,
    event_id: i64,
    rater_id: i64,
    rated_id: i64,
    score: u8,
    comment: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO ratings (event_id, rater_id, rated_id, score, comment)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![event_id, rater_id, rated_id, score, comment],
    )?;
    Ok(())
}

/// Перезаписывает балл существующей оценки.
///
/// `created_at` строки сохраняется: запись отражает первый факт оценки,
/// балл — последнее мнение.
pub fn update_rating_score(
    conn: &Connection,
    rating_id: i64,
    score: u8,
    comment: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE ratings SET score = ?1, comment = ?2 WHERE id = ?3",
        rusqlite::params![score, comment, rating_id],
    )?;
    Ok(())
}

/// Со-участники мероприятия, которых `rater_id` еще не оценил.
///
/// Сам оценивающий исключается. Порядок устойчивый: по возрастанию
/// внутреннего ID пользователя.
pub fn list_unrated_co_participants(
    conn: &Connection,
    event_id: i64,
    rater_id: i64,
) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.telegram_id, u.username, u.first_name, u.last_name, u.city, u.display_name,
                u.age, u.gender, u.about, u.rating, u.tokens, u.user_type, u.vip_until, u.created_at
         FROM users u
         JOIN event_participants ep ON ep.user_id = u.id
         WHERE ep.event_id = ?1
           AND u.id != ?2
           AND NOT EXISTS (
               SELECT 1 FROM ratings r
               WHERE r.event_id = ?1 AND r.rater_id = ?2 AND r.rated_id = u.id
           )
         ORDER BY u.id ASC",
    )?;
    let rows = stmt.query_map([event_id, rater_id], crate::storage::users::row_to_user)?;

    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EventPurpose, Gender, TargetAudience};
    use crate::storage::events::{create_event, insert_participant_guarded};
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

    fn seed(conn: &Connection) -> (i64, i64, i64, i64) {
        let creator = create_user(
            conn, 1, None, None, None, "Москва", "Орг", 30, Gender::Male, None,
        )
        .unwrap();
        let rater = create_user(
            conn, 2, None, None, None, "Москва", "Оценщик", 25, Gender::Female, None,
        )
        .unwrap();
        let peer_a = create_user(
            conn, 3, None, None, None, "Москва", "А", 25, Gender::Male, None,
        )
        .unwrap();
        let peer_b = create_user(
            conn, 4, None, None, None, "Москва", "Б", 25, Gender::Male, None,
        )
        .unwrap();

        let event = create_event(
            conn,
            creator.id,
            "Прошедшая встреча",
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

        for uid in [rater.id, peer_a.id, peer_b.id] {
            insert_participant_guarded(conn, uid, event.id, now() - chrono::Duration::days(2))
                .unwrap();
        }

        (event.id, rater.id, peer_a.id, peer_b.id)
    }

    #[test]
    fn test_unique_rating_per_triple() {
        let conn = test_conn();
        let (event_id, rater_id, peer_a, _) = seed(&conn);

        insert_rating(&conn, event_id, rater_id, peer_a, 5, None).unwrap();
        assert!(insert_rating(&conn, event_id, rater_id, peer_a, 4, None).is_err());

        let rating = get_rating(&conn, event_id, rater_id, peer_a).unwrap().unwrap();
        assert_eq!(rating.score, 5);
    }

    #[test]
    fn test_update_keeps_single_row() {
        let conn = test_conn();
        let (event_id, rater_id, peer_a, _) = seed(&conn);

        insert_rating(&conn, event_id, rater_id, peer_a, 2, None).unwrap();
        let rating = get_rating(&conn, event_id, rater_id, peer_a).unwrap().unwrap();
        update_rating_score(&conn, rating.id, 5, Some("передумал")).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let updated = get_rating(&conn, event_id, rater_id, peer_a).unwrap().unwrap();
        assert_eq!(updated.id, rating.id);
        assert_eq!(updated.score, 5);
        assert_eq!(updated.comment.as_deref(), Some("передумал"));
    }

    #[test]
    fn test_unrated_worklist_shrinks_and_excludes_rater() {
        let conn = test_conn();
        let (event_id, rater_id, peer_a, peer_b) = seed(&conn);

        let worklist = list_unrated_co_participants(&conn, event_id, rater_id).unwrap();
        let ids: Vec<i64> = worklist.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![peer_a, peer_b]);
        assert!(!ids.contains(&rater_id));

        insert_rating(&conn, event_id, rater_id, peer_a, 4, None).unwrap();

        let worklist = list_unrated_co_participants(&conn, event_id, rater_id).unwrap();
        let ids: Vec<i64> = worklist.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![peer_b]);
    }
}
