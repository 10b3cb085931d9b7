//! Shared test fixtures: temporary SQLite database and seed helpers.

// Каждый интеграционный набор использует свое подмножество помощников
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use yasami::core::types::{EventPurpose, Gender, TargetAudience};
use yasami::storage::db::{create_pool, get_connection, DbPool};
use yasami::storage::events::{self, Event};
use yasami::storage::users::{self, User};

pub struct TestDb {
    pub pool: Arc<DbPool>,
    // Держит каталог с файлом базы живым до конца теста
    _dir: TempDir,
}

/// Creates a fresh file-backed database with migrations applied.
///
/// A file (not in-memory) database is used so that tests can exercise
/// concurrent access through multiple pooled connections.
pub fn test_db() -> TestDb {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("yasami-test.sqlite");
    let pool = create_pool(path.to_str().expect("utf-8 path")).expect("create pool");
    TestDb {
        pool: Arc::new(pool),
        _dir: dir,
    }
}

pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn make_user(db: &TestDb, telegram_id: i64, age: u32, gender: Gender) -> User {
    let conn = get_connection(&db.pool).unwrap();
    users::create_user(
        &conn,
        telegram_id,
        None,
        None,
        None,
        "Москва",
        &format!("user-{telegram_id}"),
        age,
        gender,
        None,
    )
    .unwrap()
}

#[allow(clippy::too_many_arguments)]
pub fn make_event(
    db: &TestDb,
    creator_id: i64,
    event_date: NaiveDateTime,
    max_participants: Option<u32>,
    target_audience: TargetAudience,
    min_age: Option<u32>,
    max_age: Option<u32>,
) -> Event {
    let conn = get_connection(&db.pool).unwrap();
    events::create_event(
        &conn,
        creator_id,
        "Тестовое мероприятие",
        "Москва",
        EventPurpose::Meet,
        target_audience,
        min_age,
        max_age,
        "Описание",
        event_date,
        max_participants,
    )
    .unwrap()
}

/// Открытое для всех мероприятие в будущем.
pub fn open_event(db: &TestDb, creator_id: i64, max_participants: Option<u32>) -> Event {
    make_event(
        db,
        creator_id,
        now() + chrono::Duration::days(3),
        max_participants,
        TargetAudience::All,
        None,
        None,
    )
}
