//! Доступ к таблице `users`.

use chrono::NaiveDateTime;
use rusqlite::{Connection, Result};

use crate::core::config;
use crate::core::types::{Gender, UserType};
use crate::storage::db::{fmt_ts, parse_ts};

/// Структура, представляющая пользователя в базе данных.
#[derive(Debug, Clone)]
pub struct User {
    /// Внутренний ID (первичный ключ)
    pub id: i64,
    /// Telegram ID пользователя
    pub telegram_id: i64,
    /// Имя пользователя (username) в Telegram, если доступно
    pub username: Option<String>,
    /// Имя из профиля Telegram
    pub first_name: Option<String>,
    /// Фамилия из профиля Telegram
    pub last_name: Option<String>,
    /// Город пользователя
    pub city: String,
    /// Отображаемое имя, введенное в анкете
    pub display_name: String,
    /// Возраст
    pub age: u32,
    /// Пол
    pub gender: Gender,
    /// Информация "о себе" (опционально)
    pub about: Option<String>,
    /// Текущий рейтинг (репутация), не опускается ниже 0
    pub rating: i64,
    /// Баланс токенов
    pub tokens: i64,
    /// Тип пользователя: regular или vip
    pub user_type: UserType,
    /// Дата окончания VIP-статуса (None, если VIP не покупался)
    pub vip_until: Option<NaiveDateTime>,
    /// Дата регистрации в боте
    pub created_at: Option<NaiveDateTime>,
}

impl User {
    /// Активен ли VIP-статус на момент `now`.
    pub fn is_vip(&self, now: NaiveDateTime) -> bool {
        self.user_type == UserType::Vip && self.vip_until.map(|until| until > now).unwrap_or(false)
    }

    /// Достаточен ли рейтинг для создания мероприятий.
    pub fn can_create_events(&self) -> bool {
        self.rating >= *config::rating::MIN_RATING_TO_CREATE
    }

    /// Достаточен ли рейтинг для просмотра мероприятий.
    pub fn can_view_events(&self) -> bool {
        self.rating >= *config::rating::MIN_RATING_TO_VIEW
    }
}

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, last_name, city, display_name, \
                            age, gender, about, rating, tokens, user_type, vip_until, created_at";

pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        city: row.get(5)?,
        display_name: row.get(6)?,
        age: row.get(7)?,
        gender: row.get(8)?,
        about: row.get(9)?,
        rating: row.get(10)?,
        tokens: row.get(11)?,
        user_type: row.get(12)?,
        vip_until: row.get::<_, Option<String>>(13)?.as_deref().and_then(parse_ts),
        created_at: row.get::<_, Option<String>>(14)?.as_deref().and_then(parse_ts),
    })
}

/// Создает нового пользователя в базе данных.
///
/// Рейтинг стартует с `DEFAULT_RATING`, баланс токенов нулевой.
///
/// # Arguments
///
/// * `conn` - Соединение с базой данных
/// * `telegram_id` - Telegram ID пользователя
/// * `username` - Имя пользователя в Telegram (опционально)
/// * `first_name` - Имя из профиля Telegram (опционально)
/// * `last_name` - Фамилия из профиля Telegram (опционально)
/// * `city` - Город из анкеты
/// * `display_name` - Отображаемое имя из анкеты
/// * `age` - Возраст
/// * `gender` - Пол
/// * `about` - Информация "о себе" (опционально)
///
/// # Returns
///
/// Возвращает созданного пользователя (перечитанного из базы).
///
/// # Errors
///
/// Возвращает ошибку если пользователь с таким telegram_id уже существует
/// или произошла ошибка БД.
#[allow(clippy::too_many_arguments)]
pub fn create_user(
    conn: &Connection,
    telegram_id: i64,
    username: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    city: &str,
    display_name: &str,
    age: u32,
    gender: Gender,
    about: Option<&str>,
) -> Result<User> {
    conn.execute(
        "INSERT INTO users (telegram_id, username, first_name, last_name, city, display_name, age, gender, about, rating)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            telegram_id,
            username,
            first_name,
            last_name,
            city,
            display_name,
            age,
            gender,
            about,
            config::rating::DEFAULT_RATING,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_user_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Получает пользователя по Telegram ID.
///
/// # Returns
///
/// Возвращает `Ok(Some(User))` если пользователь найден, `Ok(None)` если
/// не найден, или ошибку базы данных.
pub fn get_user_by_telegram_id(conn: &Connection, telegram_id: i64) -> Result<Option<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"
    ))?;
    let mut rows = stmt.query_map([telegram_id], row_to_user)?;

    rows.next().transpose()
}

/// Получает пользователя по внутреннему ID.
pub fn get_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    let mut rows = stmt.query_map([id], row_to_user)?;

    rows.next().transpose()
}

/// Обновляет город пользователя.
pub fn update_user_city(conn: &Connection, user_id: i64, city: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET city = ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![city, user_id],
    )?;
    Ok(())
}

/// Обновляет отображаемое имя пользователя.
pub fn update_user_display_name(conn: &Connection, user_id: i64, display_name: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET display_name = ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![display_name, user_id],
    )?;
    Ok(())
}

/// Обновляет возраст пользователя.
pub fn update_user_age(conn: &Connection, user_id: i64, age: u32) -> Result<()> {
    conn.execute(
        "UPDATE users SET age = ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![age, user_id],
    )?;
    Ok(())
}

/// Обновляет информацию "о себе".
pub fn update_user_about(conn: &Connection, user_id: i64, about: Option<&str>) -> Result<()> {
    conn.execute(
        "UPDATE users SET about = ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![about, user_id],
    )?;
    Ok(())
}

/// Изменяет рейтинг пользователя на `delta` (может быть отрицательным).
///
/// Рейтинг не опускается ниже нуля: нижняя граница применяется в самом
/// запросе, поэтому конкурирующие изменения не могут увести значение
/// в минус.
pub fn adjust_rating(conn: &Connection, user_id: i64, delta: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET rating = MAX(0, rating + ?1), updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![delta, user_id],
    )?;
    Ok(())
}

/// Добавляет токены на баланс пользователя.
pub fn add_tokens(conn: &Connection, user_id: i64, amount: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET tokens = tokens + ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![amount, user_id],
    )?;
    Ok(())
}

/// Списывает токены с баланса пользователя.
///
/// # Returns
///
/// Возвращает `Ok(true)` если списание прошло, `Ok(false)` если на балансе
/// недостаточно токенов (баланс не изменяется).
pub fn spend_tokens(conn: &Connection, user_id: i64, amount: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE users SET tokens = tokens - ?1, updated_at = datetime('now')
         WHERE id = ?2 AND tokens >= ?1",
        rusqlite::params![amount, user_id],
    )?;
    Ok(affected > 0)
}

/// Устанавливает VIP-статус пользователя до даты `until`.
pub fn set_vip(conn: &Connection, user_id: i64, until: NaiveDateTime) -> Result<()> {
    conn.execute(
        "UPDATE users SET user_type = ?1, vip_until = ?2, updated_at = datetime('now') WHERE id = ?3",
        rusqlite::params![UserType::Vip, fmt_ts(until), user_id],
    )?;
    Ok(())
}
