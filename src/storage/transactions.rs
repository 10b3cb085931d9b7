//! Журнал движения токенов (таблица `transactions`).
//!
//! Журнал только пополняется; баланс пользователя хранится отдельно в
//! `users.tokens`, а записи здесь служат историей для пользователя.

use chrono::NaiveDateTime;
use rusqlite::{Connection, Result};

use crate::storage::db::parse_ts;

/// Строка журнала: пополнение (amount > 0) или списание (amount < 0).
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub description: String,
    pub created_at: Option<NaiveDateTime>,
}

/// Добавляет запись в журнал.
pub fn record_transaction(
    conn: &Connection,
    user_id: i64,
    amount: i64,
    description: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (user_id, amount, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, amount, description],
    )?;
    Ok(())
}

/// Последние записи журнала пользователя, новые первыми.
pub fn list_transactions(conn: &Connection, user_id: i64, limit: u32) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, amount, description, created_at
         FROM transactions WHERE user_id = ?1
         ORDER BY id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(rusqlite::params![user_id, limit], |row| {
        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get::<_, Option<String>>(4)?.as_deref().and_then(parse_ts),
        })
    })?;

    rows.collect()
}
