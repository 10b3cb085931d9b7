use chrono::NaiveDateTime;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Формат хранения дат в SQLite (колонки TEXT).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and runs
/// embedded schema migrations on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Returns
///
/// Returns a `DbPool` on success or an error if pool creation or the
/// migration run fails.
///
/// # Example
///
/// ```no_run
/// use yasami::storage::db;
///
/// let pool = db::create_pool("yasami.sqlite")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn create_pool(database_path: &str) -> anyhow::Result<DbPool> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 30000;",
        )
    });
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    // Ensure schema is up to date on first connection
    let mut conn = pool.get()?;
    crate::storage::migrations::run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// Retrieves a connection from the connection pool. The connection is
/// automatically returned to the pool when dropped.
///
/// # Arguments
///
/// * `pool` - Database connection pool
///
/// # Returns
///
/// Returns a `DbConnection` on success or an `r2d2::Error` if no connection
/// is available.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Сериализует дату для хранения в TEXT-колонке.
pub fn fmt_ts(ts: NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

/// Разбирает дату из TEXT-колонки.
///
/// SQLite `datetime('now')` пишет именно этот формат, поэтому обе стороны
/// (дефолты схемы и код) совместимы.
pub fn parse_ts(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_ts_round_trip() {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        assert_eq!(fmt_ts(ts), "2025-06-15 18:00:00");
        assert_eq!(parse_ts("2025-06-15 18:00:00"), Some(ts));
        assert_eq!(parse_ts("garbage"), None);
    }
}
