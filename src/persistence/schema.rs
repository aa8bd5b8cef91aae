//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` and are safe to
//! re-run on every server startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS meal (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    cook_slack_uid   TEXT NOT NULL,
    year             INTEGER NOT NULL,
    month            INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
    day              INTEGER NOT NULL CHECK(day BETWEEN 1 AND 31),
    description      TEXT,
    slack_message_id TEXT UNIQUE,
    UNIQUE(year, month, day)
);

CREATE TABLE IF NOT EXISTS member (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    slack_uid     TEXT NOT NULL UNIQUE,
    full_name     TEXT NOT NULL,
    meals_eaten   INTEGER NOT NULL DEFAULT 0 CHECK(meals_eaten >= 0),
    meals_cooked  INTEGER NOT NULL DEFAULT 0 CHECK(meals_cooked >= 0),
    leader        INTEGER NOT NULL DEFAULT 0
);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
