// src/store/mod.rs

//! SQLite persistence, one module per entity.
//!
//! Functions take the pool (or a transaction) plus the identifiers from the
//! request path, and return `AppError::NotFound` when the path does not
//! resolve. Writes that affect a title's rating recompute it in the same
//! transaction.

pub mod catalog;
pub mod comments;
pub mod rating;
pub mod reviews;
pub mod titles;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Creates the connection pool.
///
/// File databases are created on first use and run in WAL mode. Foreign keys
/// are enforced on every connection; the cascade rules live in the schema.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    if !database_url.contains(":memory:") {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Opens a write transaction that takes the database write lock up front.
///
/// A deferred transaction that reads before it writes cannot be upgraded in
/// WAL mode once another connection has committed, and SQLite reports
/// `SQLITE_BUSY` at once instead of waiting on `busy_timeout`.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Turns user input into a `LIKE ... ESCAPE '\'` substring pattern.
pub(crate) fn like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 2);
    escaped.push('%');
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }
}
