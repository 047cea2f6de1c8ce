//! SQLite persistence: one table per record type, one module per table.
//!
//! Handlers open a short-lived connection per request with `connect`, the
//! same way every service reaches the database file. `initialize` runs the
//! migrations once at start-up.

pub mod admin_logs;
pub mod audits;
pub mod documents;
pub mod page_codes;
pub mod profiles;
pub mod queries;
pub mod sessions;

use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}

/// Opens a connection with foreign keys enforced. Does not migrate.
pub fn connect(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    Ok(conn)
}

/// Opens the database file, creating it when missing, and applies pending
/// migrations.
pub fn initialize(path: &Path) -> Result<Connection, StoreError> {
    let conn = connect(path)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<(), StoreError> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(())
}

pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(1, include_str!("migrations/001_initial.sql"))];

    for (version, sql) in migrations {
        if version > current_version {
            log::info!("Running migration v{}", version);
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }
    Ok(())
}

/// Schema version, 0 on an empty database.
pub fn current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// RFC 3339 timestamp in UTC, the format of every `*_at` column.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Parses an enum stored as text inside a row mapping closure.
pub(crate) fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Decodes a JSON text column inside a row mapping closure.
pub(crate) fn json_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Turns a UNIQUE violation into `StoreError::Duplicate`.
pub(crate) fn map_unique(err: rusqlite::Error, what: impl Into<String>) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Duplicate(what.into())
        }
        _ => StoreError::Sqlite(err),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_database;
    use super::*;

    #[test]
    fn migrations_create_every_table() {
        let (_dir, _path, conn) = temp_database();
        for table in [
            "profiles",
            "sessions",
            "documents",
            "page_codes",
            "audit_submissions",
            "document_queries",
            "admin_logs",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let (_dir, path, _conn) = temp_database();
        let conn = initialize(&path).unwrap();
        assert_eq!(current_version(&conn), 1);
    }

    #[test]
    fn foreign_keys_enabled() {
        let (_dir, _path, conn) = temp_database();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn status_column_only_takes_known_values() {
        let (_dir, _path, conn) = temp_database();
        conn.execute(
            "INSERT INTO profiles (id, name, email, role, password_hash, created_at)
             VALUES ('p1', 'P', 'p@x.test', 'PROVIDER', 'h', 't')",
            [],
        )
        .unwrap();
        let err = conn.execute(
            "INSERT INTO documents (id, provider_id, filename, storage_path, status, checksum, uploaded_at)
             VALUES ('d1', 'p1', 'a.pdf', 'documents/a.pdf', 'ARCHIVED', 'c', 't')",
            [],
        );
        assert!(err.is_err());
    }
}
