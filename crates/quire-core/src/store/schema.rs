//! Database schema and timestamp encoding.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use rusqlite::types::{FromSqlError, Type};

use crate::error::Result;

/// Bumped when the table layout changes.
pub const SCHEMA_VERSION: i64 = 1;

pub(super) fn install_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS notebooks (
          id          TEXT PRIMARY KEY,
          name        TEXT NOT NULL,
          path        TEXT NOT NULL UNIQUE,
          kernel      TEXT NOT NULL DEFAULT 'python3',
          created_at  TEXT NOT NULL,
          updated_at  TEXT NOT NULL,
          cell_count  INTEGER NOT NULL DEFAULT 0,
          metadata    TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS executions (
          id           TEXT PRIMARY KEY,
          notebook_id  TEXT NOT NULL REFERENCES notebooks(id) ON DELETE CASCADE,
          cell_index   INTEGER NOT NULL,
          source       TEXT NOT NULL,
          output       TEXT NOT NULL,
          status       TEXT NOT NULL CHECK(status IN ('success', 'error', 'timeout')),
          started_at   TEXT NOT NULL,
          finished_at  TEXT NOT NULL,
          duration_ms  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kernels (
          id           TEXT PRIMARY KEY,
          name         TEXT NOT NULL UNIQUE,
          language     TEXT NOT NULL,
          display_name TEXT NOT NULL,
          argv         TEXT NOT NULL,
          created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_exec_nb ON executions(notebook_id);
        CREATE INDEX IF NOT EXISTS idx_notebooks_updated ON notebooks(updated_at);
        "#,
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Fixed-width RFC 3339 so text order is time order.
pub(super) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(super) fn parse_json<T: serde::de::DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(super) fn to_usize(idx: usize, value: i64) -> rusqlite::Result<usize> {
    usize::try_from(value).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(FromSqlError::OutOfRange(value)),
        )
    })
}

pub(super) fn to_u64(idx: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(FromSqlError::OutOfRange(value)),
        )
    })
}

pub(super) fn to_sqlite_i64(value: usize) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| crate::Error::InvalidInput(format!("value {} does not fit in the database", value)))
}
