//! SQLite record store for notebooks, executions and kernel specs.
//!
//! The store owns the relational constraints:
//! - `notebooks.path` is unique (violations surface as [`Error::PathConflict`])
//! - executions cascade-delete with their notebook
//! - kernel names are unique; registering a name again replaces the spec
//!
//! It never touches notebook documents on disk.

mod schema;

pub use schema::SCHEMA_VERSION;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

use crate::error::{Error, Result};
use crate::model::{Execution, KernelSpec, Notebook};

use schema::{format_ts, install_schema, parse_json, parse_ts, to_sqlite_i64, to_u64, to_usize};

const NOTEBOOK_COLUMNS: &str =
    "id, name, path, kernel, created_at, updated_at, cell_count, metadata";

const EXECUTION_COLUMNS: &str = "id, notebook_id, cell_index, source, output, status, \
     started_at, finished_at, duration_ms";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file, creating its parent directory.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(conn, Some(db_path))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        install_schema(&conn)?;

        tracing::debug!(
            "Opened notebook store at {}",
            db_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string())
        );

        Ok(Self { conn, db_path })
    }

    /// Database file, or `None` for an in-memory store.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // ── Notebooks ──────────────────────────────────────────────────────

    pub fn insert_notebook(&self, notebook: &Notebook) -> Result<()> {
        let insert = self.conn.execute(
            "INSERT INTO notebooks(id, name, path, kernel, created_at, updated_at, cell_count, metadata) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                notebook.id,
                notebook.name,
                path_text(&notebook.path),
                notebook.kernel,
                format_ts(&notebook.created_at),
                format_ts(&notebook.updated_at),
                to_sqlite_i64(notebook.cell_count)?,
                serde_json::to_string(&notebook.metadata)?,
            ],
        );

        match insert {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err, "notebooks.path") => {
                Err(Error::PathConflict(notebook.path.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a notebook row. `cells` is left empty.
    pub fn get_notebook(&self, id: &str) -> Result<Option<Notebook>> {
        let sql = format!("SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], notebook_from_row)
            .optional()?)
    }

    /// Id of the notebook registered at `path`, if any.
    pub fn notebook_id_for_path(&self, path: &Path) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM notebooks WHERE path = ?1",
                params![path_text(path)],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// All notebooks, most recently updated first.
    pub fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        let sql = format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks ORDER BY updated_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], notebook_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Set `updated_at`. Returns whether the notebook exists.
    pub fn touch_notebook(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE notebooks SET updated_at = ?1 WHERE id = ?2",
            params![format_ts(&at), id],
        )?;
        Ok(changed > 0)
    }

    /// Rename a notebook and set `updated_at`. Returns whether it exists.
    pub fn rename_notebook(&self, id: &str, name: &str, at: DateTime<Utc>) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE notebooks SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, format_ts(&at), id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a notebook row and, by cascade, its executions.
    /// Returns whether a row was removed.
    pub fn delete_notebook(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notebooks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ── Executions ─────────────────────────────────────────────────────

    /// Insert a batch of executions in one transaction.
    pub fn insert_executions(&mut self, executions: &[Execution]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO executions(id, notebook_id, cell_index, source, output, status, \
                 started_at, finished_at, duration_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for execution in executions {
                stmt.execute(params![
                    execution.id,
                    execution.notebook_id,
                    to_sqlite_i64(execution.cell_index)?,
                    execution.source,
                    execution.output,
                    execution.status,
                    format_ts(&execution.started_at),
                    format_ts(&execution.finished_at),
                    i64::try_from(execution.duration_ms).unwrap_or(i64::MAX),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Executions for a notebook, most recent first, at most `limit`.
    pub fn list_executions(&self, notebook_id: &str, limit: usize) -> Result<Vec<Execution>> {
        let sql = format!(
            "SELECT {EXECUTION_COLUMNS} FROM executions \
             WHERE notebook_id = ?1 \
             ORDER BY started_at DESC, rowid DESC \
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![notebook_id, to_sqlite_i64(limit)?],
            execution_from_row,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_executions(&self, notebook_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM executions WHERE notebook_id = ?1",
            params![notebook_id],
            |row| row.get(0),
        )?;
        Ok(to_usize(0, count)?)
    }

    // ── Kernels ────────────────────────────────────────────────────────

    /// Insert a kernel spec, replacing any spec with the same name.
    pub fn register_kernel(&self, spec: &KernelSpec) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kernels(id, name, language, display_name, argv, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                spec.id,
                spec.name,
                spec.language,
                spec.display_name,
                serde_json::to_string(&spec.argv)?,
                format_ts(&spec.created_at),
            ],
        )?;
        Ok(())
    }

    /// All kernel specs ordered by name.
    pub fn list_kernels(&self) -> Result<Vec<KernelSpec>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, language, display_name, argv, created_at \
             FROM kernels ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(KernelSpec {
                id: row.get(0)?,
                name: row.get(1)?,
                language: row.get(2)?,
                display_name: row.get(3)?,
                argv: parse_json(4, &row.get::<_, String>(4)?)?,
                created_at: parse_ts(5, &row.get::<_, String>(5)?)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn notebook_from_row(row: &Row<'_>) -> rusqlite::Result<Notebook> {
    Ok(Notebook {
        id: row.get(0)?,
        name: row.get(1)?,
        path: PathBuf::from(row.get::<_, String>(2)?),
        kernel: row.get(3)?,
        created_at: parse_ts(4, &row.get::<_, String>(4)?)?,
        updated_at: parse_ts(5, &row.get::<_, String>(5)?)?,
        cell_count: to_usize(6, row.get(6)?)?,
        metadata: parse_json(7, &row.get::<_, String>(7)?)?,
        cells: Vec::new(),
    })
}

fn execution_from_row(row: &Row<'_>) -> rusqlite::Result<Execution> {
    Ok(Execution {
        id: row.get(0)?,
        notebook_id: row.get(1)?,
        cell_index: to_usize(2, row.get(2)?)?,
        source: row.get(3)?,
        output: row.get(4)?,
        status: row.get(5)?,
        started_at: parse_ts(6, &row.get::<_, String>(6)?)?,
        finished_at: parse_ts(7, &row.get::<_, String>(7)?)?,
        duration_ms: to_u64(8, row.get(8)?)?,
    })
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                && message
                    .as_deref()
                    .is_some_and(|value| value.contains("UNIQUE") && value.contains(column))
        }
        _ => false,
    }
}
