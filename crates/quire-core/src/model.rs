//! Notebook, execution and kernel records.

use std::path::PathBuf;

use chrono::{DateTime, SubsecRound, Utc};
use quire_sync::Cell;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::execute::ExecutionStatus;

/// Current time at the precision the store keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fresh random identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A registered notebook.
///
/// `cells` is not stored in the database; it is read from the document at
/// `path` by [`NotebookService::load`](crate::NotebookService::load).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notebook {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub kernel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Cell count at creation time. Not re-synced when the document changes.
    pub cell_count: usize,
    pub metadata: Map<String, Value>,
    #[serde(skip)]
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Number of cells currently loaded from the document.
    pub fn live_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn summary(&self) -> NotebookSummary {
        NotebookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
            kernel: self.kernel.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            cell_count: self.cell_count,
        }
    }
}

/// Row shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookSummary {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub kernel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cell_count: usize,
}

/// One historical run of one cell. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub notebook_id: String,
    /// Zero-based position of the cell when it ran.
    pub cell_index: usize,
    /// Exact text that ran.
    pub source: String,
    pub output: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Registered kernel profile. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub id: String,
    pub name: String,
    pub language: String,
    pub display_name: String,
    pub argv: Vec<String>,
    pub created_at: DateTime<Utc>,
}
