//! Notebook service: the public contract of Quire.
//!
//! Bridges the record store and the document files on disk, keeping the two
//! reconciled on every mutating operation, and drives the cell runner.

mod export;

pub use export::{ExportFormat, render_html, render_script};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use quire_sync::Cell;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::execute::CellRunner;
use crate::model::{Execution, KernelSpec, Notebook, NotebookSummary, new_id, now};
use crate::paths::resolve_notebook_path;
use crate::store::SqliteStore;

/// Orchestrates notebook CRUD, execution, export and history.
///
/// Mutating operations take `&mut self`; one service instance serves one
/// caller at a time.
pub struct NotebookService {
    store: SqliteStore,
    runner: CellRunner,
    config: Config,
}

impl NotebookService {
    /// Open the store named by `config` and build a service over it.
    pub fn open(config: Config) -> Result<Self> {
        let store = SqliteStore::open(&config.db_path)?;
        Ok(Self::with_store(store, config))
    }

    /// Build a service over an already opened store.
    pub fn with_store(store: SqliteStore, config: Config) -> Self {
        Self {
            store,
            runner: CellRunner::new(config.interpreter.clone()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    // ── Kernel management ──────────────────────────────────────────────

    /// Register a kernel spec, replacing any spec with the same name.
    pub fn register_kernel(
        &mut self,
        name: &str,
        language: &str,
        display_name: &str,
        argv: Vec<String>,
    ) -> Result<KernelSpec> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("kernel name must not be empty".to_string()));
        }

        let spec = KernelSpec {
            id: new_id(),
            name: name.to_string(),
            language: language.to_string(),
            display_name: display_name.to_string(),
            argv,
            created_at: now(),
        };
        self.store.register_kernel(&spec)?;

        tracing::info!("Registered kernel {}", spec.name);
        Ok(spec)
    }

    /// Registered kernels ordered by name.
    pub fn list_kernels(&self) -> Result<Vec<KernelSpec>> {
        self.store.list_kernels()
    }

    // ── Notebook CRUD ──────────────────────────────────────────────────

    /// Create a notebook: write its document, then register it.
    ///
    /// If registration fails after the document was written, the document is
    /// removed again so no unregistered file is left behind.
    pub fn create(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        kernel: &str,
        cells: Option<Vec<Cell>>,
    ) -> Result<Notebook> {
        let resolved = resolve_notebook_path(path)?;
        if self.store.notebook_id_for_path(&resolved)?.is_some() {
            return Err(Error::PathConflict(resolved));
        }

        let cells = cells.unwrap_or_default();
        let ts = now();
        let notebook = Notebook {
            id: new_id(),
            name: name.to_string(),
            path: resolved,
            kernel: kernel.to_string(),
            created_at: ts,
            updated_at: ts,
            cell_count: cells.len(),
            metadata: serde_json::Map::new(),
            cells,
        };

        write_document(&notebook)?;

        if let Err(e) = self.store.insert_notebook(&notebook) {
            if let Err(cleanup) = fs::remove_file(&notebook.path) {
                tracing::warn!(
                    "Failed to remove {} after aborted create: {}",
                    notebook.path.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        tracing::info!(
            "Created notebook {} at {} ({} cells)",
            notebook.id,
            notebook.path.display(),
            notebook.cell_count
        );
        Ok(notebook)
    }

    /// Load a notebook and its cells.
    ///
    /// A missing document file yields an empty cell list; the row stays
    /// authoritative.
    pub fn load(&self, id: &str) -> Result<Notebook> {
        let mut notebook = self.find(id)?;
        notebook.cells = read_document(&notebook.path)?;
        Ok(notebook)
    }

    /// Rename a notebook.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<Notebook> {
        if !self.store.rename_notebook(id, name, now())? {
            return Err(Error::NotFound(id.to_string()));
        }
        self.load(id)
    }

    /// All notebooks, most recently updated first.
    pub fn list(&self) -> Result<Vec<NotebookSummary>> {
        Ok(self
            .store
            .list_notebooks()?
            .iter()
            .map(Notebook::summary)
            .collect())
    }

    /// Delete a notebook's document and row. Its executions go with it.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let notebook = self.find(id)?;

        match fs::remove_file(&notebook.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Document {} already gone", notebook.path.display());
            }
            Err(e) => return Err(e.into()),
        }

        self.store.delete_notebook(id)?;
        tracing::info!("Deleted notebook {}", id);
        Ok(())
    }

    // ── Execution ──────────────────────────────────────────────────────

    /// Execute one cell, or every code cell in order.
    ///
    /// Non-code cells are skipped and produce no record. A failing cell does
    /// not stop later cells. Records are persisted and `updated_at` advanced
    /// afterwards, even when nothing ran.
    pub async fn execute(
        &mut self,
        id: &str,
        cell_index: Option<usize>,
        timeout: Duration,
    ) -> Result<Vec<Execution>> {
        if timeout.is_zero() {
            return Err(Error::InvalidInput("timeout must be greater than zero".to_string()));
        }

        let notebook = self.load(id)?;
        let targets: Vec<(usize, &Cell)> = match cell_index {
            Some(index) => {
                let cell = notebook.cells.get(index).ok_or(Error::IndexOutOfRange {
                    index,
                    len: notebook.cells.len(),
                })?;
                vec![(index, cell)]
            }
            None => notebook.cells.iter().enumerate().collect(),
        };

        let mut executions = Vec::new();
        for (index, cell) in targets {
            if !cell.is_code() {
                continue;
            }

            let started_at = now();
            let clock = Instant::now();
            let outcome = self.runner.run(&cell.source, timeout).await;
            let duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
            let finished_at = now();

            tracing::debug!(
                "Cell {} of {} finished: {} ({}ms)",
                index,
                notebook.id,
                outcome.status,
                duration_ms
            );

            executions.push(Execution {
                id: new_id(),
                notebook_id: notebook.id.clone(),
                cell_index: index,
                source: cell.source.clone(),
                output: outcome.output,
                status: outcome.status,
                started_at,
                finished_at,
                duration_ms,
            });
        }

        self.store.insert_executions(&executions)?;
        self.store.touch_notebook(id, now())?;

        Ok(executions)
    }

    /// Execution history, most recent first, at most `limit` records.
    ///
    /// An unknown id has no history and yields an empty list.
    pub fn history(&self, id: &str, limit: usize) -> Result<Vec<Execution>> {
        self.store.list_executions(id, limit)
    }

    // ── Export ─────────────────────────────────────────────────────────

    /// Export a notebook and return the written path.
    ///
    /// `Document` rewrites the backing file in place and advances
    /// `updated_at`; the other formats write a sibling file.
    pub fn export(&mut self, id: &str, format: ExportFormat) -> Result<PathBuf> {
        let notebook = self.load(id)?;

        let out_path = match format {
            ExportFormat::Document => {
                write_document(&notebook)?;
                self.store.touch_notebook(id, now())?;
                notebook.path.clone()
            }
            ExportFormat::Script => {
                let out_path = quire_sync::default_script_path(&notebook.path);
                write_text(&out_path, &render_script(&notebook.cells))?;
                out_path
            }
            ExportFormat::Rendered => {
                let out_path = quire_sync::default_html_path(&notebook.path);
                write_text(&out_path, &render_html(&notebook.name, &notebook.cells))?;
                out_path
            }
        };

        tracing::info!("Exported {} as {} to {}", id, format, out_path.display());
        Ok(out_path)
    }

    fn find(&self, id: &str) -> Result<Notebook> {
        self.store
            .get_notebook(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_document(notebook: &Notebook) -> Result<()> {
    ensure_parent(&notebook.path)?;
    quire_sync::write_cells(&notebook.path, &notebook.cells, &notebook.kernel)?;
    Ok(())
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, contents)?;
    Ok(())
}

fn read_document(path: &Path) -> Result<Vec<Cell>> {
    match fs::read(path) {
        Ok(bytes) => Ok(quire_sync::decode(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Document {} is missing, loading no cells", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}
