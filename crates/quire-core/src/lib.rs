//! Core engine for Quire notebook management.
//!
//! This crate provides:
//! - SQLite record store for notebooks, execution history and kernel specs
//! - Process-isolated, time-bounded cell runner
//! - Notebook service tying the store, document files and runner together
//! - Export to script and HTML representations

pub mod config;
pub mod error;
pub mod execute;
pub mod model;
pub mod paths;
pub mod service;
pub mod store;

pub use config::{Config, Interpreter};
pub use error::{Error, Result};
pub use execute::{CellRunner, ExecutionStatus, RunOutcome};
pub use model::{Execution, KernelSpec, Notebook, NotebookSummary};
pub use service::{ExportFormat, NotebookService};
pub use store::SqliteStore;

pub use quire_sync::{Cell, CellType};
