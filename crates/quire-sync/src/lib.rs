//! Document codec for Quire notebooks.
//!
//! Converts between in-memory cells and the Jupyter `.ipynb` format.
//!
//! # Architecture
//!
//! ```text
//! [Cell] ──► JupyterNotebook::from_cells ──► encode ──► notebook.ipynb
//!                                                          │
//! [Cell] ◄── JupyterNotebook::into_cells ◄── decode ◄──────┘
//! ```
//!
//! Decoding accepts cell source either as one string or as a list of line
//! fragments, so documents written by other tools load unchanged.

mod error;
mod ipynb;

pub use error::{SyncError, SyncResult};
pub use ipynb::{
    Cell, CellType, JupyterCell, JupyterMetadata, JupyterNotebook, KernelDescriptor, LanguageInfo,
    NBFORMAT, NBFORMAT_MINOR, decode, encode, split_source,
};

use std::path::{Path, PathBuf};

/// Get the script export path for a notebook (`<stem>.py` alongside it).
pub fn default_script_path(notebook_path: impl AsRef<Path>) -> PathBuf {
    notebook_path.as_ref().with_extension("py")
}

/// Get the rendered export path for a notebook (`<stem>.html` alongside it).
pub fn default_html_path(notebook_path: impl AsRef<Path>) -> PathBuf {
    notebook_path.as_ref().with_extension("html")
}

/// Read cells from a document file.
pub fn read_cells(path: impl AsRef<Path>) -> SyncResult<Vec<Cell>> {
    Ok(JupyterNotebook::read_from_file(path)?.into_cells())
}

/// Write cells to a document file.
pub fn write_cells(path: impl AsRef<Path>, cells: &[Cell], kernel: &str) -> SyncResult<()> {
    let path = path.as_ref();
    JupyterNotebook::from_cells(cells, kernel).write_to_file(path)?;

    tracing::debug!("Wrote {} ({} cells)", path.display(), cells.len());

    Ok(())
}
