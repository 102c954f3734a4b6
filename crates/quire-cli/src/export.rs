//! Export command implementation for Quire CLI.

use std::time::Instant;

use quire_core::{ExportFormat, NotebookService};

use crate::colors;

/// Export a notebook in the named format and print where it went.
pub fn execute(service: &mut NotebookService, id: &str, format: &str) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let start = Instant::now();

    let out_path = service.export(id, format)?;

    println!(
        "{}✓{} Exported {} to {}{}{} ({:.2}ms)",
        colors::GREEN,
        colors::RESET,
        format,
        colors::CYAN,
        out_path.display(),
        colors::RESET,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
