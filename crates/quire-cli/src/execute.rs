//! Execute command implementation for Quire CLI.

use std::time::Duration;

use quire_core::{ExecutionStatus, NotebookService};

use crate::colors;

/// Run one cell (or all code cells) and print a status line per record.
///
/// Failing cells are reported, not treated as command failure.
pub async fn execute(
    service: &mut NotebookService,
    id: &str,
    cell: Option<usize>,
    timeout_secs: Option<u64>,
) -> anyhow::Result<()> {
    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(service.config().default_timeout);

    let records = service.execute(id, cell, timeout).await?;

    if records.is_empty() {
        println!("{}No code cells to execute{}", colors::DIM, colors::RESET);
        return Ok(());
    }

    let mut failed = 0;
    for record in &records {
        let (color, mark) = match record.status {
            ExecutionStatus::Success => (colors::GREEN, "✓"),
            ExecutionStatus::Error => (colors::RED, "✗"),
            ExecutionStatus::Timeout => (colors::YELLOW, "⏱"),
        };
        if !record.status.is_success() {
            failed += 1;
        }

        println!(
            "{}{}{} cell {} {} ({}ms)",
            color, mark, colors::RESET, record.cell_index, record.status, record.duration_ms
        );
        for line in record.output.lines() {
            println!("    {}", line);
        }
    }

    println!(
        "\n{}{} executed{}, {} failed",
        colors::BOLD,
        records.len(),
        colors::RESET,
        failed
    );
    Ok(())
}
