//! Notebook lifecycle commands: create, list, show, delete.

use std::path::Path;

use quire_core::NotebookService;
use serde_json::json;

use crate::colors;
use crate::output::print_json;

/// Create an empty notebook and print its record.
pub fn create(
    service: &mut NotebookService,
    name: &str,
    path: &Path,
    kernel: &str,
) -> anyhow::Result<()> {
    let notebook = service.create(name, path, kernel, None)?;
    print_json(&notebook)
}

pub fn list(service: &NotebookService) -> anyhow::Result<()> {
    print_json(&service.list()?)
}

/// Print a notebook record together with its current cells.
pub fn show(service: &NotebookService, id: &str) -> anyhow::Result<()> {
    let notebook = service.load(id)?;
    print_json(&json!({
        "notebook": &notebook,
        "cells": &notebook.cells,
    }))
}

pub fn delete(service: &mut NotebookService, id: &str) -> anyhow::Result<()> {
    service.delete(id)?;
    println!("{}✓{} Deleted {}", colors::GREEN, colors::RESET, id);
    Ok(())
}
