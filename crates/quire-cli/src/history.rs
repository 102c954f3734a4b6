//! History command implementation for Quire CLI.

use quire_core::NotebookService;

use crate::output::print_json;

pub fn execute(service: &NotebookService, id: &str, limit: usize) -> anyhow::Result<()> {
    print_json(&service.history(id, limit)?)
}
