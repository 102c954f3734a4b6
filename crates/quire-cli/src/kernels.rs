//! Kernel spec commands.

use quire_core::NotebookService;

use crate::output::print_json;

pub fn list(service: &NotebookService) -> anyhow::Result<()> {
    print_json(&service.list_kernels()?)
}

/// Register (or replace) a kernel spec and print the stored record.
pub fn register(
    service: &mut NotebookService,
    name: &str,
    language: &str,
    display_name: &str,
    argv: Vec<String>,
) -> anyhow::Result<()> {
    let spec = service.register_kernel(name, language, display_name, argv)?;
    print_json(&spec)
}
