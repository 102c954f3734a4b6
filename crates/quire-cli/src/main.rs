//! Quire CLI - Notebook persistence and execution.

mod colors;
mod execute;
mod export;
mod history;
mod kernels;
mod notebook;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quire_core::{Config, NotebookService};

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Persist, execute and export Jupyter-format notebooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Database file (overrides QUIRE_DB)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty notebook
    Create {
        /// Display name
        name: String,

        /// Where to write the .ipynb document
        path: PathBuf,

        /// Kernel name recorded in the document
        #[arg(short, long, default_value = "python3")]
        kernel: String,
    },

    /// List notebooks, most recently updated first
    List,

    /// Show a notebook and its cells
    Show {
        /// Notebook id
        id: String,
    },

    /// Execute one cell or every code cell
    Execute {
        /// Notebook id
        id: String,

        /// Zero-based index of the cell to run (default: all code cells)
        #[arg(short, long)]
        cell: Option<usize>,

        /// Per-cell timeout in seconds
        #[arg(short, long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Export a notebook
    Export {
        /// Notebook id
        id: String,

        /// Output format: document, script or rendered
        #[arg(short, long, default_value = "document")]
        format: String,
    },

    /// Show execution history, most recent first
    History {
        /// Notebook id
        id: String,

        /// Maximum number of records
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Delete a notebook, its document and its history
    Delete {
        /// Notebook id
        id: String,
    },

    /// List registered kernel specs
    Kernels,

    /// Register or replace a kernel spec
    RegisterKernel {
        /// Kernel name
        name: String,

        /// Language the kernel runs
        #[arg(long, default_value = "python")]
        language: String,

        /// Human readable name (default: the kernel name)
        #[arg(long)]
        display_name: Option<String>,

        /// Launch command, one argument per flag
        #[arg(long = "argv", value_name = "ARG", allow_hyphen_values = true)]
        argv: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format quire-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(quire_err) = err.downcast_ref::<quire_core::Error>() {
            anyhow::anyhow!("{}", quire_err.with_hint())
        } else {
            err
        }
    };

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    tracing::debug!("Using database {}", config.db_path.display());

    let mut service = NotebookService::open(config).map_err(|e| format_error(e.into()))?;

    match cli.command {
        Commands::Create { name, path, kernel } => {
            notebook::create(&mut service, &name, &path, &kernel).map_err(format_error)?;
        }

        Commands::List => notebook::list(&service).map_err(format_error)?,

        Commands::Show { id } => notebook::show(&service, &id).map_err(format_error)?,

        Commands::Execute { id, cell, timeout } => {
            execute::execute(&mut service, &id, cell, timeout)
                .await
                .map_err(format_error)?;
        }

        Commands::Export { id, format } => {
            export::execute(&mut service, &id, &format).map_err(format_error)?;
        }

        Commands::History { id, limit } => {
            history::execute(&service, &id, limit).map_err(format_error)?;
        }

        Commands::Delete { id } => notebook::delete(&mut service, &id).map_err(format_error)?,

        Commands::Kernels => kernels::list(&service).map_err(format_error)?,

        Commands::RegisterKernel {
            name,
            language,
            display_name,
            argv,
        } => {
            let display_name = display_name.unwrap_or_else(|| name.clone());
            kernels::register(&mut service, &name, &language, &display_name, argv)
                .map_err(format_error)?;
        }
    }

    Ok(())
}
