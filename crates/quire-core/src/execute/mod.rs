//! Cell execution for Quire notebooks.
//!
//! Every code cell runs in its own freshly spawned interpreter process, so
//! no state leaks between cells or between runs.
//!
//! # Architecture
//!
//! ```text
//! NotebookService::execute
//!     │
//!     └── CellRunner::run(source, timeout)      (one call per code cell)
//!             │
//!             ├── spawn `<interpreter> -c <source>` in its own process group
//!             ├── drain stdout / stderr, wait for exit
//!             ├── on timeout: SIGKILL the group, reap the child
//!             │
//!             └── RunOutcome { output, status: ExecutionStatus }
//! ```
//!
//! The runner never returns an error. Launch failures, non-zero exits and
//! timeouts are all reported through [`ExecutionStatus`].

mod runner;
mod status;

pub use runner::{CellRunner, NO_ERROR_OUTPUT, NO_OUTPUT, RunOutcome, TIMEOUT_MESSAGE};
pub use status::ExecutionStatus;
