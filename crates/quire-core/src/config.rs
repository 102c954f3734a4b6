//! Runtime configuration.
//!
//! A [`Config`] is built once at startup and passed into
//! [`NotebookService::open`](crate::NotebookService::open); library code
//! never reads the process environment on its own.

use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

/// Environment variable overriding the database location.
pub const DB_ENV: &str = "QUIRE_DB";

/// Environment variable overriding the interpreter used to run cells.
pub const PYTHON_ENV: &str = "QUIRE_PYTHON";

/// Per-cell timeout used when the caller does not supply one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Interpreter used to run code cells.
    pub interpreter: Interpreter,
    /// Default per-cell timeout.
    pub default_timeout: Duration,
}

impl Config {
    /// Configuration using the given database and a detected interpreter.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            interpreter: Interpreter::detect(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build configuration from `QUIRE_DB` / `QUIRE_PYTHON`, falling back to
    /// `~/.quire/notebooks.db` and the first Python found on `PATH`.
    pub fn from_env() -> Self {
        let db_path = std::env::var_os(DB_ENV)
            .map(|raw| paths::expand_home(&PathBuf::from(raw)))
            .unwrap_or_else(paths::default_db_path);

        let interpreter = std::env::var_os(PYTHON_ENV)
            .map(|raw| Interpreter::python(PathBuf::from(raw)))
            .unwrap_or_else(Interpreter::detect);

        Self {
            db_path,
            interpreter,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the interpreter.
    pub fn with_interpreter(mut self, interpreter: Interpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Replace the default timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

/// Program used to run a cell: `<program> <args...> <source>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Interpreter {
    /// Arbitrary interpreter taking the source as its final argument.
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Python, run as `python -c <source>`.
    pub fn python(program: impl Into<PathBuf>) -> Self {
        Self::new(program, ["-c"])
    }

    /// POSIX shell, run as `sh -c <source>`.
    pub fn shell() -> Self {
        Self::new("sh", ["-c"])
    }

    /// Find `python3` (then `python`) on `PATH`.
    ///
    /// If neither is found, returns a bare `python3` so the failure surfaces
    /// as an `error` execution rather than at startup.
    pub fn detect() -> Self {
        ["python3", "python"]
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::python)
            .unwrap_or_else(|| Self::python("python3"))
    }
}
