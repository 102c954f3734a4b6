//! Notebook and database path handling.
//!
//! Notebook paths are stored in absolute, canonical form so that the
//! uniqueness constraint on `notebooks.path` compares like with like.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Directory under the home directory holding the default database.
pub const DATA_DIR_NAME: &str = ".quire";

/// File name of the default database.
pub const DB_FILE_NAME: &str = "notebooks.db";

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    if let Some(Component::Normal(first)) = components.next()
        && first == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home.join(components.as_path());
    }
    path.to_path_buf()
}

/// Resolve a user-supplied notebook path to an absolute, canonical path.
///
/// Expands `~`, joins relative paths onto the current directory, folds
/// `.` and `..` components, then resolves symlinks in the longest prefix
/// that exists. The file and its parent directories need not exist.
///
/// # Errors
/// Returns an error if the current directory cannot be determined.
pub fn resolve_notebook_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let expanded = expand_home(path.as_ref());
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(canonicalize_existing(&normalize(&absolute)))
}

/// Canonicalize the deepest existing ancestor of `path` and re-attach the
/// components below it.
fn canonicalize_existing(path: &Path) -> PathBuf {
    for ancestor in path.ancestors() {
        // Missing entries and dangling links fall through to the parent
        let Ok(base) = fs::canonicalize(ancestor) else {
            continue;
        };
        let rest = path.strip_prefix(ancestor).unwrap_or(Path::new(""));
        return if rest.as_os_str().is_empty() {
            base
        } else {
            base.join(rest)
        };
    }
    path.to_path_buf()
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Default database location: `~/.quire/notebooks.db`.
///
/// Falls back to the current directory when no home directory is known.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
        .join(DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c/nb.ipynb")),
            PathBuf::from("/a/c/nb.ipynb")
        );
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("/a/b/..")), PathBuf::from("/a"));
    }

    #[test]
    fn test_resolve_relative_is_absolute() {
        let resolved = resolve_notebook_path("notebooks/demo.ipynb").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("notebooks/demo.ipynb"));
    }

    #[test]
    fn test_resolve_folds_dots_below_missing_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();

        let resolved = resolve_notebook_path(root.join("x/../missing/./demo.ipynb")).unwrap();
        assert_eq!(resolved, root.join("missing/demo.ipynb"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlinked_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(root.join("real")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        assert_eq!(
            resolve_notebook_path(root.join("link/nb.ipynb")).unwrap(),
            root.join("real/nb.ipynb")
        );
        assert_eq!(
            resolve_notebook_path(root.join("link/sub/nb.ipynb")).unwrap(),
            root.join("real/sub/nb.ipynb")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlinked_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        fs::write(root.join("target.ipynb"), "{}").unwrap();
        std::os::unix::fs::symlink(root.join("target.ipynb"), root.join("alias.ipynb")).unwrap();

        assert_eq!(
            resolve_notebook_path(root.join("alias.ipynb")).unwrap(),
            root.join("target.ipynb")
        );
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/nb.ipynb")), home.join("nb.ipynb"));
        }
        assert_eq!(
            expand_home(Path::new("/abs/~/nb.ipynb")),
            PathBuf::from("/abs/~/nb.ipynb")
        );
    }

    #[test]
    fn test_default_db_path() {
        let path = default_db_path();
        assert!(path.ends_with(".quire/notebooks.db"));
    }
}
