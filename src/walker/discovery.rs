// File discovery by role: README, entry points, per-dialect file lists
//
// Each function here runs its own traversal over the same ignore policy as
// the tree walker. None of them reuse a previously built tree.

use crate::error::Result;
use crate::walker::{check_root, IgnorePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A supported source dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Parsed with a full-syntax grammar
    Python,
    /// Parsed with line-oriented patterns
    Jac,
}

impl Dialect {
    /// File extension for this dialect, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::Python => "py",
            Dialect::Jac => "jac",
        }
    }

    /// Detect the dialect of a file from its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "py" => Some(Dialect::Python),
            "jac" => Some(Dialect::Jac),
            _ => None,
        }
    }
}

/// Return the contents of the first README candidate that exists and reads
///
/// Candidates are tried in order; the first readable one wins even if a
/// later candidate would be a better match.
pub fn find_readme(root: &Path, candidates: &[String]) -> Option<String> {
    for name in candidates {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(contents) => return Some(contents),
            Err(e) => {
                tracing::debug!("skipping unreadable README {}: {}", path.display(), e);
            }
        }
    }
    None
}

/// Find files whose base name is one of `entry_names`
pub fn find_entry_points(
    root: &Path,
    entry_names: &[String],
    policy: &IgnorePolicy,
) -> Result<Vec<PathBuf>> {
    let files = files_under(root, policy)?
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry_names.iter().any(|n| *n == name)
        })
        .map(|entry| entry.into_path())
        .collect();
    Ok(files)
}

/// List every file of the given dialect below `root`, in path order
pub fn list_files_of_dialect(
    root: &Path,
    dialect: Dialect,
    policy: &IgnorePolicy,
) -> Result<Vec<PathBuf>> {
    let files = files_under(root, policy)?
        .filter(|entry| Dialect::from_path(entry.path()) == Some(dialect))
        .map(|entry| entry.into_path())
        .collect();
    Ok(files)
}

/// Non-ignored regular files below `root`, sorted by path
fn files_under<'a>(
    root: &Path,
    policy: &'a IgnorePolicy,
) -> Result<impl Iterator<Item = DirEntry> + 'a> {
    check_root(root)?;

    let iter = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            e.depth() == 0 || !policy.is_ignored(&e.file_name().to_string_lossy())
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file());

    Ok(iter)
}
