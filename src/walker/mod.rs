// Repository traversal: tree view, ignore policy and role-based discovery

mod discovery;
mod ignore;
mod tree;

pub use discovery::*;
pub use ignore::{IgnorePolicy, IgnoreRules};
pub use tree::{walk, FileNode};

use crate::error::{Error, Result};
use std::path::Path;

/// Reject roots that cannot be traversed at all
pub(crate) fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(Error::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}
