// Hierarchical file tree view of a repository

use crate::error::Result;
use crate::walker::{check_root, IgnorePolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// A node in the repository tree
///
/// Children are keyed by base name, so two walks over the same directory
/// produce equal trees no matter how the filesystem ordered its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileNode {
    Directory {
        children: BTreeMap<String, FileNode>,
    },
    File {
        /// Size in bytes
        size: u64,
        /// Extension including the leading dot, empty if none
        extension: String,
    },
}

impl FileNode {
    /// An empty directory node
    pub fn empty_dir() -> Self {
        FileNode::Directory {
            children: BTreeMap::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FileNode::Directory { .. })
    }

    /// Children of a directory, `None` for files
    pub fn children(&self) -> Option<&BTreeMap<String, FileNode>> {
        match self {
            FileNode::Directory { children } => Some(children),
            FileNode::File { .. } => None,
        }
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> usize {
        match self {
            FileNode::Directory { children } => children.values().map(|c| c.file_count()).sum(),
            FileNode::File { .. } => 1,
        }
    }

    /// Total size in bytes of the files in this subtree
    pub fn total_size(&self) -> u64 {
        match self {
            FileNode::Directory { children } => children.values().map(|c| c.total_size()).sum(),
            FileNode::File { size, .. } => *size,
        }
    }

    /// Render as an indented text tree
    pub fn render(&self, root_name: &str) -> String {
        let mut lines = vec![root_name.to_string()];
        self.render_children("", &mut lines);
        lines.join("\n")
    }

    fn render_children(&self, prefix: &str, lines: &mut Vec<String>) {
        let Some(children) = self.children() else {
            return;
        };
        let count = children.len();
        for (i, (name, child)) in children.iter().enumerate() {
            let last = i + 1 == count;
            let branch = if last { "└── " } else { "├── " };
            let suffix = if child.is_dir() { "/" } else { "" };
            lines.push(format!("{}{}{}{}", prefix, branch, name, suffix));
            let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
            child.render_children(&next, lines);
        }
    }

    /// Insert a node at a path relative to this directory, creating parents
    fn insert(&mut self, relative: &Path, node: FileNode) {
        let mut parts: Vec<String> = relative
            .iter()
            .map(|c| c.to_string_lossy().into_owned())
            .collect();
        let Some(name) = parts.pop() else {
            return;
        };

        let mut current = self;
        for part in parts {
            current = match current {
                FileNode::Directory { children } => {
                    children.entry(part).or_insert_with(FileNode::empty_dir)
                }
                FileNode::File { .. } => return,
            };
        }

        if let FileNode::Directory { children } = current {
            children.insert(name, node);
        }
    }
}

/// Walk `root` into a [`FileNode`] tree
///
/// Directories more than `max_depth` levels below the root are listed as
/// empty directories. Ignored entries are neither listed nor descended
/// into, and unreadable directories end up empty without aborting the walk.
pub fn walk(root: &Path, max_depth: usize, policy: &IgnorePolicy) -> Result<FileNode> {
    check_root(root)?;

    let mut tree = FileNode::empty_dir();

    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth.saturating_add(1))
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !policy.is_ignored(&e.file_name().to_string_lossy()));

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let node = if entry.file_type().is_dir() {
            FileNode::empty_dir()
        } else {
            FileNode::File {
                size: entry.metadata().map(|m| m.len()).unwrap_or(0),
                extension: entry
                    .path()
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default(),
            }
        };

        tree.insert(relative, node);
    }

    Ok(tree)
}
