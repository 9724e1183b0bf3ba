// Ignore policy shared by the tree walker and every discovery function

use crate::error::Result;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ignore rules as written in configuration
///
/// All three rule kinds match against an entry's base name only, so the
/// decision for an entry never depends on where or when it is visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreRules {
    /// Exact base names (directories or files)
    pub names: BTreeSet<String>,
    /// Glob patterns matched against base names, e.g. `*.egg-info`
    pub patterns: Vec<String>,
    /// Filename suffixes, e.g. `.pyc`
    pub extensions: Vec<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        let names = [
            // version control
            ".git", ".github", ".gitignore", ".gitattributes",
            // dependencies and caches
            "node_modules", "__pycache__", ".pytest_cache", ".mypy_cache", ".tox",
            "venv", "env", ".env", ".venv", ".coverage", "htmlcov",
            // build output
            "dist", "build",
            // editor and OS metadata
            ".idea", ".vscode", ".DS_Store", "Thumbs.db",
        ];
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            patterns: vec!["*.egg-info".to_string()],
            extensions: [".pyc", ".pyo", ".pyd", ".so", ".dll", ".dylib"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Compiled form of [`IgnoreRules`], passed into every traversal
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    names: BTreeSet<String>,
    patterns: Vec<Pattern>,
    extensions: Vec<String>,
}

impl IgnorePolicy {
    /// Compile the rules, failing on malformed glob patterns
    pub fn new(rules: &IgnoreRules) -> Result<Self> {
        let patterns = rules
            .patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            names: rules.names.clone(),
            patterns,
            extensions: rules.extensions.clone(),
        })
    }

    /// Check whether an entry with this base name is excluded
    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.contains(name)
            || self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
            || self.patterns.iter().any(|p| p.matches(name))
    }
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        let rules = IgnoreRules::default();
        Self {
            names: rules.names,
            patterns: rules
                .patterns
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
            extensions: rules.extensions,
        }
    }
}
