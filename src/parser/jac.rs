// Jac parser using line-oriented patterns
//
// Jac has no grammar available here, so constructs are picked out with
// three independent regular expressions. Only names are recovered.

use crate::error::{Error, Result};
use crate::parser::ast::DialectUnit;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Parser for Jac source files
pub struct JacParser {
    node: Regex,
    walker: Regex,
    ability: Regex,
}

impl JacParser {
    /// Create a new Jac parser
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::parser(format!("bad Jac pattern: {}", e)))
        };
        Ok(Self {
            node: compile(r"\bnode\s+(\w+)\s*\{")?,
            walker: compile(r"\bwalker\s+(\w+)\s*\{")?,
            ability: compile(r"\bcan\s+(\w+)")?,
        })
    }

    /// Parse a Jac file, carrying read failures in the unit
    pub fn parse_file(&self, path: &Path) -> DialectUnit {
        match std::fs::read_to_string(path) {
            Ok(source) => self.parse_source(&source, path),
            Err(e) => {
                tracing::debug!("cannot read {}: {}", path.display(), e);
                DialectUnit::failed(path, format!("unreadable: {}", e))
            }
        }
    }

    /// Extract node, walker and ability names in order of appearance
    pub fn parse_source(&self, source: &str, path: impl Into<PathBuf>) -> DialectUnit {
        let mut unit = DialectUnit::new(path);
        unit.node_names = captures(&self.node, source);
        unit.walker_names = captures(&self.walker, source);
        unit.ability_names = captures(&self.ability, source);
        unit
    }
}

fn captures(pattern: &Regex, source: &str) -> Vec<String> {
    pattern
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
