// Language-agnostic entity model produced by the dialect parsers
//
// Every type here is a plain serializable value. A unit that failed to
// read or parse carries the failure message and no entities.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A parsed structured-dialect file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedUnit {
    pub source_path: PathBuf,
    /// Every function in the file, nested ones and methods included
    pub functions: Vec<FunctionEntity>,
    pub classes: Vec<ClassEntity>,
    pub imports: Vec<ImportRef>,
    /// Module-level docstring
    pub doc_comment: Option<String>,
    /// Set when the file could not be read or parsed
    pub parse_error: Option<String>,
}

impl ParsedUnit {
    /// Create an empty unit for a path
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            doc_comment: None,
            parse_error: None,
        }
    }

    /// Create an error-carrying unit
    pub fn failed(source_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            parse_error: Some(error.into()),
            ..Self::new(source_path)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.parse_error.is_none()
    }

    /// Check if file has any entities
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.source_path
    }
}

/// A function or method definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionEntity {
    pub name: String,
    pub line_start: usize,
    pub line_end: usize,
    /// Declared positional parameter names, in order
    pub parameter_names: Vec<String>,
    pub doc_comment: Option<String>,
    pub annotations: Vec<Ref>,
}

impl FunctionEntity {
    pub fn new(name: &str, line_start: usize) -> Self {
        Self {
            name: name.to_string(),
            line_start,
            line_end: line_start,
            parameter_names: Vec::new(),
            doc_comment: None,
            annotations: Vec::new(),
        }
    }

    /// Check if this is a special method (__x__)
    pub fn is_special(&self) -> bool {
        self.name.starts_with("__") && self.name.ends_with("__")
    }

    /// Check if an annotation with this simple name is applied
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Ref::Named(n) if n == name))
    }

    /// Render as `name(a, b)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameter_names.join(", "))
    }
}

/// A class definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassEntity {
    pub name: String,
    pub line_start: usize,
    pub line_end: usize,
    /// Methods declared directly in the class body, in declaration order
    pub method_names: Vec<String>,
    /// Base types as written
    pub base_names: Vec<Ref>,
    pub doc_comment: Option<String>,
}

impl ClassEntity {
    pub fn new(name: &str, line_start: usize) -> Self {
        Self {
            name: name.to_string(),
            line_start,
            line_end: line_start,
            method_names: Vec::new(),
            base_names: Vec::new(),
            doc_comment: None,
        }
    }
}

/// A decorator or base-type reference
///
/// Simple name references keep their name; anything else (attribute
/// access, calls, subscripts) keeps its source text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Ref {
    Named(String),
    Opaque(String),
}

impl Ref {
    pub fn as_str(&self) -> &str {
        match self {
            Ref::Named(s) | Ref::Opaque(s) => s,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Ref::Named(_))
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An import statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImportRef {
    /// `import x` or `import x as y`, one per imported module
    Module { module: String, alias: Option<String> },
    /// `from x import a, b`
    Selective {
        /// `None` for purely relative imports such as `from . import x`
        module: Option<String>,
        /// Number of leading dots
        level: usize,
        imported_names: Vec<String>,
    },
}

impl ImportRef {
    pub fn module(&self) -> Option<&str> {
        match self {
            ImportRef::Module { module, .. } => Some(module),
            ImportRef::Selective { module, .. } => module.as_deref(),
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, ImportRef::Selective { level, .. } if *level > 0)
    }
}

/// A pattern-dialect file: bare construct names, no locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DialectUnit {
    pub source_path: PathBuf,
    pub node_names: Vec<String>,
    pub walker_names: Vec<String>,
    pub ability_names: Vec<String>,
    /// Set when the file could not be read
    pub error: Option<String>,
}

impl DialectUnit {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    pub fn failed(source_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(source_path)
        }
    }
}
