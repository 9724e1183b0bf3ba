//! Surveyor - structural summaries of source repositories
//!
//! Walks a repository, parses Python files with tree-sitter and Jac files
//! with line patterns, builds a name-based call graph and renders Mermaid
//! diagrams plus a Markdown or JSON report.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod util;
pub mod walker;

// Re-export main types
pub use analysis::{Analysis, Analyzer, CallGraph, EntityIndex};
pub use config::Config;
pub use error::{Error, Result};
pub use parser::{DialectUnit, JacParser, ParsedUnit, PythonParser};
pub use walker::{FileNode, IgnorePolicy};
