// Parser module: structured (tree-sitter) and pattern (regex) dialects

pub mod ast;
mod jac;
mod python;

pub use ast::*;
pub use jac::JacParser;
pub use python::PythonParser;
