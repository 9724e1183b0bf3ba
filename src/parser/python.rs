// Python parser using tree-sitter

use crate::error::{Error, Result};
use crate::parser::ast::*;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// Parser for Python source files
///
/// Holds a tree-sitter parser, so one instance is needed per thread.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::Parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse a Python file
    ///
    /// Read and syntax failures are carried in the returned unit.
    pub fn parse_file(&mut self, path: &Path) -> ParsedUnit {
        match std::fs::read_to_string(path) {
            Ok(source) => self.parse_source(&source, path),
            Err(e) => {
                tracing::debug!("cannot read {}: {}", path.display(), e);
                ParsedUnit::failed(path, format!("unreadable: {}", e))
            }
        }
    }

    /// Parse Python source code
    pub fn parse_source(&mut self, source: &str, path: impl Into<PathBuf>) -> ParsedUnit {
        let path = path.into();

        let Some(tree) = self.parser.parse(source, None) else {
            return ParsedUnit::failed(path, "unparseable: parser produced no tree");
        };

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_syntax_error(root).unwrap_or((1, 1));
            tracing::debug!("syntax error in {} at {}:{}", path.display(), line, column);
            return ParsedUnit::failed(
                path,
                format!("syntax error at line {}, column {}", line, column),
            );
        }

        let bytes = source.as_bytes();
        let mut unit = ParsedUnit::new(path);
        unit.doc_comment = block_docstring(&root, bytes);

        // Pre-order walk over the whole tree, so nested functions and
        // methods are collected alongside top-level ones
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "function_definition" => {
                    if let Some(func) = parse_function(&node, bytes) {
                        unit.functions.push(func);
                    }
                }
                "class_definition" => {
                    if let Some(class) = parse_class(&node, bytes) {
                        unit.classes.push(class);
                    }
                }
                "import_statement" => {
                    unit.imports.extend(parse_import(&node, bytes));
                }
                "import_from_statement" => {
                    if let Some(import) = parse_import_from(&node, bytes) {
                        unit.imports.push(import);
                    }
                }
                _ => {}
            }

            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        unit
    }
}

/// Location (1-based line, column) of the first error or missing node
fn first_syntax_error(root: Node) -> Option<(usize, usize)> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return Some((pos.row + 1, pos.column + 1));
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .children(&mut cursor)
            .filter(|c| c.has_error() || c.is_missing())
            .collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

/// Docstring of a module or block: a lone string as the first statement
fn block_docstring(block: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    string_literal_value(text(&expr, source))
}

/// Strip prefix and quotes from a string literal and clean its indentation
///
/// Byte and format strings are not docstrings.
fn string_literal_value(literal: &str) -> Option<String> {
    let quote_at = literal.find(|c: char| c == '"' || c == '\'')?;
    let prefix = literal[..quote_at].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let body = &literal[quote_at..];
    let inner = if body.len() >= 6 && (body.starts_with("\"\"\"") || body.starts_with("'''")) {
        &body[3..body.len() - 3]
    } else if body.len() >= 2 {
        &body[1..body.len() - 1]
    } else {
        return None;
    };

    Some(clean_docstring(inner))
}

/// Remove the common indentation of continuation lines and surrounding blank lines
fn clean_docstring(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim()
            } else {
                line.get(margin..).unwrap_or("").trim_end()
            }
        })
        .collect();

    let start = cleaned.iter().position(|l| !l.is_empty());
    let end = cleaned.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => cleaned[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// Name reference or source-text fallback for an expression
fn expression_ref(node: &Node, source: &[u8]) -> Ref {
    let value = text(node, source).to_string();
    if node.kind() == "identifier" {
        Ref::Named(value)
    } else {
        Ref::Opaque(value)
    }
}

/// Decorators attached to a definition through its decorated_definition parent
fn decorators_of(node: &Node, source: &[u8]) -> Vec<Ref> {
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    if parent.kind() != "decorated_definition" {
        return Vec::new();
    }

    let mut decorators = Vec::new();
    let mut cursor = parent.walk();
    for child in parent.named_children(&mut cursor) {
        if child.kind() == "decorator" {
            if let Some(expr) = child.named_child(0) {
                decorators.push(expression_ref(&expr, source));
            }
        }
    }
    decorators
}

/// Parse a function definition
fn parse_function(node: &Node, source: &[u8]) -> Option<FunctionEntity> {
    let name = text(&node.child_by_field_name("name")?, source);
    if name.is_empty() {
        return None;
    }

    let mut func = FunctionEntity::new(name, node.start_position().row + 1);
    func.line_end = node.end_position().row + 1;
    if let Some(params) = node.child_by_field_name("parameters") {
        func.parameter_names = positional_parameters(&params, source);
    }
    if let Some(body) = node.child_by_field_name("body") {
        func.doc_comment = block_docstring(&body, source);
    }
    func.annotations = decorators_of(node, source);

    Some(func)
}

/// Names of the positional parameters, stopping at `*`, `*args` or `**kwargs`
fn positional_parameters(node: &Node, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" => names.push(text(&child, source).to_string()),
            "typed_parameter" => {
                // `x: int`, or a typed splat such as `*args: int`
                match child.named_child(0) {
                    Some(first) if first.kind() == "identifier" => {
                        names.push(text(&first, source).to_string());
                    }
                    _ => break,
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = child.child_by_field_name("name") {
                    names.push(text(&name, source).to_string());
                }
            }
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" | "*" => {
                break;
            }
            _ => {}
        }
    }

    names
}

/// Parse a class definition
fn parse_class(node: &Node, source: &[u8]) -> Option<ClassEntity> {
    let name = text(&node.child_by_field_name("name")?, source);
    if name.is_empty() {
        return None;
    }

    let mut class = ClassEntity::new(name, node.start_position().row + 1);
    class.line_end = node.end_position().row + 1;

    if let Some(args) = node.child_by_field_name("superclasses") {
        let mut cursor = args.walk();
        for base in args.named_children(&mut cursor) {
            // metaclass=... and other keywords are not bases
            if matches!(base.kind(), "keyword_argument" | "comment") {
                continue;
            }
            class.base_names.push(expression_ref(&base, source));
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        class.doc_comment = block_docstring(&body, source);

        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            let def = match child.kind() {
                "function_definition" => Some(child),
                "decorated_definition" => child
                    .child_by_field_name("definition")
                    .filter(|d| d.kind() == "function_definition"),
                _ => None,
            };
            if let Some(name) = def.and_then(|d| d.child_by_field_name("name")) {
                class.method_names.push(text(&name, source).to_string());
            }
        }
    }

    Some(class)
}

/// Parse `import a, b as c` into one reference per module
fn parse_import(node: &Node, source: &[u8]) -> Vec<ImportRef> {
    let mut imports = Vec::new();
    let mut cursor = node.walk();

    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "dotted_name" => imports.push(ImportRef::Module {
                module: text(&child, source).to_string(),
                alias: None,
            }),
            "aliased_import" => {
                if let Some(name) = child.child_by_field_name("name") {
                    imports.push(ImportRef::Module {
                        module: text(&name, source).to_string(),
                        alias: child
                            .child_by_field_name("alias")
                            .map(|a| text(&a, source).to_string()),
                    });
                }
            }
            _ => {}
        }
    }

    imports
}

/// Parse `from x import a, b` including relative forms
fn parse_import_from(node: &Node, source: &[u8]) -> Option<ImportRef> {
    let module_node = node.child_by_field_name("module_name")?;

    let (module, level) = if module_node.kind() == "relative_import" {
        let mut level = 0;
        let mut module = None;
        let mut cursor = module_node.walk();
        for inner in module_node.named_children(&mut cursor) {
            match inner.kind() {
                "import_prefix" => {
                    level = text(&inner, source).chars().filter(|c| *c == '.').count();
                }
                "dotted_name" => module = Some(text(&inner, source).to_string()),
                _ => {}
            }
        }
        (module, level)
    } else {
        (Some(text(&module_node, source).to_string()), 0)
    };

    let mut imported_names = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "wildcard_import" {
            imported_names.push("*".to_string());
        }
    }

    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "dotted_name" => imported_names.push(text(&child, source).to_string()),
            "aliased_import" => {
                if let Some(name) = child.child_by_field_name("name") {
                    imported_names.push(text(&name, source).to_string());
                }
            }
            _ => {}
        }
    }

    Some(ImportRef::Selective {
        module,
        level,
        imported_names,
    })
}
