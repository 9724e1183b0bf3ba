// Markdown report for a finished analysis
//
// Purely structural: every section is derived from the analysis value, so
// two runs over the same repository differ only in the timestamp line.

use crate::analysis::Analysis;
use crate::parser::{ClassEntity, DialectUnit, ImportRef, ParsedUnit};
use crate::util::{current_datetime, format_file_size, summarize_text};
use std::path::Path;

/// Longest README excerpt placed in the overview
const README_SUMMARY_LEN: usize = 500;

/// Builder for the Markdown report
pub struct MarkdownReport<'a> {
    analysis: &'a Analysis,
    project_name: String,
    generated_at: Option<String>,
}

impl<'a> MarkdownReport<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            project_name: analysis.project_name(),
            generated_at: None,
        }
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    /// Fix the timestamp instead of using the current local time
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = Some(timestamp.into());
        self
    }

    /// Render the full document
    pub fn render(&self) -> String {
        let analysis = self.analysis;
        let mut md = String::new();

        let generated_at = self.generated_at.clone().unwrap_or_else(current_datetime);
        md.push_str(&format!("# {}\n\n", self.project_name));
        md.push_str(&format!("_Generated {}_\n\n", generated_at));

        md.push_str("## Overview\n\n");
        match &analysis.readme {
            Some(readme) => {
                md.push_str(&format!("{}\n\n", summarize_text(readme.trim(), README_SUMMARY_LEN)));
            }
            None => md.push_str("No README found.\n\n"),
        }

        md.push_str("## Statistics\n\n");
        md.push_str(&format!("- **Files:** {}\n", analysis.tree.file_count()));
        md.push_str(&format!("- **Total size:** {}\n", format_file_size(analysis.tree.total_size())));
        md.push_str(&format!("- **Python files:** {}\n", analysis.units.len()));
        md.push_str(&format!("- **Jac files:** {}\n", analysis.dialect_units.len()));
        md.push_str(&format!("- **Classes:** {}\n", analysis.class_count()));
        md.push_str(&format!("- **Functions:** {}\n", analysis.function_count()));
        md.push('\n');

        if !analysis.entry_points.is_empty() {
            md.push_str("## Entry Points\n\n");
            for path in &analysis.entry_points {
                md.push_str(&format!("- `{}`\n", self.relative(path)));
            }
            md.push('\n');
        }

        md.push_str("## Directory Structure\n\n```text\n");
        md.push_str(&analysis.tree.render(&self.project_name));
        md.push_str("\n```\n\n");

        if !analysis.units.is_empty() {
            md.push_str("## Modules\n\n");
            for unit in &analysis.units {
                self.write_unit(&mut md, unit);
            }
        }

        if !analysis.dialect_units.is_empty() {
            md.push_str("## Jac Constructs\n\n");
            for unit in &analysis.dialect_units {
                self.write_dialect_unit(&mut md, unit);
            }
        }

        if let Some(diagram) = &analysis.class_diagram {
            md.push_str(&format!("## Class Diagram\n\n{}\n\n", diagram));
        }
        if let Some(diagram) = &analysis.call_diagram {
            md.push_str(&format!("## Call Graph\n\n{}\n\n", diagram));
        }

        md
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.analysis.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn write_unit(&self, md: &mut String, unit: &ParsedUnit) {
        md.push_str(&format!("### `{}`\n\n", self.relative(unit.path())));

        if let Some(err) = &unit.parse_error {
            md.push_str(&format!("> Not analyzed: {}\n\n", err));
            return;
        }
        if let Some(doc) = unit.doc_comment.as_deref().and_then(first_line) {
            md.push_str(&format!("{}\n\n", doc));
        }

        if !unit.imports.is_empty() {
            let modules: Vec<String> = unit.imports.iter().map(import_label).collect();
            md.push_str(&format!("**Imports:** {}\n\n", modules.join(", ")));
        }

        if !unit.classes.is_empty() {
            md.push_str("**Classes:**\n\n");
            for class in &unit.classes {
                write_class(md, class);
            }
            md.push('\n');
        }

        if !unit.functions.is_empty() {
            md.push_str("**Functions:**\n\n");
            for func in &unit.functions {
                md.push_str(&format!("- `{}` (line {})", func.signature(), func.line_start));
                if let Some(doc) = func.doc_comment.as_deref().and_then(first_line) {
                    md.push_str(&format!(": {}", doc));
                }
                md.push('\n');
            }
            md.push('\n');
        }

        if unit.is_empty() && unit.imports.is_empty() {
            md.push_str("_No definitions._\n\n");
        }
    }

    fn write_dialect_unit(&self, md: &mut String, unit: &DialectUnit) {
        md.push_str(&format!("### `{}`\n\n", self.relative(&unit.source_path)));

        if let Some(err) = &unit.error {
            md.push_str(&format!("> Not analyzed: {}\n\n", err));
            return;
        }

        for (label, names) in [
            ("Nodes", &unit.node_names),
            ("Walkers", &unit.walker_names),
            ("Abilities", &unit.ability_names),
        ] {
            if !names.is_empty() {
                md.push_str(&format!("- **{}:** {}\n", label, names.join(", ")));
            }
        }
        md.push('\n');
    }
}

/// Render a report with the current time and the root directory's name
pub fn render_markdown(analysis: &Analysis) -> String {
    MarkdownReport::new(analysis).render()
}

fn write_class(md: &mut String, class: &ClassEntity) {
    md.push_str(&format!("- **{}**", class.name));
    if !class.base_names.is_empty() {
        let bases: Vec<&str> = class.base_names.iter().map(|b| b.as_str()).collect();
        md.push_str(&format!(" ({})", bases.join(", ")));
    }
    md.push_str(&format!(" (line {})", class.line_start));
    if let Some(doc) = class.doc_comment.as_deref().and_then(first_line) {
        md.push_str(&format!(": {}", doc));
    }
    md.push('\n');
    if !class.method_names.is_empty() {
        md.push_str(&format!("  - methods: {}\n", class.method_names.join(", ")));
    }
}

fn import_label(import: &ImportRef) -> String {
    match import {
        ImportRef::Module { module, .. } => format!("`{}`", module),
        ImportRef::Selective { module, level, .. } => {
            format!("`{}{}`", ".".repeat(*level), module.as_deref().unwrap_or(""))
        }
    }
}

fn first_line(doc: &str) -> Option<&str> {
    doc.lines().map(str::trim).find(|l| !l.is_empty())
}
