// Analysis module: the end-to-end pipeline and the call graph it builds

pub mod callgraph;

pub use callgraph::*;

use crate::config::Config;
use crate::error::Result;
use crate::output::{Diagram, DiagramRenderer};
use crate::parser::{DialectUnit, JacParser, ParsedUnit, PythonParser};
use crate::walker::{self, Dialect, FileNode, IgnorePolicy};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of analyzing a repository
///
/// Per-file failures stay inline in `units` and `dialect_units`.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub root: PathBuf,
    pub tree: FileNode,
    /// Contents of the first README candidate found
    pub readme: Option<String>,
    pub entry_points: Vec<PathBuf>,
    pub units: Vec<ParsedUnit>,
    pub dialect_units: Vec<DialectUnit>,
    pub index: EntityIndex,
    pub call_graph: CallGraph,
    pub class_diagram: Option<Diagram>,
    pub call_diagram: Option<Diagram>,
}

impl Analysis {
    /// Name of the analyzed directory
    pub fn project_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string())
    }

    pub fn function_count(&self) -> usize {
        self.units.iter().map(|u| u.functions.len()).sum()
    }

    pub fn class_count(&self) -> usize {
        self.units.iter().map(|u| u.classes.len()).sum()
    }

    /// Files of either dialect that carry an error
    pub fn failures(&self) -> Vec<(&Path, &str)> {
        let parsed = self
            .units
            .iter()
            .filter_map(|u| u.parse_error.as_deref().map(|e| (u.path(), e)));
        let dialect = self
            .dialect_units
            .iter()
            .filter_map(|u| u.error.as_deref().map(|e| (u.source_path.as_path(), e)));
        parsed.chain(dialect).collect()
    }
}

/// Main analyzer that orchestrates the analysis pipeline
pub struct Analyzer {
    config: Config,
    policy: IgnorePolicy,
    jac: JacParser,
    verbose: bool,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    ///
    /// Fails on invalid configuration, a bad ignore pattern, or a parser
    /// that cannot be initialized.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let policy = IgnorePolicy::new(&config.walker.ignore)?;
        // Surface grammar problems here instead of once per file
        PythonParser::new()?;
        let jac = JacParser::new()?;

        Ok(Self {
            config,
            policy,
            jac,
            verbose: false,
        })
    }

    /// Show a progress bar while parsing
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build the file tree only
    pub fn tree(&self, root: &Path) -> Result<FileNode> {
        walker::walk(root, self.config.walker.max_depth, &self.policy)
    }

    /// Analyze the repository at `root`
    pub fn analyze(&self, root: &Path) -> Result<Analysis> {
        walker::check_root(root)?;

        let tree = self.tree(root)?;
        info!(
            "walked {}: {} files",
            root.display(),
            tree.file_count()
        );

        let readme = walker::find_readme(root, &self.config.discovery.readme_candidates);
        let entry_points =
            walker::find_entry_points(root, &self.config.discovery.entry_points, &self.policy)?;

        let py_files = walker::list_files_of_dialect(root, Dialect::Python, &self.policy)?;
        let jac_files = walker::list_files_of_dialect(root, Dialect::Jac, &self.policy)?;
        info!(
            "found {} Python and {} Jac files",
            py_files.len(),
            jac_files.len()
        );

        let units = self.parse_python(&py_files);
        let dialect_units: Vec<DialectUnit> =
            jac_files.iter().map(|path| self.jac.parse_file(path)).collect();

        let index = EntityIndex::build(&units);
        let call_graph = CallGraph::build_with_index(&units, &index);
        info!(
            "indexed {} entities, {} functions with {} call edges",
            index.len(),
            call_graph.len(),
            call_graph.edge_count()
        );

        let (class_diagram, call_diagram) = if self.config.diagrams.enabled {
            let renderer = DiagramRenderer::from_config(&self.config.diagrams);
            (
                Some(renderer.render_class_diagram(&units)),
                Some(renderer.render_call_graph_diagram(&call_graph)),
            )
        } else {
            (None, None)
        };

        Ok(Analysis {
            root: root.to_path_buf(),
            tree,
            readme,
            entry_points,
            units,
            dialect_units,
            index,
            call_graph,
            class_diagram,
            call_diagram,
        })
    }

    /// Parse Python files in parallel, one parser per worker
    ///
    /// Output order matches `files`.
    fn parse_python(&self, files: &[PathBuf]) -> Vec<ParsedUnit> {
        let progress = if self.verbose {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let units: Vec<ParsedUnit> = files
            .par_iter()
            .map_init(PythonParser::new, |parser, path| {
                let unit = match parser {
                    Ok(parser) => parser.parse_file(path),
                    Err(e) => ParsedUnit::failed(path, e.to_string()),
                };
                match &unit.parse_error {
                    Some(err) => debug!("{}: {}", path.display(), err),
                    None => debug!(
                        "{}: {} functions, {} classes",
                        path.display(),
                        unit.functions.len(),
                        unit.classes.len()
                    ),
                }
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                unit
            })
            .collect();

        if let Some(pb) = progress {
            pb.finish_with_message("Parsing complete");
        }

        units
    }
}
