//! CLI module for Surveyor

mod args;

pub use args::{Args, Command, Format};

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::render_markdown;
use crate::util::{extract_repo_name, validate_github_url};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG: &str = "surveyor.toml";

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    let verbose = matches!(args.command, Command::Analyze { verbose: true, .. });
    init_tracing(verbose);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the log subscriber on stderr; `RUST_LOG` overrides the default
fn init_tracing(verbose: bool) {
    let default = if verbose { "surveyor=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            path,
            format,
            output,
            config,
            depth,
            ignore,
            no_diagrams,
            verbose,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(depth, ignore, no_diagrams);

            tracing::debug!(
                "analyzing {} (depth {}, diagrams {})",
                path.display(),
                cfg.walker.max_depth,
                cfg.diagrams.enabled
            );

            let analyzer = Analyzer::new(cfg)?.with_verbose(verbose);
            let analysis = analyzer.analyze(&path)?;

            let failures = analysis.failures();
            if !failures.is_empty() {
                eprintln!("Skipped {} file(s):", failures.len());
                for (path, err) in failures.iter().take(5) {
                    eprintln!("  {}: {}", path.display(), err);
                }
                if failures.len() > 5 {
                    eprintln!("  ... and {} more", failures.len() - 5);
                }
            }

            let report = match format {
                Format::Json => serde_json::to_string_pretty(&analysis)?,
                Format::Markdown => render_markdown(&analysis),
            };
            write_report(&report, output.as_deref())
        }

        Command::Tree { path, depth } => {
            let mut cfg = load_config(None)?;
            cfg.merge_cli(depth, Vec::new(), false);

            let analyzer = Analyzer::new(cfg)?;
            let tree = analyzer.tree(&path)?;
            println!("{}", tree.render(&display_name(&path)));
            Ok(())
        }

        Command::CheckUrl { url } => {
            if !validate_github_url(&url) {
                return Err(Error::other(format!("Not a GitHub repository URL: {}", url)));
            }
            println!("{}", extract_repo_name(&url));
            Ok(())
        }
    }
}

/// Explicit config files must load; the default one is optional
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::load_or_default(Path::new(DEFAULT_CONFIG))),
    }
}

fn write_report(report: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, report)?;
            eprintln!("Report written to: {}", path.display());
        }
        None => println!("{}", report),
    }
    Ok(())
}

/// Name shown at the top of a rendered tree
fn display_name(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| resolved.display().to_string())
}
