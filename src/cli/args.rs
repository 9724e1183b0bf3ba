//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Summarize the structure of a source repository
#[derive(Parser, Debug)]
#[command(name = "surveyor")]
#[command(about = "Summarize the structure of a source repository")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Report format for `analyze`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a repository and print a report
    Analyze {
        /// Path to the repository root
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "markdown")]
        format: Format,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path (defaults to ./surveyor.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum directory depth listed in the tree
        #[arg(long)]
        depth: Option<usize>,

        /// Extra directory or file names to ignore (can be repeated)
        #[arg(long)]
        ignore: Vec<String>,

        /// Skip diagram generation
        #[arg(long)]
        no_diagrams: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the directory tree
    Tree {
        /// Path to the repository root
        path: PathBuf,

        /// Maximum directory depth
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Check a GitHub repository URL and print the repository name
    CheckUrl {
        url: String,
    },
}
