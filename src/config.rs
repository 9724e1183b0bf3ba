use crate::error::{Error, Result};
use crate::walker::IgnoreRules;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub walker: WalkerConfig,
    pub discovery: DiscoveryConfig,
    pub diagrams: DiagramConfig,
}

/// Tree walking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Directory levels below the root that are expanded in the tree view
    pub max_depth: usize,
    pub ignore: IgnoreRules,
}

/// File discovery by role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Candidate README names, checked in order
    pub readme_candidates: Vec<String>,
    /// File names treated as entry points
    pub entry_points: Vec<String>,
}

/// Diagram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub enabled: bool,
    /// Units considered by the class diagram
    pub max_units: usize,
    /// Methods listed per class box
    pub max_methods: usize,
    /// Functions kept in the call graph diagram
    pub max_functions: usize,
    /// Outgoing calls considered per function
    pub max_calls: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            ignore: IgnoreRules::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            readme_candidates: ["README.md", "README.rst", "README.txt", "README", "readme.md"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            entry_points: ["main.py", "app.py", "__main__.py", "run.py", "server.py", "main.jac"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_units: 10,
            max_methods: 5,
            max_functions: 15,
            max_calls: 5,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("ignoring config {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, depth: Option<usize>, ignore: Vec<String>, no_diagrams: bool) {
        if let Some(d) = depth {
            self.walker.max_depth = d;
        }

        if !ignore.is_empty() {
            self.walker.ignore.names.extend(ignore);
        }

        if no_diagrams {
            self.diagrams.enabled = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.walker.max_depth > 100 {
            return Err(Error::config_validation("max_depth cannot exceed 100"));
        }

        let d = &self.diagrams;
        if d.max_units == 0 || d.max_methods == 0 || d.max_functions == 0 || d.max_calls == 0 {
            return Err(Error::config_validation("diagram caps must be at least 1"));
        }

        if self.discovery.readme_candidates.is_empty() {
            return Err(Error::config_validation(
                "at least one README candidate required",
            ));
        }

        Ok(())
    }
}
