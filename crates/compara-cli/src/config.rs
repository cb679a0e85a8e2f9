//! Configuration management for Compara CLI
//!
//! Values come from built-in defaults, then `COMPARA_*` environment
//! variables, then command-line flags.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Default output directory when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Records between progress log lines when no progress bar is drawn.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

pub const ENV_OUTPUT_DIR: &str = "COMPARA_OUTPUT_DIR";
pub const ENV_SPECIES_FILE: &str = "COMPARA_SPECIES_FILE";
pub const ENV_PROGRESS_INTERVAL: &str = "COMPARA_PROGRESS_INTERVAL";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for all outputs
    pub output_dir: PathBuf,

    /// Species-of-interest table
    #[serde(default)]
    pub species_file: Option<PathBuf>,

    /// Log progress every N records; `None` draws a progress bar
    #[serde(default)]
    pub progress_interval: Option<usize>,
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            species_file: None,
            progress_interval: None,
        }
    }

    /// Load config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new().merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = var(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }

        if let Some(file) = var(ENV_SPECIES_FILE) {
            self.species_file = Some(PathBuf::from(file));
        }

        if let Some(interval) = var(ENV_PROGRESS_INTERVAL) {
            let parsed = interval.trim().parse::<usize>().map_err(|_| {
                CliError::config(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_PROGRESS_INTERVAL, interval
                ))
            })?;
            self.progress_interval = Some(parsed);
        }

        Ok(self)
    }

    /// Apply explicit command-line values on top of this config
    pub fn with_overrides(
        mut self,
        output_dir: Option<PathBuf>,
        species_file: Option<PathBuf>,
        progress_interval: Option<usize>,
    ) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if species_file.is_some() {
            self.species_file = species_file;
        }
        if progress_interval.is_some() {
            self.progress_interval = progress_interval;
        }
        self
    }

    /// Check the assembled values before any work starts
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(CliError::config("output directory must not be empty"));
        }
        if self.progress_interval == Some(0) {
            return Err(CliError::config("progress interval must be greater than zero"));
        }
        if let Some(species) = &self.species_file {
            if !species.is_file() {
                return Err(CliError::file_not_found(species));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
