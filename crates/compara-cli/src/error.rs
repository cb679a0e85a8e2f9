//! Error types for Compara CLI
//!
//! User-facing errors with a hint on how to fix the problem.

use compara_common::ComparaError;
use compara_ingest::family::FamilyError;
use compara_ingest::newick::NewickError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Required input file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// A family table row could not be split into its columns
    #[error("Malformed gene-family dump: {0}. The input must be an unmodified Compara family export.")]
    MalformedDump(FamilyError),

    /// Writing outputs failed
    #[error("Failed to write output: {0}. Check that the output directory is writable.")]
    Output(FamilyError),

    /// An auxiliary input table could not be read
    #[error("Invalid input: {0}")]
    Input(#[from] ComparaError),

    /// Tree could not be parsed
    #[error("Invalid Newick tree: {0}. The file's first line must hold a single ';'-terminated tree.")]
    Newick(#[from] NewickError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your command-line flags and COMPARA_* environment variables.")]
    Config(String),

    /// JSON output failed
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn file_not_found(path: &std::path::Path) -> Self {
        Self::FileNotFound(path.display().to_string())
    }
}

impl From<FamilyError> for CliError {
    fn from(err: FamilyError) -> Self {
        match err {
            FamilyError::Input(inner) => Self::Input(inner),
            err if err.is_structural() => Self::MalformedDump(err),
            err => Self::Output(err),
        }
    }
}
