//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod count_nodes;
pub mod homology;
pub mod search;
pub mod split;
pub mod variants;

use crate::error::{CliError, Result};
use crate::OutputFormat;
use serde::Serialize;
use std::path::Path;

/// Read a whole input file, reporting a missing file with a hint
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(CliError::file_not_found(path));
    }
    Ok(compara_common::error::read_to_string(path)?)
}

/// Print a run summary as JSON, or through `text` otherwise
pub(crate) fn report<T: Serialize>(format: OutputFormat, summary: &T, text: impl FnOnce(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => text(summary),
    }
    Ok(())
}
