//! `compara split` command implementation

use crate::config::Config;
use crate::error::Result;
use crate::progress;
use crate::OutputFormat;
use colored::Colorize;
use compara_ingest::family::pipeline::{split_into_chunks, SplitSummary};
use compara_ingest::family::ChunkStorage;
use std::path::PathBuf;
use tracing::info;

/// Run the split command
pub fn run(input: PathBuf, config: &Config, format: OutputFormat) -> Result<()> {
    config.validate()?;
    info!(input = %input.display(), "Splitting family dump");
    let dump = super::read_input(&input)?;

    let storage = ChunkStorage::new(&config.output_dir);
    let reporter = progress::reporter(config.progress_interval, "Splitting gene families");
    let summary = split_into_chunks(&dump, &storage, reporter.as_ref())?;

    super::report(format, &summary, print_summary)
}

fn print_summary(summary: &SplitSummary) {
    println!("{}", "Split complete".green().bold());
    println!("  Chunks:         {}", summary.chunks);
    println!("  Skipped blocks: {}", summary.skipped_blocks);
    println!("  Output:         {}", summary.output_dir.display());
}
