//! `compara variants` command implementation

use crate::error::{CliError, Result};
use crate::OutputFormat;
use colored::Colorize;
use compara_ingest::variants::{write_hits, Alignment, VariantScan};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_OUTPUT: &str = "variants.tsv";

#[derive(Debug, Clone, Serialize)]
pub struct VariantsSummary {
    pub sequences: usize,
    pub columns: usize,
    pub hits: usize,
    pub output: PathBuf,
}

/// Run the variants command
pub fn run(input: PathBuf, output: PathBuf, exclude: Option<String>, format: OutputFormat) -> Result<()> {
    if !input.is_file() {
        return Err(CliError::file_not_found(&input));
    }

    let alignment = Alignment::from_path(&input)?;
    let scan = VariantScan {
        exclude,
        ..Default::default()
    };
    let hits = scan.scan(&alignment);
    for hit in &hits {
        info!(
            position = hit.position,
            residue = %hit.unique_residue,
            sample = %hit.seq_name,
            "Unique residue found"
        );
    }

    let written = write_hits(&output, &hits)?;
    let summary = VariantsSummary {
        sequences: alignment.len(),
        columns: alignment.width(),
        hits: hits.len(),
        output: written,
    };

    super::report(format, &summary, |s| {
        let title = if s.hits == 0 {
            "No single-sample variants found".yellow().bold()
        } else {
            "Variants written".green().bold()
        };
        println!("{title}");
        println!("  Sequences: {}", s.sequences);
        println!("  Columns:   {}", s.columns);
        println!("  Hits:      {}", s.hits);
        println!("  Output:    {}", s.output.display());
    })
}
