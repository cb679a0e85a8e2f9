//! `compara homology` command implementation

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::OutputFormat;
use colored::Colorize;
use compara_ingest::homology::{self, HomologyFilter, HomologyReport, GROUPS_FILE};
use compara_ingest::species::load_name_list;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Serialize)]
struct HomologySummary<'a> {
    #[serde(flatten)]
    report: &'a HomologyReport,
    output: PathBuf,
}

/// Run the homology command
pub fn run(
    input: PathBuf,
    species: Option<PathBuf>,
    identity: f64,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    config.validate()?;
    if !(0.0..=100.0).contains(&identity) {
        return Err(CliError::config(format!(
            "identity cutoff must be between 0 and 100, got {identity}"
        )));
    }
    if !input.is_file() {
        return Err(CliError::file_not_found(&input));
    }

    info!(file = %input.display(), "Reading homology table");
    let entries = homology::load_homology_table(&input)?;

    let mut filter = HomologyFilter {
        identity_cutoff: identity,
        ..Default::default()
    };
    if let Some(path) = species {
        if !path.is_file() {
            return Err(CliError::file_not_found(&path));
        }
        filter = filter.with_species(load_name_list(&path)?);
    }

    let report = homology::summarize(&entries, &filter);

    std::fs::create_dir_all(&config.output_dir)?;
    let output = config.output_dir.join(GROUPS_FILE);
    homology::write_groups(&output, &report.groups)?;

    let summary = HomologySummary {
        report: &report,
        output,
    };
    super::report(format, &summary, |s| {
        println!("{}", "Homology groups written".green().bold());
        println!("  Entries:   {}", s.report.initial);
        println!("  Remaining: {} (-{})", s.report.remaining, s.report.removed);
        println!("  Genes:     {}", s.report.genes);
        println!("  Output:    {}", s.output.display());
    })
}
