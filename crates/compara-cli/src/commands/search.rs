//! `compara search` command implementation
//!
//! Searches a gene-family dump for every requested gene.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::progress;
use crate::OutputFormat;
use colored::Colorize;
use compara_ingest::family::pipeline::SearchSummary;
use compara_ingest::family::query::load_gene_queries;
use compara_ingest::family::{ChunkStorage, FamilySearch, GeneQuery};
use compara_ingest::species::SpeciesTable;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where the gene names come from
#[derive(Debug, Clone, Default)]
pub struct GeneSource {
    pub file: Option<PathBuf>,
    pub names: Vec<String>,
}

impl GeneSource {
    /// File entries first, then names given on the command line
    ///
    /// Names that would share an output directory with an earlier entry
    /// are dropped.
    pub fn queries(&self) -> Result<Vec<GeneQuery>> {
        let mut queries = match &self.file {
            Some(path) if !path.is_file() => return Err(CliError::file_not_found(path)),
            Some(path) => load_gene_queries(path)?,
            None => Vec::new(),
        };

        for name in self.names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let query = GeneQuery::new(name);
            if let Some(earlier) = queries.iter().find(|q| q.collides_with(&query)) {
                warn!(gene = name, earlier = %earlier, "Dropping gene sharing an output directory");
                continue;
            }
            queries.push(query);
        }

        if queries.is_empty() {
            return Err(CliError::config("No gene names to search for"));
        }
        Ok(queries)
    }
}

/// Run the search command
pub fn run(input: PathBuf, genes: GeneSource, config: &Config, format: OutputFormat) -> Result<()> {
    config.validate()?;
    let queries = genes.queries()?;

    let species = config
        .species_file
        .as_ref()
        .map(|path| SpeciesTable::from_path(path))
        .transpose()?;
    match &species {
        Some(table) => debug!(species = table.len(), "Filtering by species of interest"),
        None => debug!("No species table, keeping all rows"),
    }

    info!(input = %input.display(), genes = queries.len(), "Starting gene search");
    let dump = super::read_input(&input)?;

    let search = FamilySearch::new(ChunkStorage::new(&config.output_dir), species.as_ref());
    let reporter = progress::reporter(config.progress_interval, "Scanning gene families");
    let summary = search.run(&dump, &queries, reporter.as_ref())?;

    super::report(format, &summary, print_summary)
}

fn print_summary(summary: &SearchSummary) {
    println!("{}", "Gene search complete".green().bold());
    println!("  Records:          {}", summary.records);
    println!("  Skipped blocks:   {}", summary.skipped_blocks);
    println!();

    for gene in &summary.genes {
        if gene.chunks() == 0 {
            println!("{} {}", gene.gene.yellow(), "no family found".dimmed());
            continue;
        }
        println!(
            "{}  emitted: {}  null: {}  malformed: {}",
            gene.gene.cyan(),
            gene.emitted,
            gene.null_results,
            gene.malformed_trees
        );
    }

    println!();
    println!("  Cumulative counts: {}", summary.cumulative_path.display());
}
