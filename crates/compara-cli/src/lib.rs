//! Compara CLI Library
//!
//! Command-line interface for the Ensembl Compara parsers.
//!
//! # Overview
//!
//! - **Gene search**: find gene families in a dump and write per-chunk
//!   tables, trees and copy-number summaries (`compara search`)
//! - **Dump splitting**: one directory per family block (`compara split`)
//! - **Node counts**: annotate a tree with leaf counts (`compara count-nodes`)
//! - **Homology grouping**: filter and group pairwise homologies
//!   (`compara homology`)
//! - **Alignment variants**: single-sample changes in an aligned FASTA
//!   (`compara variants`)

pub mod commands;
pub mod config;
pub mod error;
pub mod progress;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Compara - Ensembl comparative-genomics parsers
#[derive(Parser, Debug)]
#[command(name = "compara")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Format of the run summary printed to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Print the CLI reference as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a gene-family dump for genes and write per-chunk outputs
    Search {
        /// Gene-family dump file
        #[arg(short, long)]
        input: PathBuf,

        /// Gene list: one name per line, or geneID<TAB>geneName
        #[arg(short, long, required_unless_present = "gene")]
        genes: Option<PathBuf>,

        /// Gene name to search for (repeatable)
        #[arg(long)]
        gene: Vec<String>,

        /// Species-of-interest table (tab-separated)
        #[arg(short, long, env = "COMPARA_SPECIES_FILE")]
        species: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, env = "COMPARA_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Log progress every N records instead of drawing a progress bar
        #[arg(long, env = "COMPARA_PROGRESS_INTERVAL")]
        progress_interval: Option<usize>,
    },

    /// Split a gene-family dump into one directory per family
    Split {
        /// Gene-family dump file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "COMPARA_OUTPUT_DIR")]
        output: Option<PathBuf>,
    },

    /// Annotate every tree node with the number of genes below it
    CountNodes {
        /// Newick file; only the first line is read
        #[arg(short, long)]
        input: PathBuf,

        /// NHX output file
        #[arg(short, long, default_value = commands::count_nodes::DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Filter a pairwise homology table and group it by gene
    Homology {
        /// Homology table (tab-separated)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "COMPARA_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Keep only these homology species (one name per line)
        #[arg(short, long)]
        species: Option<PathBuf>,

        /// Percent identity cutoff
        #[arg(short = 'p', long, default_value_t = compara_ingest::homology::DEFAULT_IDENTITY_CUTOFF)]
        identity: f64,
    },

    /// Find alignment columns where a single sample differs
    Variants {
        /// Aligned FASTA file
        #[arg(short, long)]
        input: PathBuf,

        /// Output TSV; renamed to <stem>_NO_RESULTS.tsv when nothing is found
        #[arg(short, long, default_value = commands::variants::DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Ignore hits in samples whose name contains this
        #[arg(long, default_value = compara_ingest::variants::DEFAULT_EXCLUDE, conflicts_with = "keep_all")]
        exclude: String,

        /// Report hits for every sample
        #[arg(long)]
        keep_all: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_requires_genes() {
        let result = Cli::try_parse_from(["compara", "search", "--input", "dump.emf"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "compara", "search", "-i", "dump.emf", "--gene", "ACTB", "--gene", "TP53",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Search { gene, genes, .. }) => {
                assert_eq!(gene, vec!["ACTB", "TP53"]);
                assert!(genes.is_none());
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_format_flag() {
        let cli = Cli::try_parse_from([
            "compara", "count-nodes", "-i", "tree.nh", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
