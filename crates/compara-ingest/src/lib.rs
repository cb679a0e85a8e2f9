//! Compara Ingest Library
//!
//! Parsers for Ensembl comparative-genomics exports.
//!
//! # Modules
//!
//! - **family**: gene-family dumps, gene search and chunk outputs
//! - **newick**: tree parsing, pruning, writing and NHX annotation
//! - **species**: species-of-interest tables
//! - **homology**: pairwise homology tables
//! - **variants**: single-sample changes in aligned FASTA
//!
//! # Example
//!
//! ```no_run
//! use compara_ingest::family::{ChunkStorage, FamilySearch, GeneQuery, NoProgress};
//! use compara_ingest::species::SpeciesTable;
//!
//! fn main() -> anyhow::Result<()> {
//!     let species = SpeciesTable::from_path("species.tsv")?;
//!     let dump = std::fs::read_to_string("Compara.102.protein_default.nh.emf")?;
//!
//!     let search = FamilySearch::new(ChunkStorage::new("results"), Some(&species));
//!     let summary = search.run(&dump, &[GeneQuery::new("ACTB")], &NoProgress)?;
//!     println!("{} records scanned", summary.records);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod family;
pub mod homology;
pub mod newick;
pub mod species;
pub mod variants;
