//! Gene-family dump parsing
//!
//! Ensembl Compara exports gene families as one flat text file. Each family
//! is a block terminated by a `//` line; inside a block the sequence rows
//! come first, closed by a `SEQ` header line, and the family's Newick tree
//! is the last line:
//!
//! ```text
//! SEQ homo_sapiens ENSP00000263025 1 100 200 1 ENSG00000003 ACTB
//! SEQ mus_musculus ENSMUSP0000001 5 300 400 -1 ENSMUSG0000001 Actb
//! SEQ danio_rerio ENSDARP0000001 7 10 90 1 ENSDARG0000001 actba
//! SEQ Species ProteinID Chromosome Start Stop GainLoss GeneID Gene
//! DATA
//! ((ENSP00000263025:0.1,ENSMUSP0000001:0.1):0.2,ENSDARP0000001:0.5);
//! //
//! ```
//!
//! Processing is split into small stages:
//! - [`parser`]: record splitting, line classification, table building
//! - [`query`]: gene name queries
//! - [`filter`]: species-of-interest filtering and annotation
//! - [`rewriter`]: tree leaf relabelling
//! - [`summary`]: copy-number tables
//! - [`storage`]: on-disk chunk layout
//! - [`pipeline`]: the per-record search state machine

pub mod filter;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod rewriter;
pub mod storage;
pub mod summary;

pub use models::{FamilyRecord, FamilyRow};
pub use parser::{build_table, classify_block, parse_record, split_records, ClassifiedBlock, RawRecord};
pub use pipeline::{FamilySearch, NoProgress, ProgressReporter, SearchOutcome};
pub use query::GeneQuery;
pub use storage::ChunkStorage;

use std::path::PathBuf;

/// Separator line between family records, including its newline
pub const RECORD_SEPARATOR: &str = "//\n";

/// Token identifying the table marker line
pub const TABLE_MARKER: &str = "SEQ";

/// Character terminating a Newick tree line
pub const TREE_TERMINATOR: char = ';';

/// Number of columns in a sequence table row
pub const TABLE_ARITY: usize = 9;

/// Placeholder for a missing gene name or failed lookup
pub const NULL_SENTINEL: &str = "NULL";

/// Result type for family operations
pub type Result<T> = std::result::Result<T, FamilyError>;

/// Error types for family parsing and output
#[derive(Debug, thiserror::Error)]
pub enum FamilyError {
    #[error(
        "Record {record}, row {row}: expected {expected} space-separated fields, found {found}: '{line}'",
        expected = TABLE_ARITY
    )]
    StructuralParse {
        record: usize,
        row: usize,
        found: usize,
        line: String,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Input(#[from] compara_common::ComparaError),
}

impl FamilyError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether the error means the input itself is malformed
    pub fn is_structural(&self) -> bool {
        matches!(self, FamilyError::StructuralParse { .. })
    }
}
