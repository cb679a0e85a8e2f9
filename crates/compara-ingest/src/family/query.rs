//! Gene name queries

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use super::models::FamilyRow;
use super::storage::path_component;

/// One gene name to search for, matched case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneQuery {
    name: String,
    folded: String,
}

impl GeneQuery {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let folded = name.to_lowercase();
        Self { name, folded }
    }

    /// Name as given by the user; used for output paths
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory key of this query's outputs
    ///
    /// Path sanitizing and case folding both apply, so `A B`, `a_b` and
    /// `A/B` share one key.
    pub fn output_key(&self) -> String {
        path_component(&self.folded)
    }

    /// Whether both queries would write into the same gene directory
    pub fn collides_with(&self, other: &GeneQuery) -> bool {
        self.output_key() == other.output_key()
    }

    pub fn matches(&self, gene: &str) -> bool {
        gene.to_lowercase() == self.folded
    }

    /// Whether any row of the table carries this gene
    pub fn matches_any(&self, rows: &[FamilyRow]) -> bool {
        rows.iter().any(|row| self.matches(&row.gene))
    }
}

impl std::fmt::Display for GeneQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Parse a gene list
///
/// One name per line, or `geneID<TAB>geneName` where the second column is
/// used. Blank lines are skipped. A later name whose output directory would
/// clash with an earlier one's is dropped with a warning.
pub fn parse_gene_queries(text: &str) -> Vec<GeneQuery> {
    let mut seen = HashSet::new();

    text.lines()
        .filter_map(|line| {
            let name = match line.split_once('\t') {
                Some((_, name)) => name,
                None => line,
            };
            let name = name.trim();
            (!name.is_empty()).then(|| GeneQuery::new(name))
        })
        .filter(|query| {
            let fresh = seen.insert(query.output_key());
            if !fresh {
                warn!(gene = %query, "Dropping gene query sharing an output directory with an earlier one");
            }
            fresh
        })
        .collect()
}

pub fn load_gene_queries(path: impl AsRef<Path>) -> compara_common::Result<Vec<GeneQuery>> {
    let content = compara_common::error::read_to_string(path)?;
    Ok(parse_gene_queries(&content))
}
