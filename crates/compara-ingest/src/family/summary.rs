//! Copy-number summaries
//!
//! For every emitted chunk two tables are written: per-row copy numbers
//! (how often the row's species and order occur in the chunk) and per-order
//! totals. All per-chunk summary rows of a run are also collected into one
//! cumulative table.

use std::collections::HashMap;

use serde::Serialize;

use super::models::{null_if_none, FamilyRow};

/// Columns of the copy-number summary and the cumulative table
pub const COPY_NUMBER_HEADER: [&str; 9] = [
    "Gene",
    "Species",
    "CommonName",
    "Order",
    "SpeciesCopyNumber",
    "OrderCopyNumber",
    "Chunk",
    "GeneID",
    "ProteinID",
];

pub const ORDER_COUNT_HEADER: [&str; 2] = ["Order", "Count"];

/// One row of a copy-number summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyNumberRow {
    #[serde(rename = "Gene")]
    pub gene: String,
    #[serde(rename = "Species")]
    pub species: String,
    #[serde(rename = "CommonName", serialize_with = "null_if_none")]
    pub common_name: Option<String>,
    #[serde(rename = "Order", serialize_with = "null_if_none")]
    pub order: Option<String>,
    #[serde(rename = "SpeciesCopyNumber")]
    pub species_copy_number: usize,
    #[serde(rename = "OrderCopyNumber")]
    pub order_copy_number: usize,
    /// `<gene>_chunk_<n>`
    #[serde(rename = "Chunk")]
    pub chunk: String,
    #[serde(rename = "GeneID")]
    pub gene_id: String,
    #[serde(rename = "ProteinID")]
    pub protein_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCount {
    #[serde(rename = "Order", serialize_with = "null_if_none")]
    pub order: Option<String>,
    #[serde(rename = "Count")]
    pub count: usize,
}

/// Label identifying a chunk in summary tables
pub fn chunk_label(gene: &str, chunk: usize) -> String {
    format!("{gene}_chunk_{chunk}")
}

/// Copy numbers for every row, in row order
///
/// Rows without an order are counted together as one group.
pub fn copy_number_summary(rows: &[FamilyRow], chunk: &str) -> Vec<CopyNumberRow> {
    let mut species_counts: HashMap<&str, usize> = HashMap::new();
    let mut order_counts: HashMap<Option<&str>, usize> = HashMap::new();
    for row in rows {
        *species_counts.entry(row.species.as_str()).or_default() += 1;
        *order_counts.entry(row.order.as_deref()).or_default() += 1;
    }

    rows.iter()
        .map(|row| CopyNumberRow {
            gene: row.gene.clone(),
            species: row.species.clone(),
            common_name: row.common_name.clone(),
            order: row.order.clone(),
            species_copy_number: species_counts[row.species.as_str()],
            order_copy_number: order_counts[&row.order.as_deref()],
            chunk: chunk.to_string(),
            gene_id: row.gene_id.clone(),
            protein_id: row.protein_id.clone(),
        })
        .collect()
}

/// Row count per order, in order of first appearance
pub fn order_counts(rows: &[FamilyRow]) -> Vec<OrderCount> {
    let mut counts: Vec<OrderCount> = Vec::new();
    for row in rows {
        match counts.iter_mut().find(|c| c.order == row.order) {
            Some(entry) => entry.count += 1,
            None => counts.push(OrderCount {
                order: row.order.clone(),
                count: 1,
            }),
        }
    }
    counts
}
