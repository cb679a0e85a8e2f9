//! Gene-family data models

use serde::{Serialize, Serializer};

use super::NULL_SENTINEL;

/// Column names of the row table, in output order
pub const ROW_TABLE_HEADER: [&str; 11] = [
    "SEQ",
    "Species",
    "ProteinID",
    "Chromosome",
    "Start",
    "Stop",
    "GainLoss",
    "GeneID",
    "Gene",
    "CommonName",
    "Order",
];

/// One row of a family's sequence table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyRow {
    #[serde(rename = "SEQ")]
    pub seq: String,
    #[serde(rename = "Species")]
    pub species: String,
    #[serde(rename = "ProteinID")]
    pub protein_id: String,
    #[serde(rename = "Chromosome")]
    pub chromosome: String,
    #[serde(rename = "Start")]
    pub start: String,
    #[serde(rename = "Stop")]
    pub stop: String,
    #[serde(rename = "GainLoss")]
    pub gain_loss: String,
    #[serde(rename = "GeneID")]
    pub gene_id: String,
    /// Gene name; [`NULL_SENTINEL`] when the dump has none
    #[serde(rename = "Gene")]
    pub gene: String,
    /// Filled from the species table, `None` on a lookup miss
    #[serde(rename = "CommonName", serialize_with = "null_if_none")]
    pub common_name: Option<String>,
    #[serde(rename = "Order", serialize_with = "null_if_none")]
    pub order: Option<String>,
}

impl FamilyRow {
    /// Map the eight leading columns and the gene name onto a row
    ///
    /// Returns `None` unless exactly eight leading columns are given. An
    /// absent or empty gene becomes [`NULL_SENTINEL`].
    pub fn from_fields(leading: &[&str], gene: Option<&str>) -> Option<Self> {
        let [seq, species, protein_id, chromosome, start, stop, gain_loss, gene_id] = leading else {
            return None;
        };

        let gene = gene
            .filter(|g| !g.is_empty())
            .unwrap_or(NULL_SENTINEL)
            .to_string();

        Some(Self {
            seq: seq.to_string(),
            species: species.to_string(),
            protein_id: protein_id.to_string(),
            chromosome: chromosome.to_string(),
            start: start.to_string(),
            stop: stop.to_string(),
            gain_loss: gain_loss.to_string(),
            gene_id: gene_id.to_string(),
            gene,
            common_name: None,
            order: None,
        })
    }

    pub fn has_null_gene(&self) -> bool {
        self.gene == NULL_SENTINEL
    }
}

/// One parsed family block with both a table and a tree
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyRecord {
    /// Position of the block in the dump, starting at 1
    pub number: usize,
    pub rows: Vec<FamilyRow>,
    /// Raw tree line as found in the dump
    pub tree: String,
}

impl FamilyRecord {
    pub fn protein_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.protein_id.as_str()).collect()
    }
}

pub(crate) fn null_if_none<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(NULL_SENTINEL))
}
