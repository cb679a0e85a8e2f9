//! On-disk layout of search and split outputs
//!
//! ```text
//! <root>/
//! ├── <gene>/chunk_<n>/
//! │   ├── chunk_<n>_SEQ.tsv
//! │   ├── chunk_<n>_ProteinID_Newick.tree
//! │   ├── chunk_<n>_ScientificName_Newick.tree
//! │   ├── chunk_<n>_GeneName_Newick.tree
//! │   ├── chunk_<n>_CommonName_Newick.tree
//! │   ├── null_result.txt
//! │   └── malformed_tree.txt
//! ├── speciesCounts/
//! │   ├── <gene>_copy_number_summary_chunk_<n>.txt
//! │   └── <gene>_OrderCounts_chunk_<n>.txt
//! ├── fileChunks/chunk_<n>/
//! │   ├── chunk_<n>_SEQ.tsv
//! │   └── chunk_<n>_Newick.tree
//! └── CumulativeSpeciesCounts.tsv
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::models::{FamilyRow, ROW_TABLE_HEADER};
use super::pipeline::EmittedFamily;
use super::summary::{CopyNumberRow, COPY_NUMBER_HEADER, ORDER_COUNT_HEADER};
use super::{FamilyError, Result};

pub const SPECIES_COUNTS_DIR: &str = "speciesCounts";
pub const FILE_CHUNKS_DIR: &str = "fileChunks";
pub const CUMULATIVE_COUNTS_FILE: &str = "CumulativeSpeciesCounts.tsv";
pub const NULL_RESULT_FILE: &str = "null_result.txt";
pub const MALFORMED_TREE_FILE: &str = "malformed_tree.txt";

const NULL_RESULT_HEADING: &str = "Resulting data only contained null values\n";

/// Writes chunk outputs below one root directory
#[derive(Debug, Clone)]
pub struct ChunkStorage {
    root: PathBuf,
}

impl ChunkStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn gene_dir(&self, gene: &str) -> PathBuf {
        self.root.join(path_component(gene))
    }

    pub fn chunk_dir(&self, gene: &str, chunk: usize) -> PathBuf {
        self.gene_dir(gene).join(format!("chunk_{chunk}"))
    }

    pub fn species_counts_dir(&self) -> PathBuf {
        self.root.join(SPECIES_COUNTS_DIR)
    }

    pub fn split_root(&self) -> PathBuf {
        self.root.join(FILE_CHUNKS_DIR)
    }

    pub fn split_chunk_dir(&self, chunk: usize) -> PathBuf {
        self.split_root().join(format!("chunk_{chunk}"))
    }

    pub fn cumulative_path(&self) -> PathBuf {
        self.root.join(CUMULATIVE_COUNTS_FILE)
    }

    /// Write tables, trees and count summaries of an emitted chunk
    pub fn write_emitted(&self, gene: &str, family: &EmittedFamily) -> Result<PathBuf> {
        let n = family.chunk;
        let dir = create_dir(self.chunk_dir(gene, n))?;

        write_tsv(&dir.join(format!("chunk_{n}_SEQ.tsv")), &ROW_TABLE_HEADER, &family.rows)?;
        write_tree(&dir.join(format!("chunk_{n}_ProteinID_Newick.tree")), &family.protein_id_tree)?;
        write_tree(
            &dir.join(format!("chunk_{n}_ScientificName_Newick.tree")),
            &family.renamed.scientific_name,
        )?;
        write_tree(
            &dir.join(format!("chunk_{n}_GeneName_Newick.tree")),
            &family.renamed.gene_name,
        )?;
        if let Some(common) = &family.renamed.common_name {
            write_tree(&dir.join(format!("chunk_{n}_CommonName_Newick.tree")), common)?;
        }

        let counts = create_dir(self.species_counts_dir())?;
        let stem = path_component(gene);
        write_tsv(
            &counts.join(format!("{stem}_copy_number_summary_chunk_{n}.txt")),
            &COPY_NUMBER_HEADER,
            &family.copy_numbers,
        )?;
        write_tsv(
            &counts.join(format!("{stem}_OrderCounts_chunk_{n}.txt")),
            &ORDER_COUNT_HEADER,
            &family.order_counts,
        )?;

        debug!(gene, chunk = n, dir = %dir.display(), "Wrote chunk outputs");
        Ok(dir)
    }

    /// Marker for a chunk whose filtered table has no gene names left
    pub fn write_null_result(&self, gene: &str, chunk: usize, rows: &[FamilyRow]) -> Result<PathBuf> {
        let dir = create_dir(self.chunk_dir(gene, chunk))?;
        let path = dir.join(NULL_RESULT_FILE);

        let mut content = NULL_RESULT_HEADING.as_bytes().to_vec();
        content.extend(tsv_bytes(&ROW_TABLE_HEADER, rows)?);
        fs::write(&path, content).map_err(|e| FamilyError::write(&path, e))?;
        Ok(path)
    }

    /// Marker holding the raw tree of a chunk that could not be pruned
    pub fn write_malformed_tree(&self, gene: &str, chunk: usize, tree: &str) -> Result<PathBuf> {
        let dir = create_dir(self.chunk_dir(gene, chunk))?;
        let path = dir.join(MALFORMED_TREE_FILE);
        write_tree(&path, tree)?;
        Ok(path)
    }

    /// Every copy-number row of the run in one table
    pub fn write_cumulative(&self, rows: &[CopyNumberRow]) -> Result<PathBuf> {
        create_dir(self.root.clone())?;
        let path = self.cumulative_path();
        write_tsv(&path, &COPY_NUMBER_HEADER, rows)?;
        Ok(path)
    }

    /// Row table and raw tree of one block, without any gene query
    pub fn write_split_chunk(&self, chunk: usize, rows: &[FamilyRow], tree: &str) -> Result<PathBuf> {
        let dir = create_dir(self.split_chunk_dir(chunk))?;
        write_tsv(&dir.join(format!("chunk_{chunk}_SEQ.tsv")), &ROW_TABLE_HEADER, rows)?;
        write_tree(&dir.join(format!("chunk_{chunk}_Newick.tree")), tree)?;
        Ok(dir)
    }
}

/// Make a gene name usable as a single path component
pub fn path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_whitespace() || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => format!("_{cleaned}"),
        _ => cleaned,
    }
}

fn create_dir(dir: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&dir).map_err(|e| FamilyError::write(&dir, e))?;
    Ok(dir)
}

fn write_tree(path: &Path, tree: &str) -> Result<()> {
    fs::write(path, format!("{tree}\n")).map_err(|e| FamilyError::write(path, e))
}

/// Header is written explicitly so empty tables still carry their columns
fn tsv_bytes<T: Serialize>(header: &[&str], rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| FamilyError::write("<tsv buffer>", e.into_error()))
}

fn write_tsv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let bytes = tsv_bytes(header, rows)?;
    fs::write(path, bytes).map_err(|e| FamilyError::write(path, e))
}
