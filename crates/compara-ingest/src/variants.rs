//! Single-sample variants in a multiple sequence alignment
//!
//! A column is reported when exactly one sample carries a residue that no
//! other sample has. Columns that are mostly gaps, or that hold more than
//! two distinct symbols, are ignored.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use bio::io::fasta;
use compara_common::error::{ComparaError, Result};
use serde::Serialize;
use tracing::{debug, trace};

pub const GAP: u8 = b'-';

/// Columns with a larger share of gaps are skipped
pub const DEFAULT_MAX_GAP_FRACTION: f64 = 0.5;

/// Hits for samples whose name contains this are dropped by default
pub const DEFAULT_EXCLUDE: &str = "primate";

/// Suffix appended to the output stem when nothing was found
pub const NO_RESULTS_SUFFIX: &str = "_NO_RESULTS";

/// Equal-length aligned sequences in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    names: Vec<String>,
    rows: Vec<Vec<u8>>,
    width: usize,
}

impl Alignment {
    pub fn new(records: Vec<(String, Vec<u8>)>) -> Result<Self> {
        let Some((_, first)) = records.first() else {
            return Err(ComparaError::parse("alignment contains no sequences"));
        };
        let width = first.len();

        if let Some((name, seq)) = records.iter().find(|(_, s)| s.len() != width) {
            return Err(ComparaError::parse(format!(
                "sequence '{}' has length {}, expected {}",
                name,
                seq.len(),
                width
            )));
        }

        let (names, rows) = records.into_iter().unzip();
        Ok(Self { names, rows, width })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let records = fasta::Reader::new(reader)
            .records()
            .map(|record| {
                let record = record?;
                Ok((record.id().to_string(), record.seq().to_vec()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(records)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| ComparaError::read(path, e))?;
        let alignment = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            sequences = alignment.len(),
            width = alignment.width(),
            "Loaded alignment"
        );
        Ok(alignment)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Residues of one column, in sample order
    pub fn column(&self, position: usize) -> Vec<u8> {
        self.rows.iter().map(|row| row[position]).collect()
    }
}

/// A residue found in exactly one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantHit {
    #[serde(rename = "seqName")]
    pub seq_name: String,
    /// 0-based alignment column
    pub position: usize,
    #[serde(rename = "uniqueAA")]
    pub unique_residue: char,
    /// The whole column, one symbol per sample
    #[serde(rename = "allSampleBases")]
    pub column: String,
}

#[derive(Debug, Clone)]
pub struct VariantScan {
    pub max_gap_fraction: f64,
    /// Drop hits whose sample name contains this
    pub exclude: Option<String>,
}

impl Default for VariantScan {
    fn default() -> Self {
        Self {
            max_gap_fraction: DEFAULT_MAX_GAP_FRACTION,
            exclude: Some(DEFAULT_EXCLUDE.to_string()),
        }
    }
}

impl VariantScan {
    pub fn scan(&self, alignment: &Alignment) -> Vec<VariantHit> {
        (0..alignment.width())
            .filter_map(|position| self.scan_column(alignment, position))
            .collect()
    }

    fn scan_column(&self, alignment: &Alignment, position: usize) -> Option<VariantHit> {
        let column = alignment.column(position);

        let gaps = column.iter().filter(|&&c| c == GAP).count();
        if gaps as f64 / column.len() as f64 > self.max_gap_fraction {
            return None;
        }

        let mut counts: HashMap<u8, usize> = HashMap::new();
        for &symbol in &column {
            *counts.entry(symbol).or_default() += 1;
        }
        if counts.len() > 2 {
            return None;
        }

        let sample = column.iter().position(|c| counts[c] == 1)?;
        let residue = column[sample];
        if residue == GAP {
            return None;
        }

        let name = &alignment.names()[sample];
        if self.exclude.as_deref().is_some_and(|ex| name.contains(ex)) {
            trace!(position, sample = %name, "Skipping excluded sample");
            return None;
        }

        Some(VariantHit {
            seq_name: name.clone(),
            position,
            unique_residue: residue as char,
            column: String::from_utf8_lossy(&column).into_owned(),
        })
    }
}

/// Where the hits are written; an empty result gets a `_NO_RESULTS` name
pub fn output_path(requested: &Path, found_any: bool) -> PathBuf {
    if found_any {
        return requested.to_path_buf();
    }

    let stem = requested
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    requested.with_file_name(format!("{stem}{NO_RESULTS_SUFFIX}.tsv"))
}

/// Write hits as TSV, choosing the file name by whether any were found
pub fn write_hits(requested: &Path, hits: &[VariantHit]) -> Result<PathBuf> {
    let path = output_path(requested, !hits.is_empty());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(&path)?;
    writer.write_record(["seqName", "position", "uniqueAA", "allSampleBases"])?;
    for hit in hits {
        writer.serialize(hit)?;
    }
    writer.flush()?;

    Ok(path)
}
