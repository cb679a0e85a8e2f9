//! Species-of-interest table
//!
//! A tab-separated file with a header row. `scientific_name` and
//! `common_name` are required columns, `order` is optional:
//!
//! ```text
//! scientific_name	common_name	order
//! homo_sapiens	human	Primates
//! mus_musculus	house mouse	Rodentia
//! ```
//!
//! The table is loaded once per run and only read afterwards.

use compara_common::error::{ComparaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 2] = ["scientific_name", "common_name"];

/// One species-of-interest row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub scientific_name: String,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

impl SpeciesEntry {
    pub fn new(
        scientific_name: impl Into<String>,
        common_name: Option<&str>,
        order: Option<&str>,
    ) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            common_name: common_name.map(str::to_string),
            order: order.map(str::to_string),
        }
    }
}

/// Read-only scientific name lookup
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    entries: Vec<SpeciesEntry>,
    index: HashMap<String, usize>,
}

impl SpeciesTable {
    pub fn from_entries(entries: Vec<SpeciesEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.scientific_name.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| ComparaError::read(path, e))?;
        let table = Self::from_reader(file)?;
        debug!(path = %path.display(), species = table.len(), "Loaded species table");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ComparaError::missing_column("species table", column));
            }
        }

        let entries = rdr
            .deserialize::<SpeciesEntry>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::from_entries(entries))
    }

    pub fn get(&self, scientific_name: &str) -> Option<&SpeciesEntry> {
        self.index.get(scientific_name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, scientific_name: &str) -> bool {
        self.index.contains_key(scientific_name)
    }

    pub fn common_name(&self, scientific_name: &str) -> Option<&str> {
        self.get(scientific_name)?.common_name.as_deref()
    }

    pub fn order(&self, scientific_name: &str) -> Option<&str> {
        self.get(scientific_name)?.order.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read a plain list with one name per line, ignoring blank lines
pub fn load_name_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = compara_common::error::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TABLE: &str = "scientific_name\tcommon_name\torder\n\
                         homo_sapiens\thuman\tPrimates\n\
                         mus_musculus\thouse mouse\tRodentia\n\
                         danio_rerio\t\t\n";

    #[test]
    fn test_parse_species_table() {
        let table = SpeciesTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.common_name("mus_musculus"), Some("house mouse"));
        assert_eq!(table.order("homo_sapiens"), Some("Primates"));
        assert!(table.contains("danio_rerio"));
        assert_eq!(table.common_name("danio_rerio"), None);
        assert_eq!(table.order("danio_rerio"), None);
        assert!(!table.contains("gallus_gallus"));
    }

    #[test]
    fn test_order_column_is_optional() {
        let table =
            SpeciesTable::from_reader("scientific_name\tcommon_name\nhomo_sapiens\thuman\n".as_bytes())
                .unwrap();
        assert_eq!(table.common_name("homo_sapiens"), Some("human"));
        assert_eq!(table.order("homo_sapiens"), None);
    }

    #[test]
    fn test_missing_required_column() {
        let err = SpeciesTable::from_reader("scientific_name\torder\nhomo_sapiens\tPrimates\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            ComparaError::MissingColumn { ref column, .. } if column == "common_name"
        ));
    }

    #[test]
    fn test_load_name_list_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("species.txt");
        std::fs::write(&path, "homo_sapiens\n\n  mus_musculus \n").unwrap();
        assert_eq!(load_name_list(&path).unwrap(), vec!["homo_sapiens", "mus_musculus"]);
    }
}
