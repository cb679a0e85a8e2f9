//! Pairwise homology tables
//!
//! Ensembl exports pairwise homologies as a tab-separated table with one row
//! per gene pair. Rows are kept when they are orthologs with at least the
//! identity cutoff, then grouped by the query gene.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use compara_common::error::{ComparaError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const ORTHOLOG_ONE2ONE: &str = "ortholog_one2one";
pub const ORTHOLOG_ONE2MANY: &str = "ortholog_one2many";

/// Percent identity a homology must reach to be kept
pub const DEFAULT_IDENTITY_CUTOFF: f64 = 50.0;

pub const GROUPS_FILE: &str = "homology_groups.tsv";

const REQUIRED_COLUMNS: [&str; 4] = ["gene_stable_id", "identity", "homology_type", "homology_species"];

/// One row of the homology table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomologyEntry {
    pub gene_stable_id: String,
    pub identity: f64,
    pub homology_type: String,
    pub homology_species: String,
    #[serde(default)]
    pub protein_stable_id: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub homology_gene_stable_id: Option<String>,
}

pub fn read_homology_table<R: Read>(reader: R) -> Result<Vec<HomologyEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ComparaError::missing_column("homology table", column));
        }
    }

    Ok(rdr
        .deserialize::<HomologyEntry>()
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn load_homology_table(path: impl AsRef<Path>) -> Result<Vec<HomologyEntry>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ComparaError::read(path, e))?;
    let entries = read_homology_table(file)?;
    debug!(path = %path.display(), entries = entries.len(), "Loaded homology table");
    Ok(entries)
}

/// Which homology rows to keep
#[derive(Debug, Clone)]
pub struct HomologyFilter {
    pub identity_cutoff: f64,
    /// Restrict `homology_species` to this set when present
    pub species: Option<HashSet<String>>,
}

impl Default for HomologyFilter {
    fn default() -> Self {
        Self {
            identity_cutoff: DEFAULT_IDENTITY_CUTOFF,
            species: None,
        }
    }
}

impl HomologyFilter {
    pub fn with_species<I, S>(mut self, species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.species = Some(species.into_iter().map(Into::into).collect());
        self
    }

    fn keeps(&self, entry: &HomologyEntry, homology_type: &str) -> bool {
        entry.homology_type == homology_type
            && entry.identity >= self.identity_cutoff
            && self
                .species
                .as_ref()
                .is_none_or(|s| s.contains(&entry.homology_species))
    }

    /// One-to-one orthologs first, then one-to-many, each in input order
    pub fn apply(&self, entries: &[HomologyEntry]) -> Vec<HomologyEntry> {
        [ORTHOLOG_ONE2ONE, ORTHOLOG_ONE2MANY]
            .into_iter()
            .flat_map(|kind| entries.iter().filter(move |e| self.keeps(e, kind)))
            .cloned()
            .collect()
    }
}

/// Kept homologies of one gene
#[derive(Debug, Clone, PartialEq)]
pub struct HomologyGroup {
    pub gene_stable_id: String,
    pub entries: Vec<HomologyEntry>,
}

impl HomologyGroup {
    pub fn count_of(&self, homology_type: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.homology_type == homology_type)
            .count()
    }

    /// Distinct homology species, sorted
    pub fn species(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .entries
            .iter()
            .map(|e| e.homology_species.as_str())
            .collect();
        set.into_iter().collect()
    }
}

/// Group entries by gene, genes sorted by ID
pub fn group_by_gene(entries: Vec<HomologyEntry>) -> Vec<HomologyGroup> {
    let mut groups: BTreeMap<String, Vec<HomologyEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.gene_stable_id.clone())
            .or_default()
            .push(entry);
    }

    groups
        .into_iter()
        .map(|(gene_stable_id, entries)| HomologyGroup {
            gene_stable_id,
            entries,
        })
        .collect()
}

/// Output row of the grouped table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomologyGroupRow {
    pub gene_stable_id: String,
    pub entries: usize,
    pub one2one: usize,
    pub one2many: usize,
    pub homology_species: String,
}

impl From<&HomologyGroup> for HomologyGroupRow {
    fn from(group: &HomologyGroup) -> Self {
        Self {
            gene_stable_id: group.gene_stable_id.clone(),
            entries: group.entries.len(),
            one2one: group.count_of(ORTHOLOG_ONE2ONE),
            one2many: group.count_of(ORTHOLOG_ONE2MANY),
            homology_species: group.species().join(","),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomologyReport {
    pub initial: usize,
    pub remaining: usize,
    pub removed: usize,
    pub genes: usize,
    #[serde(skip)]
    pub groups: Vec<HomologyGroup>,
}

/// Filter and group a homology table, logging the counts
pub fn summarize(entries: &[HomologyEntry], filter: &HomologyFilter) -> HomologyReport {
    let kept = filter.apply(entries);
    let initial = entries.len();
    let remaining = kept.len();
    let groups = group_by_gene(kept);

    info!("Initial number of entries: {}", initial);
    info!(
        "Remaining number of entries after filter: {} (-{})",
        remaining,
        initial - remaining
    );
    info!("Number of genes: {}", groups.len());

    HomologyReport {
        initial,
        remaining,
        removed: initial - remaining,
        genes: groups.len(),
        groups,
    }
}

pub fn write_groups(path: impl AsRef<Path>, groups: &[HomologyGroup]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    for group in groups {
        writer.serialize(HomologyGroupRow::from(group))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TABLE: &str = "gene_stable_id\tprotein_stable_id\tspecies\tidentity\thomology_type\thomology_gene_stable_id\thomology_species\n\
        ENSG2\tENSP2\thomo_sapiens\t80.5\tortholog_one2many\tENSMUSG2\tmus_musculus\n\
        ENSG1\tENSP1\thomo_sapiens\t99\tortholog_one2one\tENSPTRG1\tpan_troglodytes\n\
        ENSG1\tENSP1\thomo_sapiens\t49.9\tortholog_one2one\tENSDARG1\tdanio_rerio\n\
        ENSG1\tENSP1\thomo_sapiens\t60\twithin_species_paralog\tENSG9\thomo_sapiens\n\
        ENSG1\tENSP1\thomo_sapiens\t50\tortholog_one2many\tENSMUSG1\tmus_musculus\n\
        ENSG2\tENSP2\thomo_sapiens\t70\tortholog_one2one\tENSPTRG2\tpan_troglodytes\n";

    #[test]
    fn test_filter_keeps_orthologs_above_cutoff() {
        let entries = read_homology_table(TABLE.as_bytes()).unwrap();
        assert_eq!(entries.len(), 6);

        let kept = HomologyFilter::default().apply(&entries);
        let kinds: Vec<_> = kept
            .iter()
            .map(|e| (e.gene_stable_id.as_str(), e.homology_type.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("ENSG1", ORTHOLOG_ONE2ONE),
                ("ENSG2", ORTHOLOG_ONE2ONE),
                ("ENSG2", ORTHOLOG_ONE2MANY),
                ("ENSG1", ORTHOLOG_ONE2MANY),
            ]
        );
    }

    #[test]
    fn test_species_restriction() {
        let entries = read_homology_table(TABLE.as_bytes()).unwrap();
        let kept = HomologyFilter::default()
            .with_species(["mus_musculus"])
            .apply(&entries);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.homology_species == "mus_musculus"));
    }

    #[test]
    fn test_summarize_groups_by_gene() {
        let entries = read_homology_table(TABLE.as_bytes()).unwrap();
        let report = summarize(&entries, &HomologyFilter::default());
        assert_eq!((report.initial, report.remaining, report.removed), (6, 4, 2));
        assert_eq!(report.genes, 2);

        let row = HomologyGroupRow::from(&report.groups[0]);
        assert_eq!(row.gene_stable_id, "ENSG1");
        assert_eq!((row.one2one, row.one2many), (1, 1));
        assert_eq!(row.homology_species, "mus_musculus,pan_troglodytes");
    }

    #[test]
    fn test_missing_identity_column() {
        let err = read_homology_table("gene_stable_id\thomology_type\thomology_species\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ComparaError::MissingColumn { ref column, .. } if column == "identity"));
    }

    #[test]
    fn test_write_groups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(GROUPS_FILE);
        let entries = read_homology_table(TABLE.as_bytes()).unwrap();
        let report = summarize(&entries, &HomologyFilter::default());
        write_groups(&path, &report.groups).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "gene_stable_id\tentries\tone2one\tone2many\thomology_species");
        assert_eq!(lines[2], "ENSG2\t2\t1\t1\tmus_musculus,pan_troglodytes");
    }
}
