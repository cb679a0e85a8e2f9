//! Per-record gene search
//!
//! Every record is checked against every gene query. A record that carries
//! the gene ends in exactly one of three outcomes, each of which takes the
//! next chunk number for that gene:
//!
//! - emitted: table, pruned and relabelled trees, copy-number summaries
//! - null result: after species filtering no gene name is left
//! - malformed tree: the tree does not parse or lacks a table protein ID
//!
//! Records without the gene produce nothing. Only a structurally broken
//! table aborts the run.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::newick::{NewickError, NewickTree};
use crate::species::SpeciesTable;

use super::filter::{all_genes_null, annotate_species, retain_species_of_interest, sort_by_order};
use super::models::{FamilyRecord, FamilyRow};
use super::parser::{parse_record, split_records};
use super::query::GeneQuery;
use super::rewriter::{rename_leaves, RenamedTrees};
use super::storage::ChunkStorage;
use super::summary::{chunk_label, copy_number_summary, order_counts, CopyNumberRow, OrderCount};
use super::Result;

/// Receives progress while records are processed
pub trait ProgressReporter {
    fn start(&self, _total: usize) {}
    fn advance(&self, _position: usize, _total: usize) {}
    fn finish(&self) {}
}

/// Reports nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Everything written for one emitted chunk
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFamily {
    pub chunk: usize,
    /// Filtered, annotated and sorted rows
    pub rows: Vec<FamilyRow>,
    /// Tree pruned to the rows' protein IDs
    pub protein_id_tree: String,
    pub renamed: RenamedTrees,
    pub copy_numbers: Vec<CopyNumberRow>,
    pub order_counts: Vec<OrderCount>,
}

/// Terminal state of one record for one gene query
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    NoMatch,
    NullResult { rows: Vec<FamilyRow> },
    MalformedTree { tree: String, error: NewickError },
    Emitted(EmittedFamily),
}

impl SearchOutcome {
    /// Whether the outcome takes a chunk number
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchOutcome::NoMatch)
    }
}

/// Records of a dump and the number of blocks without a table or tree
#[derive(Debug, Clone, Default)]
pub struct ParsedDump {
    pub records: Vec<FamilyRecord>,
    pub skipped: usize,
}

/// Parse every block of a dump, failing on the first broken table
pub fn parse_dump(text: &str) -> Result<ParsedDump> {
    let mut dump = ParsedDump::default();

    for raw in split_records(text) {
        match parse_record(&raw)? {
            Some(record) => dump.records.push(record),
            None => {
                if !raw.text.is_empty() {
                    debug!(record = raw.number, "Block has no table or no tree");
                }
                dump.skipped += 1;
            },
        }
    }

    Ok(dump)
}

/// Per-gene outcome counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneSummary {
    pub gene: String,
    pub emitted: usize,
    pub null_results: usize,
    pub malformed_trees: usize,
}

impl GeneSummary {
    pub fn chunks(&self) -> usize {
        self.emitted + self.null_results + self.malformed_trees
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub records: usize,
    pub skipped_blocks: usize,
    pub genes: Vec<GeneSummary>,
    pub cumulative_path: PathBuf,
}

/// Gene search over parsed family records
pub struct FamilySearch<'a> {
    species: Option<&'a SpeciesTable>,
    storage: ChunkStorage,
}

impl<'a> FamilySearch<'a> {
    pub fn new(storage: ChunkStorage, species: Option<&'a SpeciesTable>) -> Self {
        Self { species, storage }
    }

    pub fn storage(&self) -> &ChunkStorage {
        &self.storage
    }

    /// Decide the outcome of one record for one query, without writing
    pub fn evaluate(&self, query: &GeneQuery, record: &FamilyRecord, chunk: usize) -> SearchOutcome {
        if !query.matches_any(&record.rows) {
            return SearchOutcome::NoMatch;
        }

        let mut rows = record.rows.clone();
        if let Some(species) = self.species {
            rows = retain_species_of_interest(rows, species);
            annotate_species(&mut rows, species);
            sort_by_order(&mut rows);

            if all_genes_null(&rows) {
                return SearchOutcome::NullResult { rows };
            }
        }

        let protein_ids: Vec<&str> = rows.iter().map(|r| r.protein_id.as_str()).collect();
        let pruned = match NewickTree::parse(&record.tree).and_then(|t| t.prune(&protein_ids)) {
            Ok(tree) => tree,
            Err(error) => {
                return SearchOutcome::MalformedTree {
                    tree: record.tree.clone(),
                    error,
                }
            },
        };

        let protein_id_tree = pruned.to_newick();
        let renamed = rename_leaves(&protein_id_tree, &rows, self.species);
        let copy_numbers = copy_number_summary(&rows, &chunk_label(query.name(), chunk));
        let order_counts = order_counts(&rows);

        SearchOutcome::Emitted(EmittedFamily {
            chunk,
            rows,
            protein_id_tree,
            renamed,
            copy_numbers,
            order_counts,
        })
    }

    /// Search every query across a whole dump and write the outputs
    pub fn run(
        &self,
        text: &str,
        queries: &[GeneQuery],
        progress: &dyn ProgressReporter,
    ) -> Result<SearchSummary> {
        let dump = parse_dump(text)?;
        info!(
            records = dump.records.len(),
            skipped = dump.skipped,
            genes = queries.len(),
            "Parsed family dump"
        );

        let total = dump.records.len() * queries.len();
        progress.start(total);

        let mut position = 0;
        let mut cumulative: Vec<CopyNumberRow> = Vec::new();
        let mut genes = Vec::with_capacity(queries.len());

        for query in queries {
            let mut summary = GeneSummary {
                gene: query.name().to_string(),
                ..Default::default()
            };
            let mut chunk = 1;

            for record in &dump.records {
                position += 1;
                progress.advance(position, total);

                let outcome = self.evaluate(query, record, chunk);
                if outcome.is_terminal() {
                    debug!(gene = %query, record = record.number, chunk, "Data found");
                }

                match outcome {
                    SearchOutcome::NoMatch => continue,
                    SearchOutcome::NullResult { rows } => {
                        self.storage.write_null_result(query.name(), chunk, &rows)?;
                        summary.null_results += 1;
                    },
                    SearchOutcome::MalformedTree { tree, error } => {
                        warn!(
                            gene = %query,
                            record = record.number,
                            chunk,
                            error = %error,
                            "Malformed tree"
                        );
                        self.storage.write_malformed_tree(query.name(), chunk, &tree)?;
                        summary.malformed_trees += 1;
                    },
                    SearchOutcome::Emitted(family) => {
                        self.storage.write_emitted(query.name(), &family)?;
                        cumulative.extend(family.copy_numbers);
                        summary.emitted += 1;
                    },
                }
                chunk += 1;
            }

            if summary.chunks() == 0 {
                info!(gene = %query, "No family found");
            } else {
                info!(
                    gene = %query,
                    emitted = summary.emitted,
                    null_results = summary.null_results,
                    malformed_trees = summary.malformed_trees,
                    "Finished gene"
                );
            }
            genes.push(summary);
        }

        progress.finish();

        let cumulative_path = self.storage.write_cumulative(&cumulative)?;
        info!(rows = cumulative.len(), path = %cumulative_path.display(), "Wrote cumulative counts");

        Ok(SearchSummary {
            records: dump.records.len(),
            skipped_blocks: dump.skipped,
            genes,
            cumulative_path,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub chunks: usize,
    pub skipped_blocks: usize,
    pub output_dir: PathBuf,
}

/// Write every block with a table and a tree to its own chunk directory
///
/// Chunks are numbered by block position in the dump.
pub fn split_into_chunks(
    text: &str,
    storage: &ChunkStorage,
    progress: &dyn ProgressReporter,
) -> Result<SplitSummary> {
    let dump = parse_dump(text)?;
    let total = dump.records.len();
    progress.start(total);

    for (i, record) in dump.records.iter().enumerate() {
        storage.write_split_chunk(record.number, &record.rows, &record.tree)?;
        progress.advance(i + 1, total);
    }
    progress.finish();

    info!(chunks = total, skipped = dump.skipped, "Split family dump");
    Ok(SplitSummary {
        chunks: total,
        skipped_blocks: dump.skipped,
        output_dir: storage.split_root(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::species::SpeciesEntry;
    use std::cell::Cell;

    const DUMP: &str = "\
SEQ homo_sapiens ENSP1 1 100 200 1 ENSG1 ACTB
SEQ mus_musculus ENSMUSP1 5 300 400 -1 ENSMUSG1 Actb
SEQ danio_rerio ENSDARP1 7 10 90 1 ENSDARG1 actba
SEQ Species ProteinID Chromosome Start Stop GainLoss GeneID Gene
DATA
((ENSP1:0.1,ENSMUSP1:0.1):0.2,ENSDARP1:0.5);
//
SEQ homo_sapiens ENSP2 17 1 90 1 ENSG2 TP53
SEQ danio_rerio ENSDARP2 5 1 90 1 ENSDARG2
SEQ Species ProteinID Chromosome Start Stop GainLoss GeneID Gene
DATA
(ENSP2:0.3,ENSDARP2:0.4);
//
";

    fn species() -> SpeciesTable {
        SpeciesTable::from_entries(vec![
            SpeciesEntry::new("homo_sapiens", Some("human"), Some("Primates")),
            SpeciesEntry::new("mus_musculus", Some("house mouse"), Some("Rodentia")),
        ])
    }

    fn record(index: usize) -> FamilyRecord {
        parse_dump(DUMP).unwrap().records.remove(index)
    }

    #[test]
    fn test_parse_dump_counts_skipped_blocks() {
        let dump = parse_dump(DUMP).unwrap();
        assert_eq!(dump.records.len(), 2);
        assert_eq!(dump.skipped, 1);
    }

    #[test]
    fn test_unmatched_gene_is_no_match() {
        let search = FamilySearch::new(ChunkStorage::new("/unused"), None);
        let outcome = search.evaluate(&GeneQuery::new("BRCA2"), &record(0), 1);
        assert_eq!(outcome, SearchOutcome::NoMatch);
        assert!(!outcome.is_terminal());
    }

    #[test]
    fn test_emitted_family_with_species_table() {
        let table = species();
        let search = FamilySearch::new(ChunkStorage::new("/unused"), Some(&table));
        let SearchOutcome::Emitted(family) = search.evaluate(&GeneQuery::new("actb"), &record(0), 4)
        else {
            panic!("expected an emitted family");
        };

        // danio_rerio is not a species of interest; the root collapses away
        assert_eq!(family.rows.len(), 2);
        assert_eq!(family.protein_id_tree, "(ENSP1:0.1,ENSMUSP1:0.1);");
        assert_eq!(
            family.renamed.common_name.as_deref(),
            Some("(human:0.1,house mouse:0.1);")
        );
        assert_eq!(family.copy_numbers[0].chunk, "actb_chunk_4");
        assert_eq!(family.chunk, 4);
    }

    #[test]
    fn test_without_species_table_all_rows_are_kept() {
        let search = FamilySearch::new(ChunkStorage::new("/unused"), None);
        let SearchOutcome::Emitted(family) = search.evaluate(&GeneQuery::new("ACTB"), &record(0), 1)
        else {
            panic!("expected an emitted family");
        };
        assert_eq!(family.rows.len(), 3);
        assert!(family.renamed.common_name.is_none());
        assert_eq!(family.rows[0].common_name, None);
    }

    #[test]
    fn test_null_query_matches_sentinel() {
        let search = FamilySearch::new(ChunkStorage::new("/unused"), None);
        let outcome = search.evaluate(&GeneQuery::new("null"), &record(1), 1);
        assert!(matches!(outcome, SearchOutcome::Emitted(_)));
    }

    #[test]
    fn test_all_rows_filtered_is_null_result() {
        let table = SpeciesTable::from_entries(vec![SpeciesEntry::new("gallus_gallus", Some("chicken"), None)]);
        let search = FamilySearch::new(ChunkStorage::new("/unused"), Some(&table));
        let outcome = search.evaluate(&GeneQuery::new("TP53"), &record(1), 1);
        assert_eq!(outcome, SearchOutcome::NullResult { rows: Vec::new() });
    }

    #[test]
    fn test_remaining_null_genes_are_null_result() {
        let table = SpeciesTable::from_entries(vec![SpeciesEntry::new("danio_rerio", Some("zebrafish"), None)]);
        let search = FamilySearch::new(ChunkStorage::new("/unused"), Some(&table));
        let SearchOutcome::NullResult { rows } = search.evaluate(&GeneQuery::new("TP53"), &record(1), 1) else {
            panic!("expected a null result");
        };
        assert_eq!(rows.len(), 1);
        assert!(rows[0].has_null_gene());
    }

    #[test]
    fn test_tree_missing_protein_is_malformed() {
        let mut broken = record(0);
        broken.tree = "(ENSP1:0.1,ENSDARP1:0.5);".to_string();
        let search = FamilySearch::new(ChunkStorage::new("/unused"), None);
        let outcome = search.evaluate(&GeneQuery::new("ACTB"), &broken, 1);
        assert!(matches!(
            outcome,
            SearchOutcome::MalformedTree { error: NewickError::MissingLeaves(_), .. }
        ));
    }

    #[test]
    fn test_structural_error_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let search = FamilySearch::new(ChunkStorage::new(dir.path()), None);
        let text = "SEQ a b\nSEQ\n(a);\n//\n";
        let err = search.run(text, &[GeneQuery::new("x")], &NoProgress).unwrap_err();
        assert!(err.is_structural());
    }

    #[derive(Default)]
    struct Counting {
        total: Cell<usize>,
        last: Cell<usize>,
        finished: Cell<bool>,
    }

    impl ProgressReporter for Counting {
        fn start(&self, total: usize) {
            self.total.set(total);
        }
        fn advance(&self, position: usize, _total: usize) {
            self.last.set(position);
        }
        fn finish(&self) {
            self.finished.set(true);
        }
    }

    #[test]
    fn test_run_writes_chunks_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let table = species();
        let search = FamilySearch::new(ChunkStorage::new(dir.path()), Some(&table));
        let progress = Counting::default();
        let queries = [GeneQuery::new("ACTB"), GeneQuery::new("TP53")];

        let summary = search.run(DUMP, &queries, &progress).unwrap();

        assert_eq!(progress.total.get(), 4);
        assert_eq!(progress.last.get(), 4);
        assert!(progress.finished.get());

        assert_eq!(summary.genes[0].emitted, 1);
        assert_eq!(summary.genes[1].emitted, 1);
        assert!(dir.path().join("ACTB/chunk_1/chunk_1_SEQ.tsv").is_file());
        assert!(dir.path().join("TP53/chunk_1/chunk_1_CommonName_Newick.tree").is_file());
        assert!(dir
            .path()
            .join("speciesCounts/TP53_OrderCounts_chunk_1.txt")
            .is_file());

        let cumulative = std::fs::read_to_string(&summary.cumulative_path).unwrap();
        assert_eq!(cumulative.lines().count(), 1 + 2 + 1);
    }

    #[test]
    fn test_split_into_chunks_uses_block_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ChunkStorage::new(dir.path());
        let text = format!("no table here\n//\n{DUMP}");

        let summary = split_into_chunks(&text, &storage, &NoProgress).unwrap();
        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.skipped_blocks, 2);
        assert!(dir.path().join("fileChunks/chunk_2/chunk_2_Newick.tree").is_file());
        assert!(dir.path().join("fileChunks/chunk_3/chunk_3_SEQ.tsv").is_file());
        assert!(!dir.path().join("fileChunks/chunk_1").exists());
    }
}
