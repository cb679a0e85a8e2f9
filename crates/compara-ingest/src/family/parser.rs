//! Record splitting, line classification and table building

use tracing::trace;

use super::models::{FamilyRecord, FamilyRow};
use super::{FamilyError, Result, RECORD_SEPARATOR, TABLE_ARITY, TABLE_MARKER, TREE_TERMINATOR};

/// Index of the gene column; everything from here on belongs to the gene name
const GENE_COLUMN: usize = TABLE_ARITY - 1;

/// One raw block of the dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Sequential block number, starting at 1
    pub number: usize,
    pub text: &'a str,
}

/// Split dump text into blocks on the `//` separator line
///
/// Splitting is purely textual. The text after the last separator is
/// yielded too, so a well-formed dump ends with one empty block.
pub fn split_records(text: &str) -> impl Iterator<Item = RawRecord<'_>> {
    text.split(RECORD_SEPARATOR)
        .enumerate()
        .map(|(i, text)| RawRecord { number: i + 1, text })
}

/// Lines of a block sorted into table rows and tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedBlock<'a> {
    /// Last line containing the tree terminator
    pub tree: Option<&'a str>,
    /// Data rows preceding the marker line; `None` without a marker
    pub rows: Option<Vec<&'a str>>,
}

impl ClassifiedBlock<'_> {
    /// Both a table and a tree were found
    pub fn is_complete(&self) -> bool {
        self.tree.is_some() && self.rows.is_some()
    }
}

/// Find the tree line and the table rows of one block
///
/// Blank lines are dropped first. Lines are then scanned from the end: the
/// first line holding `;` is the tree, and the first later-scanned line
/// holding `SEQ` is the marker. Only the lines before the marker are data
/// rows; the marker line itself is not.
pub fn classify_block(block: &str) -> ClassifiedBlock<'_> {
    let lines: Vec<&str> = block.split('\n').filter(|l| !l.is_empty()).collect();
    let mut classified = ClassifiedBlock::default();

    for (offset, line) in lines.iter().rev().enumerate() {
        if line.contains(TREE_TERMINATOR) {
            if classified.tree.is_none() {
                classified.tree = Some(line);
            }
            continue;
        }

        if line.contains(TABLE_MARKER) {
            let marker = lines.len() - 1 - offset;
            classified.rows = Some(lines[..marker].to_vec());
            break;
        }
    }

    classified
}

/// Build typed rows from space-separated table lines
///
/// Gene names may themselves contain spaces, which shows up as extra
/// fields; those are joined back with `_`. A row with only eight fields has
/// no gene name. Anything shorter is a structural error.
pub fn build_table(record: usize, rows: &[&str]) -> Result<Vec<FamilyRow>> {
    rows.iter()
        .enumerate()
        .map(|(i, line)| {
            let fields: Vec<&str> = line.split(' ').collect();
            let gene = match fields.len() {
                n if n > TABLE_ARITY => Some(rejoin_gene(&fields[GENE_COLUMN..])),
                n if n == TABLE_ARITY => Some(fields[GENE_COLUMN].to_string()),
                _ => None,
            };

            let leading = &fields[..fields.len().min(GENE_COLUMN)];
            FamilyRow::from_fields(leading, gene.as_deref()).ok_or_else(|| {
                FamilyError::StructuralParse {
                    record,
                    row: i + 1,
                    found: fields.len(),
                    line: line.to_string(),
                }
            })
        })
        .collect()
}

/// Join the overflow fields of a gene name
pub fn rejoin_gene(parts: &[&str]) -> String {
    parts.join("_")
}

/// Parse one block into a record
///
/// Returns `Ok(None)` for blocks lacking a table or a tree, including the
/// empty trailing block.
pub fn parse_record(raw: &RawRecord<'_>) -> Result<Option<FamilyRecord>> {
    let classified = classify_block(raw.text);

    let (Some(tree), Some(rows)) = (classified.tree, classified.rows) else {
        trace!(record = raw.number, "Skipping block without table or tree");
        return Ok(None);
    };

    Ok(Some(FamilyRecord {
        number: raw.number,
        rows: build_table(raw.number, &rows)?,
        tree: tree.to_string(),
    }))
}
