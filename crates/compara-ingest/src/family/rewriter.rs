//! Tree leaf relabelling
//!
//! Dump trees are labelled by protein ID. The renamed variants are produced
//! by plain substring replacement over the tree text, one row at a time in
//! table order. Replacement is not restricted to whole labels, so an ID that
//! is a prefix of another ID also rewrites part of the longer one.

use crate::species::SpeciesTable;

use super::models::FamilyRow;

/// Replace every occurrence of each source token with its target, in order
///
/// Empty source tokens are skipped; replacing them would splice the target
/// between every character.
pub fn replace_identifiers<'a, I>(tree: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .filter(|(from, _)| !from.is_empty())
        .fold(tree.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Protein IDs replaced by scientific names
pub fn scientific_name_tree(tree: &str, rows: &[FamilyRow]) -> String {
    replace_identifiers(
        tree,
        rows.iter().map(|r| (r.protein_id.as_str(), r.species.as_str())),
    )
}

/// Protein IDs replaced by gene names
pub fn gene_name_tree(tree: &str, rows: &[FamilyRow]) -> String {
    replace_identifiers(
        tree,
        rows.iter().map(|r| (r.protein_id.as_str(), r.gene.as_str())),
    )
}

/// Scientific names replaced by common names
///
/// Takes the output of [`scientific_name_tree`]. Species without a common
/// name in the table are left as they are.
pub fn common_name_tree(species_tree: &str, rows: &[FamilyRow], species: &SpeciesTable) -> String {
    replace_identifiers(
        species_tree,
        rows.iter().filter_map(|r| {
            species
                .common_name(&r.species)
                .map(|common| (r.species.as_str(), common))
        }),
    )
}

/// The relabelled variants of one family tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedTrees {
    pub scientific_name: String,
    pub gene_name: String,
    /// Only produced when a species table is available
    pub common_name: Option<String>,
}

/// Produce every relabelled variant of a protein-ID tree
pub fn rename_leaves(tree: &str, rows: &[FamilyRow], species: Option<&SpeciesTable>) -> RenamedTrees {
    let scientific_name = scientific_name_tree(tree, rows);
    let common_name = species.map(|table| common_name_tree(&scientific_name, rows, table));

    RenamedTrees {
        gene_name: gene_name_tree(tree, rows),
        scientific_name,
        common_name,
    }
}
