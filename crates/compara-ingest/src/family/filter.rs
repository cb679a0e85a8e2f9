//! Species-of-interest filtering

use tracing::trace;

use crate::species::SpeciesTable;

use super::models::FamilyRow;

/// Drop rows whose species is not in the table, keeping row order
pub fn retain_species_of_interest(rows: Vec<FamilyRow>, species: &SpeciesTable) -> Vec<FamilyRow> {
    let before = rows.len();
    let kept: Vec<FamilyRow> = rows
        .into_iter()
        .filter(|row| species.contains(&row.species))
        .collect();
    trace!(before, after = kept.len(), "Filtered rows by species");
    kept
}

/// Fill common name and order from the species table
///
/// A species missing from the table leaves both fields `None`.
pub fn annotate_species(rows: &mut [FamilyRow], species: &SpeciesTable) {
    for row in rows {
        row.common_name = species.common_name(&row.species).map(str::to_string);
        row.order = species.order(&row.species).map(str::to_string);
    }
}

/// Whether the table carries no usable gene name
///
/// An empty table counts as all-null.
pub fn all_genes_null(rows: &[FamilyRow]) -> bool {
    rows.iter().all(FamilyRow::has_null_gene)
}

/// Stable sort by taxonomic order, rows without an order last
pub fn sort_by_order(rows: &mut [FamilyRow]) {
    rows.sort_by(|a, b| match (&a.order, &b.order) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
