//! Lexical candidate filter.
//!
//! A row survives when its lowercased searchable text contains any lowercased
//! term as a plain substring. This is not word matching: "art" matches
//! "heart".

use tracing::debug;

use crate::catalog::CatalogRow;

use super::lexicon::SynonymSet;

/// Keep eligible rows whose text contains at least one term, in input order.
///
/// Blank terms are skipped; they would otherwise match every row.
pub fn filter_candidates<'a>(rows: &'a [CatalogRow], terms: &SynonymSet) -> Vec<&'a CatalogRow> {
    let needles: Vec<String> = terms
        .iter()
        .map(str::to_lowercase)
        .filter(|t| !t.trim().is_empty())
        .collect();
    if needles.is_empty() {
        return Vec::new();
    }

    let kept: Vec<&CatalogRow> = rows
        .iter()
        .filter(|row| row.is_eligible())
        .filter(|row| {
            let haystack = row.searchable_text.to_lowercase();
            needles.iter().any(|needle| haystack.contains(needle.as_str()))
        })
        .collect();

    debug!(
        rows = rows.len(),
        terms = needles.len(),
        kept = kept.len(),
        "filtered candidates"
    );
    kept
}
