//! Similarity measures available to fuzzy comparators (§4.5, §4.8).

use serde::{Deserialize, Serialize};
use strsim::{jaro_winkler, normalized_levenshtein};
use utoipa::ToSchema;

/// Configured string-similarity measure. `DamerauLevenshtein` reuses
/// strsim's normalized Damerau-Levenshtein distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum SimilarityMeasure {
    JaroWinkler,
    Levenshtein,
    DamerauLevenshtein,
}

impl Default for SimilarityMeasure {
    fn default() -> Self {
        SimilarityMeasure::JaroWinkler
    }
}

impl SimilarityMeasure {
    /// Similarity in `[0, 1]`, 1 meaning identical.
    pub fn score(self, a: &str, b: &str) -> f64 {
        match self {
            SimilarityMeasure::JaroWinkler => jaro_winkler(a, b),
            SimilarityMeasure::Levenshtein => normalized_levenshtein(a, b),
            SimilarityMeasure::DamerauLevenshtein => {
                strsim::normalized_damerau_levenshtein(a, b)
            }
        }
    }
}
