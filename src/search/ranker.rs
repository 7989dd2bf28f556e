//! Cosine scoring and deterministic top-k selection.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::catalog::CatalogRow;

/// A candidate's vector length differs from the query's.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("vector dimension mismatch at candidate {position}: expected {expected}, got {actual}")]
pub struct DimensionMismatch {
    pub position: usize,
    pub expected: usize,
    pub actual: usize,
}

/// A catalog row with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub row: &'a CatalogRow,
    /// Cosine similarity, always within `[-1, 1]`.
    pub score: f32,
    /// Index of the candidate in the ranker's input.
    pub position: usize,
}

/// Cosine similarity of two vectors of equal length.
///
/// Returns 0 when either vector has zero magnitude or the result is not
/// finite. Accumulates in f64 and clamps to `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (x, y)| {
            let (x, y) = (f64::from(*x), f64::from(*y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() || score == 0.0 {
        return 0.0;
    }
    score.clamp(-1.0, 1.0) as f32
}

/// Scores candidates against a query vector and keeps the best `k`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker;

impl SimilarityRanker {
    pub fn new() -> Self {
        Self
    }

    /// Top `min(k, candidates.len())` candidates by descending score.
    ///
    /// Equal scores keep their input order, so identical input always gives
    /// identical output.
    pub fn rank<'a>(
        &self,
        query: &[f32],
        candidates: &[(&'a CatalogRow, Vec<f32>)],
        k: usize,
    ) -> Result<Vec<ScoredCandidate<'a>>, DimensionMismatch> {
        if let Some((position, (_, vector))) = candidates
            .iter()
            .enumerate()
            .find(|(_, (_, v))| v.len() != query.len())
        {
            return Err(DimensionMismatch {
                position,
                expected: query.len(),
                actual: vector.len(),
            });
        }
        if k == 0 || candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Min-heap of the best k seen so far; the root is the weakest entry.
        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (position, (_, vector)) in candidates.iter().enumerate() {
            heap.push(std::cmp::Reverse(ScoredEntry {
                score: cosine_similarity(query, vector),
                position,
            }));
            if heap.len() > k {
                heap.pop();
            }
        }

        let mut entries: Vec<ScoredEntry> = heap.into_iter().map(|e| e.0).collect();
        entries.sort_by(|a, b| b.cmp(a));

        let ranked: Vec<ScoredCandidate<'a>> = entries
            .into_iter()
            .map(|entry| ScoredCandidate {
                row: candidates[entry.position].0,
                score: entry.score,
                position: entry.position,
            })
            .collect();

        debug!(
            candidates = candidates.len(),
            k,
            top_score = ranked.first().map(|c| c.score),
            "ranked candidates"
        );
        Ok(ranked)
    }
}

#[derive(Debug, Clone, Copy)]
struct ScoredEntry {
    score: f32,
    position: usize,
}

impl PartialEq for ScoredEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredEntry {}

impl PartialOrd for ScoredEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredEntry {
    /// Higher score is greater; on ties the earlier position is greater.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.position.cmp(&self.position))
    }
}
