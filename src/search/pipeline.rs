//! Query → ranked products.
//!
//! Two modes share the encoder and the ranker but keep distinct contracts:
//!
//! - **Rank catalog** ([`SearchPipeline::rank_catalog`]): batch-encode every
//!   eligible row, encode the query, return display records of the top hits.
//! - **Filter then rank** ([`SearchPipeline::filter_then_rank`]): expand the
//!   keyword into synonyms, keep rows containing any of them, encode those
//!   rows one at a time, return the original row ids of the top hits. If no
//!   row survives the filter, nothing is encoded.
//!
//! The pipeline holds only shared read-only collaborators, so one instance
//! can serve any number of sequential queries.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::catalog::{CatalogRow, DisplayRecord};

use super::canonicalize::canonicalize_for_embedding;
use super::embedder::{Embedder, EmbedderError};
use super::filter::filter_candidates;
use super::lexicon::LexicalExpander;
use super::ranker::{DimensionMismatch, SimilarityRanker};

/// Number of results returned when not configured otherwise.
pub const DEFAULT_TOP_K: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("encoding failed: {0}")]
    Encoding(#[from] EmbedderError),

    #[error(transparent)]
    DimensionMismatch(#[from] DimensionMismatch),

    #[error("no lexical database configured; filter-then-rank needs one")]
    LexiconUnavailable,
}

/// Which of the two search contracts to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    RankCatalog,
    FilterThenRank,
}

/// Result of [`SearchPipeline::run`]; the shape depends on the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Records(Vec<DisplayRecord>),
    Identifiers(Vec<usize>),
}

impl SearchOutcome {
    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::Records(records) => records.len(),
            SearchOutcome::Identifiers(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct SearchPipeline {
    embedder: Arc<dyn Embedder>,
    expander: Option<LexicalExpander>,
    ranker: SimilarityRanker,
    top_k: usize,
}

impl SearchPipeline {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            expander: None,
            ranker: SimilarityRanker::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Attach the synonym expander required by filter-then-rank.
    pub fn with_expander(mut self, expander: LexicalExpander) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Dispatch to the mode's own entry point.
    pub fn run(
        &self,
        mode: SearchMode,
        query: &str,
        rows: &[CatalogRow],
    ) -> Result<SearchOutcome, SearchError> {
        match mode {
            SearchMode::RankCatalog => self.rank_catalog(query, rows).map(SearchOutcome::Records),
            SearchMode::FilterThenRank => self
                .filter_then_rank(query, rows)
                .map(SearchOutcome::Identifiers),
        }
    }

    /// Rank every eligible row against `query` and project the top hits.
    pub fn rank_catalog(
        &self,
        query: &str,
        rows: &[CatalogRow],
    ) -> Result<Vec<DisplayRecord>, SearchError> {
        let query = validate_query(query)?;
        let started = Instant::now();

        let eligible: Vec<&CatalogRow> = rows.iter().filter(|r| r.is_eligible()).collect();
        if eligible.is_empty() {
            debug!("no eligible rows; skipping encoding");
            return Ok(Vec::new());
        }

        let texts: Vec<String> = eligible
            .iter()
            .map(|row| canonicalize_for_embedding(&row.searchable_text))
            .collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&text_refs)?;
        if vectors.len() != eligible.len() {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "{} returned {} vectors for {} rows",
                self.embedder.id(),
                vectors.len(),
                eligible.len()
            ))
            .into());
        }
        let query_vec = self.embed_query(query)?;

        let candidates: Vec<(&CatalogRow, Vec<f32>)> = eligible.into_iter().zip(vectors).collect();
        let ranked = self.ranker.rank(&query_vec, &candidates, self.top_k)?;

        info!(
            mode = "rank_catalog",
            embedder = self.embedder.id(),
            candidates = candidates.len(),
            results = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(ranked.iter().map(|c| c.row.display_record()).collect())
    }

    /// Filter rows by the keyword's synonyms, then rank the survivors.
    ///
    /// Returns original row ids. An empty filter result returns early without
    /// touching the encoder.
    pub fn filter_then_rank(
        &self,
        keyword: &str,
        rows: &[CatalogRow],
    ) -> Result<Vec<usize>, SearchError> {
        let expander = self
            .expander
            .as_ref()
            .ok_or(SearchError::LexiconUnavailable)?;
        let keyword = validate_query(keyword)?;
        let started = Instant::now();

        let terms = expander.expand(keyword);
        let filtered = filter_candidates(rows, &terms);
        if filtered.is_empty() {
            info!(
                mode = "filter_then_rank",
                keyword,
                terms = terms.len(),
                "no catalog rows matched; skipping encoding"
            );
            return Ok(Vec::new());
        }

        let mut candidates: Vec<(&CatalogRow, Vec<f32>)> = Vec::with_capacity(filtered.len());
        for row in filtered {
            let vector = self
                .embedder
                .embed(&canonicalize_for_embedding(&row.searchable_text))?;
            candidates.push((row, vector));
        }
        let query_vec = self.embed_query(keyword)?;
        let ranked = self.ranker.rank(&query_vec, &candidates, self.top_k)?;

        info!(
            mode = "filter_then_rank",
            embedder = self.embedder.id(),
            terms = terms.len(),
            candidates = candidates.len(),
            results = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(ranked.iter().map(|c| c.row.id).collect())
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>, SearchError> {
        Ok(self.embedder.embed(&canonicalize_for_embedding(query))?)
    }
}

fn validate_query(query: &str) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(trimmed)
}
