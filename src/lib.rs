//! Semantic product search over a CSV catalog.
//!
//! Two search modes share one embedder and one ranker:
//!
//! - rank the whole catalog against a free-text query ([`search::SearchPipeline::rank_catalog`]);
//! - expand a keyword into synonyms, filter the catalog by substring, then rank
//!   the survivors ([`search::SearchPipeline::filter_then_rank`]).

pub mod catalog;
pub mod cli;
pub mod config;
pub mod search;
