//! Search layer facade.
//!
//! This module provides the ranking pipeline, including:
//!
//! - **[`embedder`]**: Embedder trait for turning text into vectors.
//! - **[`embedder_registry`]**: Embedder registry for model selection.
//! - **[`hash_embedder`]**: FNV-1a feature hashing embedder (deterministic fallback).
//! - **[`fastembed_embedder`]**: FastEmbed-backed ML embedder (MiniLM, BERT).
//! - **[`canonicalize`]**: Text preprocessing for consistent embedding input.
//! - **[`lexicon`]**: Synonym expansion backed by WordNet or a JSON table.
//! - **[`filter`]**: Substring candidate filter over synonym sets.
//! - **[`ranker`]**: Cosine similarity and stable top-k selection.
//! - **[`pipeline`]**: The two search modes built from the pieces above.

pub mod canonicalize;
pub mod embedder;
pub mod embedder_registry;
pub mod fastembed_embedder;
pub mod filter;
pub mod hash_embedder;
pub mod lexicon;
pub mod pipeline;
pub mod ranker;

pub use pipeline::{SearchError, SearchMode, SearchOutcome, SearchPipeline};
