//! Embedder trait for turning text into fixed-dimension vectors.
//!
//! Every encoder used by the pipeline implements [`Embedder`]. The trait is
//! object safe so encoders can be picked at runtime from the
//! [`embedder_registry`](super::embedder_registry) and shared as
//! `Arc<dyn Embedder>`.

/// Result alias for embedder operations.
pub type EmbedderResult<T> = Result<T, EmbedderError>;

#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("embedder unavailable: {0}")]
    Unavailable(String),

    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Static description of an embedder, for logging and status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedderInfo {
    pub id: String,
    pub dimension: usize,
    pub is_semantic: bool,
}

/// A text encoder producing vectors of a fixed dimension.
///
/// Implementations must treat every input independently: embedding a batch
/// yields exactly the vectors that embedding each item alone would. Empty
/// strings are valid input. Over-long input is truncated, never rejected.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>>;

    /// Embed several texts, one vector per input, in input order.
    fn embed_batch(&self, texts: &[&str]) -> EmbedderResult<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Output dimension.
    fn dimension(&self) -> usize;

    /// Stable identifier, e.g. `minilm-384`.
    fn id(&self) -> &str;

    /// Whether vectors carry learned semantics (false for lexical hashing).
    fn is_semantic(&self) -> bool;

    fn info(&self) -> EmbedderInfo {
        EmbedderInfo {
            id: self.id().to_string(),
            dimension: self.dimension(),
            is_semantic: self.is_semantic(),
        }
    }
}
