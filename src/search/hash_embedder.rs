//! FNV-1a feature hashing embedder.
//!
//! Lowercased alphanumeric tokens are hashed into `dimension` buckets with a
//! hash-derived sign, then the vector is L2-normalized. No model files are
//! needed, so this embedder is always available and fully deterministic. It
//! captures lexical overlap only, not meaning.

use super::embedder::{Embedder, EmbedderResult};

/// Default output dimension (matches MiniLM so vectors line up in tooling).
pub const DEFAULT_DIMENSION: usize = 384;

/// Default token budget; tokens past this point are ignored.
pub const DEFAULT_MAX_TOKENS: usize = 512;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    max_tokens: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            max_tokens: DEFAULT_MAX_TOKENS,
            id: format!("fnv1a-{dimension}"),
        }
    }

    pub fn default_dimension() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }

    /// Override the token budget.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::default_dimension()
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text).take(self.max_tokens) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_semantic(&self) -> bool {
        false
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_has_configured_dimension() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(embedder.embed("red running shoes").unwrap().len(), 64);
        assert_eq!(embedder.dimension(), 64);
        assert_eq!(embedder.id(), "fnv1a-64");
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("").unwrap();
        assert_eq!(v.len(), DEFAULT_DIMENSION);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn output_is_unit_length() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("Blue jacket, waterproof").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let embedder = HashEmbedder::default();
        assert_eq!(
            embedder.embed("Red, Running SHOES!").unwrap(),
            embedder.embed("red running shoes").unwrap()
        );
    }

    #[test]
    fn batch_matches_single_calls() {
        let embedder = HashEmbedder::default();
        let texts = ["red running shoes", "", "blue jacket"];
        let batch = embedder.embed_batch(&texts).unwrap();
        for (text, vector) in texts.iter().zip(&batch) {
            assert_eq!(&embedder.embed(text).unwrap(), vector);
        }
    }

    #[test]
    fn long_input_is_truncated_not_rejected() {
        let embedder = HashEmbedder::default().with_max_tokens(2);
        let long = format!("red shoes {}", "filler ".repeat(10_000));
        assert_eq!(
            embedder.embed(&long).unwrap(),
            embedder.embed("red shoes").unwrap()
        );
    }
}
