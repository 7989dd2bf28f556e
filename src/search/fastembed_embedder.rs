//! FastEmbed-backed ML embedder (ONNX runtime).
//!
//! Loads a sentence encoder from local model files and mean-pools its last
//! hidden state into one vector per input. Nothing is downloaded here: the
//! model directory must already contain the files listed in
//! [`REQUIRED_ONNX_FILES`].

use std::fs;
use std::path::Path;

use fastembed::{
    InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles, UserDefinedEmbeddingModel,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::embedder::{Embedder, EmbedderError, EmbedderResult};
use super::embedder_registry::{EmbedderRegistry, REQUIRED_ONNX_FILES};

pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    id: String,
    dimension: usize,
}

impl FastEmbedder {
    /// Load a registered ONNX embedder (e.g. `minilm`) from `<data_dir>/models`.
    pub fn load_by_name(data_dir: &Path, name: &str) -> EmbedderResult<Self> {
        let registry = EmbedderRegistry::new(data_dir);
        let registered = registry.validate(name)?;
        let model_dir = registered.model_dir(data_dir).ok_or_else(|| {
            EmbedderError::Unavailable(format!("embedder '{name}' has no model directory"))
        })?;
        Self::load_from_dir(
            &model_dir,
            registered.id,
            registered.dimension,
            registered.max_tokens,
        )
    }

    /// Load a model from an explicit directory.
    ///
    /// `max_tokens` is the tokenizer truncation budget: longer inputs are cut,
    /// never rejected.
    pub fn load_from_dir(
        model_dir: &Path,
        id: &str,
        dimension: usize,
        max_tokens: usize,
    ) -> EmbedderResult<Self> {
        let missing: Vec<&str> = REQUIRED_ONNX_FILES
            .iter()
            .copied()
            .filter(|f| !model_dir.join(f).is_file())
            .collect();
        if !missing.is_empty() {
            return Err(EmbedderError::Unavailable(format!(
                "missing files in {}: {}",
                model_dir.display(),
                missing.join(", ")
            )));
        }

        let read = |file: &str| {
            fs::read(model_dir.join(file)).map_err(|e| {
                EmbedderError::Unavailable(format!(
                    "failed to read {}: {e}",
                    model_dir.join(file).display()
                ))
            })
        };

        let tokenizer_files = TokenizerFiles {
            tokenizer_file: read("tokenizer.json")?,
            config_file: read("config.json")?,
            special_tokens_map_file: read("special_tokens_map.json")?,
            tokenizer_config_file: read("tokenizer_config.json")?,
        };
        let onnx = read("model.onnx")?;
        debug!(
            model_dir = %model_dir.display(),
            onnx_bytes = onnx.len(),
            "loading onnx embedder"
        );

        let user_model =
            UserDefinedEmbeddingModel::new(onnx, tokenizer_files).with_pooling(Pooling::Mean);
        let options = InitOptionsUserDefined::new().with_max_length(max_tokens);
        let model = TextEmbedding::try_new_from_user_defined(user_model, options)
            .map_err(|e| EmbedderError::Unavailable(format!("failed to initialize {id}: {e}")))?;

        info!(embedder = id, dimension, max_tokens, "embedder ready");
        Ok(Self {
            model: Mutex::new(model),
            id: id.to_string(),
            dimension,
        })
    }

    fn check_dimensions(&self, vectors: &[Vec<f32>]) -> EmbedderResult<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "{} produced dimension {}, expected {}",
                self.id,
                bad.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| EmbedderError::EmbeddingFailed("model returned no vector".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> EmbedderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .model
            .lock()
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbedderError::EmbeddingFailed(e.to_string()))?;
        if vectors.len() != texts.len() {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "model returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        self.check_dimensions(&vectors)?;
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_semantic(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_from_empty_dir_reports_missing_files() {
        let tmp = tempdir().unwrap();
        let err = FastEmbedder::load_from_dir(tmp.path(), "minilm-384", 384, 256)
            .err()
            .expect("should fail without model files");
        let msg = err.to_string();
        assert!(matches!(err, EmbedderError::Unavailable(_)));
        assert!(msg.contains("model.onnx"));
        assert!(msg.contains("tokenizer.json"));
    }

    #[test]
    fn load_by_unknown_name_fails() {
        let tmp = tempdir().unwrap();
        assert!(FastEmbedder::load_by_name(tmp.path(), "no-such-model").is_err());
    }
}
