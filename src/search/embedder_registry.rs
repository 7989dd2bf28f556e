//! Embedder registry for model selection.
//!
//! This module provides a registry of available embedding backends that allows:
//! - Listing available embedders with metadata
//! - Selecting embedder by name from CLI/config
//! - Validating model availability before use
//! - Providing a sensible default model
//!
//! # Supported Embedders
//!
//! | Name | ID | Dimension | Type | Notes |
//! |------|-----|-----------|------|-------|
//! | minilm | minilm-384 | 384 | ML | Default semantic embedder |
//! | bert-base | bert-base-768 | 768 | ML | Uncased BERT, mean pooled |
//! | hash | fnv1a-384 | 384 | Hash | Always available fallback |
//!
//! # Example
//!
//! ```ignore
//! use product_search::search::embedder_registry::{EmbedderRegistry, get_embedder};
//!
//! let registry = EmbedderRegistry::new(&data_dir);
//! let best = registry.best_available();
//! println!("{}: {} ({})", best.name, best.id, best.dimension);
//!
//! let embedder = get_embedder(&data_dir, Some("minilm"))?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::embedder::{Embedder, EmbedderError, EmbedderResult};
use super::fastembed_embedder::FastEmbedder;
use super::hash_embedder::{DEFAULT_MAX_TOKENS, HashEmbedder};

/// Default embedder name when none specified.
pub const DEFAULT_EMBEDDER: &str = "minilm";

/// Hash embedder name (always available).
pub const HASH_EMBEDDER: &str = "hash";

/// Information about a registered embedder.
#[derive(Debug, Clone)]
pub struct RegisteredEmbedder {
    /// Short name for CLI/config (e.g., "minilm", "hash").
    pub name: &'static str,
    /// Unique embedder ID (e.g., "minilm-384", "fnv1a-384").
    pub id: &'static str,
    /// Output dimension.
    pub dimension: usize,
    /// Tokenizer truncation budget.
    pub max_tokens: usize,
    /// Whether this is a semantic (ML) embedder.
    pub is_semantic: bool,
    /// Human-readable description.
    pub description: &'static str,
    /// Whether the model files are required (false = always available).
    pub requires_model_files: bool,
    /// HuggingFace model ID the local files come from.
    pub huggingface_id: &'static str,
    /// Directory name under `<data_dir>/models`.
    pub model_dir_name: &'static str,
}

/// Files required for any ONNX-based embedder.
pub const REQUIRED_ONNX_FILES: &[&str] = &[
    "model.onnx",
    "tokenizer.json",
    "config.json",
    "special_tokens_map.json",
    "tokenizer_config.json",
];

impl RegisteredEmbedder {
    /// Check if this embedder is available in the given data directory.
    pub fn is_available(&self, data_dir: &Path) -> bool {
        self.missing_files(data_dir).is_empty()
    }

    /// Get the model directory path for this embedder (if applicable).
    pub fn model_dir(&self, data_dir: &Path) -> Option<PathBuf> {
        if !self.requires_model_files {
            return None;
        }
        Some(data_dir.join("models").join(self.model_dir_name))
    }

    /// Get required model files for this embedder.
    pub fn required_files(&self) -> &'static [&'static str] {
        if !self.requires_model_files {
            return &[];
        }
        REQUIRED_ONNX_FILES
    }

    /// Get missing model files for this embedder.
    pub fn missing_files(&self, data_dir: &Path) -> Vec<String> {
        let Some(model_dir) = self.model_dir(data_dir) else {
            return Vec::new();
        };
        self.required_files()
            .iter()
            .filter(|f| !model_dir.join(f).is_file())
            .map(|f| (*f).to_string())
            .collect()
    }
}

/// Static registry of all supported embedders, semantic models first.
pub static EMBEDDERS: &[RegisteredEmbedder] = &[
    RegisteredEmbedder {
        name: "minilm",
        id: "minilm-384",
        dimension: 384,
        max_tokens: 256,
        is_semantic: true,
        description: "MiniLM L6 v2 - fast sentence embeddings",
        requires_model_files: true,
        huggingface_id: "sentence-transformers/all-MiniLM-L6-v2",
        model_dir_name: "all-MiniLM-L6-v2",
    },
    RegisteredEmbedder {
        name: "bert-base",
        id: "bert-base-768",
        dimension: 768,
        max_tokens: 512,
        is_semantic: true,
        description: "BERT base uncased - mean pooled token states",
        requires_model_files: true,
        huggingface_id: "bert-base-uncased",
        model_dir_name: "bert-base-uncased",
    },
    RegisteredEmbedder {
        name: "hash",
        id: "fnv1a-384",
        dimension: 384,
        max_tokens: DEFAULT_MAX_TOKENS,
        is_semantic: false,
        description: "FNV-1a feature hashing - lexical fallback, always available",
        requires_model_files: false,
        huggingface_id: "",
        model_dir_name: "",
    },
];

/// Embedder registry with data directory context.
pub struct EmbedderRegistry {
    data_dir: PathBuf,
}

impl EmbedderRegistry {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Get embedder info by name or id.
    pub fn get(&self, name: &str) -> Option<&'static RegisteredEmbedder> {
        let name_lower = name.to_ascii_lowercase();
        EMBEDDERS
            .iter()
            .find(|e| e.name == name_lower || e.id == name_lower)
    }

    /// Get the best available embedder (ML if available, hash fallback).
    pub fn best_available(&self) -> &'static RegisteredEmbedder {
        EMBEDDERS
            .iter()
            .filter(|e| e.is_semantic)
            .find(|e| e.is_available(&self.data_dir))
            .unwrap_or_else(hash_entry)
    }

    /// Validate that an embedder is ready to use.
    ///
    /// Returns the registry entry if available, or an error with details about
    /// what's missing.
    pub fn validate(&self, name: &str) -> EmbedderResult<&'static RegisteredEmbedder> {
        let embedder = self.get(name).ok_or_else(|| {
            EmbedderError::Unavailable(format!(
                "unknown embedder '{}'. Available: {}",
                name,
                EMBEDDERS
                    .iter()
                    .map(|e| e.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        let missing = embedder.missing_files(&self.data_dir);
        if !missing.is_empty() {
            let model_dir = embedder
                .model_dir(&self.data_dir)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            return Err(EmbedderError::Unavailable(format!(
                "embedder '{}' not available: missing files in {}: {}. Export {} to ONNX into that directory.",
                name,
                model_dir,
                missing.join(", "),
                embedder.huggingface_id
            )));
        }

        Ok(embedder)
    }
}

fn hash_entry() -> &'static RegisteredEmbedder {
    EMBEDDERS
        .iter()
        .find(|e| e.name == HASH_EMBEDDER)
        .unwrap_or(&EMBEDDERS[EMBEDDERS.len() - 1])
}

/// Load an embedder by name (or the best available if None).
///
/// # Arguments
///
/// * `data_dir` - Data directory containing `models/`.
/// * `name` - Optional embedder name. If None, uses the best available.
pub fn get_embedder(data_dir: &Path, name: Option<&str>) -> EmbedderResult<Arc<dyn Embedder>> {
    let registry = EmbedderRegistry::new(data_dir);

    let embedder_info = match name {
        Some(n) => registry.validate(n)?,
        None => registry.best_available(),
    };
    debug!(embedder = embedder_info.name, "selected embedder");

    load_embedder(data_dir, embedder_info)
}

fn load_embedder(
    data_dir: &Path,
    registered: &'static RegisteredEmbedder,
) -> EmbedderResult<Arc<dyn Embedder>> {
    if registered.requires_model_files {
        let embedder = FastEmbedder::load_by_name(data_dir, registered.name)?;
        return Ok(Arc::new(embedder));
    }
    let embedder =
        HashEmbedder::new(registered.dimension).with_max_tokens(registered.max_tokens);
    Ok(Arc::new(embedder))
}
