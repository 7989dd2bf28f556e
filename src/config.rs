//! Runtime configuration read from the environment.
//!
//! Every value can also come from a `.env` file in the working directory.
//! Command-line flags take precedence over anything set here.

use std::path::PathBuf;

use tracing::warn;

use crate::search::pipeline::DEFAULT_TOP_K;

pub const ENV_DATA_DIR: &str = "PRODUCT_SEARCH_DATA_DIR";
pub const ENV_EMBEDDER: &str = "PRODUCT_SEARCH_EMBEDDER";
pub const ENV_CATALOG: &str = "PRODUCT_SEARCH_CATALOG";
pub const ENV_LEXICON: &str = "PRODUCT_SEARCH_LEXICON";
pub const ENV_TOP_K: &str = "PRODUCT_SEARCH_TOP_K";
pub const ENV_FORMAT: &str = "PRODUCT_SEARCH_FORMAT";

/// Catalog path used by filter-then-rank when none is given.
pub const DEFAULT_CATALOG: &str = "products_list.csv";

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Root for `models/` and the default WordNet location.
    pub data_dir: PathBuf,
    /// Registry name or id; `None` picks the best available embedder.
    pub embedder: Option<String>,
    pub catalog_path: PathBuf,
    /// WordNet `dict/` directory or JSON synonym file.
    pub lexicon_path: Option<PathBuf>,
    pub top_k: usize,
    pub format: OutputFormat,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            embedder: None,
            catalog_path: PathBuf::from(DEFAULT_CATALOG),
            lexicon_path: None,
            top_k: DEFAULT_TOP_K,
            format: OutputFormat::Json,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by `PRODUCT_SEARCH_*` variables.
    ///
    /// Unparseable values, and a `top_k` of zero, are logged and ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(val) = dotenvy::var(ENV_DATA_DIR)
            && !val.trim().is_empty()
        {
            cfg.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = dotenvy::var(ENV_EMBEDDER)
            && !val.trim().is_empty()
        {
            cfg.embedder = Some(val.trim().to_string());
        }

        if let Ok(val) = dotenvy::var(ENV_CATALOG)
            && !val.trim().is_empty()
        {
            cfg.catalog_path = PathBuf::from(val);
        }

        if let Ok(val) = dotenvy::var(ENV_LEXICON)
            && !val.trim().is_empty()
        {
            cfg.lexicon_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = dotenvy::var(ENV_TOP_K) {
            match val.trim().parse::<usize>() {
                Ok(k) if k > 0 => cfg.top_k = k,
                _ => warn!(value = %val, "ignoring {ENV_TOP_K}; expected a positive integer"),
            }
        }

        if let Ok(val) = dotenvy::var(ENV_FORMAT) {
            match val.parse() {
                Ok(format) => cfg.format = format,
                Err(err) => warn!(error = %err, "ignoring invalid {ENV_FORMAT}"),
            }
        }

        cfg
    }

    /// Lexicon to open for filter-then-rank: the configured one, else
    /// `<data_dir>/wordnet`.
    pub fn resolved_lexicon_path(&self) -> PathBuf {
        self.lexicon_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("wordnet"))
    }
}

/// Platform data directory, or the working directory when none can be
/// determined.
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "product-search", "product-search")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
