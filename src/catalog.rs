//! Product catalog loading.
//!
//! The catalog is a CSV file with a header row. Only the columns in
//! [`REQUIRED_COLUMNS`] are read; anything else (`productType`, `variants`,
//! ...) is ignored. Values are carried through as strings, unchanged.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Columns every catalog must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "embeddingText",
    "displayTitle",
    "url",
    "imageUrl",
    "price",
    "discount",
];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to open catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("catalog {path} is missing required columns: {}", .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },
}

/// Raw CSV record; field names follow the catalog's column headers.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(rename = "embeddingText")]
    embedding_text: String,
    #[serde(rename = "displayTitle")]
    display_title: String,
    url: String,
    #[serde(rename = "imageUrl")]
    image_url: String,
    price: String,
    discount: String,
}

/// One product. `id` is the zero-based row position in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub id: usize,
    pub searchable_text: String,
    pub title: String,
    pub url: String,
    pub image_url: String,
    pub price: String,
    pub discount: String,
}

impl CatalogRow {
    /// Row with only searchable text set; display fields are empty.
    pub fn new(id: usize, searchable_text: impl Into<String>) -> Self {
        Self {
            id,
            searchable_text: searchable_text.into(),
            title: String::new(),
            url: String::new(),
            image_url: String::new(),
            price: String::new(),
            discount: String::new(),
        }
    }

    pub fn with_display(
        mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        image_url: impl Into<String>,
        price: impl Into<String>,
        discount: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.url = url.into();
        self.image_url = image_url.into();
        self.price = price.into();
        self.discount = discount.into();
        self
    }

    /// Rows with blank searchable text never take part in filtering or ranking.
    pub fn is_eligible(&self) -> bool {
        !self.searchable_text.trim().is_empty()
    }

    pub fn display_record(&self) -> DisplayRecord {
        DisplayRecord {
            title: self.title.clone(),
            url: self.url.clone(),
            image_url: self.image_url.clone(),
            price: self.price.clone(),
            discount: self.discount.clone(),
        }
    }
}

/// Display projection of a row, serialized with the catalog's column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    #[serde(rename = "displayTitle")]
    pub title: String,
    pub url: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub price: String,
    pub discount: String,
}

/// Load every row of a catalog CSV into memory.
///
/// Fails before reading any row if a required column is absent.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogRow>, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| CatalogError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| (*col).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CatalogError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }
    debug!(path = %path.display(), columns = headers.len(), "catalog header ok");

    let mut rows = Vec::new();
    for (id, record) in reader.deserialize::<CatalogRecord>().enumerate() {
        let record = record.map_err(csv_err)?;
        rows.push(CatalogRow {
            id,
            searchable_text: record.embedding_text,
            title: record.display_title,
            url: record.url,
            image_url: record.image_url,
            price: record.price,
            discount: record.discount,
        });
    }

    let eligible = rows.iter().filter(|r| r.is_eligible()).count();
    info!(path = %path.display(), rows = rows.len(), eligible, "catalog loaded");
    Ok(rows)
}
