//! In-memory synonym table.
//!
//! JSON layout maps a word to its senses, each sense a list of lemmas:
//!
//! ```json
//! { "jacket": [["jacket", "coat"], ["jacket", "crown"]] }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{LexicalDatabase, LexiconError};

#[derive(Debug, Clone)]
pub struct SynonymTable {
    senses: HashMap<String, Vec<Vec<String>>>,
    id: String,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self {
            senses: HashMap::new(),
            id: "synonym-table".to_string(),
        }
    }

    /// Build a table from `(word, senses)` pairs. Words are matched ignoring case.
    pub fn from_senses<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<Vec<V>>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::new();
        for (word, senses) in entries {
            let word: String = word.into();
            for sense in senses {
                table.add_sense(word.clone(), sense);
            }
        }
        table
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LexiconError> {
        let raw = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: HashMap<String, Vec<Vec<String>>> =
            serde_json::from_str(&raw).map_err(|source| LexiconError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let mut table = Self::from_senses(parsed);
        table.id = format!("synonym-table:{}", path.display());
        Ok(table)
    }

    pub fn add_sense<V: Into<String>>(&mut self, word: String, lemmas: Vec<V>) {
        self.senses
            .entry(word.to_lowercase())
            .or_default()
            .push(lemmas.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.senses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalDatabase for SynonymTable {
    fn synonyms(&self, word: &str) -> Vec<String> {
        self.senses
            .get(&word.trim().to_lowercase())
            .map(|senses| senses.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    fn id(&self) -> &str {
        &self.id
    }
}
