//! Lexical expansion of keywords into synonym sets.
//!
//! A [`LexicalDatabase`] answers "which surface forms share a sense with this
//! word". [`LexicalExpander`] turns that into a [`SynonymSet`] that always
//! starts with the keyword itself, which the candidate filter then matches
//! against catalog text.
//!
//! Two databases ship with the crate:
//! - [`WordNet`]: reads a WordNet 3.x `dict/` directory
//! - [`SynonymTable`]: in-memory table, loadable from JSON

mod synonym_table;
mod wordnet;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

pub use synonym_table::SynonymTable;
pub use wordnet::WordNet;

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed lexicon file {path} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("invalid synonym table {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read-only synonym source queried by word.
pub trait LexicalDatabase: Send + Sync {
    /// Every lemma of every sense of `word`, in database order. May contain
    /// duplicates. Unknown words return an empty list.
    fn synonyms(&self, word: &str) -> Vec<String>;

    fn id(&self) -> &str;
}

/// Open a lexical database from disk.
///
/// A directory is read as a WordNet `dict/` directory; a file as a JSON
/// synonym table.
pub fn open_lexicon(path: &Path) -> Result<Arc<dyn LexicalDatabase>, LexiconError> {
    if path.is_dir() {
        Ok(Arc::new(WordNet::open(path)?))
    } else {
        Ok(Arc::new(SynonymTable::from_json_file(path)?))
    }
}

/// Insertion-ordered set of terms compared case-insensitively.
///
/// The first spelling inserted for a given lowercase form is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymSet {
    terms: Vec<String>,
    seen: HashSet<String>,
}

impl SynonymSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a term; returns false if an equal (ignoring case) term exists.
    pub fn insert(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if self.seen.insert(term.to_lowercase()) {
            self.terms.push(term);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.seen.contains(&term.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SynonymSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for term in iter {
            set.insert(term);
        }
        set
    }
}

/// Expands keywords through a shared [`LexicalDatabase`].
#[derive(Clone)]
pub struct LexicalExpander {
    database: Arc<dyn LexicalDatabase>,
}

impl LexicalExpander {
    pub fn new(database: Arc<dyn LexicalDatabase>) -> Self {
        Self { database }
    }

    /// The keyword exactly as given, followed by its synonyms across all
    /// senses. Never empty.
    pub fn expand(&self, keyword: &str) -> SynonymSet {
        let mut set = SynonymSet::new();
        set.insert(keyword);
        for synonym in self.database.synonyms(keyword) {
            set.insert(synonym);
        }
        debug!(
            keyword,
            lexicon = self.database.id(),
            terms = set.len(),
            "expanded keyword"
        );
        set
    }
}
