//! WordNet 3.x database reader.
//!
//! [`WordNet::open`] is the one-time initialization step: it parses the
//! `index.*` files and `*.exc` exception lists into memory and memory-maps
//! the `data.*` files. Lookups afterwards are read-only, so one instance can
//! be shared across threads behind an `Arc`.
//!
//! Lookup follows WordNet's base-form rules ("morphy"): exception list first,
//! otherwise suffix detachment, keeping only forms the index knows about.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, info, warn};

use super::{LexicalDatabase, LexiconError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    fn file_suffix(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
        }
    }

    /// Suffix detachment rules as `(suffix, replacement)`.
    fn substitutions(self) -> &'static [(&'static str, &'static str)] {
        match self {
            PartOfSpeech::Noun => &[
                ("s", ""),
                ("ses", "s"),
                ("ves", "f"),
                ("xes", "x"),
                ("zes", "z"),
                ("ches", "ch"),
                ("shes", "sh"),
                ("men", "man"),
                ("ies", "y"),
            ],
            PartOfSpeech::Verb => &[
                ("s", ""),
                ("ies", "y"),
                ("es", "e"),
                ("es", ""),
                ("ed", "e"),
                ("ed", ""),
                ("ing", "e"),
                ("ing", ""),
            ],
            PartOfSpeech::Adjective => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
            PartOfSpeech::Adverb => &[],
        }
    }
}

struct PosTables {
    pos: PartOfSpeech,
    /// lemma → synset byte offsets into `data`.
    index: HashMap<String, Vec<usize>>,
    /// inflected form → base forms.
    exceptions: HashMap<String, Vec<String>>,
    data: Mmap,
    data_path: PathBuf,
}

pub struct WordNet {
    tables: Vec<PosTables>,
    id: String,
}

impl WordNet {
    /// Open a WordNet `dict/` directory.
    pub fn open(dict_dir: &Path) -> Result<Self, LexiconError> {
        let mut tables = Vec::with_capacity(PartOfSpeech::ALL.len());
        for pos in PartOfSpeech::ALL {
            tables.push(load_pos(dict_dir, pos)?);
        }

        let lemmas: usize = tables.iter().map(|t| t.index.len()).sum();
        info!(dict_dir = %dict_dir.display(), lemmas, "wordnet loaded");

        Ok(Self {
            tables,
            id: format!("wordnet:{}", dict_dir.display()),
        })
    }

    /// Base forms of `word` for one part of speech, known to the index.
    fn morphy(&self, table: &PosTables, word: &str) -> Vec<String> {
        let candidates: Vec<String> = match table.exceptions.get(word) {
            Some(bases) => std::iter::once(word.to_string())
                .chain(bases.iter().cloned())
                .collect(),
            None => std::iter::once(word.to_string())
                .chain(
                    table
                        .pos
                        .substitutions()
                        .iter()
                        .filter_map(|(suffix, replacement)| {
                            word.strip_suffix(suffix)
                                .map(|stem| format!("{stem}{replacement}"))
                        }),
                )
                .collect(),
        };

        let mut forms: Vec<String> = Vec::new();
        for form in candidates {
            if table.index.contains_key(&form) && !forms.contains(&form) {
                forms.push(form);
            }
        }
        forms
    }

    /// Lemmas of the synset stored at `offset` in a data file.
    fn synset_lemmas(&self, table: &PosTables, offset: usize) -> Option<Vec<String>> {
        let bytes = table.data.get(offset..)?;
        let end = bytes
            .iter()
            .position(|b| *b == b'\n')
            .unwrap_or(bytes.len());
        let line = String::from_utf8_lossy(&bytes[..end]);
        let lemmas = parse_synset_lemmas(&line);
        if lemmas.is_none() {
            warn!(
                path = %table.data_path.display(),
                offset,
                "skipping malformed synset"
            );
        }
        lemmas
    }
}

impl LexicalDatabase for WordNet {
    fn synonyms(&self, word: &str) -> Vec<String> {
        let key = word.trim().to_lowercase().replace(' ', "_");
        if key.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for table in &self.tables {
            for form in self.morphy(table, &key) {
                let offsets = table.index.get(&form).map(Vec::as_slice).unwrap_or(&[]);
                for &offset in offsets {
                    if let Some(lemmas) = self.synset_lemmas(table, offset) {
                        out.extend(lemmas);
                    }
                }
            }
        }
        debug!(word, synonyms = out.len(), "wordnet lookup");
        out
    }

    fn id(&self) -> &str {
        &self.id
    }
}

fn load_pos(dict_dir: &Path, pos: PartOfSpeech) -> Result<PosTables, LexiconError> {
    let suffix = pos.file_suffix();

    let index_path = dict_dir.join(format!("index.{suffix}"));
    let index = parse_index(&index_path)?;

    let exc_path = dict_dir.join(format!("{suffix}.exc"));
    let exceptions = if exc_path.is_file() {
        parse_exceptions(&exc_path)?
    } else {
        debug!(path = %exc_path.display(), "no exception list");
        HashMap::new()
    };

    let data_path = dict_dir.join(format!("data.{suffix}"));
    let file = File::open(&data_path).map_err(|source| LexiconError::Io {
        path: data_path.clone(),
        source,
    })?;
    // SAFETY: the data files are opened read-only and never modified while mapped.
    let data = unsafe { Mmap::map(&file) }.map_err(|source| LexiconError::Io {
        path: data_path.clone(),
        source,
    })?;

    Ok(PosTables {
        pos,
        index,
        exceptions,
        data,
        data_path,
    })
}

fn read_lines(path: &Path) -> Result<String, LexiconError> {
    fs::read_to_string(path).map_err(|source| LexiconError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `lemma pos synset_cnt p_cnt [ptr...] sense_cnt tagsense_cnt offset...`.
fn parse_index(path: &Path) -> Result<HashMap<String, Vec<usize>>, LexiconError> {
    let contents = read_lines(path)?;
    let mut index = HashMap::new();

    for (line_no, line) in contents.lines().enumerate() {
        // License header lines start with whitespace.
        if line.is_empty() || line.starts_with(' ') {
            continue;
        }
        let malformed = |reason: &str| LexiconError::Malformed {
            path: path.to_path_buf(),
            line: line_no + 1,
            reason: reason.to_string(),
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(malformed("too few fields"));
        }
        let synset_cnt: usize = fields[2]
            .parse()
            .map_err(|_| malformed("bad synset count"))?;
        if fields.len() < 4 + synset_cnt {
            return Err(malformed("missing synset offsets"));
        }
        let offsets = fields[fields.len() - synset_cnt..]
            .iter()
            .map(|f| f.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed("bad synset offset"))?;

        index.insert(fields[0].to_string(), offsets);
    }
    Ok(index)
}

/// Parse `inflected base [base...]` lines.
fn parse_exceptions(path: &Path) -> Result<HashMap<String, Vec<String>>, LexiconError> {
    let contents = read_lines(path)?;
    let mut exceptions = HashMap::new();
    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let Some(inflected) = fields.next() else {
            continue;
        };
        let bases: Vec<String> = fields.map(str::to_string).collect();
        if !bases.is_empty() {
            exceptions.insert(inflected.to_string(), bases);
        }
    }
    Ok(exceptions)
}

/// Extract lemmas from `offset lex_filenum ss_type w_cnt word lex_id [word lex_id]... ...`.
///
/// Lemmas keep WordNet's underscore form (`tennis_shoe`); adjective markers
/// such as `(ip)` are dropped.
fn parse_synset_lemmas(line: &str) -> Option<Vec<String>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let w_cnt = usize::from_str_radix(fields.get(3)?, 16).ok()?;
    let mut lemmas = Vec::with_capacity(w_cnt);
    for i in 0..w_cnt {
        let raw = fields.get(4 + i * 2)?;
        let word = match raw.find('(') {
            Some(idx) if raw.ends_with(')') => &raw[..idx],
            _ => raw,
        };
        lemmas.push(word.to_string());
    }
    Some(lemmas)
}
