//! Typed records decoded from the corpora.
//!
//! Every record is built lazily at query time from one [`Location`] in one
//! corpus file. Optional fields are explicit `Option`s: a missing stroke count
//! is `None`, never zero.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frequency rank assigned to characters without a ranking.
///
/// Ranked lists sort ascending, so unranked entries land after every ranked one.
pub const UNRANKED: u32 = 2501;

/// The read-only corpora served by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corpus {
    /// Multi-key headword dictionary
    Dictionary,
    /// Single-key character database
    Characters,
    /// Delimited example-sentence bank
    Sentences,
    /// Composition-diagram directory (parts index)
    Parts,
    /// Similar-character list
    Similars,
}

impl Corpus {
    /// Every corpus, in startup build order.
    pub const ALL: [Corpus; 5] = [
        Corpus::Dictionary,
        Corpus::Characters,
        Corpus::Sentences,
        Corpus::Parts,
        Corpus::Similars,
    ];

    /// Get corpus name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dictionary => "dictionary",
            Self::Characters => "characters",
            Self::Sentences => "sentences",
            Self::Parts => "parts",
            Self::Similars => "similars",
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte range of one record inside one corpus file.
///
/// Only meaningful for the file it was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Byte offset of the first byte of the record
    pub offset: u64,
    /// Record length in bytes
    pub length: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(offset: u64, length: u32) -> Self {
        Self { offset, length }
    }

    /// Build a location spanning `[start, end)`.
    ///
    /// # Returns
    ///
    /// `None` if `end < start` or the span does not fit in a `u32` length
    pub fn spanning(start: u64, end: u64) -> Option<Self> {
        let length = end.checked_sub(start)?;
        u32::try_from(length).ok().map(|length| Self::new(start, length))
    }

    /// Offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.length)
    }
}

/// Abbreviation code resolved to its declared description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Short code as declared (e.g. `n`, `vt`)
    pub code: String,
    /// Full description from the corpus entity declarations
    pub description: String,
}

/// Written form of a dictionary headword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub info: Vec<Tag>,
    pub priority: Vec<String>,
}

/// Reading of a dictionary headword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub text: String,
    pub info: Vec<Tag>,
    pub priority: Vec<String>,
    /// Written forms this reading is restricted to
    pub restrictions: Vec<String>,
    /// Reading is not a true reading of the written forms
    pub nokanji: bool,
}

/// Source-language annotation of a loanword sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLanguage {
    /// ISO 639 code, `wasei` for Japanese-made pseudo-loans, `eng` by default
    pub language: String,
    /// Source word, if given
    pub text: Option<String>,
}

/// One sense (translation group) of a dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    pub glosses: Vec<String>,
    /// Written forms the sense is restricted to
    pub stagk: Vec<String>,
    /// Readings the sense is restricted to
    pub stagr: Vec<String>,
    pub pos: Vec<Tag>,
    pub xref: Vec<String>,
    pub antonyms: Vec<String>,
    pub field: Vec<Tag>,
    pub misc: Vec<Tag>,
    pub notes: Vec<String>,
    pub source_languages: Vec<SourceLanguage>,
    pub dialects: Vec<Tag>,
}

/// Decoded headword dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    pub words: Vec<Word>,
    pub readings: Vec<Reading>,
    pub senses: Vec<Sense>,
}

/// Decoded character database entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub literal: String,
    pub stroke_count: Option<u32>,
    /// Frequency rank (lower is more common)
    pub frequency: Option<u32>,
    pub on: Vec<String>,
    pub kun: Vec<String>,
    pub nanori: Vec<String>,
    /// English meanings only
    pub meanings: Vec<String>,
}

/// Source sentence with its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    pub source: String,
    pub target: String,
}

/// Example sentence matched through a headword annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRecord {
    #[serde(flatten)]
    pub sentence: SentencePair,
    /// Reading recorded in the annotation, if any
    pub reading: Option<String>,
    /// Sense number, 0 when not annotated
    pub sense: u32,
    /// Surface form in the sentence, the matched headword when not annotated
    pub form: String,
}

/// Character paired with its frequency rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranked {
    pub literal: String,
    pub rank: u32,
}

/// Result of a headword lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeadwordLookup {
    /// Exact/prefix lookup
    Prefix {
        /// Records of the query itself
        exact: Option<Vec<DictionaryRecord>>,
        /// Records of the longest indexed proper prefix, when the query is absent
        shorter: Option<Vec<DictionaryRecord>>,
        /// Indexed headwords extending the query
        longer: Vec<String>,
    },
    /// Anchored regex lookup
    Regex { matches: Vec<String> },
}
