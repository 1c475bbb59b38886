//! Example-sentence corpus (WWWJDIC/Tatoeba layout, one record per line).
//!
//! # Layout
//!
//! ```text
//! 4851	1434	彼は食べた。	He ate.	彼(かれ)[01] 食べる(たべる){食べた}~
//! └─┬─┘	└─┬─┘	└───┬────┘	└─┬──┘	└──────────────┬────────────────┘
//!  id     id    source      target        annotation tokens
//! ```
//!
//! Annotation tokens have the shape `headword(|N)?(reading)?[sense]?{form}?~?`.
//! Only tokens carrying the trailing `~` marker point back at the sentence as a
//! good example for their headword; those are indexed.

use crate::corpus::file::{trim_line_end, CorpusFile};
use crate::telemetry::{lookup_span, record_returned, LookupOperation};
use crate::types::{Corpus, ExampleRecord, Location, Result, SentencePair};
use rand::seq::SliceRandom;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

const SOURCE_FIELD: usize = 2;
const TARGET_FIELD: usize = 3;

/// Fields up to and including the target sentence.
const MIN_FIELDS: usize = TARGET_FIELD + 1;

/// One parsed annotation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub headword: String,
    pub reading: Option<String>,
    pub sense: Option<u32>,
    pub form: Option<String>,
    /// Token carries the `~` good-example marker
    pub marked: bool,
}

/// Parse one annotation token.
///
/// # Returns
///
/// `None` if the token does not start with a headword
///
/// # Example
///
/// ```rust,ignore
/// let a = parse_annotation("食べる(たべる)[01]{食べた}~").unwrap();
/// assert_eq!(a.headword, "食べる");
/// assert_eq!(a.sense, Some(1));
/// ```
pub fn parse_annotation(token: &str) -> Option<Annotation> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^([^(\[{~|]+)(?:\|\d)?(?:\(([^)]*)\))?(?:\[(\d+)\])?(?:\{([^}]*)\})?(~)?")
            .expect("annotation pattern is valid")
    });

    let captures = pattern.captures(token)?;
    let text = |i: usize| captures.get(i).map(|m| m.as_str().to_string());

    Some(Annotation {
        headword: captures.get(1)?.as_str().to_string(),
        reading: text(2),
        sense: captures.get(3).and_then(|m| m.as_str().parse().ok()),
        form: text(4),
        marked: captures.get(5).is_some(),
    })
}

/// Indexed pointer from a headword to an example line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexedExample {
    location: Location,
    reading: Option<String>,
    sense: Option<u32>,
    form: Option<String>,
}

/// Counters collected while streaming the sentence bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentenceBuildStats {
    pub lines: usize,
    pub headwords: usize,
    pub annotations: usize,
    pub skipped_lines: usize,
}

/// Indexed example-sentence bank.
pub struct SentenceCorpus {
    file: CorpusFile,
    lines: Vec<Location>,
    index: HashMap<String, Vec<IndexedExample>>,
    stats: SentenceBuildStats,
}

impl SentenceCorpus {
    /// Open the sentence bank and index every line.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::CorpusUnavailable` if the file cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = CorpusFile::open(Corpus::Sentences, path)?;
        Ok(Self::build(file))
    }

    /// Index an opened corpus file.
    pub fn build(file: CorpusFile) -> Self {
        let _guard = lookup_span(LookupOperation::Build, Corpus::Sentences).entered();
        let started = Instant::now();

        let mut stats = SentenceBuildStats::default();
        let mut lines = Vec::new();
        let mut index: HashMap<String, Vec<IndexedExample>> = HashMap::new();

        for (offset, raw) in file.lines() {
            let Some(location) = u32::try_from(raw.len())
                .ok()
                .map(|length| Location::new(offset, length))
            else {
                stats.skipped_lines += 1;
                tracing::warn!(offset, "Skipping oversized line");
                continue;
            };

            let Ok(line) = std::str::from_utf8(trim_line_end(raw)) else {
                stats.skipped_lines += 1;
                tracing::warn!(offset, "Skipping non UTF-8 line");
                continue;
            };

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < MIN_FIELDS {
                stats.skipped_lines += 1;
                tracing::debug!(offset, fields = fields.len(), "Skipping line without a sentence pair");
                continue;
            }
            lines.push(location);

            if fields.len() == MIN_FIELDS {
                continue;
            }
            let annotations = fields[fields.len() - 1];

            for annotation in annotations.split_whitespace().filter_map(parse_annotation) {
                if !annotation.marked {
                    continue;
                }
                stats.annotations += 1;
                index.entry(annotation.headword).or_default().push(IndexedExample {
                    location,
                    reading: annotation.reading,
                    sense: annotation.sense,
                    form: annotation.form,
                });
            }
        }

        stats.lines = lines.len();
        stats.headwords = index.len();

        tracing::info!(
            corpus = %Corpus::Sentences,
            path = %file.path().display(),
            lines = stats.lines,
            headwords = stats.headwords,
            annotations = stats.annotations,
            skipped_lines = stats.skipped_lines,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sentence index built"
        );

        Self {
            file,
            lines,
            index,
            stats,
        }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the corpus has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Headwords with at least one marked example, in no particular order.
    pub fn headwords(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Counters from the build pass.
    pub fn stats(&self) -> SentenceBuildStats {
        self.stats
    }

    /// Examples for the first headword that has any.
    ///
    /// # Arguments
    ///
    /// * `headwords` - Candidate headwords, tried in order
    /// * `readings` - Accepted readings; an empty list accepts every reading
    ///
    /// # Returns
    ///
    /// Examples whose annotation has no reading or one of `readings`, with
    /// sense (0 when absent) and form (the headword when absent) filled in
    pub fn get<S: AsRef<str>>(&self, headwords: &[S], readings: &[S]) -> Vec<ExampleRecord> {
        let _guard = lookup_span(LookupOperation::Examples, Corpus::Sentences).entered();

        let Some((headword, entries)) = headwords.iter().find_map(|hw| {
            let hw = hw.as_ref();
            self.index
                .get(hw)
                .filter(|entries| !entries.is_empty())
                .map(|entries| (hw, entries))
        }) else {
            record_returned(0);
            return Vec::new();
        };

        let accepts = |entry: &IndexedExample| match &entry.reading {
            Some(reading) => readings.is_empty() || readings.iter().any(|r| r.as_ref() == reading),
            None => true,
        };

        let examples: Vec<ExampleRecord> = entries
            .iter()
            .filter(|entry| accepts(entry))
            .filter_map(|entry| {
                Some(ExampleRecord {
                    sentence: self.decode(entry.location)?,
                    reading: entry.reading.clone(),
                    sense: entry.sense.unwrap_or(0),
                    form: entry.form.clone().unwrap_or_else(|| headword.to_string()),
                })
            })
            .collect();

        record_returned(examples.len());
        tracing::debug!(headword, returned = examples.len(), "Example lookup");
        examples
    }

    /// Sentences whose source text contains `phrase`.
    ///
    /// # Arguments
    ///
    /// * `phrase` - Substring to look for in the source sentence
    /// * `max` - Maximum number of results
    /// * `start` - Number of matches to skip first
    /// * `shuffle` - Scan lines in random order instead of file order
    pub fn search_phrase(&self, phrase: &str, max: usize, start: usize, shuffle: bool) -> Vec<SentencePair> {
        let _guard = lookup_span(LookupOperation::Phrase, Corpus::Sentences).entered();

        let mut order = self.lines.clone();
        if shuffle {
            order.shuffle(&mut rand::thread_rng());
        }

        let found: Vec<SentencePair> = order
            .into_iter()
            .filter_map(|location| self.decode(location))
            .filter(|pair| pair.source.contains(phrase))
            .skip(start)
            .take(max)
            .collect();

        record_returned(found.len());
        found
    }

    /// Decode the sentence pair on one line.
    ///
    /// Lines without a sentence pair are dropped at build time, so this only
    /// fails, with a warning, for a location that is not in the index.
    pub fn decode(&self, location: Location) -> Option<SentencePair> {
        let Some(bytes) = self.file.read(location) else {
            tracing::warn!(corpus = %Corpus::Sentences, ?location, "Location out of bounds");
            return None;
        };

        let line = match std::str::from_utf8(trim_line_end(bytes)) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(corpus = %Corpus::Sentences, ?location, error = %e, "Failed to decode line");
                return None;
            }
        };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_FIELDS {
            tracing::warn!(corpus = %Corpus::Sentences, ?location, fields = fields.len(), "Line has too few fields");
            return None;
        }

        Some(SentencePair {
            source: fields[SOURCE_FIELD].to_string(),
            target: fields[TARGET_FIELD].to_string(),
        })
    }
}
