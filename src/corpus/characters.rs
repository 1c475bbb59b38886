//! Character database corpus (KANJIDIC2 layout, one record per literal).
//!
//! # Layout
//!
//! ```text
//! <character>                            ┐
//! <literal>語</literal>                  │ one Location per literal
//! <misc>                                 │
//! <stroke_count>14</stroke_count>        │
//! <freq>301</freq>                       │ also captured at build time
//! </misc>                                │ for ranking (records with a
//! <reading_meaning>                      │ reading/meaning section only)
//! <rmgroup>                              │
//! <reading r_type="ja_on">ゴ</reading>   │
//! <meaning>word</meaning>                │
//! </rmgroup>                             │
//! </reading_meaning>                     │
//! </character>                           ┘
//! ```

use crate::corpus::file::{trim_line_end, CorpusFile};
use crate::corpus::xml::Element;
use crate::index::rank::RankSource;
use crate::telemetry::{lookup_span, LookupOperation};
use crate::types::{CharacterRecord, Corpus, Location, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

const RECORD_START: &[u8] = b"<character>";
const RECORD_END: &[u8] = b"</character>";

/// Counters collected while streaming the character database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterBuildStats {
    pub characters: usize,
    pub ranked: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Indexed character database.
pub struct CharacterCorpus {
    file: CorpusFile,
    index: HashMap<String, Location>,
    frequencies: HashMap<String, u32>,
    stats: CharacterBuildStats,
}

/// Record being scanned during the build.
#[derive(Default)]
struct OpenRecord {
    start: u64,
    literal: Option<String>,
    frequency: Option<u32>,
}

impl CharacterCorpus {
    /// Open the character database and index every literal.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::CorpusUnavailable` if the file cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = CorpusFile::open(Corpus::Characters, path)?;
        Ok(Self::build(file))
    }

    /// Index an opened corpus file.
    ///
    /// Records without a literal are skipped. A literal seen twice keeps its
    /// last record.
    pub fn build(file: CorpusFile) -> Self {
        let _guard = lookup_span(LookupOperation::Build, Corpus::Characters).entered();
        let started = Instant::now();

        let mut stats = CharacterBuildStats::default();
        let mut index = HashMap::new();
        let mut frequencies = HashMap::new();
        let mut open: Option<OpenRecord> = None;

        for (offset, raw) in file.lines() {
            let line = trim_line_end(raw);
            let indent = line.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let line = &line[indent..];

            if open.is_none() {
                if line == RECORD_START {
                    open = Some(OpenRecord {
                        start: offset,
                        ..OpenRecord::default()
                    });
                }
                continue;
            }
            let Some(record) = open.as_mut() else { continue };

            if line == RECORD_END {
                let end = offset + raw.len() as u64;
                let location = Location::spanning(record.start, end);

                match (record.literal.take(), location) {
                    (Some(literal), Some(location)) => {
                        match record.frequency.filter(|_| is_complete(&file, location)) {
                            Some(frequency) => frequencies.insert(literal.clone(), frequency),
                            None => frequencies.remove(&literal),
                        };
                        if index.insert(literal.clone(), location).is_some() {
                            stats.duplicates += 1;
                            tracing::warn!(literal, offset = record.start, "Duplicate literal, keeping last record");
                        }
                    }
                    _ => {
                        stats.skipped += 1;
                        tracing::warn!(offset = record.start, "Skipping character record without literal");
                    }
                }
                open = None;
                continue;
            }

            if record.literal.is_none() {
                if let Some(literal) = element_text(line, "literal") {
                    record.literal = Some(literal.to_string());
                }
            } else if record.frequency.is_none() {
                record.frequency = element_text(line, "freq").and_then(|f| f.parse().ok());
            }
        }

        if let Some(record) = open {
            stats.skipped += 1;
            tracing::warn!(offset = record.start, "Discarding unterminated character record at end of file");
        }

        stats.characters = index.len();
        stats.ranked = frequencies.len();

        tracing::info!(
            corpus = %Corpus::Characters,
            path = %file.path().display(),
            characters = stats.characters,
            ranked = stats.ranked,
            duplicates = stats.duplicates,
            skipped = stats.skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Character index built"
        );

        Self {
            file,
            index,
            frequencies,
            stats,
        }
    }

    /// Number of indexed characters.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Indexed literals, in no particular order.
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Counters from the build pass.
    pub fn stats(&self) -> CharacterBuildStats {
        self.stats
    }

    /// Frequency rank of a character, `None` if unranked or unknown.
    pub fn frequency(&self, literal: &str) -> Option<u32> {
        self.frequencies.get(literal).copied()
    }

    /// Look up and decode one character.
    ///
    /// # Returns
    ///
    /// `None` if the literal is unknown, its record cannot be decoded, or the
    /// record has no reading/meaning section
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let characters = CharacterCorpus::open("data/kanjidic2.xml")?;
    /// let record = characters.get("語");
    /// assert_eq!(record.and_then(|r| r.stroke_count), Some(14));
    /// ```
    pub fn get(&self, literal: &str) -> Option<CharacterRecord> {
        let _guard = lookup_span(LookupOperation::Get, Corpus::Characters).entered();
        let location = *self.index.get(literal)?;

        let Some(bytes) = self.file.read(location) else {
            tracing::warn!(corpus = %Corpus::Characters, ?location, "Location out of bounds");
            return None;
        };

        match Element::parse(bytes) {
            Ok(character) => decode_character(&character, literal),
            Err(e) => {
                tracing::warn!(corpus = %Corpus::Characters, ?location, error = %e, "Failed to decode character");
                None
            }
        }
    }
}

impl RankSource for CharacterCorpus {
    fn rank(&self, literal: &str) -> Option<u32> {
        self.frequency(literal)
    }
}

/// Text of a single-line `<name>text</name>` element.
fn element_text<'a>(line: &'a [u8], name: &str) -> Option<&'a str> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let inner = line
        .strip_prefix(open.as_bytes())?
        .strip_suffix(close.as_bytes())?;
    std::str::from_utf8(inner).ok()
}

/// Check whether a ranked record also decodes, so a character that
/// [`CharacterCorpus::get`] reports as missing is never ranked.
fn is_complete(file: &CorpusFile, location: Location) -> bool {
    file.read(location)
        .and_then(|bytes| Element::parse(bytes).ok())
        .is_some_and(|character| reading_meaning(&character).is_some())
}

/// Non-empty `<reading_meaning>` section of a record.
fn reading_meaning(character: &Element) -> Option<&Element> {
    character
        .child("reading_meaning")
        .filter(|rm| !rm.children.is_empty())
}

/// Populate a record from a parsed `<character>` element.
///
/// Returns `None` when the record has no reading/meaning section.
pub fn decode_character(character: &Element, literal: &str) -> Option<CharacterRecord> {
    let misc = character.child("misc");
    let number = |name: &str| -> Option<u32> {
        let text = misc?.child(name)?.text()?;
        match text.parse() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::warn!(literal, element = name, text, "Ignoring non-numeric value");
                None
            }
        }
    };

    let reading_meaning = reading_meaning(character)?;

    let mut record = CharacterRecord {
        literal: literal.to_string(),
        stroke_count: number("stroke_count"),
        frequency: number("freq"),
        nanori: reading_meaning.texts("nanori"),
        ..CharacterRecord::default()
    };

    if let Some(rmgroup) = reading_meaning.child("rmgroup") {
        record.meanings = rmgroup
            .descendants("meaning")
            .into_iter()
            .filter(|m| matches!(m.attr("m_lang"), None | Some("en")))
            .filter_map(|m| m.text().map(str::to_string))
            .collect();

        for reading in rmgroup.descendants("reading") {
            let Some(text) = reading.text() else { continue };
            match reading.attr("r_type") {
                Some("ja_on") => record.on.push(text.to_string()),
                Some("ja_kun") => record.kun.push(text.to_string()),
                _ => {}
            }
        }
    }

    Some(record)
}
