//! Headword dictionary corpus (JMdict layout, multi-key entries).
//!
//! # Layout
//!
//! ```text
//! <!ENTITY n "noun (common) (futsuumeishi)">     preamble: entity declarations
//! ...
//! <JMdict>                                       data section starts
//! <entry>                                        ┐
//! <ent_seq>1234</ent_seq>                        │
//! <k_ele>                                        │
//! <keb>犬</keb>                                  │ one Location, indexed
//! </k_ele>                                       │ under every keb/reb
//! <r_ele>                                        │
//! <reb>いぬ</reb>                                │
//! </r_ele>                                       │
//! <sense><pos>&n;</pos><gloss>dog</gloss></sense>│
//! </entry>                                       ┘
//! ```
//!
//! The build is one streaming pass over lines. Decoding happens per lookup: the
//! entry bytes are read from the mapped file, entity references are reduced to
//! their bare codes, the entry is parsed, and every code is resolved back into a
//! `{code, description}` tag.

use crate::corpus::file::{trim_line_end, CorpusFile};
use crate::corpus::xml::{Element, EntityTable};
use crate::index::ordered::OrderedKeyIndex;
use crate::telemetry::{lookup_span, LookupOperation};
use crate::types::{
    Corpus, DictionaryRecord, HeadwordLookup, Location, Reading, Result, Sense, SourceLanguage,
    Tag, Word,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

const DATA_START: &[u8] = b"<JMdict>";
const ENTRY_START: &[u8] = b"<entry>";
const ENTRY_END: &[u8] = b"</entry>";

/// Counters collected while streaming the dictionary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DictionaryBuildStats {
    pub entries: usize,
    pub keys: usize,
    pub entities: usize,
    pub skipped_declarations: usize,
    pub skipped_entries: usize,
}

/// Indexed headword dictionary.
pub struct DictionaryCorpus {
    file: CorpusFile,
    entities: EntityTable,
    index: OrderedKeyIndex,
    stats: DictionaryBuildStats,
}

impl DictionaryCorpus {
    /// Open the dictionary and build its key index.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::CorpusUnavailable` if the file cannot be opened.
    /// Malformed declarations and entries are skipped with a warning.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let dictionary = DictionaryCorpus::open("data/JMdict_e")?;
    /// let result = dictionary.lookup("犬", false)?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = CorpusFile::open(Corpus::Dictionary, path)?;
        Self::build(file)
    }

    /// Build the key index over an opened corpus file.
    pub fn build(file: CorpusFile) -> Result<Self> {
        let _guard = lookup_span(LookupOperation::Build, Corpus::Dictionary).entered();
        let started = Instant::now();

        let mut stats = DictionaryBuildStats::default();
        let mut declarations = HashMap::new();
        let mut keys: HashMap<String, Vec<Location>> = HashMap::new();

        let mut in_data = false;
        let mut entry_start: Option<u64> = None;
        let mut entry_keys: Vec<String> = Vec::new();

        for (offset, raw) in file.lines() {
            let line = trim_line_end(raw);

            if !in_data {
                if line.starts_with(b"<!ENTITY") {
                    match std::str::from_utf8(line).ok().and_then(EntityTable::parse_declaration) {
                        Some((code, expansion)) => {
                            declarations.insert(code, expansion);
                        }
                        None => {
                            stats.skipped_declarations += 1;
                            tracing::warn!(offset, "Skipping malformed entity declaration");
                        }
                    }
                } else if line == DATA_START {
                    in_data = true;
                }
                continue;
            }

            let Some(start) = entry_start else {
                if line == ENTRY_START {
                    entry_start = Some(offset);
                }
                continue;
            };

            if let Some(key) = headword_key(line) {
                match std::str::from_utf8(key) {
                    Ok(key) => entry_keys.push(key.to_string()),
                    Err(_) => tracing::warn!(offset, "Skipping non UTF-8 headword"),
                }
                continue;
            }

            if line == ENTRY_END {
                let end = offset + raw.len() as u64;
                match Location::spanning(start, end) {
                    Some(location) => {
                        stats.entries += 1;
                        for key in entry_keys.drain(..) {
                            keys.entry(key).or_default().push(location);
                        }
                    }
                    None => {
                        stats.skipped_entries += 1;
                        entry_keys.clear();
                        tracing::warn!(offset = start, "Skipping oversized entry");
                    }
                }
                entry_start = None;
            }
        }

        if let Some(start) = entry_start {
            stats.skipped_entries += 1;
            tracing::warn!(offset = start, "Discarding unterminated entry at end of file");
        }

        let entities = EntityTable::new(declarations)?;
        let index = OrderedKeyIndex::from_map(keys);
        stats.keys = index.len();
        stats.entities = entities.len();

        tracing::info!(
            corpus = %Corpus::Dictionary,
            path = %file.path().display(),
            keys = stats.keys,
            entries = stats.entries,
            entities = stats.entities,
            skipped_declarations = stats.skipped_declarations,
            skipped_entries = stats.skipped_entries,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dictionary index built"
        );

        Ok(Self {
            file,
            entities,
            index,
            stats,
        })
    }

    /// Key index over every headword and reading.
    pub fn index(&self) -> &OrderedKeyIndex {
        &self.index
    }

    /// Entity declarations captured from the preamble.
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// Counters from the build pass.
    pub fn stats(&self) -> DictionaryBuildStats {
        self.stats
    }

    /// Look up a headword.
    ///
    /// # Arguments
    ///
    /// * `query` - Headword or reading
    /// * `regex` - Treat `query` as a pattern anchored at the key start
    ///
    /// # Returns
    ///
    /// Decoded exact/shorter records plus longer keys, or regex matches
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::InvalidInput` for an invalid regex
    pub fn lookup(&self, query: &str, regex: bool) -> Result<HeadwordLookup> {
        if regex {
            let _guard = lookup_span(LookupOperation::Regex, Corpus::Dictionary).entered();
            let matches = self.index.regex_search(query)?;
            return Ok(HeadwordLookup::Regex { matches });
        }

        let _guard = lookup_span(LookupOperation::Prefix, Corpus::Dictionary).entered();
        let found = self.index.get(query);
        tracing::debug!(
            query,
            exact = found.exact.is_some(),
            shorter = found.shorter.is_some(),
            longer = found.longer.len(),
            "Headword lookup"
        );

        Ok(HeadwordLookup::Prefix {
            exact: found.exact.map(|locations| self.decode_all(&locations)),
            shorter: found.shorter.map(|locations| self.decode_all(&locations)),
            longer: found.longer,
        })
    }

    fn decode_all(&self, locations: &[Location]) -> Vec<DictionaryRecord> {
        locations.iter().map(|&location| self.decode(location)).collect()
    }

    /// Decode the entry at a location.
    ///
    /// Never fails: unreadable or unparsable bytes yield an empty record, and a
    /// sub-element that cannot be decoded is left out. Both are logged.
    pub fn decode(&self, location: Location) -> DictionaryRecord {
        let Some(bytes) = self.file.read(location) else {
            tracing::warn!(corpus = %Corpus::Dictionary, ?location, "Location out of bounds");
            return DictionaryRecord::default();
        };

        let substituted = self.entities.substitute(bytes);
        match Element::parse(&substituted) {
            Ok(entry) => decode_entry(&entry, &self.entities),
            Err(e) => {
                tracing::warn!(corpus = %Corpus::Dictionary, ?location, error = %e, "Failed to decode entry");
                DictionaryRecord::default()
            }
        }
    }
}

/// Key of a `<keb>` / `<reb>` line.
fn headword_key(line: &[u8]) -> Option<&[u8]> {
    let indent = line.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let line = &line[indent..];
    ["keb", "reb"].iter().find_map(|tag| {
        let open = format!("<{}>", tag);
        let close = format!("</{}>", tag);
        line.strip_prefix(open.as_bytes())?
            .strip_suffix(close.as_bytes())
    })
}

/// Populate a record from a parsed `<entry>` element.
pub fn decode_entry(entry: &Element, entities: &EntityTable) -> DictionaryRecord {
    let tags = |parent: &Element, name: &str| resolve_tags(parent, name, entities);

    let words = entry
        .descendants("k_ele")
        .into_iter()
        .filter_map(|k_ele| {
            let text = k_ele.child("keb").and_then(Element::text)?;
            Some(Word {
                text: text.to_string(),
                info: tags(k_ele, "ke_inf"),
                priority: k_ele.texts("ke_pri"),
            })
        })
        .collect();

    let readings = entry
        .descendants("r_ele")
        .into_iter()
        .filter_map(|r_ele| {
            let text = r_ele.child("reb").and_then(Element::text)?;
            Some(Reading {
                text: text.to_string(),
                info: tags(r_ele, "re_inf"),
                priority: r_ele.texts("re_pri"),
                restrictions: r_ele.texts("re_restr"),
                nokanji: r_ele.child("re_nokanji").is_some(),
            })
        })
        .collect();

    let senses = entry
        .descendants("sense")
        .into_iter()
        .map(|sense| Sense {
            glosses: sense.texts("gloss"),
            stagk: sense.texts("stagk"),
            stagr: sense.texts("stagr"),
            pos: tags(sense, "pos"),
            xref: sense.texts("xref"),
            antonyms: sense.texts("ant"),
            field: tags(sense, "field"),
            misc: tags(sense, "misc"),
            notes: sense.texts("s_inf"),
            source_languages: source_languages(sense),
            dialects: tags(sense, "dial"),
        })
        .collect();

    DictionaryRecord {
        words,
        readings,
        senses,
    }
}

fn resolve_tags(parent: &Element, name: &str, entities: &EntityTable) -> Vec<Tag> {
    parent
        .descendants(name)
        .into_iter()
        .filter_map(|element| {
            let code = element.text()?;
            let tag = entities.tag(code);
            if tag.is_none() {
                tracing::warn!(element = name, code, "Dropping undeclared entity code");
            }
            tag
        })
        .collect()
}

fn source_languages(sense: &Element) -> Vec<SourceLanguage> {
    sense
        .descendants("lsource")
        .into_iter()
        .map(|lsource| {
            let language = match lsource.attr("xml:lang") {
                Some(lang) => lang,
                None if lsource.attr("ls_wasei").is_some() => "wasei",
                None => "eng",
            };
            SourceLanguage {
                language: language.to_string(),
                text: lsource.text().map(str::to_string),
            }
        })
        .collect()
}
