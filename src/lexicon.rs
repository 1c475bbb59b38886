//! High-level lookup API over every corpus.
//!
//! This is the main entry point for queries. A `Lexicon` is built once at
//! startup and is immutable afterwards, so it can be shared across threads
//! behind an `Arc` without locking.

use crate::cache::PartsCache;
use crate::config::LexiconConfig;
use crate::corpus::{CharacterCorpus, DictionaryCorpus, SentenceCorpus};
use crate::index::{NoRanks, PartsIndex, RankSource, SimilarsIndex};
use crate::telemetry::{lookup_span, record_returned, LookupOperation};
use crate::types::{
    CharacterRecord, Corpus, ExampleRecord, HeadwordLookup, LexiconError, Ranked, Result,
    SentencePair,
};
use std::collections::BTreeSet;
use std::time::Instant;

/// Every loaded corpus and index.
///
/// Corpora that were not requested at open time answer with
/// `LexiconError::NotLoaded`.
#[derive(Default)]
pub struct Lexicon {
    dictionary: Option<DictionaryCorpus>,
    characters: Option<CharacterCorpus>,
    sentences: Option<SentenceCorpus>,
    parts: Option<PartsIndex>,
    similars: Option<SimilarsIndex>,
}

impl Lexicon {
    /// Open every corpus.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::ConfigError` for an invalid config and
    /// `LexiconError::CorpusUnavailable` for the first corpus that cannot be
    /// opened
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let lexicon = Arc::new(Lexicon::open(&LexiconConfig::with_data_dir("/srv/jisho"))?);
    /// let similar = lexicon.get_similars("士")?;
    /// ```
    pub fn open(config: &LexiconConfig) -> Result<Self> {
        Self::open_only(config, &Corpus::ALL)
    }

    /// Open only the given corpora.
    ///
    /// # Arguments
    ///
    /// * `config` - Corpus locations
    /// * `corpora` - Corpora to load; the rest stay unloaded
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open)
    pub fn open_only(config: &LexiconConfig, corpora: &[Corpus]) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();
        let wants = |corpus: Corpus| corpora.contains(&corpus);

        let mut lexicon = Self::default();

        if wants(Corpus::Dictionary) {
            lexicon.dictionary = Some(DictionaryCorpus::open(&config.dictionary)?);
        }
        if wants(Corpus::Characters) {
            lexicon.characters = Some(CharacterCorpus::open(&config.characters)?);
        }
        if wants(Corpus::Sentences) {
            lexicon.sentences = Some(SentenceCorpus::open(&config.sentences)?);
        }
        if wants(Corpus::Parts) {
            let cache = PartsCache::new(&config.parts_cache);
            lexicon.parts = Some(PartsIndex::open(&config.diagrams, &cache)?);
        }
        if wants(Corpus::Similars) {
            lexicon.similars = Some(SimilarsIndex::open(&config.similars)?);
        }

        tracing::info!(
            loaded = ?lexicon.loaded(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Lexicon ready"
        );
        Ok(lexicon)
    }

    /// Corpora available for queries.
    pub fn loaded(&self) -> Vec<Corpus> {
        Corpus::ALL
            .into_iter()
            .filter(|&corpus| self.is_loaded(corpus))
            .collect()
    }

    /// Check whether a corpus was loaded.
    pub fn is_loaded(&self, corpus: Corpus) -> bool {
        match corpus {
            Corpus::Dictionary => self.dictionary.is_some(),
            Corpus::Characters => self.characters.is_some(),
            Corpus::Sentences => self.sentences.is_some(),
            Corpus::Parts => self.parts.is_some(),
            Corpus::Similars => self.similars.is_some(),
        }
    }

    /// Look up a headword in the dictionary.
    ///
    /// # Arguments
    ///
    /// * `query` - Headword or reading
    /// * `regex` - Treat `query` as a pattern anchored at the key start
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::InvalidInput` for an invalid pattern
    pub fn lookup_headword(&self, query: &str, regex: bool) -> Result<HeadwordLookup> {
        loaded(&self.dictionary, Corpus::Dictionary)?.lookup(query, regex)
    }

    /// Look up one character.
    pub fn lookup_character(&self, literal: &str) -> Result<Option<CharacterRecord>> {
        Ok(loaded(&self.characters, Corpus::Characters)?.get(literal))
    }

    /// Example sentences for the first headword that has any.
    pub fn lookup_examples<S: AsRef<str>>(&self, headwords: &[S], readings: &[S]) -> Result<Vec<ExampleRecord>> {
        Ok(loaded(&self.sentences, Corpus::Sentences)?.get(headwords, readings))
    }

    /// Sentences containing a phrase.
    pub fn search_phrase(&self, phrase: &str, max: usize, start: usize, shuffle: bool) -> Result<Vec<SentencePair>> {
        Ok(loaded(&self.sentences, Corpus::Sentences)?.search_phrase(phrase, max, start, shuffle))
    }

    /// Composition parts of a character.
    pub fn get_parts(&self, literal: &str) -> Result<Vec<String>> {
        Ok(loaded(&self.parts, Corpus::Parts)?.get_parts(literal))
    }

    /// Characters built from all of the given parts, most frequent first.
    pub fn get_combinations(&self, parts: &BTreeSet<String>) -> Result<Vec<Ranked>> {
        let index = loaded(&self.parts, Corpus::Parts)?;
        let _guard = lookup_span(LookupOperation::Subset, Corpus::Parts).entered();

        let found = index.get_combinations(parts, self.ranks());
        record_returned(found.len());
        Ok(found)
    }

    /// Look-alike characters, most frequent first.
    pub fn get_similars(&self, literal: &str) -> Result<Vec<Ranked>> {
        let index = loaded(&self.similars, Corpus::Similars)?;
        let _guard = lookup_span(LookupOperation::Neighbors, Corpus::Similars).entered();

        let found = index.get(literal, self.ranks());
        record_returned(found.len());
        Ok(found)
    }

    /// Frequency ranks from the character database, if loaded.
    fn ranks(&self) -> &dyn RankSource {
        match &self.characters {
            Some(characters) => characters as &dyn RankSource,
            None => &NoRanks,
        }
    }
}

fn loaded<T>(slot: &Option<T>, corpus: Corpus) -> Result<&T> {
    slot.as_ref().ok_or(LexiconError::NotLoaded(corpus))
}
