//! Similar-character index.
//!
//! Source format is one character per line followed by its look-alikes, all
//! separated by `/`:
//!
//! ```text
//! 士/土/工/干
//! ```

use crate::index::rank::{rank_sorted, RankSource};
use crate::types::{Corpus, LexiconError, Ranked, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Character → similar characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarsIndex {
    similars: HashMap<String, Vec<String>>,
}

impl SimilarsIndex {
    /// Load the similarity list from disk.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::CorpusUnavailable` if the file cannot be read
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let started = Instant::now();

        let text = std::fs::read_to_string(path).map_err(|source| LexiconError::CorpusUnavailable {
            corpus: Corpus::Similars,
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::parse(&text);

        tracing::info!(
            corpus = %Corpus::Similars,
            characters = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Similarity index built"
        );
        Ok(index)
    }

    /// Parse the similarity list.
    ///
    /// Blank segments are dropped; lines without any segment are skipped. A
    /// repeated head character keeps its last line.
    pub fn parse(text: &str) -> Self {
        let mut similars = HashMap::new();

        for line in text.lines() {
            let mut segments = line.split('/').map(str::trim).filter(|s| !s.is_empty());
            if let Some(head) = segments.next() {
                similars.insert(head.to_string(), segments.map(str::to_string).collect());
            }
        }

        Self { similars }
    }

    /// Number of indexed characters.
    pub fn len(&self) -> usize {
        self.similars.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.similars.is_empty()
    }

    /// Similar characters as listed, unranked.
    pub fn neighbors(&self, literal: &str) -> &[String] {
        self.similars.get(literal).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Similar characters sorted by frequency rank.
    ///
    /// # Returns
    ///
    /// `(character, rank)` pairs ascending by rank, unranked last, ties in list
    /// order; empty for an unknown character
    pub fn get(&self, literal: &str, ranks: &dyn RankSource) -> Vec<Ranked> {
        rank_sorted(self.neighbors(literal).iter().map(String::as_str), ranks)
    }
}
