//! Composition-parts index (set membership with subset queries).
//!
//! Built from a directory of KanjiVG-style stroke diagrams, one SVG per
//! character. Each diagram nests component groups; a group that names a
//! component (`kvg:element`) is taken as one atomic part and not decomposed
//! further:
//!
//! ```text
//! <svg>
//!   <g>                              stroke paths
//!     <g kvg:element="語">           character group
//!       <g kvg:element="言"/>        part
//!       <g>                          unnamed: descend
//!         <g kvg:element="五"/>      part
//!         <g kvg:element="口"/>      part
//! ```
//!
//! Parsing the whole directory is slow, so [`PartsIndex::open`] goes through a
//! [`PartsCache`] and only parses when the cache is missing or stale.

use crate::cache::{fingerprint, PartsCache};
use crate::corpus::xml::Element;
use crate::index::rank::{rank_sorted, RankSource};
use crate::types::{Corpus, LexiconError, Ranked, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Deepest group nesting followed inside one diagram.
pub const MAX_GROUP_DEPTH: usize = 32;

/// Attribute naming the component a group draws.
const ELEMENT_ATTR: &str = "kvg:element";

/// One character and its named parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartsEntry {
    pub literal: String,
    pub parts: BTreeSet<String>,
}

/// Character → set of composition parts, in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartsIndex {
    entries: Vec<PartsEntry>,
    by_literal: HashMap<String, usize>,
}

impl PartsIndex {
    /// Build from entries in build order.
    ///
    /// A repeated literal replaces the parts of the earlier entry but keeps its
    /// position.
    pub fn from_entries(entries: impl IntoIterator<Item = PartsEntry>) -> Self {
        let mut index = Self::default();

        for entry in entries {
            match index.by_literal.get(&entry.literal) {
                Some(&i) => index.entries[i].parts = entry.parts,
                None => {
                    index
                        .by_literal
                        .insert(entry.literal.clone(), index.entries.len());
                    index.entries.push(entry);
                }
            }
        }

        index
    }

    /// Load from cache, or parse the diagram directory and refresh the cache.
    ///
    /// # Arguments
    ///
    /// * `diagrams` - Directory of per-character SVG diagrams
    /// * `cache` - Persisted cache location
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::CorpusUnavailable` if there is no usable cache and
    /// the diagram directory cannot be listed
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = PartsCache::new("data/cache/kanjivgparts.bin");
    /// let parts = PartsIndex::open("client/kanji", &cache)?;
    /// ```
    pub fn open(diagrams: impl AsRef<Path>, cache: &PartsCache) -> Result<Self> {
        let diagrams = diagrams.as_ref();
        let started = Instant::now();

        let listing = diagram_files(diagrams);
        let source_fingerprint = match &listing {
            Ok(files) => Some(fingerprint(files)?),
            Err(_) => None,
        };

        if let Some(entries) = cache.load(source_fingerprint.as_ref()) {
            let index = Self::from_entries(entries);
            tracing::info!(
                corpus = %Corpus::Parts,
                characters = index.len(),
                cache = %cache.path().display(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Parts index loaded from cache"
            );
            return Ok(index);
        }

        let files = listing.map_err(|source| LexiconError::CorpusUnavailable {
            corpus: Corpus::Parts,
            path: diagrams.to_path_buf(),
            source,
        })?;
        let index = Self::build(&files);

        if let Some(source_fingerprint) = source_fingerprint {
            if let Err(e) = cache.store(&source_fingerprint, index.entries()) {
                tracing::warn!(cache = %cache.path().display(), error = %e, "Failed to write parts cache");
            }
        }

        tracing::info!(
            corpus = %Corpus::Parts,
            characters = index.len(),
            diagrams = files.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Parts index built"
        );
        Ok(index)
    }

    /// Parse diagram files in the given order.
    ///
    /// Unreadable or malformed diagrams, and diagrams without a character
    /// group, are skipped with a warning.
    pub fn build(files: &[PathBuf]) -> Self {
        let mut entries = Vec::with_capacity(files.len());
        let mut skipped = 0usize;

        for path in files {
            let parsed = std::fs::read(path)
                .map_err(LexiconError::from)
                .and_then(|bytes| parse_diagram(&bytes));

            match parsed {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {
                    tracing::debug!(diagram = %path.display(), "Diagram has no character group");
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(diagram = %path.display(), error = %e, "Skipping diagram");
                }
            }
        }

        if skipped > 0 {
            tracing::warn!(corpus = %Corpus::Parts, skipped, "Diagrams skipped during build");
        }

        Self::from_entries(entries)
    }

    /// Entries in build order.
    pub fn entries(&self) -> &[PartsEntry] {
        &self.entries
    }

    /// Number of indexed characters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parts of a character, sorted; empty if unknown.
    pub fn get_parts(&self, literal: &str) -> Vec<String> {
        self.by_literal
            .get(literal)
            .map(|&i| self.entries[i].parts.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Characters containing every given part.
    ///
    /// # Arguments
    ///
    /// * `parts` - Required parts
    /// * `ranks` - Frequency rank source
    ///
    /// # Returns
    ///
    /// Every character whose part set is a superset of `parts`, ascending by
    /// rank (unranked = 2501), ties in build order
    pub fn get_combinations(&self, parts: &BTreeSet<String>, ranks: &dyn RankSource) -> Vec<Ranked> {
        let matching = self
            .entries
            .iter()
            .filter(|entry| parts.is_subset(&entry.parts))
            .map(|entry| entry.literal.as_str());

        rank_sorted(matching, ranks)
    }
}

/// List `*.svg` files in a diagram directory, sorted by file name.
pub fn diagram_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_svg = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);
        if is_svg && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Parse one diagram into its character and parts.
///
/// # Returns
///
/// `None` if the diagram has no named character group
///
/// # Errors
///
/// Returns an error if the diagram is not well-formed markup
pub fn parse_diagram(bytes: &[u8]) -> Result<Option<PartsEntry>> {
    let root = Element::parse(bytes)?;

    let character = match root.child("g").and_then(|strokes| strokes.child("g")) {
        Some(group) => group,
        None => return Ok(None),
    };
    let literal = match character.attr(ELEMENT_ATTR) {
        Some(literal) => literal.to_string(),
        None => return Ok(None),
    };

    Ok(Some(PartsEntry {
        parts: collect_parts(character, &literal),
        literal,
    }))
}

/// Depth-first walk over nested groups collecting named leaves.
fn collect_parts(character: &Element, literal: &str) -> BTreeSet<String> {
    let mut parts = BTreeSet::new();
    let mut stack: Vec<(&Element, usize)> = Vec::new();
    push_groups(&mut stack, character, 1);

    while let Some((group, depth)) = stack.pop() {
        if let Some(part) = group.attr(ELEMENT_ATTR) {
            parts.insert(part.to_string());
            continue;
        }

        if depth >= MAX_GROUP_DEPTH {
            tracing::warn!(literal, depth, "Diagram nesting too deep, not descending further");
            continue;
        }

        push_groups(&mut stack, group, depth + 1);
    }

    parts
}

/// Push child groups so they pop in document order.
fn push_groups<'a>(stack: &mut Vec<(&'a Element, usize)>, parent: &'a Element, depth: usize) {
    let start = stack.len();
    stack.extend(parent.children_named("g").map(|g| (g, depth)));
    stack[start..].reverse();
}
