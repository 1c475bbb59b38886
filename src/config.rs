//! Corpus locations.

use crate::types::error::{LexiconError, Result};
use crate::types::Corpus;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths to every corpus and to the parts cache.
///
/// Missing fields in a config file fall back to the default layout:
///
/// ```text
/// data/JMdict_e                    dictionary
/// data/kanjidic2.xml               character database
/// data/wwwjdic.csv                 example sentences
/// client/kanji/                    stroke diagrams (*.svg)
/// data/kanji.tgz_similars.ut8      similar characters
/// data/cache/kanjivgparts.bin      parts cache (written)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Headword dictionary (JMdict)
    pub dictionary: PathBuf,
    /// Character database (KANJIDIC2)
    pub characters: PathBuf,
    /// Example sentences (WWWJDIC/Tatoeba)
    pub sentences: PathBuf,
    /// Stroke diagram directory (KanjiVG)
    pub diagrams: PathBuf,
    /// Similar-character list
    pub similars: PathBuf,
    /// Parts cache file
    pub parts_cache: PathBuf,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            dictionary: PathBuf::from("data/JMdict_e"),
            characters: PathBuf::from("data/kanjidic2.xml"),
            sentences: PathBuf::from("data/wwwjdic.csv"),
            diagrams: PathBuf::from("client/kanji"),
            similars: PathBuf::from("data/kanji.tgz_similars.ut8"),
            parts_cache: PathBuf::from("data/cache/kanjivgparts.bin"),
        }
    }
}

impl LexiconConfig {
    /// Default layout under a data directory.
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        Self::default().resolve(dir)
    }

    /// Load configuration from a JSON file.
    ///
    /// Paths are returned as written; call [`resolve`](Self::resolve) to anchor
    /// relative ones.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::ConfigError` if the file cannot be read or is not
    /// a valid config
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LexiconError::ConfigError(format!("Cannot read config {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| LexiconError::ConfigError(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Anchor relative paths at `base`. Absolute paths are kept.
    pub fn resolve(mut self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        for path in self.paths_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Reject empty paths.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::ConfigError` naming the first empty field
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("dictionary", &self.dictionary),
            ("characters", &self.characters),
            ("sentences", &self.sentences),
            ("diagrams", &self.diagrams),
            ("similars", &self.similars),
            ("parts_cache", &self.parts_cache),
        ];

        match fields.iter().find(|(_, path)| path.as_os_str().is_empty()) {
            Some((name, _)) => Err(LexiconError::ConfigError(format!("Path '{}' is empty", name))),
            None => Ok(()),
        }
    }

    /// Source path of a corpus (the diagram directory for parts).
    pub fn source(&self, corpus: Corpus) -> &Path {
        match corpus {
            Corpus::Dictionary => &self.dictionary,
            Corpus::Characters => &self.characters,
            Corpus::Sentences => &self.sentences,
            Corpus::Parts => &self.diagrams,
            Corpus::Similars => &self.similars,
        }
    }

    fn paths_mut(&mut self) -> [&mut PathBuf; 6] {
        [
            &mut self.dictionary,
            &mut self.characters,
            &mut self.sentences,
            &mut self.diagrams,
            &mut self.similars,
            &mut self.parts_cache,
        ]
    }
}
