//! Jisho core - Japanese lexical corpus indexing and lookup
//!
//! Serves low-latency queries against large read-only reference corpora:
//! - Headword dictionary (JMdict) with exact, shorter-prefix and longer-key lookup
//! - Character database (KANJIDIC2) with frequency ranks
//! - Example sentences (WWWJDIC/Tatoeba) by annotated headword or phrase
//! - Composition parts (KanjiVG) with subset queries and a persisted cache
//! - Similar-character lists ranked by frequency
//!
//! Each corpus is indexed once at startup by streaming its file and keeping only
//! byte locations; records are decoded on demand from a read-only memory map.
//!
//! Can be used as:
//! - Library (`Lexicon`, shared through `Arc`)
//! - Command-line tool (`jisho`)

pub mod types;
pub mod corpus;
pub mod index;
pub mod cache;
pub mod config;
pub mod telemetry;

// High-level lookup API
pub mod lexicon;

pub use config::LexiconConfig;
pub use lexicon::Lexicon;
pub use types::{LexiconError, Result};
