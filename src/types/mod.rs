//! Core data types for the lexicon engine.
//!
//! Defines fundamental types used throughout the system:
//! - `Location`: byte range of one record in one corpus file
//! - Decoded records (`DictionaryRecord`, `CharacterRecord`, `ExampleRecord`)
//! - `LexiconError`: Error types for all operations
//! - `Result`: Convenient result type alias

pub mod error;
pub mod record;

pub use error::{LexiconError, Result};
pub use record::{
    CharacterRecord, Corpus, DictionaryRecord, ExampleRecord, HeadwordLookup, Location, Ranked,
    Reading, Sense, SentencePair, SourceLanguage, Tag, Word, UNRANKED,
};
