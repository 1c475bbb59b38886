//! Read-only corpora: streaming index builds, lazy per-record decoding.
//!
//! Every corpus follows the same pattern:
//!
//! ```text
//! open(path) ──▶ CorpusFile (mmap) ──▶ one pass over lines ──▶ key → Location
//!                                                                   │
//! lookup(key) ──────────────────────────────────────────────────────┘
//!      └──▶ read(Location) ──▶ decode ──▶ typed record
//! ```
//!
//! Records are never held in memory beyond the lookup that decodes them.

pub mod characters;
pub mod dictionary;
pub mod file;
pub mod sentences;
pub mod xml;

pub use characters::{CharacterBuildStats, CharacterCorpus};
pub use dictionary::{DictionaryBuildStats, DictionaryCorpus};
pub use file::CorpusFile;
pub use sentences::{parse_annotation, Annotation, SentenceBuildStats, SentenceCorpus};
pub use xml::{Element, EntityTable};
