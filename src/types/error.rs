//! Error types for corpus indexing and lookup.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` implementations.
//!
//! Only conditions a caller can act on surface as errors. Warnings raised while
//! streaming a corpus and failures while decoding a single record are logged and
//! absorbed by the indexers; a key that is not indexed is an empty result.

use crate::types::record::Corpus;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for all lexicon operations.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// A required corpus could not be opened at startup
    #[error("{corpus} corpus unavailable at {}: {source}", path.display())]
    CorpusUnavailable {
        /// Which corpus failed
        corpus: Corpus,
        /// Path that was tried
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Query against a corpus that was not loaded into this lexicon
    #[error("{0} corpus is not loaded")]
    NotLoaded(Corpus),

    /// Invalid query input (bad regex, empty path, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Record bytes could not be parsed
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Parts cache could not be read or written
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Markup parse error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// Regex compilation error
    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Bincode serialization error
    #[error("Bincode error: {0}")]
    BincodeError(#[from] bincode::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LexiconError {
    /// Create an invalid-input error with context.
    ///
    /// # Arguments
    ///
    /// * `msg` - Error message
    ///
    /// # Returns
    ///
    /// `LexiconError::InvalidInput`
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a malformed-record error with context.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// Check if error must stop the process before serving.
    ///
    /// # Returns
    ///
    /// `true` for startup failures (missing corpus, bad configuration)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CorpusUnavailable { .. } | Self::ConfigError(_)
        )
    }
}

/// Result type alias for lexicon operations.
pub type Result<T> = std::result::Result<T, LexiconError>;
