//! Tracing instrumentation for index builds and lookups.
//!
//! **Span naming**: `{operation} {corpus}`
//! - Example: `prefix dictionary`, `subset parts`, `build sentences`
//!
//! **Attributes**:
//! - `lexicon.corpus`: corpus name
//! - `lexicon.operation`: operation name
//! - `lexicon.returned`: number of results (recorded by [`record_returned`])
//!
//! # Example
//!
//! ```rust,ignore
//! use jisho_core::telemetry::{lookup_span, LookupOperation};
//!
//! let span = lookup_span(LookupOperation::Prefix, Corpus::Dictionary);
//! let _guard = span.entered();
//! let found = index.get("犬");
//! ```

use crate::types::{Corpus, LexiconError, Result};
use std::str::FromStr;
use tracing::{span, Level, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Lookup operation types (maps to `lexicon.operation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOperation {
    /// Streaming index build
    Build,
    /// Exact/prefix key lookup
    Prefix,
    /// Anchored regex key scan
    Regex,
    /// Single-key record lookup
    Get,
    /// Headword-annotated example lookup
    Examples,
    /// Substring scan over sentences
    Phrase,
    /// Superset query over part sets
    Subset,
    /// Similar-character lookup
    Neighbors,
}

impl LookupOperation {
    /// Get operation name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Prefix => "prefix",
            Self::Regex => "regex",
            Self::Get => "get",
            Self::Examples => "examples",
            Self::Phrase => "phrase",
            Self::Subset => "subset",
            Self::Neighbors => "neighbors",
        }
    }
}

/// Create a lookup span.
///
/// # Arguments
///
/// * `operation` - Operation type
/// * `corpus` - Corpus being queried
///
/// # Returns
///
/// Tracing span named `lookup` with operation and corpus attributes
pub fn lookup_span(operation: LookupOperation, corpus: Corpus) -> Span {
    span!(
        Level::INFO,
        "lookup",
        otel.name = %format!("{} {}", operation.as_str(), corpus),
        lexicon.corpus = corpus.as_str(),
        lexicon.operation = operation.as_str(),
        lexicon.returned = tracing::field::Empty,
    )
}

/// Record the number of results in the current span.
pub fn record_returned(returned: usize) {
    Span::current().record("lexicon.returned", returned);
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(LexiconError::ConfigError(format!(
                "unknown log format '{}', expected text or json",
                other
            ))),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Logs go to stderr so
/// that command output on stdout stays machine-readable.
///
/// # Errors
///
/// Returns `LexiconError::ConfigError` if a global subscriber is already set
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| LexiconError::ConfigError(format!("tracing already initialised: {}", e)))
}
