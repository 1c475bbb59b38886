//! Jisho CLI
//!
//! Command-line interface for dictionary, character, example and composition
//! lookups. Results are printed as pretty JSON on stdout; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use jisho_core::telemetry::{init_tracing, LogFormat};
use jisho_core::types::Corpus;
use jisho_core::{Lexicon, LexiconConfig};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Jisho - Japanese dictionary and character lookup
#[derive(Parser)]
#[command(name = "jisho")]
#[command(about = "Dictionary, kanji, example sentence and composition lookups over local corpora", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file with corpus paths (overrides JISHO_CONFIG)
    #[arg(long, env = "JISHO_CONFIG")]
    config: Option<PathBuf>,

    /// Directory relative corpus paths are resolved against (overrides JISHO_DATA_DIR)
    #[arg(long, env = "JISHO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a headword or reading
    Headword {
        /// Headword, reading, or pattern with --regex
        query: String,

        /// Match keys against a regex anchored at the key start
        #[arg(long)]
        regex: bool,
    },

    /// Look up one kanji
    Character {
        /// Kanji literal
        literal: String,
    },

    /// Example sentences for a headword
    Examples {
        /// Candidate headwords, comma separated, first with examples wins
        headwords: String,

        /// Accepted readings, comma separated (all readings when omitted)
        #[arg(long)]
        readings: Option<String>,
    },

    /// Sentences containing a phrase
    Phrase {
        /// Phrase to search in source sentences
        query: String,

        /// Maximum number of results
        #[arg(long, default_value = "5")]
        max: usize,

        /// Number of matches to skip
        #[arg(long, default_value = "0")]
        start: usize,

        /// Scan sentences in file order
        #[arg(long)]
        no_shuffle: bool,
    },

    /// Composition parts of a kanji
    Parts {
        /// Kanji literal
        literal: String,
    },

    /// Kanji containing all of the given parts
    Combinations {
        /// Parts, comma separated
        parts: String,
    },

    /// Look-alike kanji
    Similars {
        /// Kanji literal
        literal: String,
    },
}

impl Commands {
    /// Corpora a command reads.
    fn corpora(&self) -> &'static [Corpus] {
        match self {
            Commands::Headword { .. } => &[Corpus::Dictionary],
            Commands::Character { .. } => &[Corpus::Characters],
            Commands::Examples { .. } | Commands::Phrase { .. } => &[Corpus::Sentences],
            Commands::Parts { .. } => &[Corpus::Parts],
            Commands::Combinations { .. } => &[Corpus::Parts, Corpus::Characters],
            Commands::Similars { .. } => &[Corpus::Similars, Corpus::Characters],
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let lexicon = Lexicon::open_only(&config, cli.command.corpora())?;

    match cli.command {
        Commands::Headword { query, regex } => {
            print_json(&lexicon.lookup_headword(query.trim(), regex)?)?;
        }
        Commands::Character { literal } => {
            print_json(&lexicon.lookup_character(literal.trim())?)?;
        }
        Commands::Examples { headwords, readings } => {
            let headwords = split_list(&headwords);
            let readings = reading_list(readings.as_deref());
            print_json(&lexicon.lookup_examples(&headwords, &readings)?)?;
        }
        Commands::Phrase {
            query,
            max,
            start,
            no_shuffle,
        } => {
            print_json(&lexicon.search_phrase(query.trim(), max, start, !no_shuffle)?)?;
        }
        Commands::Parts { literal } => {
            print_json(&lexicon.get_parts(literal.trim())?)?;
        }
        Commands::Combinations { parts } => {
            let parts: BTreeSet<String> = split_list(&parts)
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect();
            print_json(&lexicon.get_combinations(&parts)?)?;
        }
        Commands::Similars { literal } => {
            print_json(&lexicon.get_similars(literal.trim())?)?;
        }
    }

    Ok(())
}

/// Resolve corpus paths from the config file and data directory.
fn load_config(config: Option<&Path>, data_dir: Option<&Path>) -> anyhow::Result<LexiconConfig> {
    let data_dir = data_dir.map(expand);

    let config = match config.map(expand) {
        Some(path) => {
            let base = data_dir
                .clone()
                .or_else(|| path.parent().map(Path::to_path_buf))
                .unwrap_or_default();
            LexiconConfig::load(&path)
                .with_context(|| format!("loading config {}", path.display()))?
                .resolve(base)
        }
        None => LexiconConfig::with_data_dir(data_dir.unwrap_or_else(|| PathBuf::from("."))),
    };

    config.validate()?;
    Ok(config)
}

/// Expand `~` in a path.
fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

/// Split a comma separated argument, trimming the whole list first.
fn split_list(list: &str) -> Vec<String> {
    list.trim().split(',').map(str::to_string).collect()
}

/// Accepted readings; an absent or blank argument accepts every reading.
fn reading_list(readings: Option<&str>) -> Vec<String> {
    match readings {
        Some(list) if !list.trim().is_empty() => split_list(list),
        _ => Vec::new(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_list() {
        assert!(reading_list(None).is_empty());
        assert!(reading_list(Some("  ")).is_empty());
        assert_eq!(reading_list(Some("いぬ,けん")), vec!["いぬ", "けん"]);
        assert_eq!(reading_list(Some("いぬ,")), vec!["いぬ", ""]);
    }
}
