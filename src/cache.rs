//! Persisted cache for the parts index.
//!
//! # File Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (bincode, fixed-width little endian)             │
//! │   Magic: "JISHOPRT" (8 bytes, offset 0)                 │
//! │   Version: u32 (offset 8)                               │
//! │   Source fingerprint: [u8; 32] (blake3)                 │
//! │   Entry count: u64                                      │
//! │   Built at: RFC 3339 timestamp                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ Entries (bincode): Vec<PartsEntry> in build order       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The fingerprint hashes the sorted `(file name, byte length)` list of the
//! diagram directory. A cache with a different magic, version or fingerprint is
//! stale and ignored; the caller rebuilds and overwrites it. Content edits that
//! keep every file's name and length are not detected: delete the cache file
//! after such an upgrade.

use crate::index::parts::PartsEntry;
use crate::types::{LexiconError, Result};
use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Magic number for file format validation.
const MAGIC: [u8; 8] = *b"JISHOPRT";

/// Current cache format version.
pub const FORMAT_VERSION: u32 = 1;

/// Magic plus version, at fixed offsets.
const PREFIX_SIZE: usize = 12;

/// blake3 digest of a diagram directory listing.
pub type Fingerprint = [u8; 32];

/// Cache file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheHeader {
    /// Magic number (file format identifier)
    magic: [u8; 8],

    /// Cache format version
    version: u32,

    /// Fingerprint of the diagrams the entries were built from
    fingerprint: Fingerprint,

    /// Number of entries that follow
    entries: u64,

    /// When the cache was written
    built_at: DateTime<Utc>,
}

/// Parts cache at a fixed path.
#[derive(Debug, Clone)]
pub struct PartsCache {
    path: PathBuf,
}

impl PartsCache {
    /// Create a cache handle. Nothing is read or written yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load cached entries.
    ///
    /// # Arguments
    ///
    /// * `expected` - Fingerprint of the current diagrams, `None` if they are
    ///   unavailable (any cache with a valid header is then accepted)
    ///
    /// # Returns
    ///
    /// `None` if the cache is missing, unreadable or stale
    pub fn load(&self, expected: Option<&Fingerprint>) -> Option<Vec<PartsEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(cache = %self.path.display(), error = %e, "No parts cache");
                return None;
            }
        };

        match Self::read(file, expected) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(cache = %self.path.display(), error = %e, "Ignoring parts cache");
                None
            }
        }
    }

    fn read(file: File, expected: Option<&Fingerprint>) -> Result<Vec<PartsEntry>> {
        let len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut prefix = [0u8; PREFIX_SIZE];
        reader
            .read_exact(&mut prefix)
            .map_err(|e| LexiconError::CacheError(format!("Truncated header: {}", e)))?;
        validate_prefix(&prefix)?;

        // Every length field is bounded by the file size.
        let header: CacheHeader = codec()
            .with_limit(len)
            .deserialize_from((&prefix[..]).chain(&mut reader))?;

        if let Some(expected) = expected {
            if &header.fingerprint != expected {
                return Err(LexiconError::CacheError(format!(
                    "Stale cache built at {}: diagram directory changed",
                    header.built_at.to_rfc3339()
                )));
            }
        }

        let entries: Vec<PartsEntry> = codec().with_limit(len).deserialize_from(&mut reader)?;
        if entries.len() as u64 != header.entries {
            return Err(LexiconError::CacheError(format!(
                "Entry count mismatch: header says {}, found {}",
                header.entries,
                entries.len()
            )));
        }

        Ok(entries)
    }

    /// Write entries to the cache, replacing any previous file.
    ///
    /// The cache is written to a sibling temp file and renamed into place, so a
    /// crash mid-write never leaves a truncated cache behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file written
    pub fn store(&self, fingerprint: &Fingerprint, entries: &[PartsEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let header = CacheHeader {
            magic: MAGIC,
            version: FORMAT_VERSION,
            fingerprint: *fingerprint,
            entries: entries.len() as u64,
            built_at: Utc::now(),
        };

        let tmp_path = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        codec().serialize_into(&mut writer, &header)?;
        codec().serialize_into(&mut writer, entries)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(cache = %self.path.display(), entries = entries.len(), "Parts cache written");
        Ok(())
    }
}

/// Fixed-width little-endian encoding, so magic and version sit at fixed offsets.
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

/// Check magic and version before decoding anything length-prefixed.
fn validate_prefix(prefix: &[u8; PREFIX_SIZE]) -> Result<()> {
    if prefix[0..8] != MAGIC {
        return Err(LexiconError::CacheError(format!(
            "Invalid magic bytes: expected {:?}, got {:?}",
            MAGIC,
            &prefix[0..8]
        )));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&prefix[8..12]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(LexiconError::CacheError(format!(
            "Unsupported version: expected {}, got {}",
            FORMAT_VERSION, version
        )));
    }

    Ok(())
}

/// Fingerprint a diagram directory listing.
///
/// # Arguments
///
/// * `files` - Diagram paths, already sorted
///
/// # Errors
///
/// Returns an error if a file's metadata cannot be read
pub fn fingerprint(files: &[PathBuf]) -> Result<Fingerprint> {
    let mut hasher = blake3::Hasher::new();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let len = fs::metadata(path)?.len();

        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        hasher.update(&len.to_le_bytes());
    }

    Ok(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries() -> Vec<PartsEntry> {
        vec![
            PartsEntry {
                literal: "語".into(),
                parts: ["言", "五", "口"].iter().map(|s| s.to_string()).collect(),
            },
            PartsEntry {
                literal: "話".into(),
                parts: ["言", "舌"].iter().map(|s| s.to_string()).collect(),
            },
        ]
    }

    #[test]
    fn test_store_and_load() {
        let dir = tempdir().unwrap();
        let cache = PartsCache::new(dir.path().join("nested/cache/parts.bin"));
        let fp = [7u8; 32];

        cache.store(&fp, &entries()).unwrap();

        assert_eq!(cache.load(Some(&fp)), Some(entries()));
        assert_eq!(cache.load(None), Some(entries()));
        assert!(!cache.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_fingerprint_mismatch_is_stale() {
        let dir = tempdir().unwrap();
        let cache = PartsCache::new(dir.path().join("parts.bin"));

        cache.store(&[1u8; 32], &entries()).unwrap();
        assert_eq!(cache.load(Some(&[2u8; 32])), None);
    }

    #[test]
    fn test_missing_and_garbage_cache() {
        let dir = tempdir().unwrap();
        let cache = PartsCache::new(dir.path().join("parts.bin"));
        assert_eq!(cache.load(None), None);

        fs::write(cache.path(), b"definitely not a cache").unwrap();
        assert_eq!(cache.load(None), None);
    }

    #[test]
    fn test_long_garbage_cache_is_rejected() {
        let dir = tempdir().unwrap();
        let cache = PartsCache::new(dir.path().join("parts.bin"));

        fs::write(cache.path(), "x".repeat(256)).unwrap();
        assert_eq!(cache.load(None), None);
    }

    #[test]
    fn test_oversized_length_field_is_rejected() {
        let dir = tempdir().unwrap();
        let cache = PartsCache::new(dir.path().join("parts.bin"));

        // Valid prefix, then a built_at length far past the end of the file.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 32]);
        bytes.extend_from_slice(&2u64.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        bytes.extend_from_slice(&[b'x'; 64]);
        fs::write(cache.path(), &bytes).unwrap();

        assert_eq!(cache.load(None), None);
    }

    #[test]
    fn test_wrong_version_is_stale() {
        let dir = tempdir().unwrap();
        let cache = PartsCache::new(dir.path().join("parts.bin"));
        cache.store(&[1u8; 32], &entries()).unwrap();

        let mut bytes = fs::read(cache.path()).unwrap();
        bytes[8..12].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
        fs::write(cache.path(), &bytes).unwrap();

        assert_eq!(cache.load(None), None);
    }

    #[test]
    fn test_fingerprint_tracks_listing() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("08a9e.svg");
        let b = dir.path().join("08a71.svg");
        fs::write(&a, b"<svg/>").unwrap();
        fs::write(&b, b"<svg/>").unwrap();

        let both = fingerprint(&[b.clone(), a.clone()]).unwrap();
        assert_eq!(both, fingerprint(&[b.clone(), a.clone()]).unwrap());
        assert_ne!(both, fingerprint(&[b.clone()]).unwrap());

        fs::write(&a, b"<svg></svg>").unwrap();
        assert_ne!(both, fingerprint(&[b, a]).unwrap());
    }
}
