//! Memory-mapped, read-only corpus file.
//!
//! # Access Pattern
//!
//! - **Build**: one sequential pass over [`CorpusFile::lines`], which yields each
//!   line with its byte offset. Pages are faulted in as the pass advances and the
//!   OS is free to evict them afterwards, so the corpus is never held in memory.
//! - **Lookup**: [`CorpusFile::read`] slices exactly one [`Location`]. The read is
//!   offset-explicit: there is no shared cursor, so concurrent lookups cannot
//!   observe each other's seeks.

use crate::types::{Corpus, LexiconError, Location, Result};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only corpus file opened once at startup.
pub struct CorpusFile {
    /// Corpus this file backs (for logs and errors)
    corpus: Corpus,

    /// Path the file was opened from
    path: PathBuf,

    /// Mapping of the whole file (`None` for an empty file)
    mmap: Option<Mmap>,
}

impl CorpusFile {
    /// Open and memory-map a corpus file.
    ///
    /// # Arguments
    ///
    /// * `corpus` - Which corpus the file backs
    /// * `path` - Corpus file path
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::CorpusUnavailable` if the file is missing or cannot
    /// be mapped
    ///
    /// # Safety
    ///
    /// Memory-mapped data is immutable. Corpora must not be modified while loaded.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let file = CorpusFile::open(Corpus::Dictionary, "data/JMdict_e")?;
    /// for (offset, line) in file.lines() {
    ///     // ...
    /// }
    /// ```
    pub fn open(corpus: Corpus, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source| LexiconError::CorpusUnavailable {
            corpus,
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(unavailable)?;
        let len = file.metadata().map_err(unavailable)?.len();

        let mmap = if len == 0 {
            None
        } else {
            Some(unsafe { MmapOptions::new().map(&file).map_err(unavailable)? })
        };

        Ok(Self { corpus, path, mmap })
    }

    /// Corpus this file backs.
    pub fn corpus(&self) -> Corpus {
        self.corpus
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole file contents.
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// File length in bytes.
    pub fn len(&self) -> u64 {
        self.bytes().len() as u64
    }

    /// Check if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Read the bytes of one record.
    ///
    /// # Arguments
    ///
    /// * `location` - Record location produced by this file's indexer
    ///
    /// # Returns
    ///
    /// Exactly `location.length` bytes, or `None` if the range is out of bounds
    pub fn read(&self, location: Location) -> Option<&[u8]> {
        let start = usize::try_from(location.offset).ok()?;
        let end = usize::try_from(location.end()).ok()?;
        self.bytes().get(start..end)
    }

    /// Iterate lines with their starting byte offsets.
    ///
    /// Each yielded line keeps its terminating `\n` so that
    /// `offset + line.len()` is the offset of the next line.
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            bytes: self.bytes(),
            offset: 0,
        }
    }
}

/// Iterator over `(offset, line)` pairs of a corpus file.
pub struct Lines<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (u64, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let rest = &self.bytes[self.offset..];
        let len = rest
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(rest.len());

        let start = self.offset;
        self.offset += len;
        Some((start as u64, &rest[..len]))
    }
}

/// Strip a trailing `\n` or `\r\n`.
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
