//! Message content, held in memory or on disk.
//!
//! # Design Decisions
//! - A range is inclusive on both ends and applies to every read
//! - File assets are opened on demand; nothing keeps a descriptor alive
//! - `add_chunk` on a file appends to the file itself

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Content of a request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Memory {
        buffer: Vec<u8>,
        range: Option<(u64, u64)>,
    },
    File {
        path: PathBuf,
        range: Option<(u64, u64)>,
    },
}

impl Default for Asset {
    fn default() -> Self {
        Asset::memory(Vec::new())
    }
}

impl Asset {
    pub fn memory(buffer: impl Into<Vec<u8>>) -> Self {
        Asset::Memory {
            buffer: buffer.into(),
            range: None,
        }
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        Asset::File {
            path: path.as_ref().to_path_buf(),
            range: None,
        }
    }

    /// Limit every read to the inclusive `start..=end` byte range.
    pub fn set_range(&mut self, start: u64, end: u64) {
        match self {
            Asset::Memory { range, .. } | Asset::File { range, .. } => {
                *range = Some((start, end));
            }
        }
    }

    pub fn range(&self) -> Option<(u64, u64)> {
        match self {
            Asset::Memory { range, .. } | Asset::File { range, .. } => *range,
        }
    }

    /// Size of the whole content, ignoring any range.
    pub fn total_len(&self) -> Result<u64> {
        Ok(match self {
            Asset::Memory { buffer, .. } => buffer.len() as u64,
            Asset::File { path, .. } => std::fs::metadata(path)?.len(),
        })
    }

    /// Number of bytes a read will produce.
    pub fn len(&self) -> Result<u64> {
        let total = self.total_len()?;
        Ok(match self.range() {
            Some((start, end)) if start < total && start <= end => end.min(total - 1) - start + 1,
            Some(_) => 0,
            None => total,
        })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append data to the content.
    pub fn add_chunk(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Asset::Memory { buffer, .. } => buffer.extend_from_slice(data),
            Asset::File { path, .. } => {
                let mut file = OpenOptions::new().append(true).open(path)?;
                file.write_all(data)?;
            }
        }
        Ok(())
    }

    /// Copy the (ranged) content into `out`, returning the bytes written.
    pub fn serve<W: Write + ?Sized>(&self, out: &mut W) -> Result<u64> {
        match self {
            Asset::Memory { buffer, .. } => {
                let slice = self.memory_slice(buffer);
                out.write_all(slice)?;
                Ok(slice.len() as u64)
            }
            Asset::File { path, range } => {
                let mut file = File::open(path)?;
                let written = match range {
                    Some((start, end)) => {
                        file.seek(SeekFrom::Start(*start))?;
                        let limit = end.saturating_sub(*start) + 1;
                        io::copy(&mut file.take(limit), out)?
                    }
                    None => io::copy(&mut file, out)?,
                };
                Ok(written)
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.serve(&mut out)?;
        Ok(out)
    }

    /// Content as text. Unreadable files produce an empty string.
    pub fn to_string_lossy(&self) -> String {
        match self.to_bytes() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read asset content");
                String::new()
            }
        }
    }

    fn memory_slice<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        match self.range() {
            Some((start, end)) => {
                let len = buffer.len();
                let start = (start as usize).min(len);
                let end = (end as usize).saturating_add(1).min(len);
                &buffer[start..end.max(start)]
            }
            None => buffer,
        }
    }
}

impl From<&str> for Asset {
    fn from(s: &str) -> Self {
        Asset::memory(s.as_bytes())
    }
}

impl From<String> for Asset {
    fn from(s: String) -> Self {
        Asset::memory(s.into_bytes())
    }
}

impl From<Vec<u8>> for Asset {
    fn from(bytes: Vec<u8>) -> Self {
        Asset::memory(bytes)
    }
}
