//! Places static files are looked up in.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::http::Asset;

/// A file found in a source.
#[derive(Debug, Clone)]
pub struct StaticFile {
    pub content: Asset,
    /// Modification time, when the source knows it.
    pub modified: Option<SystemTime>,
    pub len: u64,
}

pub trait FileSource: fmt::Debug + Send + Sync {
    /// Look up a relative, already sanitized path.
    fn open(&self, path: &str) -> Option<StaticFile>;
}

/// Files under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSource for DirSource {
    fn open(&self, path: &str) -> Option<StaticFile> {
        let full = self.root.join(path);
        match std::fs::metadata(&full) {
            Ok(meta) if meta.is_file() => Some(StaticFile {
                content: Asset::file(&full),
                modified: meta.modified().ok(),
                len: meta.len(),
            }),
            Ok(_) => None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %full.display(), error = %e, "Could not stat static file");
                None
            }
        }
    }
}

/// Files held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, (Vec<u8>, Option<SystemTime>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file without a modification time; the application start
    /// time is used instead.
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content, None);
        self
    }

    pub fn insert(
        &mut self,
        path: &str,
        content: impl Into<Vec<u8>>,
        modified: Option<SystemTime>,
    ) {
        let path = path.trim_start_matches('/').to_string();
        self.files.insert(path, (content.into(), modified));
    }
}

impl FileSource for MemorySource {
    fn open(&self, path: &str) -> Option<StaticFile> {
        self.files.get(path).map(|(bytes, modified)| StaticFile {
            len: bytes.len() as u64,
            content: Asset::memory(bytes.clone()),
            modified: *modified,
        })
    }
}
