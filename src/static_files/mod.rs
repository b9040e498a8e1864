//! Static file dispatch.
//!
//! # Responsibilities
//! - Serve files from an ordered list of sources before routes run
//! - Answer conditional requests (`If-None-Match`, `If-Modified-Since`) with 304
//! - Serve `Range` requests with 206, or 416 when unsatisfiable
//!
//! # Design Decisions
//! - Only `GET` and `HEAD` are considered; anything else falls through to routes
//! - Paths with `.` or `..` segments are never served
//! - The ETag is the hex MD5 of the HTTP-date formatted modification time
//! - Files without a modification time use `app_start`, fixed at construction

pub mod source;

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};

use crate::app::Context;
use crate::http::types;

pub use source::{DirSource, FileSource, MemorySource, StaticFile};

/// Something that may answer a request before routing does.
pub trait StaticServer: Send + Sync {
    /// Returns true when the request was served. The response code,
    /// headers and content are set as a side effect.
    fn dispatch(&self, c: &mut Context<'_>) -> bool;
}

#[derive(Debug)]
pub struct Static {
    sources: Vec<Box<dyn FileSource>>,
    app_start: SystemTime,
}

impl Default for Static {
    fn default() -> Self {
        Self::new()
    }
}

impl Static {
    pub fn new() -> Self {
        Self::with_app_start(SystemTime::now())
    }

    pub fn with_app_start(app_start: SystemTime) -> Self {
        Self {
            sources: Vec::new(),
            app_start,
        }
    }

    /// Add a directory source. Earlier sources win.
    pub fn with_path(mut self, root: impl Into<PathBuf>) -> Self {
        self.add_path(root);
        self
    }

    pub fn with_source(mut self, source: impl FileSource + 'static) -> Self {
        self.add_source(source);
        self
    }

    pub fn add_path(&mut self, root: impl Into<PathBuf>) {
        self.add_source(DirSource::new(root));
    }

    pub fn add_source(&mut self, source: impl FileSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn app_start(&self) -> SystemTime {
        self.app_start
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Serve the file at `path` (relative to every source).
    pub fn serve(&self, c: &mut Context<'_>, path: &str) -> bool {
        let Some(relative) = sanitize(path) else {
            return false;
        };
        let Some(file) = self.sources.iter().find_map(|source| source.open(&relative)) else {
            return false;
        };

        let modified = truncate_to_secs(file.modified.unwrap_or(self.app_start));
        let etag = etag_for(modified);

        let if_none_match = c.req.headers.if_none_match().map(str::to_string);
        if if_none_match.as_deref() == Some(etag.as_str())
            || c.req.headers.if_modified_since().is_some_and(|ims| ims > modified)
        {
            tracing::debug!(path = %relative, "Static file not modified");
            c.res.set_code(304);
            c.res.headers.set_etag(&etag);
            return true;
        }

        let mut content = file.content;
        c.res.headers.set_last_modified(modified);
        c.res.headers.set_etag(&etag);
        c.res.headers.set_content_type(types::content_type_for_path(&relative));
        c.res.headers.set("Accept-Ranges", "bytes");

        let code = match c.req.headers.range() {
            Some(range) => match range.resolve(file.len) {
                Some((start, end)) => {
                    content.set_range(start, end);
                    c.res
                        .headers
                        .set("Content-Range", format!("bytes {}-{}/{}", start, end, file.len));
                    206
                }
                None => {
                    c.res
                        .headers
                        .set("Content-Range", format!("bytes */{}", file.len));
                    c.res.set_code(416);
                    return true;
                }
            },
            None => 200,
        };

        tracing::debug!(path = %relative, status = code, "Serving static file");
        c.res.set_code(code);
        if c.req.method != "HEAD" {
            c.res.content = content;
        }
        true
    }
}

impl StaticServer for Static {
    fn dispatch(&self, c: &mut Context<'_>) -> bool {
        if c.req.method != "GET" && c.req.method != "HEAD" {
            return false;
        }
        let path = c.req.path().to_string();
        self.serve(c, &path)
    }
}

/// Strip the leading slash and reject empty, `.` and `..` segments.
fn sanitize(path: &str) -> Option<String> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    let clean = relative
        .split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    clean.then(|| relative.to_string())
}

/// HTTP dates have second precision; compare at that precision.
fn truncate_to_secs(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => UNIX_EPOCH + Duration::from_secs(since.as_secs()),
        Err(_) => time,
    }
}

fn etag_for(modified: SystemTime) -> String {
    let date = httpdate::fmt_http_date(modified);
    format!("{:x}", Md5::digest(date.as_bytes()))
}
