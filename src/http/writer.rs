//! Destinations for a finished response.
//!
//! A [`ResponseWriter`] receives the status line and headers once, then
//! the body through `io::Write`. The HTTP server streams what it gets to
//! the client; [`Recorder`] keeps everything in memory for tests.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::headers::Headers;

pub trait ResponseWriter: io::Write + Send {
    /// Send the status code and headers. Called at most once.
    fn write_head(&mut self, code: u16, headers: &Headers) -> io::Result<()>;

    /// True once `write_head` has been called.
    fn head_written(&self) -> bool;
}

/// Everything a [`Recorder`] has seen.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub code: Option<u16>,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// In-memory writer. Clones share the same recording, so one handle can
/// be given to a response while another is inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Recording>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn code(&self) -> Option<u16> {
        self.lock().code
    }

    pub fn headers(&self) -> Headers {
        self.lock().headers.clone()
    }

    pub fn body(&self) -> Vec<u8> {
        self.lock().body.clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.lock().body).into_owned()
    }

    pub fn recording(&self) -> Recording {
        self.lock().clone()
    }
}

impl io::Write for Recorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseWriter for Recorder {
    fn write_head(&mut self, code: u16, headers: &Headers) -> io::Result<()> {
        let mut recording = self.lock();
        recording.code = Some(code);
        recording.headers = headers.clone();
        Ok(())
    }

    fn head_written(&self) -> bool {
        self.lock().code.is_some()
    }
}
