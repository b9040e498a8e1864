//! Outgoing response envelope.
//!
//! # Responsibilities
//! - Hold status code, reason text, headers and content
//! - Provide content setters that also set `Content-Type`
//! - Write itself to an attached [`ResponseWriter`]
//!
//! # Design Decisions
//! - A code of `0` means "unset"; the application normalizes it to 200
//! - The writer is optional so responses can be built and inspected without I/O

use std::fmt;
use std::io::Write;

use axum::http::StatusCode;
use serde::Serialize;

use super::asset::Asset;
use super::headers::Headers;
use super::writer::ResponseWriter;
use crate::error::Result;

pub const TEXT: &str = "text/plain";
pub const JSON: &str = "application/json";
pub const HTML: &str = "text/html;charset=UTF-8";

#[derive(Default)]
pub struct Response {
    pub code: u16,
    pub status: String,
    pub headers: Headers,
    pub content: Asset,
    writer: Option<Box<dyn ResponseWriter>>,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("code", &self.code)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content", &self.content)
            .field("writer", &self.writer.is_some())
            .finish()
    }
}

/// Standard reason phrase for a status code, or `""`.
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("")
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(mut self, writer: impl ResponseWriter + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn set_writer(&mut self, writer: Box<dyn ResponseWriter>) {
        self.writer = Some(writer);
    }

    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// True once the status line went out. After that the response can
    /// no longer be replaced, only appended to.
    pub fn head_written(&self) -> bool {
        self.writer.as_ref().is_some_and(|w| w.head_written())
    }

    /// Set the status code and its standard reason text.
    pub fn set_code(&mut self, code: u16) {
        self.code = code;
        self.status = reason_phrase(code).to_string();
    }

    /// Replace the content with plain text.
    pub fn text(&mut self, text: impl Into<String>) {
        self.headers.set_content_type(TEXT);
        self.content = Asset::from(text.into());
    }

    /// Replace the content with HTML.
    pub fn html(&mut self, html: impl Into<String>) {
        self.headers.set_content_type(HTML);
        self.content = Asset::from(html.into());
    }

    /// Replace the content with `data` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<()> {
        let body = serde_json::to_vec(data)?;
        self.headers.set_content_type(JSON);
        self.content = Asset::memory(body);
        Ok(())
    }

    /// Drop code, headers and content. The writer stays attached.
    pub fn reset(&mut self) {
        self.code = 0;
        self.status.clear();
        self.headers = Headers::new();
        self.content = Asset::default();
    }

    /// Send the head (unless already sent) and then the content to the
    /// attached writer. Without a writer this does nothing.
    pub fn write_to_writer(&mut self) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        if !writer.head_written() {
            writer.write_head(self.code, &self.headers)?;
        }
        self.content.serve(writer.as_mut())?;
        writer.flush()?;
        Ok(())
    }
}
