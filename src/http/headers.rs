//! Case-insensitive, multi-valued HTTP headers.
//!
//! # Design Decisions
//! - Names are canonicalized on every read and write (`content-type` → `Content-Type`)
//! - `add` appends, `set` replaces
//! - Typed accessors cover what static serving and conditional requests need

use std::collections::BTreeMap;
use std::time::SystemTime;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use base64::Engine;

/// Canonical form of a header name: each dash-separated word capitalized.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.chars() {
        if upper {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        upper = ch == '-';
    }
    out
}

/// A `Range: bytes=start-end` request. Either bound may be missing;
/// a missing start means "the last `end` bytes".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl ByteRange {
    /// Parse the first range of a `bytes=` header value.
    pub fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes=")?;
        let first = spec.split(',').next()?.trim();
        let (start, end) = first.split_once('-')?;
        let bound = |s: &str| -> Option<Option<u64>> {
            let s = s.trim();
            if s.is_empty() {
                Some(None)
            } else {
                s.parse().ok().map(Some)
            }
        };
        let range = ByteRange {
            start: bound(start)?,
            end: bound(end)?,
        };
        if range.start.is_none() && range.end.is_none() {
            return None;
        }
        Some(range)
    }

    /// Resolve against a content length into inclusive `(start, end)`
    /// offsets. `None` when the range cannot be satisfied.
    pub fn resolve(&self, len: u64) -> Option<(u64, u64)> {
        if len == 0 {
            return None;
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < len && start <= end => {
                Some((start, end.min(len - 1)))
            }
            (Some(start), None) if start < len => Some((start, len - 1)),
            (None, Some(suffix)) if suffix > 0 => Some((len - suffix.min(len), len - 1)),
            _ => None,
        }
    }
}

/// HTTP headers keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, Vec<String>>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the header is present with at least one value.
    pub fn exists(&self, name: &str) -> bool {
        self.0
            .get(&canonical_name(name))
            .is_some_and(|values| !values.is_empty())
    }

    /// First value of the header, or `""`.
    pub fn header(&self, name: &str) -> &str {
        self.every_header(name)
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All values of the header, possibly empty.
    pub fn every_header(&self, name: &str) -> &[String] {
        self.0
            .get(&canonical_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a value.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.0
            .entry(canonical_name(name))
            .or_default()
            .push(value.into());
    }

    /// Replace all values with a single one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(canonical_name(name), vec![value.into()]);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.0.remove(&canonical_name(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every `(name, value)` pair, one entry per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn content_type(&self) -> &str {
        self.header("Content-Type")
    }

    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.set("Content-Type", value);
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length").trim().parse().ok()
    }

    pub fn range(&self) -> Option<ByteRange> {
        ByteRange::parse(self.header("Range"))
    }

    pub fn if_modified_since(&self) -> Option<SystemTime> {
        httpdate::parse_http_date(self.header("If-Modified-Since")).ok()
    }

    /// The `If-None-Match` entity tag without quotes or weak prefix.
    pub fn if_none_match(&self) -> Option<&str> {
        self.exists("If-None-Match")
            .then(|| unquote_etag(self.header("If-None-Match")))
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        httpdate::parse_http_date(self.header("Last-Modified")).ok()
    }

    pub fn set_last_modified(&mut self, time: SystemTime) {
        self.set("Last-Modified", httpdate::fmt_http_date(time));
    }

    /// The `ETag` value without quotes.
    pub fn etag(&self) -> Option<&str> {
        self.exists("ETag").then(|| unquote_etag(self.header("ETag")))
    }

    /// Set `ETag`, adding quotes.
    pub fn set_etag(&mut self, etag: &str) {
        self.set("ETag", format!("\"{}\"", etag));
    }

    /// `Authorization` header. `Basic` credentials are decoded to
    /// `user:password`; other schemes are returned as sent.
    pub fn authorization(&self) -> Option<String> {
        if !self.exists("Authorization") {
            return None;
        }
        let value = self.header("Authorization");
        if let Some(encoded) = value.strip_prefix("Basic ") {
            if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
                return Some(String::from_utf8_lossy(&decoded).into_owned());
            }
        }
        Some(value.to_string())
    }

    /// Convert into an `http` header map, skipping invalid entries.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in self.pairs() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }
        map
    }
}

fn unquote_etag(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    value.trim_matches('"')
}

impl From<&HeaderMap> for Headers {
    fn from(map: &HeaderMap) -> Self {
        let mut headers = Headers::new();
        for (name, value) in map {
            headers.add(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        headers
    }
}

impl<K: AsRef<str>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(entries: [(K, V); N]) -> Self {
        let mut headers = Headers::new();
        for (name, value) in entries {
            headers.add(name.as_ref(), value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("content-type", "text/plain");

        assert!(headers.exists("Content-Type"));
        assert!(headers.exists("CONTENT-TYPE"));
        assert_eq!(headers.header("Content-type"), "text/plain");
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["Content-Type"]);
    }

    #[test]
    fn test_add_appends_set_replaces() {
        let mut headers = Headers::new();
        headers.add("Vary", "Accept");
        headers.add("vary", "Cookie");
        assert_eq!(headers.every_header("Vary"), ["Accept", "Cookie"]);
        assert_eq!(headers.header("Vary"), "Accept");

        headers.set("VARY", "Origin");
        assert_eq!(headers.every_header("Vary"), ["Origin"]);

        assert_eq!(headers.header("Missing"), "");
        assert!(headers.every_header("Missing").is_empty());
    }

    #[test]
    fn test_range() {
        let headers = Headers::from([("Range", "bytes=1-2")]);
        let range = headers.range().unwrap();
        assert_eq!(range, ByteRange { start: Some(1), end: Some(2) });
        assert_eq!(range.resolve(10), Some((1, 2)));

        let open = ByteRange::parse("bytes=5-").unwrap();
        assert_eq!(open.resolve(10), Some((5, 9)));

        let suffix = ByteRange::parse("bytes=-3").unwrap();
        assert_eq!(suffix.resolve(10), Some((7, 9)));

        assert_eq!(ByteRange::parse("bytes=20-30").unwrap().resolve(10), None);
        assert!(ByteRange::parse("items=1-2").is_none());
        assert!(ByteRange::parse("bytes=-").is_none());
    }

    #[test]
    fn test_dates() {
        let expect = UNIX_EPOCH + Duration::from_secs(32_503_678_200);
        let headers = Headers::from([("If-Modified-Since", "Tue, 31 Dec 2999 23:30:00 GMT")]);
        assert_eq!(headers.if_modified_since(), Some(expect));

        let mut res = Headers::new();
        res.set_last_modified(expect);
        assert_eq!(res.header("Last-Modified"), "Tue, 31 Dec 2999 23:30:00 GMT");
        assert_eq!(res.last_modified(), Some(expect));
    }

    #[test]
    fn test_etags() {
        let headers = Headers::from([("If-None-Match", "\"acabacab\"")]);
        assert_eq!(headers.if_none_match(), Some("acabacab"));

        let mut res = Headers::new();
        res.set_etag("acabacab");
        assert_eq!(res.header("Etag"), "\"acabacab\"");
        assert_eq!(res.etag(), Some("acabacab"));
    }

    #[test]
    fn test_authorization() {
        let headers = Headers::from([("Authorization", "Basic QmVuZGVyOnJvY2tz")]);
        assert_eq!(headers.authorization().as_deref(), Some("Bender:rocks"));

        let bearer = Headers::from([("Authorization", "Bearer token")]);
        assert_eq!(bearer.authorization().as_deref(), Some("Bearer token"));
        assert_eq!(Headers::new().authorization(), None);
    }

    #[test]
    fn test_header_map_conversion() {
        let mut map = HeaderMap::new();
        map.append("x-request-id", HeaderValue::from_static("abc"));
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));

        let headers = Headers::from(&map);
        assert_eq!(headers.header("X-Request-Id"), "abc");
        assert_eq!(headers.every_header("Set-Cookie"), ["a=1", "b=2"]);

        let back = headers.to_header_map();
        assert_eq!(back.get_all("set-cookie").iter().count(), 2);
    }
}
