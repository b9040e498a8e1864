//! Incoming request envelope.
//!
//! # Responsibilities
//! - Hold method, URL, headers and body content
//! - Parse query and form parameters on demand
//! - Convert from the `http` crate types the server receives
//!
//! # Design Decisions
//! - Body parameters come before query parameters for the same name
//! - Origin-form targets (`/foo?x=1`) are resolved against `http://localhost/`
//! - The URL path is kept as sent (no percent-decoding) so it matches route patterns literally

use std::sync::LazyLock;

use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use url::Url;

use super::asset::Asset;
use super::headers::Headers;
use super::parameters::Parameters;
use crate::error::Result;

static BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("static base URL is valid"));

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub headers: Headers,
    pub content: Asset,
}

impl Request {
    /// Build a request from a method and either an absolute URL or an
    /// origin-form target.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        Self {
            method: method.into(),
            url: resolve_target(&BASE_URL, target),
            headers: Headers::new(),
            content: Asset::default(),
        }
    }

    /// Build a request from the parts and buffered body received by the
    /// HTTP server.
    pub fn from_http(parts: &Parts, body: impl Into<Vec<u8>>) -> Self {
        let headers = Headers::from(&parts.headers);
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let url = if parts.uri.scheme().is_some() {
            Url::parse(&parts.uri.to_string()).unwrap_or_else(|_| resolve_target(&BASE_URL, target))
        } else {
            let host = headers.header("Host");
            Url::parse(&format!("http://{}/", host))
                .map(|base| resolve_target(&base, target))
                .unwrap_or_else(|_| resolve_target(&BASE_URL, target))
        };

        Self {
            method: parts.method.as_str().to_string(),
            url,
            headers,
            content: Asset::memory(body),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn with_body(mut self, content: impl Into<Asset>) -> Self {
        self.content = content.into();
        self
    }

    /// Request path, without query string.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query_params(&self) -> Parameters {
        Parameters::parse(self.url.query().unwrap_or(""))
    }

    /// Parameters from an `application/x-www-form-urlencoded` body. Empty
    /// for any other content type.
    pub fn body_params(&self) -> Parameters {
        let content_type = self.headers.content_type();
        let is_form = content_type
            .split(';')
            .next()
            .is_some_and(|ty| ty.trim().eq_ignore_ascii_case(FORM_URLENCODED));
        if !is_form {
            return Parameters::new();
        }
        Parameters::parse(&self.content.to_string_lossy())
    }

    /// Body and query parameters combined, body values first.
    pub fn params(&self) -> Parameters {
        let mut params = self.query_params();
        params.prepend(&self.body_params());
        params
    }

    /// First value of a parameter, or `""`.
    pub fn param(&self, name: &str) -> String {
        self.params().param(name).to_string()
    }

    pub fn every_param(&self, name: &str) -> Vec<String> {
        self.params().every_param(name).to_vec()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.content.to_bytes()?)?)
    }
}

fn resolve_target(base: &Url, target: &str) -> Url {
    Url::parse(target)
        .or_else(|_| base.join(target))
        .unwrap_or_else(|e| {
            tracing::debug!(target = %target, error = %e, "Unparsable request target");
            base.clone()
        })
}
