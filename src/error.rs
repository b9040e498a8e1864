//! Crate-wide error type.
//!
//! # Design Decisions
//! - Routing "not found" is never an error: it is a 404 response
//! - Handler and hook failures are values, converted to 500 at the request boundary
//! - Stash type mismatches and missing templates fail fast (configuration bugs)

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by routing, rendering, handlers and commands.
#[derive(Debug, Error)]
pub enum Error {
    /// A stash value exists but holds a different type than requested.
    #[error("stash value `{key}` is a {found}, expected a {expected}")]
    StashTypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The renderer has no template with this name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template parse or render failure.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// A route path compiled into an invalid regular expression.
    #[error("invalid route pattern `{path}`: {source}")]
    Pattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Free-form failure reported by a handler.
    #[error("{0}")]
    Handler(String),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// Bad command line arguments.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Build a handler failure from any message.
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return type of route handlers and hooks.
pub type HandlerResult<T = ()> = Result<T>;
