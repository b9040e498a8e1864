//! A single routing destination.
//!
//! # Responsibilities
//! - Hold the allowed methods, compiled path pattern and default stash
//! - Hold the handler set with [`Route::to`]
//! - Own nested routes when created with `under`
//!
//! # Design Decisions
//! - Two regexes are compiled up front: one anchored at both ends for leaf
//!   routes, one anchored at the start only for routes with children
//! - The choice between them is made at match time, since children may be
//!   added after the parent is registered

use std::fmt;

use regex::Regex;

use super::pattern;
use super::router::Routes;
use crate::app::Context;
use crate::error::{Error, HandlerResult, Result};
use crate::stash::Stash;

/// A route handler. Mutates the context; an `Err` becomes a 500 response.
pub type Handler = Box<dyn Fn(&mut Context<'_>) -> HandlerResult + Send + Sync>;

pub struct Route {
    name: Option<String>,
    methods: Vec<String>,
    path: String,
    pattern: String,
    full: Regex,
    prefix: Regex,
    defaults: Stash,
    handler: Option<Handler>,
    children: Routes,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("path", &self.path)
            .field("pattern", &self.pattern)
            .field("defaults", &self.defaults)
            .field("handler", &self.handler.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl Route {
    pub(crate) fn new(methods: &[&str], path: &str, defaults: Stash) -> Result<Self> {
        let pattern = pattern::compile(path, &defaults);
        let compile = |source: String| {
            Regex::new(&source).map_err(|source| Error::Pattern {
                path: path.to_string(),
                source,
            })
        };
        let full = compile(format!("^(?:{})$", pattern))?;
        let prefix = compile(format!("^(?:{})", pattern))?;

        Ok(Self {
            name: None,
            methods: methods.iter().map(|m| m.to_string()).collect(),
            path: path.to_string(),
            pattern,
            full,
            prefix,
            defaults,
            handler: None,
            children: Routes::new(),
        })
    }

    /// Set the handler invoked when this route is dispatched.
    pub fn to<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub(crate) fn set_handler(&mut self, handler: Handler) {
        self.handler = Some(handler);
    }

    /// Give the route a name for [`Routes::find_named`].
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// The template the route was registered with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The compiled, unanchored regex source.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn defaults(&self) -> &Stash {
        &self.defaults
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Nested routes. Empty unless the route was created with `under`.
    pub fn routes(&self) -> &Routes {
        &self.children
    }

    pub fn routes_mut(&mut self) -> &mut Routes {
        &mut self.children
    }

    /// Try this route against a method and path. On success returns the
    /// end offset of the matched text and the stash values it adds:
    /// defaults first, then every non-empty capture.
    pub(crate) fn matches(&self, method: &str, path: &str) -> Option<(usize, Stash)> {
        if !self.methods.iter().any(|m| m == method) {
            return None;
        }

        let regex = if self.children.is_empty() {
            &self.full
        } else {
            &self.prefix
        };
        let captures = regex.captures(path)?;

        let mut stash = self.defaults.clone();
        for name in regex.capture_names().flatten() {
            if let Some(value) = captures.name(name) {
                if !value.as_str().is_empty() {
                    stash.insert(name, value.as_str());
                }
            }
        }

        let end = captures.get(0).map(|m| m.end()).unwrap_or(0);
        Some((end, stash))
    }
}
