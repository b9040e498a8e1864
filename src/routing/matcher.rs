//! Route matching.
//!
//! # Responsibilities
//! - Walk a route tree for a method and path
//! - Descend into nested routes with the unmatched remainder of the path
//! - Collect the chain of matched routes and the stash values they add
//!
//! # Design Decisions
//! - First match wins at every level, in registration order
//! - A parent whose children all fail makes the whole match fail (no backtracking)
//! - Inner captures override outer ones for the same name

use super::route::Route;
use super::router::Routes;
use crate::stash::Stash;

/// Routes selected for one request, outermost first.
#[derive(Debug, Clone, Default)]
pub struct Match<'a> {
    pub stack: Vec<&'a Route>,
}

impl<'a> Match<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, route: &'a Route) {
        self.stack.push(route);
    }

    /// The innermost (endpoint) route.
    pub fn endpoint(&self) -> Option<&'a Route> {
        self.stack.last().copied()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Find the chain of routes for `method` and `path`, with the stash
/// values collected along the way.
pub fn find<'a>(routes: &'a Routes, method: &str, path: &str) -> Option<(Match<'a>, Stash)> {
    let mut matched = Match::new();
    let mut stash = Stash::new();
    let mut current = routes;
    let mut remaining = path;

    loop {
        let (route, end, captured) = current
            .iter()
            .find_map(|route| route.matches(method, remaining).map(|(end, s)| (route, end, s)))?;

        matched.push(route);
        stash.merge(&captured);

        if route.routes().is_empty() {
            return Some((matched, stash));
        }
        current = route.routes();
        remaining = &remaining[end..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let mut routes = Routes::new();
        routes.get("/foo").name("first");
        routes.get("/foo").name("second");

        let (matched, _) = find(&routes, "GET", "/foo").unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.endpoint().unwrap().route_name(), Some("first"));
    }

    #[test]
    fn test_nested_remainder() {
        let mut routes = Routes::new();
        let parent = routes.under("/user/:id", |_| Ok(true));
        parent.routes_mut().get("/edit").name("edit");

        let (matched, stash) = find(&routes, "GET", "/user/42/edit").unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched.endpoint().unwrap().route_name(), Some("edit"));
        assert_eq!(stash.get_str("id").unwrap(), Some("42"));
    }

    #[test]
    fn test_child_failure_fails_whole_match() {
        let mut routes = Routes::new();
        routes.under("/foo", |_| Ok(true)).routes_mut().get("/bar");
        routes.get("/foo").name("never reached");

        assert!(find(&routes, "GET", "/foo").is_none());
        assert!(find(&routes, "GET", "/foo/baz").is_none());
    }

    #[test]
    fn test_inner_capture_overrides_outer() {
        let mut routes = Routes::new();
        routes
            .under_with("/:section", Stash::from([("format", "html")]), |_| Ok(true))
            .routes_mut()
            .get("/:section");

        let (_, stash) = find(&routes, "GET", "/outer/inner").unwrap();
        assert_eq!(stash.get_str("section").unwrap(), Some("inner"));
        assert_eq!(stash.get_str("format").unwrap(), Some("html"));
    }
}
