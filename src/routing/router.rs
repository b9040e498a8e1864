//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Match a request context against them
//! - Call the handlers of the matched chain
//!
//! # Design Decisions
//! - Registration order is priority order; there is no specificity sorting
//! - No match is a 404 response, not an error
//! - An `under` handler returning `false` stops the chain; output already
//!   produced by earlier handlers stands

use super::matcher::{self, Match};
use super::route::{Handler, Route};
use crate::app::Context;
use crate::error::{HandlerResult, Result};
use crate::stash::Stash;

/// Methods an `under` route answers to.
pub const UNDER_METHODS: [&str; 5] = ["GET", "POST", "PATCH", "PUT", "DELETE"];

#[derive(Debug, Default)]
pub struct Routes {
    routes: Vec<Route>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route for any of `methods`, returning an error if the
    /// path does not compile.
    pub fn try_any_with(
        &mut self,
        methods: &[&str],
        path: &str,
        defaults: Stash,
    ) -> Result<&mut Route> {
        let route = Route::new(methods, path, defaults)?;
        self.routes.push(route);
        let index = self.routes.len() - 1;
        Ok(&mut self.routes[index])
    }

    /// Register a route for any of `methods`.
    ///
    /// # Panics
    ///
    /// Panics if raw regex text in `path` is invalid. Routes are
    /// registered at startup, so this is a programming error; use
    /// [`Routes::try_any_with`] to handle it instead.
    pub fn any_with(&mut self, methods: &[&str], path: &str, defaults: Stash) -> &mut Route {
        match self.try_any_with(methods, path, defaults) {
            Ok(route) => route,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn any(&mut self, methods: &[&str], path: &str) -> &mut Route {
        self.any_with(methods, path, Stash::new())
    }

    pub fn get(&mut self, path: &str) -> &mut Route {
        self.any(&["GET"], path)
    }

    pub fn get_with(&mut self, path: &str, defaults: Stash) -> &mut Route {
        self.any_with(&["GET"], path, defaults)
    }

    pub fn post(&mut self, path: &str) -> &mut Route {
        self.any(&["POST"], path)
    }

    pub fn post_with(&mut self, path: &str, defaults: Stash) -> &mut Route {
        self.any_with(&["POST"], path, defaults)
    }

    pub fn put(&mut self, path: &str) -> &mut Route {
        self.any(&["PUT"], path)
    }

    pub fn put_with(&mut self, path: &str, defaults: Stash) -> &mut Route {
        self.any_with(&["PUT"], path, defaults)
    }

    pub fn patch(&mut self, path: &str) -> &mut Route {
        self.any(&["PATCH"], path)
    }

    pub fn patch_with(&mut self, path: &str, defaults: Stash) -> &mut Route {
        self.any_with(&["PATCH"], path, defaults)
    }

    pub fn delete(&mut self, path: &str) -> &mut Route {
        self.any(&["DELETE"], path)
    }

    pub fn delete_with(&mut self, path: &str, defaults: Stash) -> &mut Route {
        self.any_with(&["DELETE"], path, defaults)
    }

    /// Register an intermediate route. Its handler decides whether
    /// dispatch continues into the nested routes, which are added through
    /// [`Route::routes_mut`].
    pub fn under<F>(&mut self, path: &str, handler: F) -> &mut Route
    where
        F: Fn(&mut Context<'_>) -> HandlerResult<bool> + Send + Sync + 'static,
    {
        self.under_with(path, Stash::new(), handler)
    }

    pub fn under_with<F>(&mut self, path: &str, defaults: Stash, handler: F) -> &mut Route
    where
        F: Fn(&mut Context<'_>) -> HandlerResult<bool> + Send + Sync + 'static,
    {
        let wrapped: Handler = Box::new(move |c: &mut Context<'_>| {
            c.continue_dispatch = handler(c)?;
            Ok(())
        });
        let route = self.any_with(&UNDER_METHODS, path, defaults);
        route.set_handler(wrapped);
        route
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Depth-first search for a route by name.
    pub fn find_named(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find_map(|route| {
            if route.route_name() == Some(name) {
                Some(route)
            } else {
                route.routes().find_named(name)
            }
        })
    }

    /// Match the context's method and path (stash `path`, falling back to
    /// the request path). On success sets `c.matched` and merges the
    /// captured values into the stash; on failure leaves `c.matched` unset.
    pub fn route_match<'a>(&'a self, c: &mut Context<'a>) {
        self.match_path(c);
    }

    /// [`Routes::route_match`], returning the path that was matched.
    fn match_path<'a>(&'a self, c: &mut Context<'a>) -> String {
        c.matched = None;

        let path = match c.stash.get_str("path") {
            Ok(Some(path)) => path.to_string(),
            Ok(None) => c.req.path().to_string(),
            Err(e) => {
                tracing::debug!(error = %e, path = %c.req.path(), "Ignoring stash path, matching request path");
                c.req.path().to_string()
            }
        };

        if let Some((matched, stash)) = matcher::find(self, &c.req.method, &path) {
            c.stash.merge(&stash);
            c.matched = Some(matched);
        }
        path
    }

    /// Match the context and call every handler in the matched chain.
    /// Sets a 404 when nothing matches. Handler errors are returned as-is.
    pub fn dispatch<'a>(&'a self, c: &mut Context<'a>) -> HandlerResult {
        let path = self.match_path(c);

        let Some(Match { stack }) = c.matched.clone() else {
            tracing::debug!(method = %c.req.method, path = %path, "No route matched");
            c.res.set_code(404);
            return Ok(());
        };

        for route in stack {
            c.continue_dispatch = true;
            if let Some(handler) = route.handler() {
                handler(c)?;
            }
            if !c.continue_dispatch {
                tracing::debug!(path = %route.path(), "Dispatch stopped by under route");
                break;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Routes {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Application;
    use crate::http::{Request, Response};

    #[test]
    fn test_find_named_nested() {
        let mut routes = Routes::new();
        routes.get("/").name("index");
        routes
            .under("/admin", |_| Ok(true))
            .routes_mut()
            .get("/users")
            .name("admin_users");

        assert_eq!(routes.find_named("index").unwrap().path(), "/");
        assert_eq!(routes.find_named("admin_users").unwrap().path(), "/users");
        assert!(routes.find_named("missing").is_none());
    }

    #[test]
    fn test_try_any_with_reports_bad_pattern() {
        let mut routes = Routes::new();
        assert!(routes.try_any_with(&["GET"], "/(?P<id>", Stash::new()).is_err());
        assert!(routes.is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid route pattern")]
    fn test_any_panics_on_bad_pattern() {
        let mut routes = Routes::new();
        routes.get("/[");
    }

    #[test]
    fn test_match_uses_stash_path() {
        let app = Application::new();
        let mut routes = Routes::new();
        routes.get("/rewritten").name("rewritten");
        routes.get("/original").name("original");

        let mut c = app.build_context(Request::new("GET", "/original"), Response::new());
        c.stash.insert("path", "/rewritten");
        routes.route_match(&mut c);
        let endpoint = c.matched.as_ref().and_then(Match::endpoint);
        assert_eq!(endpoint.and_then(Route::route_name), Some("rewritten"));
    }

    #[test]
    fn test_non_string_stash_path_falls_back_to_request() {
        let app = Application::new();
        let mut routes = Routes::new();
        routes.get("/original").name("original");

        let mut c = app.build_context(Request::new("GET", "/original"), Response::new());
        c.stash.insert("path", 42);
        assert_eq!(routes.match_path(&mut c), "/original");
        let endpoint = c.matched.as_ref().and_then(Match::endpoint);
        assert_eq!(endpoint.and_then(Route::route_name), Some("original"));
    }

    #[test]
    fn test_under_methods() {
        let mut routes = Routes::new();
        let route = routes.under("/foo", |_| Ok(true));
        assert_eq!(route.methods(), ["GET", "POST", "PATCH", "PUT", "DELETE"]);
        assert!(route.handler().is_some());
    }
}
