//! Named extension points around dispatch.

use std::collections::HashMap;
use std::fmt;

use super::Context;
use crate::error::HandlerResult;

/// Before static files and routes.
pub const BEFORE_DISPATCH: &str = "BeforeDispatch";
/// After routes (or static files), also after a 404.
pub const AFTER_DISPATCH: &str = "AfterDispatch";
/// After a static file was served.
pub const AFTER_STATIC: &str = "AfterStatic";

pub type HookHandler = Box<dyn Fn(&mut Context<'_>) -> HandlerResult + Send + Sync>;

/// Hook name → handlers, in registration order.
#[derive(Default)]
pub struct Hooks {
    handlers: HashMap<String, Vec<HookHandler>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, handlers) in &self.handlers {
            map.entry(name, &handlers.len());
        }
        map.finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, handler: HookHandler) {
        self.handlers.entry(name.to_string()).or_default().push(handler);
    }

    /// Number of handlers registered for `name`.
    pub fn count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    /// Run every handler for `name` in order, stopping at the first error.
    /// Unknown names do nothing.
    pub fn emit(&self, name: &str, c: &mut Context<'_>) -> HandlerResult {
        let Some(handlers) = self.handlers.get(name) else {
            return Ok(());
        };
        for handler in handlers {
            handler(c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Application;
    use crate::http::{Request, Response};

    fn append(c: &mut Context<'_>, text: &str) -> HandlerResult {
        c.res.content.add_chunk(text.as_bytes())
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut app = Application::new();
        app.hook(BEFORE_DISPATCH, |c| append(c, "1"));
        app.hook(BEFORE_DISPATCH, |c| append(c, "2"));
        app.hook(AFTER_DISPATCH, |c| append(c, "after"));

        let mut c = app.build_context(Request::new("GET", "/"), Response::new());
        app.emit(BEFORE_DISPATCH, &mut c).unwrap();
        assert_eq!(c.res.content.to_string_lossy(), "12");
    }

    #[test]
    fn test_unknown_hook_is_noop() {
        let mut app = Application::new();
        app.hook(BEFORE_DISPATCH, |c| {
            append(c, "1")?;
            c.app().emit("NoSuchHook", c)?;
            append(c, "3")
        });

        let mut c = app.build_context(Request::new("GET", "/"), Response::new());
        app.emit(BEFORE_DISPATCH, &mut c).unwrap();
        app.emit("NoSuchHook", &mut c).unwrap();
        assert_eq!(c.res.content.to_string_lossy(), "13");
        assert!(c.res.headers.is_empty());
    }

    #[test]
    fn test_emit_stops_at_first_error() {
        let mut hooks = Hooks::new();
        hooks.add(AFTER_STATIC, Box::new(|c: &mut Context<'_>| append(c, "first")));
        hooks.add(AFTER_STATIC, Box::new(|_: &mut Context<'_>| Err(crate::error::Error::handler("nope"))));
        hooks.add(AFTER_STATIC, Box::new(|c: &mut Context<'_>| append(c, "never")));
        assert_eq!(hooks.count(AFTER_STATIC), 3);
        assert_eq!(hooks.count("NoSuchHook"), 0);

        let app = Application::new();
        let mut c = app.build_context(Request::new("GET", "/"), Response::new());
        assert!(hooks.emit(AFTER_STATIC, &mut c).is_err());
        assert!(hooks.emit("NoSuchHook", &mut c).is_ok());
        assert_eq!(c.res.content.to_string_lossy(), "first");
    }
}
