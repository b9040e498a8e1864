//! The application: routes, hooks, renderer, static files and commands.
//!
//! # Responsibilities
//! - Own everything registered at startup
//! - Run the request lifecycle for one [`Context`]
//! - Turn handler errors and panics into `500` responses
//! - Dispatch command-line invocations to [`Command`]s
//!
//! # Design Decisions
//! - Registration takes `&mut self`; serving takes `&self`. Once wrapped in
//!   an `Arc` the application is read-only and shared by every request
//! - `AfterDispatch` hooks run even when routing failed or a handler errored
//! - A panic skips the remaining hooks; the client still gets a `500`
//!   unless the head was already sent

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use super::context::Context;
use super::hooks::{HookHandler, Hooks, AFTER_DISPATCH, AFTER_STATIC, BEFORE_DISPATCH};
use crate::commands::{self, Command, DEFAULT_COMMAND};
use crate::config::{load_config, AppConfig};
use crate::error::{Error, HandlerResult, Result};
use crate::http::{Request, Response};
use crate::render::{tera::TeraRenderer, Renderer};
use crate::routing::Routes;
use crate::static_files::{Static, StaticServer};

pub struct Application {
    routes: Routes,
    hooks: Hooks,
    renderer: Box<dyn Renderer>,
    static_server: Box<dyn StaticServer>,
    commands: BTreeMap<String, Box<dyn Command>>,
    config: AppConfig,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("routes", &self.routes)
            .field("hooks", &self.hooks)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    /// An application with no static directories and no template
    /// directories. Templates can still be added in memory.
    pub fn new() -> Self {
        Self {
            routes: Routes::new(),
            hooks: Hooks::new(),
            renderer: Box::new(TeraRenderer::new()),
            static_server: Box::new(Static::new()),
            commands: commands::builtin()
                .into_iter()
                .map(|(name, command)| (name.to_string(), command))
                .collect(),
            config: AppConfig::default(),
        }
    }

    /// An application serving static files and templates from the
    /// directories named in `config`.
    pub fn with_config(config: AppConfig) -> Self {
        let mut app = Self::new();

        let mut static_files = Static::new();
        for path in &config.static_files.paths {
            static_files.add_path(path);
        }
        app.static_server = Box::new(static_files);

        for path in &config.templates.paths {
            app.renderer.add_path(Path::new(path));
        }

        tracing::debug!(
            static_paths = ?config.static_files.paths,
            template_paths = ?config.templates.paths,
            "Application configured"
        );
        app.config = config;
        app
    }

    /// Load and validate a TOML config file, then build from it.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = load_config(path.as_ref())?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut Routes {
        &mut self.routes
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn set_renderer(&mut self, renderer: impl Renderer + 'static) {
        self.renderer = Box::new(renderer);
    }

    pub fn set_static(&mut self, static_server: impl StaticServer + 'static) {
        self.static_server = Box::new(static_server);
    }

    /// Append a handler to the hook `name`.
    pub fn hook<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        let handler: HookHandler = Box::new(handler);
        self.hooks.add(name, handler);
    }

    /// Run the handlers of hook `name`. Unknown names do nothing.
    pub fn emit(&self, name: &str, c: &mut Context<'_>) -> HandlerResult {
        self.hooks.emit(name, c)
    }

    /// Register or replace a command.
    pub fn add_command(&mut self, name: impl Into<String>, command: impl Command + 'static) {
        self.commands.insert(name.into(), Box::new(command));
    }

    pub fn command(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|command| command.as_ref())
    }

    /// Every command, sorted by name.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &dyn Command)> {
        self.commands
            .iter()
            .map(|(name, command)| (name.as_str(), command.as_ref()))
    }

    /// A context for `req` with the stash `path` set to the request path.
    pub fn build_context(&self, req: Request, res: Response) -> Context<'_> {
        let path = req.path().to_string();
        let mut c = Context::new(self, req, res);
        c.stash.insert("path", path);
        c
    }

    /// Run the full request lifecycle and write the response.
    pub fn handler<'a>(&'a self, c: &mut Context<'a>) {
        if let Err(e) = self.dispatch(c) {
            fail(c, &e);
        }

        if let Err(e) = self.hooks.emit(AFTER_DISPATCH, c) {
            fail(c, &e);
        }

        if !c.is_rendered() {
            if let Err(e) = c.finalize_render() {
                fail(c, &e);
            }
        }

        if c.res.code == 0 {
            c.res.set_code(200);
        }

        if let Err(e) = c.res.write_to_writer() {
            tracing::warn!(error = %e, path = %c.req.path(), "Failed to write response");
        }
    }

    /// [`Application::handler`] behind a panic boundary.
    pub fn serve<'a>(&'a self, c: &mut Context<'a>) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.handler(c)));
        let Err(payload) = result else {
            return;
        };

        tracing::error!(
            method = %c.req.method,
            path = %c.req.path(),
            panic = %panic_message(payload.as_ref()),
            "Handler panicked"
        );
        if c.res.head_written() {
            return;
        }
        c.internal_error();
        if let Err(e) = c.res.write_to_writer() {
            tracing::warn!(error = %e, "Failed to write error response");
        }
    }

    fn dispatch<'a>(&'a self, c: &mut Context<'a>) -> HandlerResult {
        self.hooks.emit(BEFORE_DISPATCH, c)?;

        if self.static_server.dispatch(c) {
            return self.hooks.emit(AFTER_STATIC, c);
        }

        self.routes.dispatch(c)
    }

    /// Run the command named by the process arguments.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.start_with_args(&args)
    }

    /// Run the command named by `args[0]` (default `help`) with the rest
    /// of `args`, writing to stdout.
    pub fn start_with_args(self: &Arc<Self>, args: &[String]) -> Result<()> {
        let (name, rest) = match args.split_first() {
            Some((name, rest)) => (name.as_str(), rest),
            None => (DEFAULT_COMMAND, args),
        };
        let command = self
            .command(name)
            .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;

        tracing::debug!(command = name, "Running command");
        command.run(self, rest, &mut std::io::stdout())
    }
}

fn fail(c: &mut Context<'_>, e: &Error) {
    tracing::error!(
        method = %c.req.method,
        path = %c.req.path(),
        error = %e,
        "Request failed"
    );
    if !c.res.head_written() {
        c.internal_error();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Recorder;
    use crate::static_files::MemorySource;
    use crate::stash::Stash;

    fn run(app: &Application, method: &str, path: &str) -> Recorder {
        let recorder = Recorder::new();
        let res = Response::new().with_writer(recorder.clone());
        let mut c = app.build_context(Request::new(method, path), res);
        app.serve(&mut c);
        recorder
    }

    #[test]
    fn test_build_context_sets_path() {
        let app = Application::new();
        let c = app.build_context(Request::new("GET", "/foo?x=1"), Response::new());
        assert_eq!(c.stash.get_str("path").unwrap(), Some("/foo"));
    }

    #[test]
    fn test_defaults_to_200() {
        let mut app = Application::new();
        app.routes_mut().get("/").to(|_| Ok(()));

        let recorder = run(&app, "GET", "/");
        assert_eq!(recorder.code(), Some(200));
        assert_eq!(recorder.text(), "");
    }

    #[test]
    fn test_not_found() {
        let app = Application::new();
        let recorder = run(&app, "GET", "/missing");
        assert_eq!(recorder.code(), Some(404));
        assert_eq!(recorder.text(), "");
    }

    #[test]
    fn test_before_dispatch_can_rewrite_path() {
        let mut app = Application::new();
        app.hook(BEFORE_DISPATCH, |c| {
            c.stash.insert("path", "/rewritten");
            Ok(())
        });
        app.routes_mut().get("/rewritten").to(|c| {
            c.res.text("rewritten");
            Ok(())
        });

        assert_eq!(run(&app, "GET", "/original").text(), "rewritten");
    }

    #[test]
    fn test_after_dispatch_runs_after_error() {
        let mut app = Application::new();
        app.routes_mut()
            .get("/")
            .to(|_| Err(Error::handler("boom")));
        app.hook(AFTER_DISPATCH, |c| {
            c.res.headers.set("X-After", "yes");
            Ok(())
        });

        let recorder = run(&app, "GET", "/");
        assert_eq!(recorder.code(), Some(500));
        assert_eq!(recorder.text(), "Internal Server Error");
        assert_eq!(recorder.headers().header("X-After"), "yes");
    }

    #[test]
    fn test_panic_becomes_500() {
        let mut app = Application::new();
        app.routes_mut().get("/").to(|_| panic!("handler exploded"));

        let recorder = run(&app, "GET", "/");
        assert_eq!(recorder.code(), Some(500));
        assert_eq!(recorder.text(), "Internal Server Error");
    }

    #[test]
    fn test_static_skips_routes() {
        let mut app = Application::new();
        app.set_static(Static::new().with_source(MemorySource::new().with_file("a.txt", "file")));
        app.routes_mut().get("/a.txt").to(|c| {
            c.res.text("route");
            Ok(())
        });
        app.hook(AFTER_STATIC, |c| {
            c.stash.insert("static", true);
            c.res.headers.set("X-Static", "1");
            Ok(())
        });

        let recorder = run(&app, "GET", "/a.txt");
        assert_eq!(recorder.text(), "file");
        assert_eq!(recorder.headers().header("X-Static"), "1");

        assert_eq!(run(&app, "POST", "/a.txt").code(), Some(404));
    }

    #[test]
    fn test_stash_status_applied_without_render() {
        let mut app = Application::new();
        app.routes_mut()
            .get_with("/", Stash::from([("status", 201)]))
            .to(|c| {
                c.res.text("created");
                Ok(())
            });

        let recorder = run(&app, "GET", "/");
        assert_eq!(recorder.code(), Some(201));
        assert_eq!(recorder.text(), "created");
    }

    #[test]
    fn test_captured_status_applied() {
        let mut app = Application::new();
        app.routes_mut().get("/error/:status").to(|c| {
            c.res.text("custom error page");
            Ok(())
        });

        let recorder = run(&app, "GET", "/error/404");
        assert_eq!(recorder.code(), Some(404));
        assert_eq!(recorder.text(), "custom error page");

        let recorder = run(&app, "GET", "/error/oops");
        assert_eq!(recorder.code(), Some(500));
    }

    #[test]
    fn test_commands_sorted() {
        let app = Application::new();
        let names: Vec<&str> = app.commands().map(|(name, _)| name).collect();
        assert_eq!(names, ["daemon", "help", "routes", "version"]);
    }

    #[test]
    fn test_unknown_command() {
        let app = Arc::new(Application::new());
        let err = app.start_with_args(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, Error::CommandNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_with_config_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "Hello from disk").unwrap();

        let mut config = AppConfig::default();
        config.static_files.paths = vec![dir.path().to_string_lossy().into_owned()];
        config.templates.paths = vec![dir.path().to_string_lossy().into_owned()];
        let app = Application::with_config(config);

        assert_eq!(run(&app, "GET", "/hello.txt").text(), "Hello from disk");
        assert!(app.renderer().has_template("hello.txt"));
    }
}
