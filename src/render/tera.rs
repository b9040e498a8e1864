//! `tera` backed renderer.
//!
//! # Responsibilities
//! - Keep a cache of parsed templates
//! - Load templates from search directories on first use
//! - Expose the stash to templates, both at top level and as `stash`
//!
//! # Design Decisions
//! - Directories added later are searched first
//! - Loaded files are cached for the life of the renderer
//! - The cache sits behind an `RwLock` so lazy loading works through `&self`

use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use ::tera::Tera;

use super::{Helper, Renderer};
use crate::app::Context;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct TeraRenderer {
    tera: RwLock<Tera>,
    paths: Vec<PathBuf>,
}

impl TeraRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search directories, highest precedence first.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn is_cached(&self, name: &str) -> bool {
        let tera = self.tera.read().unwrap_or_else(PoisonError::into_inner);
        let found = tera.get_template_names().any(|n| n == name);
        found
    }

    /// Make sure `name` is in the cache, reading it from the search
    /// directories if needed.
    fn ensure_loaded(&self, name: &str) -> Result<()> {
        if self.is_cached(name) {
            return Ok(());
        }

        let Some(path) = self.find_file(name) else {
            return Err(Error::TemplateNotFound(name.to_string()));
        };
        let content = std::fs::read_to_string(&path)?;
        tracing::debug!(template = %name, path = %path.display(), "Loaded template from disk");

        let mut tera = self.tera.write().unwrap_or_else(PoisonError::into_inner);
        tera.add_raw_template(name, &content)?;
        Ok(())
    }

    fn find_file(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        self.paths
            .iter()
            .map(|dir| dir.join(relative))
            .find(|path| path.is_file())
    }
}

impl Renderer for TeraRenderer {
    fn add_template(&mut self, name: &str, content: &str) -> Result<()> {
        self.tera
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .add_raw_template(name, content)?;
        Ok(())
    }

    fn add_path(&mut self, path: &Path) {
        self.paths.insert(0, path.to_path_buf());
    }

    fn add_helper(&mut self, name: &str, helper: Helper) {
        self.tera
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .register_function(name, helper);
    }

    fn has_template(&self, name: &str) -> bool {
        self.is_cached(name) || self.find_file(name).is_some()
    }

    fn render(&self, name: &str, c: &Context<'_>) -> Result<String> {
        self.ensure_loaded(name)?;

        let mut context = ::tera::Context::from_serialize(&c.stash)?;
        context.insert("stash", &c.stash);

        let tera = self.tera.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tera.render(name, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::app::Application;
    use crate::http::{Request, Response};

    #[test]
    fn test_render_stash() {
        let mut renderer = TeraRenderer::new();
        renderer
            .add_template("greet", "Hello, {{ name }}! ({{ stash.name }})")
            .unwrap();

        let app = Application::new();
        let mut c = app.build_context(Request::new("GET", "/"), Response::new());
        c.stash.insert("name", "Gophers");

        assert_eq!(renderer.render("greet", &c).unwrap(), "Hello, Gophers! (Gophers)");
    }

    #[test]
    fn test_later_paths_take_precedence() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("page"), "first").unwrap();
        std::fs::write(second.path().join("page"), "second").unwrap();
        std::fs::write(first.path().join("only_first"), "fallback").unwrap();

        let mut renderer = TeraRenderer::new();
        renderer.add_path(first.path());
        renderer.add_path(second.path());

        let app = Application::new();
        let c = app.build_context(Request::new("GET", "/"), Response::new());
        assert_eq!(renderer.render("page", &c).unwrap(), "second");
        assert_eq!(renderer.render("only_first", &c).unwrap(), "fallback");
        assert!(renderer.has_template("page"));
    }

    #[test]
    fn test_missing_template() {
        let renderer = TeraRenderer::new();
        let app = Application::new();
        let c = app.build_context(Request::new("GET", "/"), Response::new());

        assert!(!renderer.has_template("nope"));
        assert!(matches!(
            renderer.render("nope", &c),
            Err(Error::TemplateNotFound(name)) if name == "nope"
        ));
        assert!(matches!(
            renderer.render("../etc/passwd", &c),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_helper() {
        let mut renderer = TeraRenderer::new();
        renderer.add_helper(
            "shout",
            Box::new(|args: &HashMap<String, ::tera::Value>| -> ::tera::Result<::tera::Value> {
                let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
                Ok(::tera::Value::String(text.to_uppercase()))
            }),
        );
        renderer
            .add_template("loud", r#"{{ shout(text="bite my shiny metal") }}"#)
            .unwrap();

        let app = Application::new();
        let c = app.build_context(Request::new("GET", "/"), Response::new());
        assert_eq!(renderer.render("loud", &c).unwrap(), "BITE MY SHINY METAL");
    }
}
