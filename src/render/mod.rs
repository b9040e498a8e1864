//! Template rendering.
//!
//! # Responsibilities
//! - Define the [`Renderer`] capability the context renders through
//! - Provide a `tera` backed implementation and an in-memory one
//!
//! # Design Decisions
//! - Renderers are shared by every request, so rendering takes `&self`
//! - Registration (`add_*`) takes `&mut self` and happens at startup
//! - A missing template is an error for the caller, never an empty string

use std::collections::HashMap;
use std::path::Path;

use crate::app::Context;
use crate::error::Result;

pub mod memory;
pub mod tera;

pub use self::memory::MemoryRenderer;
pub use self::tera::TeraRenderer;

/// A template helper function, callable from templates by name.
pub type Helper = Box<
    dyn Fn(&HashMap<String, ::tera::Value>) -> ::tera::Result<::tera::Value> + Send + Sync,
>;

pub trait Renderer: Send + Sync {
    /// Register a template from a string.
    fn add_template(&mut self, name: &str, content: &str) -> Result<()>;

    /// Add a directory to search for templates not registered directly.
    fn add_path(&mut self, path: &Path);

    /// Register a helper function. Renderers without helpers ignore it.
    fn add_helper(&mut self, name: &str, helper: Helper) {
        let _ = helper;
        tracing::debug!(helper = %name, "Renderer does not support helpers");
    }

    fn has_template(&self, name: &str) -> bool;

    /// Render a template with the context's stash.
    fn render(&self, name: &str, c: &Context<'_>) -> Result<String>;
}
