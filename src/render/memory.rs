//! Renderer that returns template text as-is.

use std::collections::HashMap;
use std::path::Path;

use super::Renderer;
use crate::app::Context;
use crate::error::{Error, Result};

/// Stores templates in memory and "renders" them verbatim. Useful in
/// tests where template syntax would get in the way.
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderer {
    templates: HashMap<String, String>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for MemoryRenderer {
    fn add_template(&mut self, name: &str, content: &str) -> Result<()> {
        self.templates.insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn add_path(&mut self, path: &Path) {
        tracing::debug!(path = %path.display(), "MemoryRenderer ignores template paths");
    }

    fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn render(&self, name: &str, _c: &Context<'_>) -> Result<String> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }
}
