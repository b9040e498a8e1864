//! Per-request state.
//!
//! # Responsibilities
//! - Own the request, response and stash for one request
//! - Carry the matched route chain and the dispatch/render flags
//! - Resolve parameters (stash first, then request)
//! - Render templates into the response
//!
//! A context is owned by exactly one thread for the whole request and
//! borrows the application read-only.

use crate::error::{Error, Result};
use crate::http::response::HTML;
use crate::http::{Request, Response};
use crate::routing::Match;
use crate::stash::{Stash, Value};

use super::Application;

pub struct Context<'a> {
    pub req: Request,
    pub res: Response,
    pub stash: Stash,
    /// Routes selected by the last match, or `None` when nothing matched.
    pub matched: Option<Match<'a>>,
    app: &'a Application,
    rendered: bool,
    pub(crate) continue_dispatch: bool,
}

impl<'a> Context<'a> {
    /// A bare context. Use [`Application::build_context`] to also get the
    /// default stash values.
    pub fn new(app: &'a Application, req: Request, res: Response) -> Self {
        Self {
            req,
            res,
            stash: Stash::new(),
            matched: None,
            app,
            rendered: false,
            continue_dispatch: true,
        }
    }

    pub fn app(&self) -> &'a Application {
        self.app
    }

    /// A parameter value: the stash wins over request parameters. Fails
    /// when the stash holds a non-string value under `name`.
    pub fn param(&self, name: &str) -> Result<String> {
        if let Some(value) = self.stash.get_str(name)? {
            return Ok(value.to_string());
        }
        Ok(self.req.param(name))
    }

    /// Every value of a request parameter, or the single stash value if
    /// the stash has one.
    pub fn every_param(&self, name: &str) -> Result<Vec<String>> {
        if let Some(value) = self.stash.get_str(name)? {
            return Ok(vec![value.to_string()]);
        }
        Ok(self.req.every_param(name))
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Render a template into the response as HTML.
    pub fn render(&mut self, name: &str) -> Result<()> {
        let output = self.render_string(name)?;
        self.res.headers.set_content_type(HTML);
        self.res.content = output.into();
        self.finalize_render()
    }

    /// Render a template and return the output without touching the
    /// response.
    pub fn render_string(&self, name: &str) -> Result<String> {
        self.app.renderer().render(name, self)
    }

    /// Finish rendering: apply a pending `status` from the stash and mark
    /// the context rendered. Content is left as it is.
    pub fn finalize_render(&mut self) -> Result<()> {
        if let Some(code) = self.pending_status()? {
            self.res.set_code(code);
        }
        self.rendered = true;
        Ok(())
    }

    /// The stash `status`, either an int or a numeric string such as a
    /// captured `/error/:status` placeholder.
    fn pending_status(&self) -> Result<Option<u16>> {
        let code = match self.stash.get("status") {
            None => return Ok(None),
            Some(Value::Int(n)) => u16::try_from(*n)
                .map_err(|_| Error::handler(format!("invalid status code {}", n)))?,
            Some(Value::Str(s)) => s.trim().parse().map_err(|_| Error::StashTypeMismatch {
                key: "status".to_string(),
                expected: "int",
                found: "string",
            })?,
            Some(other) => {
                return Err(Error::StashTypeMismatch {
                    key: "status".to_string(),
                    expected: "int",
                    found: other.type_name(),
                })
            }
        };
        Ok(Some(code))
    }

    /// Replace the response with a bare `500 Internal Server Error`.
    pub(crate) fn internal_error(&mut self) {
        self.res.reset();
        self.res.set_code(500);
        self.res.text("Internal Server Error");
        self.rendered = true;
    }
}
