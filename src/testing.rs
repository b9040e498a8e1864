//! In-process test helper.
//!
//! ```no_run
//! use mojo::{testing::Tester, Application};
//!
//! let mut app = Application::new();
//! app.routes_mut().get("/").to(|c| {
//!     c.res.text("Hello");
//!     Ok(())
//! });
//!
//! Tester::new(&app).get_ok("/").status_is(200).text_is("Hello");
//! ```
//!
//! Requests run through [`Application::handler`] with a [`Recorder`]
//! attached. Failed assertions panic with a message naming the request.

use std::panic::{self, AssertUnwindSafe};

use crate::app::Application;
use crate::http::{Recorder, Recording, Request, Response};

pub struct Tester<'a> {
    app: &'a Application,
    last: Option<(String, Recording)>,
}

impl<'a> Tester<'a> {
    pub fn new(app: &'a Application) -> Self {
        Self { app, last: None }
    }

    pub fn get_ok(&mut self, path: &str) -> &mut Self {
        self.request_ok("GET", path)
    }

    pub fn request_ok(&mut self, method: &str, path: &str) -> &mut Self {
        self.send_ok(Request::new(method, path))
    }

    /// Run `req` through the application. Panics if a handler panicked.
    pub fn send_ok(&mut self, req: Request) -> &mut Self {
        let name = format!("{} {}", req.method, req.url.path());
        let app = self.app;
        let recorder = Recorder::new();
        let mut c = app.build_context(req, Response::new().with_writer(recorder.clone()));

        if panic::catch_unwind(AssertUnwindSafe(|| app.handler(&mut c))).is_err() {
            panic!("Failed test '{}': panic in route handler", name);
        }

        self.last = Some((name, recorder.recording()));
        self
    }

    /// What the last request wrote.
    pub fn recording(&self) -> &Recording {
        &self.current().1
    }

    pub fn status_is(&mut self, code: u16) -> &mut Self {
        let (name, recording) = self.current();
        if recording.code != Some(code) {
            panic!(
                "Failed test '{}': status {:?} != {}",
                name, recording.code, code
            );
        }
        self
    }

    pub fn text_is(&mut self, text: &str) -> &mut Self {
        let (name, recording) = self.current();
        let body = String::from_utf8_lossy(&recording.body);
        if body != text {
            panic!("Failed test '{}': content {:?} != {:?}", name, body, text);
        }
        self
    }

    pub fn header_is(&mut self, header: &str, value: &str) -> &mut Self {
        let (name, recording) = self.current();
        let actual = recording.headers.header(header);
        if actual != value {
            panic!(
                "Failed test '{}': header {} is {:?}, expected {:?}",
                name, header, actual, value
            );
        }
        self
    }

    fn current(&self) -> &(String, Recording) {
        match &self.last {
            Some(last) => last,
            None => panic!("No request has been made yet"),
        }
    }
}
