//! A Mojolicious-style web framework.
//!
//! Routes with placeholders and nested `under` routes, named hooks around
//! dispatch, template rendering, static files with conditional and range
//! requests, and a small command-line layer (`daemon`, `routes`, ...).

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod render;
pub mod routing;
pub mod stash;
pub mod static_files;
pub mod testing;

pub use app::{Application, Context};
pub use config::AppConfig;
pub use error::{Error, HandlerResult, Result};
pub use http::{Request, Response, Server};
pub use routing::{Route, Routes};
pub use stash::{Stash, Value};
