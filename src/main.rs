//! `mojo`: a small demo application.
//!
//! ```text
//! mojo daemon -l http://*:3000
//! curl http://localhost:3000/Mojolicious   # Hello, Mojolicious!
//! ```
//!
//! Set `MOJO_CONFIG` to a TOML file to override the defaults.

use std::process::ExitCode;
use std::sync::Arc;

use mojo::config::AppConfig;
use mojo::observability::init_logging;
use mojo::{Application, Stash};

fn main() -> ExitCode {
    let app = match std::env::var("MOJO_CONFIG") {
        Ok(path) => match Application::from_config_file(&path) {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        Err(_) => Application::with_config(AppConfig::default()),
    };
    init_logging(&app.config().observability);

    let mut app = app;
    app.routes_mut()
        .get_with("/:who", Stash::from([("who", "World")]))
        .name("hello")
        .to(|c| {
            let who = c.param("who")?;
            c.res.text(format!("Hello, {}!", who));
            Ok(())
        });

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mojo starting");

    match Arc::new(app).start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
