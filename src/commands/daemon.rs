//! `daemon`: run the HTTP server until Ctrl-C.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use super::Command;
use crate::app::Application;
use crate::error::{Error, Result};
use crate::http::Server;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, Default)]
pub struct DaemonCommand;

#[derive(Debug, Parser)]
#[command(name = "daemon", no_binary_name = true)]
struct DaemonArgs {
    /// The host/port to listen on, e.g. "http://*:3000"
    #[arg(short, long)]
    listen: Option<String>,
}

/// Turn a listen location ("http://*:3000", "*:8080", ":3000") into a
/// bindable socket address string.
pub fn normalize_listen(listen: &str) -> String {
    let addr = listen
        .strip_prefix("http://")
        .unwrap_or(listen)
        .trim_end_matches('/');
    match addr.rsplit_once(':') {
        Some(("", port)) | Some(("*", port)) => format!("0.0.0.0:{}", port),
        _ => addr.to_string(),
    }
}

impl Command for DaemonCommand {
    fn description(&self) -> &str {
        "Start the web application server"
    }

    fn usage(&self) -> &str {
        "[OPTIONS]

OPTIONS
  -l, --listen <listen>            The host/port to listen on. Defaults to
                                   the configured bind address
                                   (\"http://*:3000\")
"
    }

    fn run(&self, app: &Arc<Application>, args: &[String], out: &mut dyn Write) -> Result<()> {
        let parsed = DaemonArgs::try_parse_from(args).map_err(|e| Error::Usage(e.to_string()))?;
        let config = app.config();
        let bind = parsed
            .listen
            .as_deref()
            .map(normalize_listen)
            .unwrap_or_else(|| config.listener.bind_address.clone());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => metrics::init_metrics(addr),
                    Err(_) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    ),
                }
            }

            let listener = TcpListener::bind(&bind).await?;
            let local_addr = listener.local_addr()?;
            writeln!(out, "Listening on http://{}", local_addr)?;
            out.flush()?;

            Server::new(Arc::clone(app))
                .run(listener, shutdown_signal())
                .await?;
            Ok::<(), Error>(())
        })
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_listen() {
        assert_eq!(normalize_listen("http://*:3000"), "0.0.0.0:3000");
        assert_eq!(normalize_listen("*:8080"), "0.0.0.0:8080");
        assert_eq!(normalize_listen(":3000"), "0.0.0.0:3000");
        assert_eq!(normalize_listen("http://127.0.0.1:3000/"), "127.0.0.1:3000");
        assert_eq!(normalize_listen("localhost:3000"), "localhost:3000");
    }

    #[test]
    fn test_parses_listen_flag() {
        let args = DaemonArgs::try_parse_from(["-l", "http://*:4000"]).unwrap();
        assert_eq!(args.listen.as_deref(), Some("http://*:4000"));

        let args = DaemonArgs::try_parse_from(["--listen", ":5000"]).unwrap();
        assert_eq!(args.listen.as_deref(), Some(":5000"));

        assert!(DaemonArgs::try_parse_from(["--bogus"]).is_err());
    }

    #[test]
    fn test_bad_arguments_are_usage_errors() {
        let app = Arc::new(Application::new());
        let mut out = Vec::new();
        let err = DaemonCommand
            .run(&app, &["--bogus".to_string()], &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }
}
