//! Application commands.
//!
//! # Responsibilities
//! - Define the [`Command`] capability
//! - Provide the built-in commands every application gets
//!
//! # Design Decisions
//! - Commands write to a caller-supplied sink so their output is testable
//! - Argument parsing inside a command uses `clap`; the command name itself
//!   is picked by `Application::start_with_args`

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::app::Application;
use crate::error::Result;

pub mod daemon;
pub mod help;
pub mod routes;
pub mod version;

pub use daemon::DaemonCommand;
pub use help::HelpCommand;
pub use routes::RoutesCommand;
pub use version::VersionCommand;

/// The command run when none is named.
pub const DEFAULT_COMMAND: &str = "help";

pub trait Command: Send + Sync {
    /// One line shown in the command list.
    fn description(&self) -> &str;

    /// Full usage text, shown after `Usage: <program> <command>`.
    fn usage(&self) -> &str;

    fn run(&self, app: &Arc<Application>, args: &[String], out: &mut dyn Write) -> Result<()>;
}

/// Built-in commands, as `(name, command)` pairs.
pub fn builtin() -> Vec<(&'static str, Box<dyn Command>)> {
    vec![
        ("daemon", Box::new(DaemonCommand) as Box<dyn Command>),
        ("help", Box::new(HelpCommand) as Box<dyn Command>),
        ("routes", Box::new(RoutesCommand) as Box<dyn Command>),
        ("version", Box::new(VersionCommand) as Box<dyn Command>),
    ]
}

/// File name of the running executable, for usage lines.
pub fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "mojo".to_string())
}
