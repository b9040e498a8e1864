//! `version`: show the framework version.

use std::io::Write;
use std::sync::Arc;

use super::Command;
use crate::app::Application;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct VersionCommand;

impl Command for VersionCommand {
    fn description(&self) -> &str {
        "Show the current framework version"
    }

    fn usage(&self) -> &str {
        ""
    }

    fn run(&self, _app: &Arc<Application>, _args: &[String], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "CORE")?;
        writeln!(out, "  {:<9}{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
        Ok(())
    }
}
