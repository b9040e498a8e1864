//! `routes`: print the route tree.

use std::io::Write;
use std::sync::Arc;

use super::Command;
use crate::app::Application;
use crate::error::Result;
use crate::routing::Routes;

#[derive(Debug, Clone, Copy, Default)]
pub struct RoutesCommand;

impl Command for RoutesCommand {
    fn description(&self) -> &str {
        "Show available routes"
    }

    fn usage(&self) -> &str {
        "

Lists every route with its methods and name. Nested routes are indented
under the route they belong to.
"
    }

    fn run(&self, app: &Arc<Application>, _args: &[String], out: &mut dyn Write) -> Result<()> {
        write_tree(app.routes(), 0, out)
    }
}

fn write_tree(routes: &Routes, depth: usize, out: &mut dyn Write) -> Result<()> {
    for route in routes {
        let path = format!("{}{}", "  ".repeat(depth), route.path());
        let line = format!(
            "{:<32} {:<24} {}",
            path,
            route.methods().join(","),
            route.route_name().unwrap_or("")
        );
        writeln!(out, "{}", line.trim_end())?;
        write_tree(route.routes(), depth + 1, out)?;
    }
    Ok(())
}
