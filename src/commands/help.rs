//! `help`: list commands or show one command's usage.

use std::io::Write;
use std::sync::Arc;

use super::{program_name, Command};
use crate::app::Application;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct HelpCommand;

impl Command for HelpCommand {
    fn description(&self) -> &str {
        "Display help for commands"
    }

    fn usage(&self) -> &str {
        "[COMMAND]

ARGUMENTS
  COMMAND                          Display help for the given command
"
    }

    fn run(&self, app: &Arc<Application>, args: &[String], out: &mut dyn Write) -> Result<()> {
        let program = program_name();

        let Some(name) = args.first() else {
            writeln!(out, "Usage: {} COMMAND [OPTIONS]\n", program)?;
            writeln!(out, "Commands:")?;
            for (name, command) in app.commands() {
                writeln!(out, " {:<10}- {}", name, command.description())?;
            }
            return Ok(());
        };

        let command = app
            .command(name)
            .ok_or_else(|| Error::CommandNotFound(name.clone()))?;
        writeln!(out, "Usage: {} {} {}", program, name, command.usage())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Result<String> {
        let app = Arc::new(Application::new());
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let mut out = Vec::new();
        HelpCommand.run(&app, &args, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_lists_commands_sorted() {
        let out = run(&[]).unwrap();
        assert!(out.contains("COMMAND [OPTIONS]"));

        let daemon = out.find(" daemon    - Start the web application server").unwrap();
        let help = out.find(" help      - Display help for commands").unwrap();
        let version = out.find(" version   - ").unwrap();
        assert!(daemon < help && help < version);
    }

    #[test]
    fn test_command_usage() {
        let out = run(&["daemon"]).unwrap();
        assert!(out.contains("daemon [OPTIONS]"));
        assert!(out.contains("-l, --listen"));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(run(&["frobnicate"]), Err(Error::CommandNotFound(name)) if name == "frobnicate"));
    }
}
