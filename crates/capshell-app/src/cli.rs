use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "capshell", version, about = "Interactive shell over pluggable capability modules")]
pub struct Cli {
    #[arg(long, global = true, help = "Shell config file (TOML); falls back to $CAPSHELL_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Write log output to this file instead of stderr")]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive shell (default).
    Shell,
    /// Run one command and print its output.
    Run {
        module: String,
        command: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List registered modules.
    List,
    /// Initialize every module and show its status.
    Status {
        #[arg(long, help = "Output machine-readable JSON")]
        json: bool,
    },
    /// Run every module's health probe and show the result.
    Health {
        #[arg(long, help = "Output machine-readable JSON")]
        json: bool,
    },
}

impl Commands {
    /// The line `run` dispatches, in the shell's own syntax.
    pub fn line(&self) -> Option<String> {
        let Self::Run {
            module,
            command,
            args,
        } = self
        else {
            return None;
        };
        let words: Vec<&str> = std::iter::once(module.as_str())
            .chain(command.as_deref())
            .chain(args.iter().map(String::as_str))
            .collect();
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_is_default() {
        let cli = Cli::parse_from(["capshell"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn run_keeps_flags_for_the_module() {
        let cli = Cli::parse_from(["capshell", "run", "demo", "echo", "hi", "--loud"]);
        let command = cli.command.unwrap();
        assert_eq!(command.line().as_deref(), Some("demo echo hi --loud"));
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["capshell", "status", "--json", "--log-file", "/tmp/x.log"]);
        assert!(matches!(cli.command, Some(Commands::Status { json: true })));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/x.log")));
    }

    #[test]
    fn run_module_only() {
        let cli = Cli::parse_from(["capshell", "run", "demo"]);
        assert_eq!(cli.command.unwrap().line().as_deref(), Some("demo"));
    }
}
