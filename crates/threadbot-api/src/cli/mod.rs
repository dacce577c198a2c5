//! CLI command definitions for the `threadbot` binary.
//!
//! Uses clap derive macros for argument parsing. Each subcommand has its
//! handler in a sibling module.

pub mod persona;
pub mod run;
pub mod schedule;
pub mod thread;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Keep a Bluesky thread going with LLM-voiced personas.
#[derive(Parser)]
#[command(name = "threadbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Path to threadbot.toml (defaults to $THREADBOT_CONFIG, then the data dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the chosen verbosity. `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn,threadbot=info",
            1 => "info,threadbot=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add one post to the thread, then exit.
    Run,

    /// Keep adding posts on a recurring schedule until interrupted.
    Schedule {
        /// Cron expression or phrase like "every 3 hours" (defaults to the config).
        #[arg(long)]
        every: Option<String>,
    },

    /// Show the stored thread.
    Show,

    /// List configured personas.
    Personas,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_schedule_with_global_flags() {
        let cli = Cli::try_parse_from([
            "threadbot",
            "schedule",
            "--every",
            "every 2 hours",
            "--json",
            "-v",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.log_filter(), "info,threadbot=debug");
        match cli.command {
            Commands::Schedule { every } => assert_eq!(every.as_deref(), Some("every 2 hours")),
            _ => panic!("expected schedule"),
        }
    }

    #[test]
    fn test_quiet_filter() {
        let cli = Cli::try_parse_from(["threadbot", "--quiet", "run"]).unwrap();
        assert_eq!(cli.log_filter(), "error");
    }

    #[test]
    fn test_config_flag() {
        let cli = Cli::try_parse_from(["threadbot", "show", "--config", "/etc/threadbot.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/threadbot.toml")));
    }
}
