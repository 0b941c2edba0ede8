// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `branchdrive`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "branchdrive",
    version,
    about = "Drive a batch of branch-indexed commands across project targets.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Branchdrive.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Branchdrive.toml")]
    pub config: String,

    /// Run only the given target path(s) instead of every configured target.
    ///
    /// May be repeated. Each value must match a target listed in the config;
    /// anything else is rejected before the run starts.
    #[arg(long, value_name = "PATH")]
    pub target: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BRANCHDRIVE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the run plan, but don't execute any commands.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
