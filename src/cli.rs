// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `hotbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hotbuild",
    version,
    about = "Watch a project tree and rebuild or hot-reload the units that changed.",
    long_about = None
)]
pub struct CliArgs {
    /// Project root to watch.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Hotbuild.toml` inside the project root, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Run one full build and exit with its status, no watching.
    #[arg(long)]
    pub once: bool,

    /// Treat every line on stdin as a request for a full rebuild.
    #[arg(long)]
    pub rebuild_on_enter: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate config, print the effective layout, but don't watch.
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
