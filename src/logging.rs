// src/logging.rs

//! Logging setup for `hotbuild` using `tracing` + `tracing-subscriber`.
//!
//! Level selection, highest priority first:
//! 1. `--log-level` on the command line
//! 2. `HOTBUILD_LOG`, either a bare level ("debug") or full filter
//!    directives ("hotbuild=debug,hotbuild::build=info")
//! 3. `info`
//!
//! Logs go to stderr. Build tool output is re-emitted through the
//! `hotbuild::build` target so it can be filtered on its own.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "HOTBUILD_LOG";

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(Level::from(lvl).as_str()),
        None => filter_from_env(std::env::var(LOG_ENV_VAR).ok().as_deref()),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing tracing subscriber")?;

    Ok(())
}

/// Filter for an optional `HOTBUILD_LOG` value. Unparsable values fall back
/// to `info`.
pub fn filter_from_env(value: Option<&str>) -> EnvFilter {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return EnvFilter::new("info");
    };
    if let Some(level) = parse_level_str(value) {
        return EnvFilter::new(level.as_str());
    }
    EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info"))
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Parse a bare level name as accepted in `HOTBUILD_LOG`.
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
