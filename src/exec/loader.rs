// src/exec/loader.rs

//! Loading freshly compiled units into the running system.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::info;

use crate::config::LoadSection;

/// Placeholder replaced by the unit name in load command templates.
pub const UNIT_PLACEHOLDER: &str = "{unit}";

/// Trait abstracting how a compiled unit is loaded.
pub trait UnitLoader: Send {
    fn load<'a>(&'a mut self, unit: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Runs `[load].command` through the platform shell.
///
/// Without a command, loads are logged and reported as successful.
#[derive(Debug, Clone, Default)]
pub struct ShellUnitLoader {
    command: Option<String>,
}

impl ShellUnitLoader {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    pub fn from_config(load: &LoadSection) -> Self {
        Self::new(load.command.clone())
    }

    /// The shell line that loads `unit`, if a command is configured.
    pub fn command_for(&self, unit: &str) -> Option<String> {
        self.command
            .as_ref()
            .map(|template| template.replace(UNIT_PLACEHOLDER, unit))
    }
}

impl UnitLoader for ShellUnitLoader {
    fn load<'a>(&'a mut self, unit: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let Some(line) = self.command_for(unit) else {
                info!(unit, "no [load].command configured; load skipped");
                return Ok(());
            };

            let mut cmd = if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(&line);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(&line);
                c
            };

            let status = cmd
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .status()
                .await
                .with_context(|| format!("spawning load command for unit '{unit}'"))?;

            if !status.success() {
                bail!(
                    "load command for unit '{unit}' exited with status {}",
                    status.code().unwrap_or(-1)
                );
            }
            Ok(())
        })
    }
}
