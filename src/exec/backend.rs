// src/exec/backend.rs

//! Pluggable build backend abstraction.
//!
//! The dispatcher talks to a `BuildBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake backend in tests while keeping
//! the production implementation here.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::BuildSection;
use crate::types::UnitName;

/// What a build operates on.
///
/// Starts out covering the whole project and can be narrowed to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub root_dir: PathBuf,
    pub working_dir: PathBuf,
    pub unit: Option<UnitName>,
}

impl BuildConfiguration {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        Self {
            working_dir: root_dir.clone(),
            root_dir,
            unit: None,
        }
    }

    /// Limit the build to `unit`, run from `dir`.
    pub fn restrict_to(mut self, unit: impl Into<UnitName>, dir: impl Into<PathBuf>) -> Self {
        self.unit = Some(unit.into());
        self.working_dir = dir.into();
        self
    }
}

/// Trait abstracting how builds are run.
pub trait BuildBackend: Send {
    /// Configuration covering the whole project under `root`.
    fn default_configuration(&self, root: &Path) -> BuildConfiguration {
        BuildConfiguration::new(root)
    }

    /// Run the build to completion.
    ///
    /// The implementation may change the process working directory; the
    /// caller restores it.
    fn run_build<'a>(
        &'a mut self,
        commands: &'a [String],
        config: &'a BuildConfiguration,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Runs the configured build tool as a child process.
#[derive(Debug, Clone)]
pub struct ShellBuildBackend {
    program: String,
    unit_flag: Option<String>,
}

impl ShellBuildBackend {
    pub fn new(program: impl Into<String>, unit_flag: Option<String>) -> Self {
        Self {
            program: program.into(),
            unit_flag,
        }
    }

    pub fn from_config(build: &BuildSection) -> Self {
        Self::new(build.program.clone(), build.unit_flag.clone())
    }

    /// Full argument list for one build.
    pub fn arguments(&self, commands: &[String], config: &BuildConfiguration) -> Vec<String> {
        let mut args: Vec<String> = commands.to_vec();
        if let (Some(flag), Some(unit)) = (&self.unit_flag, &config.unit) {
            args.push(flag.clone());
            args.push(unit.clone());
        }
        args
    }
}

impl BuildBackend for ShellBuildBackend {
    fn run_build<'a>(
        &'a mut self,
        commands: &'a [String],
        config: &'a BuildConfiguration,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let args = self.arguments(commands, config);
            info!(
                program = %self.program,
                ?args,
                dir = ?config.working_dir,
                unit = config.unit.as_deref().unwrap_or("<project>"),
                "starting build"
            );

            let output = Command::new(&self.program)
                .args(&args)
                .current_dir(&config.working_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .with_context(|| format!("spawning build tool '{}'", self.program))?;

            for line in String::from_utf8_lossy(&output.stdout).lines() {
                info!(target: "hotbuild::build", "{line}");
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            for line in stderr.lines() {
                debug!(target: "hotbuild::build", "stderr: {line}");
            }

            if !output.status.success() {
                let code = output.status.code().unwrap_or(-1);
                bail!(
                    "'{} {}' exited with status {code}{}",
                    self.program,
                    args.join(" "),
                    stderr_tail(&stderr)
                );
            }
            Ok(())
        })
    }
}

/// Last few stderr lines, for error reports.
fn stderr_tail(stderr: &str) -> String {
    const TAIL: usize = 5;
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(TAIL);
    format!(": {}", lines[start..].join(" | "))
}
