// src/exec/dispatcher.rs

//! The single point where builds and loads are issued.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::exec::backend::BuildBackend;
use crate::exec::loader::UnitLoader;
use crate::types::{Scope, UnitName};

/// Something the session wants done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Rebuild(Scope),
    Reload(UnitName),
}

/// Result of one dispatch, as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Succeeded)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Succeeded => write!(f, "ok"),
            DispatchOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Issues builds and loads, one at a time, and contains every failure.
///
/// Nothing returned from the backend or the loader escapes as an error:
/// failures are logged and turned into [`DispatchOutcome::Failed`]. Each
/// build and load runs on its own task, so a panic inside a collaborator is
/// reported the same way instead of unwinding through the caller.
pub struct ActionDispatcher<B, L> {
    root: PathBuf,
    commands: Arc<[String]>,
    backend: Arc<Mutex<B>>,
    loader: Arc<Mutex<L>>,
}

impl<B, L> fmt::Debug for ActionDispatcher<B, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("root", &self.root)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

impl<B, L> ActionDispatcher<B, L>
where
    B: BuildBackend + 'static,
    L: UnitLoader + 'static,
{
    pub fn new(root: impl Into<PathBuf>, commands: Vec<String>, backend: B, loader: L) -> Self {
        Self {
            root: root.into(),
            commands: commands.into(),
            backend: Arc::new(Mutex::new(backend)),
            loader: Arc::new(Mutex::new(loader)),
        }
    }

    pub async fn dispatch(&mut self, action: &Action) -> DispatchOutcome {
        match action {
            Action::Rebuild(scope) => self.rebuild(scope).await,
            Action::Reload(unit) => self.reload(unit).await,
        }
    }

    async fn rebuild(&mut self, scope: &Scope) -> DispatchOutcome {
        let base = self.backend.lock().await.default_configuration(&self.root);
        let config = match scope {
            Scope::TopLevel => base,
            Scope::NamedUnit { name, dir } => {
                let unit_dir = self.root.join(dir);
                base.restrict_to(name.clone(), unit_dir)
            }
            Scope::Unhandled => {
                warn!("refusing to build an unhandled scope");
                return DispatchOutcome::Failed("no build scope".to_string());
            }
        };

        let guard = match WorkingDirGuard::capture() {
            Ok(g) => Some(g),
            Err(err) => {
                warn!(error = %err, "cannot read working directory; it will not be restored");
                None
            }
        };

        let backend = Arc::clone(&self.backend);
        let commands = Arc::clone(&self.commands);
        let build_config = config.clone();
        let task = tokio::spawn(async move {
            let mut backend = backend.lock_owned().await;
            backend.run_build(&commands, &build_config).await
        });
        let result = task.await.unwrap_or_else(|err| Err(join_failure("build backend", err)));
        drop(guard);

        match result {
            Ok(()) => {
                info!(%scope, "build finished");
                DispatchOutcome::Succeeded
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(%scope, dir = ?config.working_dir, error = %reason, "build failed");
                DispatchOutcome::Failed(reason)
            }
        }
    }

    async fn reload(&mut self, unit: &str) -> DispatchOutcome {
        let loader = Arc::clone(&self.loader);
        let owned_unit = unit.to_string();
        let task = tokio::spawn(async move {
            let mut loader = loader.lock_owned().await;
            loader.load(&owned_unit).await
        });
        let result = task.await.unwrap_or_else(|err| Err(join_failure("unit loader", err)));

        match result {
            Ok(()) => {
                info!(unit, "unit loaded");
                DispatchOutcome::Succeeded
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(unit, error = %reason, "unit load failed");
                DispatchOutcome::Failed(reason)
            }
        }
    }
}

fn join_failure(who: &str, err: JoinError) -> anyhow::Error {
    if err.is_panic() {
        anyhow!("{who} panicked: {}", panic_message(&*err.into_panic()))
    } else {
        anyhow!("{who} task was cancelled")
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Restores the process working directory on drop, whichever way the build
/// ended.
#[derive(Debug)]
pub struct WorkingDirGuard {
    saved: PathBuf,
}

impl WorkingDirGuard {
    pub fn capture() -> std::io::Result<Self> {
        Ok(Self {
            saved: std::env::current_dir()?,
        })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        let unchanged = std::env::current_dir()
            .map(|cwd| cwd == self.saved)
            .unwrap_or(false);
        if unchanged {
            return;
        }
        if let Err(err) = std::env::set_current_dir(&self.saved) {
            error!(dir = ?self.saved, error = %err, "failed to restore working directory");
        }
    }
}
