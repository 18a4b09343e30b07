// src/engine/session.rs

use std::collections::HashMap;
use std::fmt;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::{ActionDispatcher, BuildBackend, DispatchOutcome, UnitLoader};
use crate::types::UnitName;
use crate::watch::{EventFilter, EventSink, FilesystemMonitor, RootPath};

use super::core::SessionCore;
use super::handle::SessionHandle;
use super::{CoreCommand, LastAction, SessionMessage, Signal};

/// A running debounce timer.
struct ReloadTimer {
    token: u64,
    handle: JoinHandle<()>,
}

/// Drives [`SessionCore`] from the session channel and carries out its
/// commands.
///
/// This is a pure IO shell: every decision is made by the core. Messages are
/// handled strictly one at a time, so a build blocks the loop and any events
/// arriving meanwhile wait in the channel.
pub struct WatchSession<B: BuildBackend, L: UnitLoader> {
    core: SessionCore,
    rx: mpsc::UnboundedReceiver<SessionMessage>,
    /// Weak so that timers alone never keep the session alive.
    timer_tx: mpsc::WeakUnboundedSender<SessionMessage>,
    dispatcher: ActionDispatcher<B, L>,
    monitor: Box<dyn FilesystemMonitor>,
    timers: HashMap<UnitName, ReloadTimer>,
    state_tx: watch::Sender<LastAction>,
}

impl<B: BuildBackend, L: UnitLoader> fmt::Debug for WatchSession<B, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSession")
            .field("core", &self.core)
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl<B, L> WatchSession<B, L>
where
    B: BuildBackend + 'static,
    L: UnitLoader + 'static,
{
    /// Subscribe to `monitor` and spawn the session loop.
    ///
    /// The monitor's event vocabulary is consulted once here to decide how
    /// in-progress artifacts are treated for the whole session.
    pub fn start(
        config: &ConfigFile,
        mut monitor: Box<dyn FilesystemMonitor>,
        backend: B,
        loader: L,
    ) -> Result<(SessionHandle, JoinHandle<Result<()>>)> {
        let root = RootPath::lexical(monitor.root_path());
        let atomic_renames = monitor.reports_atomic_renames();
        let filter = EventFilter::from_layout(config.layout(), root.unit_name(), atomic_renames)?;

        info!(
            root = ?root.as_path(),
            unit = %root.unit_name(),
            atomic_renames,
            "starting watch session"
        );

        let (tx, rx) = mpsc::unbounded_channel::<SessionMessage>();
        monitor.subscribe(EventSink::new(tx.clone()))?;

        let dispatcher = ActionDispatcher::new(
            root.as_path(),
            config.build().commands.clone(),
            backend,
            loader,
        );
        let core = SessionCore::new(root, filter, config.watch().debounce_delay());
        let (state_tx, state_rx) = watch::channel(LastAction::Fresh);

        let session = Self {
            core,
            rx,
            timer_tx: tx.downgrade(),
            dispatcher,
            monitor,
            timers: HashMap::new(),
            state_tx,
        };

        let task = tokio::spawn(session.run());
        Ok((SessionHandle::new(tx, state_rx), task))
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<()> {
        info!("watch session running");

        loop {
            let message = match self.rx.recv().await {
                Some(m) => m,
                None => {
                    info!("session channel closed; exiting");
                    break;
                }
            };

            debug!(?message, "session received message");

            let (signal, reply) = into_signal(message);
            if let Signal::ReloadTimerFired { unit, token } = &signal {
                self.forget_timer(unit, *token);
            }

            let step = self.core.step(signal);

            let mut outcome = None;
            for command in step.commands {
                if let Some(o) = self.execute_command(command).await {
                    outcome = Some(o);
                }
            }

            // Publish before replying so a sync caller sees its own build.
            self.state_tx.send_replace(self.core.last_action().clone());
            if let Some(reply) = reply {
                let _ = reply.send(outcome.unwrap_or(DispatchOutcome::Succeeded));
            }

            if !step.keep_running {
                break;
            }
        }

        for (_, timer) in self.timers.drain() {
            timer.handle.abort();
        }
        info!(root = ?self.monitor.root_path(), "watch session stopped; releasing monitor");
        drop(self.monitor);
        Ok(())
    }

    /// Execute a single command from the core. Returns the outcome of a
    /// dispatch.
    async fn execute_command(&mut self, command: CoreCommand) -> Option<DispatchOutcome> {
        match command {
            CoreCommand::Dispatch(action) => {
                let outcome = self.dispatcher.dispatch(&action).await;
                self.core.record_outcome(&outcome);
                Some(outcome)
            }
            CoreCommand::ScheduleReload { unit, token, delay } => {
                let tx = self.timer_tx.clone();
                let timer_unit = unit.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(tx) = tx.upgrade() {
                        let _ = tx.send(SessionMessage::ReloadTimerFired {
                            unit: timer_unit,
                            token,
                        });
                    }
                });
                if let Some(previous) = self.timers.insert(unit, ReloadTimer { token, handle }) {
                    previous.handle.abort();
                }
                None
            }
            CoreCommand::CancelReload { unit } => {
                if let Some(timer) = self.timers.remove(&unit) {
                    timer.handle.abort();
                    debug!(unit = %unit, token = timer.token, "debounce timer aborted");
                }
                None
            }
        }
    }

    fn forget_timer(&mut self, unit: &str, token: u64) {
        if self.timers.get(unit).is_some_and(|t| t.token == token) {
            self.timers.remove(unit);
        }
    }
}

fn into_signal(
    message: SessionMessage,
) -> (Signal, Option<oneshot::Sender<DispatchOutcome>>) {
    match message {
        SessionMessage::FileEvent(event) => (Signal::FileEvent(event), None),
        SessionMessage::TriggerBuild { reply } => {
            let sync = reply.is_some();
            (Signal::UserBuild { sync }, reply)
        }
        SessionMessage::ReloadTimerFired { unit, token } => {
            (Signal::ReloadTimerFired { unit, token }, None)
        }
        SessionMessage::Unrecognized(description) => (Signal::Unrecognized(description), None),
        SessionMessage::Shutdown => (Signal::Shutdown, None),
    }
}
