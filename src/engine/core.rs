// src/engine/core.rs

//! Pure session state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`Signal`]s and produces:
//! - an updated [`LastAction`]
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::session::WatchSession`) is responsible for:
//! - reading messages from the session channel
//! - running builds and loads through the dispatcher
//! - starting and aborting debounce timers
//!
//! The core can be unit tested without any Tokio, channels, filesystem or
//! processes.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::debounce::DebounceGate;
use crate::engine::{EventResult, LastAction, Signal};
use crate::exec::{Action, DispatchOutcome};
use crate::types::{RawEvent, Scope, UnitName, Verdict};
use crate::watch::path_utils::display_components;
use crate::watch::{EventFilter, RootPath};

/// Command produced by the core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run a build or a load, then report back with
    /// [`SessionCore::record_outcome`].
    Dispatch(Action),
    /// Start a one-shot timer that delivers `ReloadTimerFired { unit, token }`.
    ScheduleReload {
        unit: UnitName,
        token: u64,
        delay: Duration,
    },
    /// Abort the running timer for `unit`, if any.
    CancelReload { unit: UnitName },
}

/// Decision returned by the core after handling a single [`Signal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn run(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug)]
pub struct SessionCore {
    root: RootPath,
    filter: EventFilter,
    gate: DebounceGate,
    last_action: LastAction,
}

impl SessionCore {
    pub fn new(root: RootPath, filter: EventFilter, debounce_delay: Duration) -> Self {
        Self {
            root,
            filter,
            gate: DebounceGate::new(debounce_delay),
            last_action: LastAction::Fresh,
        }
    }

    pub fn root(&self) -> &RootPath {
        &self.root
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn gate(&self) -> &DebounceGate {
        &self.gate
    }

    pub fn last_action(&self) -> &LastAction {
        &self.last_action
    }

    /// Handle a single signal, updating state and returning the commands for
    /// the IO shell.
    pub fn step(&mut self, signal: Signal) -> CoreStep {
        match signal {
            Signal::FileEvent(event) => self.handle_file_event(event),
            Signal::UserBuild { sync } => {
                info!(sync, "full build requested");
                self.last_action = if sync {
                    LastAction::UserSyncBuild
                } else {
                    LastAction::UserBuild
                };
                CoreStep::run(vec![CoreCommand::Dispatch(Action::Rebuild(Scope::TopLevel))])
            }
            Signal::ReloadTimerFired { unit, token } => {
                if !self.gate.fire(&unit, token) {
                    return CoreStep::run(Vec::new());
                }
                info!(unit = %unit, "loading unit after in-progress artifact settled");
                self.last_action = LastAction::LoadRequest(unit.clone());
                CoreStep::run(vec![CoreCommand::Dispatch(Action::Reload(unit))])
            }
            Signal::Unrecognized(description) => {
                warn!(%description, "unrecognized session signal");
                self.last_action = LastAction::UnknownSignal;
                CoreStep::run(Vec::new())
            }
            Signal::Shutdown => {
                info!("session shutdown requested");
                let commands = self
                    .gate
                    .pending_units()
                    .into_iter()
                    .map(|unit| CoreCommand::CancelReload { unit })
                    .collect();
                self.gate.clear();
                CoreStep {
                    commands,
                    keep_running: false,
                }
            }
        }
    }

    /// Fill in the outcome of the dispatch issued by the last step.
    pub fn record_outcome(&mut self, outcome: &DispatchOutcome) {
        if let LastAction::Event { result, .. } = &mut self.last_action {
            if *result == EventResult::Pending {
                *result = EventResult::Completed(outcome.clone());
            }
        }
    }

    fn handle_file_event(&mut self, event: RawEvent) -> CoreStep {
        let RawEvent { path, kinds } = event;

        let Some(components) = self.root.relative_components(&path) else {
            debug!(?path, "event outside watched root");
            self.last_action = LastAction::Event {
                path,
                kinds,
                result: EventResult::OutOfScope,
            };
            return CoreStep::run(Vec::new());
        };

        let verdict = self.filter.evaluate(&components, &kinds);
        let rel = display_components(&components);

        let mut commands = Vec::new();
        let result = match verdict {
            Verdict::Ignore => {
                debug!(path = %rel, ?kinds, "ignored");
                EventResult::Ignored
            }
            Verdict::Unhandled(rel) => {
                warn!(path = %rel, ?kinds, "change in unrecognized location; no action");
                EventResult::Unhandled
            }
            Verdict::UnknownArtifact(name) => {
                warn!(path = %rel, artifact = %name, "unrecognized artifact name; no action");
                EventResult::Unhandled
            }
            Verdict::DeferReload(unit) => {
                let scheduled = self.gate.on_deferred_candidate(&unit);
                if scheduled.replaced {
                    commands.push(CoreCommand::CancelReload { unit: unit.clone() });
                }
                commands.push(CoreCommand::ScheduleReload {
                    unit,
                    token: scheduled.token,
                    delay: scheduled.delay,
                });
                EventResult::Deferred
            }
            Verdict::Reload(unit) => {
                if self.gate.on_definitive_event(&unit) {
                    commands.push(CoreCommand::CancelReload { unit: unit.clone() });
                }
                info!(path = %rel, unit = %unit, "artifact changed; reloading");
                commands.push(CoreCommand::Dispatch(Action::Reload(unit)));
                EventResult::Pending
            }
            Verdict::Rebuild(scope) => {
                info!(path = %rel, %scope, "source changed; rebuilding");
                commands.push(CoreCommand::Dispatch(Action::Rebuild(scope)));
                EventResult::Pending
            }
        };

        self.last_action = LastAction::Event {
            path,
            kinds,
            result,
        };
        CoreStep::run(commands)
    }
}
