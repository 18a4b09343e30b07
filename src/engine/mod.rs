// src/engine/mod.rs

//! Watch session engine.
//!
//! This module ties together:
//! - the event filter (what a change means)
//! - the debounce gate (in-progress artifacts waiting for their rename)
//! - the action dispatcher (builds and loads)
//! - the session event loop that reacts to:
//!   - raw filesystem events
//!   - manual build requests
//!   - debounce timer firings
//!   - shutdown
//!
//! The pure state machine lives in [`core`]; the async/IO shell is
//! implemented in [`session`].

use std::path::PathBuf;

use tokio::sync::oneshot;

use crate::exec::DispatchOutcome;
use crate::types::{EventKind, RawEvent, UnitName};

/// Messages flowing into a session from monitors, handles and timers.
#[derive(Debug)]
pub enum SessionMessage {
    /// A change reported by the filesystem monitor.
    FileEvent(RawEvent),
    /// Full project build requested by a user. With a reply channel the
    /// requester waits for the outcome.
    TriggerBuild {
        reply: Option<oneshot::Sender<DispatchOutcome>>,
    },
    /// A deferred reload's delay elapsed.
    ReloadTimerFired { unit: UnitName, token: u64 },
    /// Anything else, e.g. a watcher error. Recorded and otherwise ignored.
    Unrecognized(String),
    /// Stop the session and release the monitor.
    Shutdown,
}

/// Input to the pure core: a [`SessionMessage`] without its IO parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    FileEvent(RawEvent),
    UserBuild { sync: bool },
    ReloadTimerFired { unit: UnitName, token: u64 },
    Unrecognized(String),
    Shutdown,
}

/// What became of a processed file event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    /// The path is not under the watched root.
    OutOfScope,
    /// Noise, or no triggering kind.
    Ignored,
    /// Inside the root but not part of any known layout, or an artifact
    /// name that could not be parsed.
    Unhandled,
    /// A deferred reload was scheduled.
    Deferred,
    /// A build or load was issued and has not reported back yet.
    Pending,
    /// A build or load was issued and finished.
    Completed(DispatchOutcome),
}

/// The last thing a session did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastAction {
    Fresh,
    UserSyncBuild,
    UserBuild,
    Event {
        path: PathBuf,
        kinds: Vec<EventKind>,
        result: EventResult,
    },
    LoadRequest(UnitName),
    UnknownSignal,
}

pub mod core;
pub mod debounce;
pub mod handle;
pub mod session;

pub use self::core::{CoreCommand, CoreStep, SessionCore};
pub use debounce::{DebounceEntry, DebounceGate, ScheduledReload};
pub use handle::SessionHandle;
pub use session::WatchSession;
