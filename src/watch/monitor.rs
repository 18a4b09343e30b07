// src/watch/monitor.rs

//! The boundary between a filesystem monitor and a watch session.

use std::path::Path;

use tokio::sync::mpsc;

use crate::engine::SessionMessage;
use crate::errors::Result;
use crate::types::{EventKind, RawEvent};

/// Where a monitor delivers events once subscribed.
///
/// Sending never blocks, so it is safe to call from the synchronous
/// callbacks `notify` runs on its own threads.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { tx }
    }

    /// Forward a raw event. Returns `false` once the session has stopped.
    pub fn deliver(&self, event: RawEvent) -> bool {
        self.tx.send(SessionMessage::FileEvent(event)).is_ok()
    }

    /// Forward something the session has no dedicated handling for, such as
    /// a watcher error.
    pub fn report(&self, description: impl Into<String>) -> bool {
        self.tx
            .send(SessionMessage::Unrecognized(description.into()))
            .is_ok()
    }
}

/// A source of [`RawEvent`]s for one project root.
pub trait FilesystemMonitor: Send {
    /// Canonical root being watched.
    fn root_path(&self) -> &Path;

    /// Every kind this monitor is able to emit.
    fn known_event_kinds(&self) -> &[EventKind];

    /// Start delivering events to `sink`. Delivery stops when the monitor is
    /// dropped.
    fn subscribe(&mut self, sink: EventSink) -> Result<()>;

    /// Whether a rename arrives as one `Renamed` event rather than as a
    /// separate delete and create.
    fn reports_atomic_renames(&self) -> bool {
        self.known_event_kinds().contains(&EventKind::Renamed)
    }
}
