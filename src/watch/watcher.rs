// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use crate::errors::Result;
use crate::types::{EventKind, MonitorBackend, RawEvent};
use crate::watch::monitor::{EventSink, FilesystemMonitor};

const NATIVE_KINDS: &[EventKind] = &[
    EventKind::Created,
    EventKind::Modified,
    EventKind::Renamed,
    EventKind::Deleted,
    EventKind::Unknown,
];

/// The poll watcher diffs directory snapshots, so a rename shows up as a
/// removal plus a creation.
const POLL_KINDS: &[EventKind] = &[
    EventKind::Created,
    EventKind::Modified,
    EventKind::Deleted,
    EventKind::Unknown,
];

/// Keeps the underlying `notify` watcher alive. Dropping it stops watching.
#[allow(dead_code)]
enum ActiveWatcher {
    Native(RecommendedWatcher),
    Poll(PollWatcher),
}

/// [`FilesystemMonitor`] backed by `notify`.
pub struct NotifyMonitor {
    root: PathBuf,
    backend: MonitorBackend,
    poll_interval: Duration,
    active: Option<ActiveWatcher>,
}

impl std::fmt::Debug for NotifyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyMonitor")
            .field("root", &self.root)
            .field("backend", &self.backend)
            .field("subscribed", &self.active.is_some())
            .finish()
    }
}

impl NotifyMonitor {
    /// `root` should already be canonical (see `RootPath::resolve`).
    pub fn new(root: impl Into<PathBuf>, backend: MonitorBackend, poll_interval: Duration) -> Self {
        Self {
            root: root.into(),
            backend,
            poll_interval,
            active: None,
        }
    }
}

impl FilesystemMonitor for NotifyMonitor {
    fn root_path(&self) -> &Path {
        &self.root
    }

    fn known_event_kinds(&self) -> &[EventKind] {
        match self.backend {
            MonitorBackend::Recommended => NATIVE_KINDS,
            MonitorBackend::Poll => POLL_KINDS,
        }
    }

    fn subscribe(&mut self, sink: EventSink) -> Result<()> {
        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) => forward_event(&sink, event),
            Err(err) => {
                sink.report(format!("file watch error: {err}"));
            }
        };

        let active = match self.backend {
            MonitorBackend::Recommended => {
                let mut watcher = RecommendedWatcher::new(handler, Config::default())?;
                watcher.watch(&self.root, RecursiveMode::Recursive)?;
                ActiveWatcher::Native(watcher)
            }
            MonitorBackend::Poll => {
                let config = Config::default().with_poll_interval(self.poll_interval);
                let mut watcher = PollWatcher::new(handler, config)?;
                watcher.watch(&self.root, RecursiveMode::Recursive)?;
                ActiveWatcher::Poll(watcher)
            }
        };

        self.active = Some(active);
        info!(root = ?self.root, backend = ?self.backend, "file watcher started");
        Ok(())
    }
}

/// Translate one `notify` event into the session's raw events.
///
/// One raw event per path. Backends that report a rename as separate
/// `From` and `To` events also emit a trailing `Both` event naming the same
/// two paths; it is dropped so a rename is seen once.
pub fn translate_event(event: Event) -> Vec<RawEvent> {
    if matches!(
        event.kind,
        notify::EventKind::Modify(ModifyKind::Name(RenameMode::Both))
    ) {
        return Vec::new();
    }
    let kind = EventKind::from(&event.kind);
    event
        .paths
        .into_iter()
        .map(|path| RawEvent::new(path, vec![kind]))
        .collect()
}

fn forward_event(sink: &EventSink, event: Event) {
    for raw in translate_event(event) {
        if !sink.deliver(raw) {
            debug!("session gone; dropping watch event");
            return;
        }
    }
}
