use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Name of a compiled unit (a sub-application, or the root application).
pub type UnitName = String;

/// Event tags reported by a filesystem monitor.
///
/// Only `Created`, `Modified` and `Renamed` ever trigger an action; the rest
/// are carried through so the session can record what it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Modified,
    Renamed,
    Deleted,
    Unknown,
}

impl EventKind {
    /// Whether this kind can trigger a reload or rebuild.
    pub fn is_trigger(self) -> bool {
        matches!(self, EventKind::Created | EventKind::Modified | EventKind::Renamed)
    }
}

impl From<&notify::EventKind> for EventKind {
    fn from(kind: &notify::EventKind) -> Self {
        use notify::event::ModifyKind;

        match kind {
            notify::EventKind::Create(_) => EventKind::Created,
            notify::EventKind::Modify(ModifyKind::Name(_)) => EventKind::Renamed,
            notify::EventKind::Modify(_) => EventKind::Modified,
            notify::EventKind::Remove(_) => EventKind::Deleted,
            notify::EventKind::Access(_) | notify::EventKind::Any | notify::EventKind::Other => {
                EventKind::Unknown
            }
        }
    }
}

/// A single change reported by the monitor: one absolute path plus the
/// ordered list of kinds observed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kinds: Vec<EventKind>,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kinds: impl Into<Vec<EventKind>>) -> Self {
        Self {
            path: path.into(),
            kinds: kinds.into(),
        }
    }
}

/// The logical unit an event or build applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The whole project.
    TopLevel,
    /// A single unit. `dir` is the unit's directory relative to the root
    /// (empty for the root application itself).
    NamedUnit { name: UnitName, dir: PathBuf },
    /// The path does not belong to any known layout.
    Unhandled,
}

impl Scope {
    pub fn named(name: impl Into<UnitName>, dir: impl Into<PathBuf>) -> Self {
        Scope::NamedUnit {
            name: name.into(),
            dir: dir.into(),
        }
    }

    pub fn unit_name(&self) -> Option<&str> {
        match self {
            Scope::NamedUnit { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::TopLevel => write!(f, "<project>"),
            Scope::NamedUnit { name, .. } => write!(f, "{name}"),
            Scope::Unhandled => write!(f, "<unhandled>"),
        }
    }
}

/// Outcome of filtering a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Noise or a non-triggering event kind.
    Ignore,
    /// A compiled artifact changed; load it.
    Reload(UnitName),
    /// An in-progress artifact was seen and the monitor cannot report the
    /// final rename; load after the debounce delay unless something newer
    /// arrives for the unit.
    DeferReload(UnitName),
    /// Source changed; recompile the scope.
    Rebuild(Scope),
    /// The artifact filename has an unrecognized shape.
    UnknownArtifact(String),
    /// The path is inside the root but matches no known layout.
    Unhandled(String),
}

/// Which `notify` watcher implementation feeds the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorBackend {
    /// Native OS notifications (inotify, FSEvents, ReadDirectoryChanges).
    #[default]
    Recommended,
    /// `notify`'s polling watcher. Renames surface as remove + create.
    Poll,
}

impl FromStr for MonitorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recommended" | "native" => Ok(MonitorBackend::Recommended),
            "poll" => Ok(MonitorBackend::Poll),
            other => Err(format!(
                "invalid watch backend: {other} (expected \"recommended\" or \"poll\")"
            )),
        }
    }
}
