use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use hotbuild::exec::{BuildBackend, BuildConfiguration, UnitLoader};
use hotbuild::types::{EventKind, RawEvent};
use hotbuild::watch::{EventSink, FilesystemMonitor};

/// A build backend that:
/// - records every configuration it was asked to build
/// - optionally changes the working directory mid-build
/// - optionally fails or panics
#[derive(Clone, Default)]
pub struct FakeBuildBackend {
    builds: Arc<Mutex<Vec<BuildConfiguration>>>,
    fail: bool,
    panic: bool,
    chdir_to: Option<PathBuf>,
}

impl FakeBuildBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Panic inside every build, after recording it.
    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    /// Change the process working directory to `dir` during every build.
    pub fn changing_dir_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chdir_to = Some(dir.into());
        self
    }

    pub fn builds(&self) -> Vec<BuildConfiguration> {
        self.builds.lock().unwrap().clone()
    }
}

impl BuildBackend for FakeBuildBackend {
    fn run_build<'a>(
        &'a mut self,
        _commands: &'a [String],
        config: &'a BuildConfiguration,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.builds.lock().unwrap().push(config.clone());
            if let Some(dir) = &self.chdir_to {
                std::env::set_current_dir(dir)?;
            }
            if self.panic {
                panic!("simulated build panic");
            }
            if self.fail {
                return Err(anyhow!("simulated build failure"));
            }
            Ok(())
        })
    }
}

/// A unit loader that records loads and fails for selected units.
#[derive(Clone, Default)]
pub struct FakeUnitLoader {
    loads: Arc<Mutex<Vec<String>>>,
    failing_units: HashSet<String>,
    panicking_units: HashSet<String>,
}

impl FakeUnitLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, unit: &str) -> Self {
        self.failing_units.insert(unit.to_string());
        self
    }

    pub fn panicking_for(mut self, unit: &str) -> Self {
        self.panicking_units.insert(unit.to_string());
        self
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }
}

impl UnitLoader for FakeUnitLoader {
    fn load<'a>(&'a mut self, unit: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.loads.lock().unwrap().push(unit.to_string());
            if self.panicking_units.contains(unit) {
                panic!("simulated load panic for {unit}");
            }
            if self.failing_units.contains(unit) {
                return Err(anyhow!("simulated load failure for {unit}"));
            }
            Ok(())
        })
    }
}

/// A monitor that emits only what the test tells it to.
pub struct FakeMonitor {
    root: PathBuf,
    kinds: Vec<EventKind>,
    sink: Arc<Mutex<Option<EventSink>>>,
    released: Arc<AtomicBool>,
}

/// Test-side end of a [`FakeMonitor`], usable after the monitor has been
/// moved into a session.
#[derive(Clone)]
pub struct MonitorFeed {
    sink: Arc<Mutex<Option<EventSink>>>,
    released: Arc<AtomicBool>,
}

impl FakeMonitor {
    /// Monitor that reports renames atomically.
    pub fn native(root: impl Into<PathBuf>) -> (Self, MonitorFeed) {
        Self::with_kinds(
            root,
            vec![
                EventKind::Created,
                EventKind::Modified,
                EventKind::Renamed,
                EventKind::Deleted,
            ],
        )
    }

    /// Monitor whose vocabulary has no rename event.
    pub fn without_renames(root: impl Into<PathBuf>) -> (Self, MonitorFeed) {
        Self::with_kinds(
            root,
            vec![EventKind::Created, EventKind::Modified, EventKind::Deleted],
        )
    }

    pub fn with_kinds(root: impl Into<PathBuf>, kinds: Vec<EventKind>) -> (Self, MonitorFeed) {
        let sink = Arc::new(Mutex::new(None));
        let released = Arc::new(AtomicBool::new(false));
        let monitor = Self {
            root: root.into(),
            kinds,
            sink: Arc::clone(&sink),
            released: Arc::clone(&released),
        };
        (monitor, MonitorFeed { sink, released })
    }
}

impl Drop for FakeMonitor {
    fn drop(&mut self) {
        self.sink.lock().unwrap().take();
        self.released.store(true, Ordering::SeqCst);
    }
}

impl FilesystemMonitor for FakeMonitor {
    fn root_path(&self) -> &Path {
        &self.root
    }

    fn known_event_kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    fn subscribe(&mut self, sink: EventSink) -> hotbuild::errors::Result<()> {
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }
}

impl MonitorFeed {
    /// Emit one event. Returns `false` if nobody is subscribed.
    pub fn emit(&self, path: impl Into<PathBuf>, kinds: &[EventKind]) -> bool {
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.deliver(RawEvent::new(path.into(), kinds.to_vec())),
            None => false,
        }
    }

    /// Emit something the session does not understand.
    pub fn report(&self, description: &str) -> bool {
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.report(description),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.sink.lock().unwrap().is_some()
    }

    /// Whether the monitor has been dropped by its session.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}
