use std::path::{Path, PathBuf};
use std::time::Duration;

use hotbuild::engine::{LastAction, SessionHandle, WatchSession};
use hotbuild::types::EventKind;
use hotbuild_test_utils::builders::ConfigFileBuilder;
use hotbuild_test_utils::fakes::{FakeBuildBackend, FakeMonitor, FakeUnitLoader, MonitorFeed};
use hotbuild_test_utils::{init_tracing, with_timeout};

const ROOT: &str = "/work/myapp";
const DEBOUNCE_MS: u64 = 100;
const MODIFIED: &[EventKind] = &[EventKind::Modified];

fn artifact(name: &str) -> PathBuf {
    Path::new(ROOT).join("apps/foo/ebin").join(name)
}

fn start(monitor: FakeMonitor) -> (SessionHandle, FakeUnitLoader) {
    init_tracing();
    let cfg = ConfigFileBuilder::new().with_debounce_ms(DEBOUNCE_MS).build();
    let loader = FakeUnitLoader::new();
    let (handle, _task) =
        WatchSession::start(&cfg, Box::new(monitor), FakeBuildBackend::new(), loader.clone())
            .expect("session starts");
    (handle, loader)
}

fn without_renames() -> (FakeMonitor, MonitorFeed) {
    FakeMonitor::without_renames(ROOT)
}

/// Long enough for any stray timer to have fired.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 4)).await;
}

#[tokio::test]
async fn burst_of_in_progress_writes_loads_once() {
    let (monitor, feed) = without_renames();
    let (handle, loader) = start(monitor);

    for _ in 0..5 {
        assert!(feed.emit(artifact("foo.bea#"), MODIFIED));
    }

    let mut actions = handle.actions();
    with_timeout(actions.wait_for(|a| *a == LastAction::LoadRequest("foo".into())))
        .await
        .expect("session still running");
    settle().await;

    assert_eq!(loader.loads(), vec!["foo"]);
}

#[tokio::test]
async fn definitive_artifact_preempts_deferred_load() {
    let (monitor, feed) = without_renames();
    let (handle, loader) = start(monitor);

    feed.emit(artifact("foo.bea#"), MODIFIED);
    feed.emit(artifact("foo.beam"), &[EventKind::Created]);

    // Flush both events through the session before the delay elapses.
    with_timeout(handle.trigger_build_sync()).await.expect("reply");
    assert_eq!(loader.loads(), vec!["foo"]);

    settle().await;
    assert_eq!(loader.loads(), vec!["foo"]);
    assert_eq!(handle.last_action(), LastAction::UserSyncBuild);
}

#[tokio::test]
async fn units_are_debounced_independently() {
    let (monitor, feed) = without_renames();
    let (handle, loader) = start(monitor);

    feed.emit(artifact("foo.bea#"), MODIFIED);
    feed.emit(artifact("foo_sup.bea#"), MODIFIED);
    with_timeout(handle.trigger_build_sync()).await.expect("reply");

    settle().await;
    let mut loads = loader.loads();
    loads.sort();
    assert_eq!(loads, vec!["foo", "foo_sup"]);
}

#[tokio::test]
async fn in_progress_artifact_is_ignored_when_monitor_reports_renames() {
    let (monitor, feed) = FakeMonitor::native(ROOT);
    let (handle, loader) = start(monitor);

    feed.emit(artifact("foo.bea#"), MODIFIED);
    with_timeout(handle.trigger_build_sync()).await.expect("reply");

    settle().await;
    assert!(loader.loads().is_empty());
}

#[tokio::test]
async fn shutdown_cancels_pending_loads() {
    let (monitor, feed) = without_renames();
    let (handle, loader) = start(monitor);

    feed.emit(artifact("foo.bea#"), MODIFIED);
    handle.shutdown().expect("shutdown sent");

    settle().await;
    assert!(loader.loads().is_empty());
    assert!(feed.is_released());
}
