use std::path::Path;

use hotbuild::engine::{EventResult, LastAction, SessionHandle, WatchSession};
use hotbuild::errors::{HotbuildError, Result};
use hotbuild::exec::DispatchOutcome;
use hotbuild::types::{EventKind, RawEvent};
use hotbuild_test_utils::builders::ConfigFileBuilder;
use hotbuild_test_utils::fakes::{FakeBuildBackend, FakeMonitor, FakeUnitLoader, MonitorFeed};
use hotbuild_test_utils::{init_tracing, with_timeout};
use tokio::task::JoinHandle;

const ROOT: &str = "/work/myapp";
const MODIFIED: &[EventKind] = &[EventKind::Modified];

struct Harness {
    handle: SessionHandle,
    task: JoinHandle<Result<()>>,
    feed: MonitorFeed,
    backend: FakeBuildBackend,
    loader: FakeUnitLoader,
}

fn start(backend: FakeBuildBackend, loader: FakeUnitLoader) -> Harness {
    init_tracing();
    let cfg = ConfigFileBuilder::new().build();
    let (monitor, feed) = FakeMonitor::native(ROOT);
    let (handle, task) =
        WatchSession::start(&cfg, Box::new(monitor), backend.clone(), loader.clone())
            .expect("session starts");
    Harness {
        handle,
        task,
        feed,
        backend,
        loader,
    }
}

fn under_root(rel: &str) -> std::path::PathBuf {
    Path::new(ROOT).join(rel)
}

async fn wait_for_event_result(handle: &SessionHandle, expected: EventResult) {
    let mut actions = handle.actions();
    with_timeout(actions.wait_for(|a| {
        matches!(a, LastAction::Event { result, .. } if *result == expected)
    }))
    .await
    .expect("session still running");
}

#[tokio::test]
async fn subscribes_to_monitor_on_start() {
    let h = start(FakeBuildBackend::new(), FakeUnitLoader::new());
    assert!(h.feed.is_subscribed());
    assert_eq!(h.handle.last_action(), LastAction::Fresh);
}

#[tokio::test]
async fn sync_build_reports_outcome() {
    let h = start(FakeBuildBackend::new(), FakeUnitLoader::new());

    let outcome = with_timeout(h.handle.trigger_build_sync()).await.expect("reply");
    assert_eq!(outcome, DispatchOutcome::Succeeded);
    assert_eq!(h.handle.last_action(), LastAction::UserSyncBuild);

    let builds = h.backend.builds();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].unit, None);
    assert_eq!(builds[0].working_dir, Path::new(ROOT));
}

#[tokio::test]
async fn sync_build_reports_failure_and_session_survives() {
    let h = start(FakeBuildBackend::failing(), FakeUnitLoader::new());

    let outcome = with_timeout(h.handle.trigger_build_sync()).await.expect("reply");
    match outcome {
        DispatchOutcome::Failed(reason) => assert!(reason.contains("simulated build failure")),
        other => panic!("expected failure, got {other:?}"),
    }

    // Still accepting requests.
    let again = with_timeout(h.handle.trigger_build_sync()).await.expect("reply");
    assert!(!again.is_success());
    assert_eq!(h.backend.builds().len(), 2);
}

#[tokio::test]
async fn panicking_backend_does_not_end_the_session() {
    let h = start(FakeBuildBackend::panicking(), FakeUnitLoader::new());

    let outcome = with_timeout(h.handle.trigger_build_sync()).await.expect("reply");
    match outcome {
        DispatchOutcome::Failed(reason) => assert!(reason.contains("panicked"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }

    let again = with_timeout(h.handle.trigger_build_sync()).await.expect("reply");
    assert!(!again.is_success());
    assert_eq!(h.backend.builds().len(), 2);

    h.handle.shutdown().expect("shutdown sent");
    with_timeout(h.task)
        .await
        .expect("session task joined")
        .expect("session exits cleanly");
}

#[tokio::test]
async fn async_build_is_queued() {
    let h = start(FakeBuildBackend::new(), FakeUnitLoader::new());

    h.handle.trigger_build_async().expect("queued");
    let mut actions = h.handle.actions();
    with_timeout(actions.wait_for(|a| *a == LastAction::UserBuild))
        .await
        .expect("session still running");
    assert_eq!(h.backend.builds().len(), 1);
}

#[tokio::test]
async fn monitor_events_are_handled_in_arrival_order() {
    let h = start(FakeBuildBackend::new(), FakeUnitLoader::new());

    assert!(h.feed.emit(under_root("apps/foo/src/foo.erl"), MODIFIED));
    assert!(h.feed.emit(under_root("deps/bar/ebin/bar.beam"), MODIFIED));
    assert!(h.feed.emit(under_root(".git/index"), MODIFIED));

    // Requests share the channel with monitor events, so everything emitted
    // above has been handled once this returns.
    with_timeout(h.handle.trigger_build_sync()).await.expect("reply");

    let units: Vec<Option<String>> = h.backend.builds().into_iter().map(|b| b.unit).collect();
    assert_eq!(units, vec![Some("foo".to_string()), None]);
    assert_eq!(h.loader.loads(), vec!["bar"]);
}

#[tokio::test]
async fn completed_event_records_outcome() {
    let loader = FakeUnitLoader::new().failing_for("foo");
    let h = start(FakeBuildBackend::new(), loader);

    h.feed.emit(under_root("apps/foo/ebin/foo.beam"), MODIFIED);
    let mut actions = h.handle.actions();
    with_timeout(actions.wait_for(|a| {
        matches!(
            a,
            LastAction::Event {
                result: EventResult::Completed(DispatchOutcome::Failed(_)),
                ..
            }
        )
    }))
    .await
    .expect("session still running");

    // A failed load does not stop the session.
    let outcome = with_timeout(h.handle.trigger_build_sync()).await.expect("reply");
    assert!(outcome.is_success());
}

#[tokio::test]
async fn out_of_scope_and_unhandled_events_do_nothing() {
    let h = start(FakeBuildBackend::new(), FakeUnitLoader::new());

    h.handle
        .inject_event(RawEvent::new("/elsewhere/src/x.erl", MODIFIED.to_vec()))
        .expect("sent");
    wait_for_event_result(&h.handle, EventResult::OutOfScope).await;

    h.feed.emit(under_root("README.md"), MODIFIED);
    wait_for_event_result(&h.handle, EventResult::Unhandled).await;

    assert!(h.backend.builds().is_empty());
    assert!(h.loader.loads().is_empty());
}

#[tokio::test]
async fn unrecognized_messages_are_recorded() {
    let h = start(FakeBuildBackend::new(), FakeUnitLoader::new());

    assert!(h.feed.report("inotify queue overflow"));
    let mut actions = h.handle.actions();
    with_timeout(actions.wait_for(|a| *a == LastAction::UnknownSignal))
        .await
        .expect("session still running");
}

#[tokio::test]
async fn shutdown_releases_monitor_and_closes_handle() {
    let h = start(FakeBuildBackend::new(), FakeUnitLoader::new());

    h.handle.shutdown().expect("shutdown sent");
    with_timeout(h.task)
        .await
        .expect("session task joined")
        .expect("session exits cleanly");

    assert!(h.feed.is_released());
    assert!(!h.feed.emit(under_root("apps/foo/src/foo.erl"), MODIFIED));
    assert!(matches!(
        h.handle.trigger_build_async(),
        Err(HotbuildError::SessionClosed)
    ));
    assert!(matches!(
        h.handle.trigger_build_sync().await,
        Err(HotbuildError::SessionClosed)
    ));
}
