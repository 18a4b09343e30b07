use std::path::{Path, PathBuf};

use hotbuild::exec::{
    Action, ActionDispatcher, BuildBackend, BuildConfiguration, DispatchOutcome, ShellBuildBackend,
    ShellUnitLoader, UnitLoader,
};
use hotbuild::types::Scope;
use hotbuild_test_utils::fakes::{FakeBuildBackend, FakeUnitLoader};
use hotbuild_test_utils::init_tracing;

const ROOT: &str = "/work/myapp";

fn dispatcher(
    backend: FakeBuildBackend,
    loader: FakeUnitLoader,
) -> ActionDispatcher<FakeBuildBackend, FakeUnitLoader> {
    ActionDispatcher::new(ROOT, vec!["compile".to_string()], backend, loader)
}

#[tokio::test]
async fn top_level_rebuild_covers_the_whole_project() {
    init_tracing();
    let backend = FakeBuildBackend::new();
    let mut d = dispatcher(backend.clone(), FakeUnitLoader::new());

    let outcome = d.dispatch(&Action::Rebuild(Scope::TopLevel)).await;
    assert_eq!(outcome, DispatchOutcome::Succeeded);

    assert_eq!(backend.builds(), vec![BuildConfiguration::new(ROOT)]);
}

#[tokio::test]
async fn unit_rebuild_is_restricted_to_the_unit_directory() {
    let backend = FakeBuildBackend::new();
    let mut d = dispatcher(backend.clone(), FakeUnitLoader::new());

    d.dispatch(&Action::Rebuild(Scope::named("foo", "apps/foo"))).await;
    d.dispatch(&Action::Rebuild(Scope::named("myapp", ""))).await;

    let builds = backend.builds();
    assert_eq!(builds.len(), 2);
    assert_eq!(builds[0].unit.as_deref(), Some("foo"));
    assert_eq!(builds[0].working_dir, Path::new(ROOT).join("apps/foo"));
    assert_eq!(builds[0].root_dir, PathBuf::from(ROOT));
    assert_eq!(builds[1].unit.as_deref(), Some("myapp"));
    assert_eq!(builds[1].working_dir, Path::new(ROOT).join(""));
}

#[tokio::test]
async fn build_failure_becomes_failed_outcome() {
    let mut d = dispatcher(FakeBuildBackend::failing(), FakeUnitLoader::new());

    let outcome = d.dispatch(&Action::Rebuild(Scope::TopLevel)).await;
    match outcome {
        DispatchOutcome::Failed(reason) => assert!(reason.contains("simulated build failure")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unhandled_scope_is_never_built() {
    let backend = FakeBuildBackend::new();
    let mut d = dispatcher(backend.clone(), FakeUnitLoader::new());

    let outcome = d.dispatch(&Action::Rebuild(Scope::Unhandled)).await;
    assert!(!outcome.is_success());
    assert!(backend.builds().is_empty());
}

#[tokio::test]
async fn reload_goes_to_the_loader() {
    let loader = FakeUnitLoader::new().failing_for("broken");
    let mut d = dispatcher(FakeBuildBackend::new(), loader.clone());

    assert!(d.dispatch(&Action::Reload("foo".into())).await.is_success());
    let outcome = d.dispatch(&Action::Reload("broken".into())).await;
    assert!(matches!(outcome, DispatchOutcome::Failed(ref r) if r.contains("broken")));

    assert_eq!(loader.loads(), vec!["foo", "broken"]);
}

#[tokio::test]
async fn panicking_backend_becomes_failed_outcome() {
    init_tracing();
    let backend = FakeBuildBackend::panicking();
    let mut d = dispatcher(backend.clone(), FakeUnitLoader::new());

    let outcome = d.dispatch(&Action::Rebuild(Scope::named("foo", "apps/foo"))).await;
    match outcome {
        DispatchOutcome::Failed(reason) => {
            assert!(reason.contains("panicked"), "{reason}");
            assert!(reason.contains("simulated build panic"), "{reason}");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    // The backend is still usable after the panic.
    let again = d.dispatch(&Action::Rebuild(Scope::TopLevel)).await;
    assert!(!again.is_success());
    assert_eq!(backend.builds().len(), 2);
}

#[tokio::test]
async fn panicking_loader_becomes_failed_outcome() {
    let loader = FakeUnitLoader::new().panicking_for("bad");
    let mut d = dispatcher(FakeBuildBackend::new(), loader.clone());

    let outcome = d.dispatch(&Action::Reload("bad".into())).await;
    assert!(
        matches!(outcome, DispatchOutcome::Failed(ref r) if r.contains("unit loader panicked")),
        "{outcome:?}"
    );
    assert!(d.dispatch(&Action::Reload("good".into())).await.is_success());
    assert_eq!(loader.loads(), vec!["bad", "good"]);
}

#[test]
fn shell_backend_appends_unit_flag_only_for_unit_builds() {
    let backend = ShellBuildBackend::new("rebar3", Some("--app".into()));
    let commands = vec!["compile".to_string()];

    let project = BuildConfiguration::new(ROOT);
    assert_eq!(backend.arguments(&commands, &project), vec!["compile"]);

    let unit = project.restrict_to("foo", Path::new(ROOT).join("apps/foo"));
    assert_eq!(
        backend.arguments(&commands, &unit),
        vec!["compile", "--app", "foo"]
    );

    let no_flag = ShellBuildBackend::new("make", None);
    assert_eq!(no_flag.arguments(&commands, &unit), vec!["compile"]);
}

#[test]
fn shell_loader_substitutes_unit_name() {
    let loader = ShellUnitLoader::new(Some("erl_call -a 'c l [{unit}]'".into()));
    assert_eq!(
        loader.command_for("foo").as_deref(),
        Some("erl_call -a 'c l [foo]'")
    );
    assert_eq!(ShellUnitLoader::new(None).command_for("foo"), None);
}

#[tokio::test]
async fn shell_loader_without_command_succeeds() {
    let mut loader = ShellUnitLoader::default();
    loader.load("foo").await.expect("logged-only load succeeds");
}

#[cfg(unix)]
#[tokio::test]
async fn shell_backend_reports_exit_status_and_stderr() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut backend = ShellBuildBackend::new("sh", None);
    let config = BuildConfiguration::new(tmp.path());

    backend
        .run_build(&["-c".to_string(), "exit 0".to_string()], &config)
        .await
        .expect("successful build");

    let err = backend
        .run_build(
            &["-c".to_string(), "echo compile error >&2; exit 3".to_string()],
            &config,
        )
        .await
        .expect_err("failing build");
    let msg = format!("{err:#}");
    assert!(msg.contains("status 3"), "{msg}");
    assert!(msg.contains("compile error"), "{msg}");
}

#[cfg(unix)]
#[tokio::test]
async fn shell_loader_runs_command_per_unit() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let marker = tmp.path().join("loaded");
    let template = format!("echo {{unit}} >> '{}'", marker.display());
    let mut loader = ShellUnitLoader::new(Some(template));

    loader.load("foo").await.expect("load foo");
    loader.load("bar").await.expect("load bar");
    assert_eq!(std::fs::read_to_string(&marker).expect("marker"), "foo\nbar\n");

    let mut failing = ShellUnitLoader::new(Some("exit 1".into()));
    let err = failing.load("foo").await.expect_err("failing load");
    assert!(err.to_string().contains("foo"));
}
