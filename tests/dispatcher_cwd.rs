//! Kept alone in its own test binary: it changes the process working
//! directory.

use hotbuild::exec::{Action, ActionDispatcher, DispatchOutcome};
use hotbuild::types::Scope;
use hotbuild_test_utils::fakes::{FakeBuildBackend, FakeUnitLoader};
use hotbuild_test_utils::init_tracing;

#[tokio::test]
async fn working_directory_is_restored_after_every_build() {
    init_tracing();
    let original = std::env::current_dir().expect("cwd");
    let elsewhere = tempfile::tempdir().expect("tempdir");
    let root = tempfile::tempdir().expect("tempdir");

    let ok_backend = FakeBuildBackend::new().changing_dir_to(elsewhere.path());
    let mut d = ActionDispatcher::new(
        root.path(),
        vec!["compile".to_string()],
        ok_backend.clone(),
        FakeUnitLoader::new(),
    );
    let outcome = d.dispatch(&Action::Rebuild(Scope::named("foo", "apps/foo"))).await;
    assert_eq!(outcome, DispatchOutcome::Succeeded);
    assert_eq!(std::env::current_dir().expect("cwd"), original);
    assert_eq!(ok_backend.builds().len(), 1);

    let failing_backend = FakeBuildBackend::failing().changing_dir_to(elsewhere.path());
    let mut d = ActionDispatcher::new(
        root.path(),
        vec!["compile".to_string()],
        failing_backend,
        FakeUnitLoader::new(),
    );
    let outcome = d.dispatch(&Action::Rebuild(Scope::TopLevel)).await;
    assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    assert_eq!(std::env::current_dir().expect("cwd"), original);
}
