use clap::Parser;
use hotbuild::cli::{CliArgs, LogLevel};
use hotbuild::config::DEFAULT_CONFIG_FILE;
use hotbuild::logging::{filter_from_env, parse_level_str};

#[test]
fn defaults_watch_current_directory() {
    let args = CliArgs::try_parse_from(["hotbuild"]).expect("parse");
    assert_eq!(args.root, ".");
    assert!(args.config.is_none());
    assert!(!args.once);
    assert!(!args.rebuild_on_enter);
    assert!(!args.dry_run);
    assert!(args.log_level.is_none());
}

#[test]
fn flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "hotbuild",
        "--root",
        "/srv/app",
        "--config",
        "dev.toml",
        "--rebuild-on-enter",
        "--log-level",
        "debug",
    ])
    .expect("parse");
    assert_eq!(args.root, "/srv/app");
    assert_eq!(args.config.as_deref(), Some("dev.toml"));
    assert!(args.rebuild_on_enter);
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));

    assert!(CliArgs::try_parse_from(["hotbuild", "--log-level", "loud"]).is_err());
}

#[test]
fn env_level_names() {
    assert_eq!(parse_level_str(" Debug "), Some(tracing::Level::DEBUG));
    assert_eq!(parse_level_str("warning"), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str("verbose"), None);

    assert_eq!(filter_from_env(None).to_string(), "info");
    assert_eq!(filter_from_env(Some("  ")).to_string(), "info");
    assert_eq!(filter_from_env(Some("DEBUG")).to_string(), "debug");
    assert_eq!(
        filter_from_env(Some("hotbuild=trace")).to_string(),
        "hotbuild=trace"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn once_mode_reports_build_status() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path().to_string_lossy().into_owned();

    std::fs::write(
        tmp.path().join(DEFAULT_CONFIG_FILE),
        "[build]\nprogram = \"sh\"\ncommands = [\"-c\", \"exit 0\"]\n",
    )
    .expect("write config");
    let args = CliArgs::try_parse_from(["hotbuild", "--root", root.as_str(), "--once"]).expect("parse");
    hotbuild::run(args).await.expect("build succeeds");

    let failing = tmp.path().join("failing.toml");
    std::fs::write(
        &failing,
        "[build]\nprogram = \"sh\"\ncommands = [\"-c\", \"exit 4\"]\n",
    )
    .expect("write config");
    let config = failing.to_string_lossy().into_owned();
    let args = CliArgs::try_parse_from(["hotbuild", "--root", root.as_str(), "--config", config.as_str(), "--once"])
        .expect("parse");
    let err = hotbuild::run(args).await.expect_err("build fails");
    assert!(format!("{err:#}").contains("status 4"));
}

#[tokio::test]
async fn dry_run_validates_config_without_watching() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path().to_string_lossy().into_owned();

    let args = CliArgs::try_parse_from(["hotbuild", "--root", root.as_str(), "--dry-run"]).expect("parse");
    hotbuild::run(args).await.expect("dry run");

    std::fs::write(
        tmp.path().join(DEFAULT_CONFIG_FILE),
        "[watch]\ndebounce_ms = 0\n",
    )
    .expect("write config");
    let args = CliArgs::try_parse_from(["hotbuild", "--root", root.as_str(), "--dry-run"]).expect("parse");
    assert!(hotbuild::run(args).await.is_err());
}
