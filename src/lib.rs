// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_for_root, ConfigFile};
use crate::engine::{SessionHandle, WatchSession};
use crate::exec::{Action, ActionDispatcher, DispatchOutcome, ShellBuildBackend, ShellUnitLoader};
use crate::types::Scope;
use crate::watch::{NotifyMonitor, PathClassifier, RootPath};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - root resolution and config loading
/// - build backend and unit loader
/// - file monitor + watch session
/// - stdin rebuild requests (optional)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let root = RootPath::resolve(&args.root)
        .with_context(|| format!("resolving project root {:?}", args.root))?;
    let cfg = load_for_root(root.as_path(), args.config.as_deref().map(Path::new))?;

    if args.dry_run {
        print_dry_run(&root, &cfg);
        return Ok(());
    }

    let backend = ShellBuildBackend::from_config(cfg.build());
    let loader = ShellUnitLoader::from_config(cfg.load());

    if args.once {
        return build_once(&root, &cfg, backend, loader).await;
    }

    let monitor = NotifyMonitor::new(
        root.as_path(),
        cfg.watch().backend,
        cfg.watch().poll_interval(),
    );
    let (handle, task) = WatchSession::start(&cfg, Box::new(monitor), backend, loader)?;

    // Ctrl-C → graceful shutdown.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = handle.shutdown();
        });
    }

    if args.rebuild_on_enter {
        spawn_stdin_trigger(handle.clone());
        info!("press Enter to rebuild the whole project");
    }

    task.await.context("watch session task failed")??;
    Ok(())
}

/// One synchronous full build without a session.
async fn build_once(
    root: &RootPath,
    cfg: &ConfigFile,
    backend: ShellBuildBackend,
    loader: ShellUnitLoader,
) -> Result<()> {
    let mut dispatcher =
        ActionDispatcher::new(root.as_path(), cfg.build().commands.clone(), backend, loader);
    match dispatcher.dispatch(&Action::Rebuild(Scope::TopLevel)).await {
        DispatchOutcome::Succeeded => Ok(()),
        DispatchOutcome::Failed(reason) => bail!("build failed: {reason}"),
    }
}

/// Each line read from stdin queues a full build.
fn spawn_stdin_trigger(handle: SessionHandle) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(_)) => {
                    if handle.trigger_build_async().is_err() {
                        debug!("session stopped; no longer reading stdin");
                        return;
                    }
                }
                Ok(None) => {
                    debug!("stdin closed");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "failed reading stdin");
                    return;
                }
            }
        }
    });
}

/// Dry-run output: the effective layout and collaborators.
fn print_dry_run(root: &RootPath, cfg: &ConfigFile) {
    let classifier = PathClassifier::from_layout(cfg.layout(), root.unit_name());
    let layout = cfg.layout();

    println!("hotbuild dry-run");
    println!("  root = {}", root.as_path().display());
    println!("  root unit = {}", classifier.root_unit());
    println!();

    println!("layout rules ({}):", classifier.rules().len());
    for rule in classifier.rules() {
        println!("  - {rule}");
    }
    println!("  source dirs: {:?}", layout.source_dirs);
    println!(
        "  artifacts: {}/<unit>.{} (in progress: .{})",
        layout.artifact_dir, layout.artifact_extension, layout.in_progress_extension
    );
    println!("  ignored dirs: {:?}", layout.ignored_dirs);
    println!("  noise files: {:?}", layout.noise_files);
    println!();

    println!("watch:");
    println!("  backend = {:?}", cfg.watch().backend);
    println!("  debounce = {:?}", cfg.watch().debounce_delay());
    println!();

    println!("build:");
    println!("  program = {}", cfg.build().program);
    println!("  commands = {:?}", cfg.build().commands);
    if let Some(ref flag) = cfg.build().unit_flag {
        println!("  unit_flag = {flag}");
    }
    match cfg.load().command {
        Some(ref cmd) => println!("load:\n  command = {cmd}"),
        None => println!("load:\n  (no command; loads are only logged)"),
    }

    debug!("dry-run complete (nothing watched)");
}
