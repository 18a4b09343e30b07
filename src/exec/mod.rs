// src/exec/mod.rs

//! Build and load execution layer.
//!
//! - [`backend`] provides the `BuildBackend` trait and `ShellBuildBackend`,
//!   which runs the configured build tool as a child process.
//! - [`loader`] provides the `UnitLoader` trait and `ShellUnitLoader`.
//! - [`dispatcher`] owns both and turns session actions into calls on them,
//!   containing every failure and restoring the working directory.

pub mod backend;
pub mod dispatcher;
pub mod loader;

pub use backend::{BuildBackend, BuildConfiguration, ShellBuildBackend};
pub use dispatcher::{Action, ActionDispatcher, DispatchOutcome, WorkingDirGuard};
pub use loader::{ShellUnitLoader, UnitLoader};
