// src/config/mod.rs

//! Configuration loading and validation for hotbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate layout names, extensions and durations (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_for_root, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{
    BuildSection, ConfigFile, LayoutSection, LoadSection, RawConfigFile, WatchSection,
};
