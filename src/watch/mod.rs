// src/watch/mod.rs

//! Event classification and the filesystem monitor boundary.
//!
//! This module is responsible for:
//! - Relativizing event paths against the watched root.
//! - Mapping paths onto units via the layout table.
//! - Dropping noise and deciding the [`Verdict`](crate::types::Verdict) for
//!   each event.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** run builds or loads; it only decides what should happen.

pub mod artifact;
pub mod filter;
pub mod layout;
pub mod monitor;
pub mod noise;
pub mod path_utils;
pub mod watcher;

pub use artifact::ArtifactNaming;
pub use filter::EventFilter;
pub use layout::{Classification, LayoutRule, PathClassifier};
pub use monitor::{EventSink, FilesystemMonitor};
pub use noise::NoiseFilter;
pub use path_utils::RootPath;
pub use watcher::{translate_event, NotifyMonitor};
