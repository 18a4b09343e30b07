// src/watch/filter.rs

//! Turns one root-relative event into a [`Verdict`].

use anyhow::Result;
use tracing::trace;

use crate::config::LayoutSection;
use crate::types::{EventKind, Scope, Verdict};
use crate::watch::artifact::ArtifactNaming;
use crate::watch::layout::PathClassifier;
use crate::watch::noise::NoiseFilter;
use crate::watch::path_utils::display_components;

/// Pure, deterministic event evaluation. Holds no per-event state, so the
/// same input always produces the same verdict.
#[derive(Debug, Clone)]
pub struct EventFilter {
    classifier: PathClassifier,
    noise: NoiseFilter,
    artifacts: ArtifactNaming,
    source_dirs: Vec<String>,
    artifact_dir: String,
}

impl EventFilter {
    pub fn new(
        classifier: PathClassifier,
        noise: NoiseFilter,
        artifacts: ArtifactNaming,
        source_dirs: Vec<String>,
        artifact_dir: String,
    ) -> Self {
        Self {
            classifier,
            noise,
            artifacts,
            source_dirs,
            artifact_dir,
        }
    }

    /// Build the filter for a root unit from `[layout]`.
    ///
    /// `atomic_renames` comes from the monitor's event vocabulary and is
    /// fixed for the filter's lifetime.
    pub fn from_layout(
        layout: &LayoutSection,
        root_unit: impl Into<String>,
        atomic_renames: bool,
    ) -> Result<Self> {
        Ok(Self::new(
            PathClassifier::from_layout(layout, root_unit),
            NoiseFilter::from_layout(layout)?,
            ArtifactNaming::from_layout(layout, atomic_renames),
            layout.source_dirs.clone(),
            layout.artifact_dir.clone(),
        ))
    }

    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    pub fn artifacts(&self) -> &ArtifactNaming {
        &self.artifacts
    }

    /// The first kind in `kinds` that can trigger an action, in the order
    /// the monitor reported them.
    pub fn triggering_kind(kinds: &[EventKind]) -> Option<EventKind> {
        kinds.iter().copied().find(|k| k.is_trigger())
    }

    pub fn evaluate(&self, components: &[String], kinds: &[EventKind]) -> Verdict {
        let Some(kind) = Self::triggering_kind(kinds) else {
            return Verdict::Ignore;
        };

        if self.noise.is_noise(components) {
            trace!(path = %display_components(components), "noise path");
            return Verdict::Ignore;
        }

        trace!(path = %display_components(components), ?kind, "evaluating path");

        let classification = self.classifier.classify(components);
        if classification.scope == Scope::Unhandled {
            return Verdict::Unhandled(display_components(components));
        }

        match classification.unit_path {
            [dir, file] if *dir == self.artifact_dir => self.artifacts.parse(file),
            [dir, _, ..] if self.source_dirs.iter().any(|s| s == dir) => {
                Verdict::Rebuild(classification.scope)
            }
            _ => Verdict::Unhandled(display_components(components)),
        }
    }
}
