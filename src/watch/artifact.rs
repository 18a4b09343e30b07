// src/watch/artifact.rs

//! Compiled artifact filename parsing.

use crate::config::LayoutSection;
use crate::types::Verdict;

/// Knows what finished and in-progress artifact names look like, and whether
/// the active monitor reports renames as a single event.
#[derive(Debug, Clone)]
pub struct ArtifactNaming {
    extension: String,
    in_progress_extension: String,
    atomic_renames: bool,
}

impl ArtifactNaming {
    pub fn new(
        extension: impl Into<String>,
        in_progress_extension: impl Into<String>,
        atomic_renames: bool,
    ) -> Self {
        Self {
            extension: extension.into(),
            in_progress_extension: in_progress_extension.into(),
            atomic_renames,
        }
    }

    pub fn from_layout(layout: &LayoutSection, atomic_renames: bool) -> Self {
        Self::new(
            layout.artifact_extension.clone(),
            layout.in_progress_extension.clone(),
            atomic_renames,
        )
    }

    pub fn atomic_renames(&self) -> bool {
        self.atomic_renames
    }

    /// Verdict for a file found directly in the artifact directory.
    ///
    /// - `name.<ext>` loads `name`.
    /// - `name.<in-progress ext>` waits for the rename: if the monitor
    ///   reports renames, the rename event will name the real file and this
    ///   one is ignored; otherwise a deferred load is requested.
    /// - Anything else is an unknown artifact.
    pub fn parse(&self, file_name: &str) -> Verdict {
        let tokens: Vec<&str> = file_name.split('.').collect();
        match tokens.as_slice() {
            [name, ext] if !name.is_empty() && *ext == self.extension => {
                Verdict::Reload(name.to_string())
            }
            [name, ext] if !name.is_empty() && *ext == self.in_progress_extension => {
                if self.atomic_renames {
                    Verdict::Ignore
                } else {
                    Verdict::DeferReload(name.to_string())
                }
            }
            _ => Verdict::UnknownArtifact(file_name.to_string()),
        }
    }
}
