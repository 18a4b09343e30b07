// src/watch/noise.rs

//! Paths that never lead to an action: version control and log directories,
//! editor temp files, and tool marker files.

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::LayoutSection;

/// Name of the file vim creates to probe whether a directory is writable.
/// When it already exists vim retries with `4913 + 123`, `4913 + 246`, ...
const VIM_PROBE_BASE: u64 = 4913;
const VIM_PROBE_STEP: u64 = 123;

#[derive(Clone)]
pub struct NoiseFilter {
    ignored_dirs: Vec<String>,
    noise_files: GlobSet,
}

impl fmt::Debug for NoiseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseFilter")
            .field("ignored_dirs", &self.ignored_dirs)
            .finish_non_exhaustive()
    }
}

impl NoiseFilter {
    pub fn from_layout(layout: &LayoutSection) -> Result<Self> {
        let noise_files = build_globset(&layout.noise_files)
            .context("building noise file globset")?;
        Ok(Self {
            ignored_dirs: layout.ignored_dirs.clone(),
            noise_files,
        })
    }

    /// True when the path should be dropped without classification.
    ///
    /// Ignored names only match directory segments, so a file that happens
    /// to be called `log` is still classified. An event on a bare `.git`
    /// directory falls through to the classifier and ends up unhandled.
    pub fn is_noise(&self, components: &[String]) -> bool {
        let Some((file, dirs)) = components.split_last() else {
            return false;
        };
        if dirs
            .iter()
            .any(|segment| self.ignored_dirs.iter().any(|d| d == segment))
        {
            return true;
        }
        self.noise_files.is_match(file.as_str()) || is_vim_probe(file)
    }
}

/// `4913`, `5036`, `5159`, ...
pub fn is_vim_probe(name: &str) -> bool {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match name.parse::<u64>() {
        Ok(n) => n >= VIM_PROBE_BASE && (n - VIM_PROBE_BASE) % VIM_PROBE_STEP == 0,
        Err(_) => false,
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
