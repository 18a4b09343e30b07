// src/watch/path_utils.rs

//! Root path resolution and event path relativization.

use std::path::{Component, Path, PathBuf};

use crate::errors::Result;

/// The watched project root: absolute, canonical where possible, and free of
/// `.` / `..` segments. Computed once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPath {
    path: PathBuf,
}

impl RootPath {
    /// Resolve `path` against the current directory, canonicalize it when it
    /// exists, and shorten any remaining `.` / `..` segments.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let canonical = absolute.canonicalize().unwrap_or(absolute);
        Ok(Self {
            path: shorten(&canonical),
        })
    }

    /// Build a root from an already-absolute path without touching the
    /// filesystem. Only the lexical shortening is applied.
    pub fn lexical(path: impl AsRef<Path>) -> Self {
        Self {
            path: shorten(path.as_ref()),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Name of the root application: the root directory's final segment.
    pub fn unit_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Segments of `path` below the root, or `None` when `path` is not
    /// under the root at all.
    ///
    /// - First we try a direct prefix match on the shortened path.
    /// - If that fails (symlinked prefixes such as macOS `/private/var`), we
    ///   canonicalize the event path and try again. Paths that no longer exist
    ///   cannot be canonicalized and stay out of scope.
    pub fn relative_components(&self, path: &Path) -> Option<Vec<String>> {
        if let Some(components) = strip_root(&self.path, &shorten(path)) {
            return Some(components);
        }

        let canonical = path.canonicalize().ok()?;
        strip_root(&self.path, &shorten(&canonical))
    }
}

fn strip_root(root: &Path, path: &Path) -> Option<Vec<String>> {
    let rel = path.strip_prefix(root).ok()?;
    Some(
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(seg) => Some(seg.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect(),
    )
}

/// Lexically remove `.` segments and fold `..` into their parent.
///
/// `..` directly under the filesystem root stays at the root.
pub fn shorten(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join relative components back into a `/`-separated string for logs and
/// verdicts.
pub fn display_components(components: &[String]) -> String {
    components.join("/")
}
