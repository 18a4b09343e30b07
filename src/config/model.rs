// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::MonitorBackend;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// backend = "recommended"
/// debounce_ms = 500
///
/// [layout]
/// containers = ["apps", "deps"]
/// artifact_dir = "ebin"
///
/// [build]
/// program = "rebar3"
/// commands = ["compile"]
///
/// [load]
/// command = "erl_call -sname dev -a 'c l [{unit}]'"
/// ```
///
/// Every section is optional; an empty file is the same as no file at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub layout: LayoutSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub load: LoadSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch: WatchSection,
    layout: LayoutSection,
    build: BuildSection,
    load: LoadSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            watch: raw.watch,
            layout: raw.layout,
            build: raw.build,
            load: raw.load,
        }
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    pub fn layout(&self) -> &LayoutSection {
        &self.layout
    }

    pub fn build(&self) -> &BuildSection {
        &self.build
    }

    pub fn load(&self) -> &LoadSection {
        &self.load
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// `"recommended"` (native notifications) or `"poll"`.
    #[serde(default)]
    pub backend: MonitorBackend,

    /// Poll interval for the `"poll"` backend.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long an in-progress artifact waits for its final rename before
    /// the unit is loaded anyway.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl WatchSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            backend: MonitorBackend::default(),
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[layout]` section: how paths map onto units and which files are noise.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutSection {
    /// Directories whose children are independent units (`apps/<name>`).
    #[serde(default = "default_containers")]
    pub containers: Vec<String>,

    /// Top-level directories that belong to the root unit itself.
    #[serde(default = "default_root_unit_dirs")]
    pub root_unit_dirs: Vec<String>,

    /// Unit directories whose contents require a recompile when changed.
    #[serde(default = "default_source_dirs")]
    pub source_dirs: Vec<String>,

    /// Unit directory holding compiled artifacts.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,

    /// Extension of a finished compiled artifact.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,

    /// Extension of an artifact that is still being written and will be
    /// renamed to `artifact_extension` once complete.
    #[serde(default = "default_in_progress_extension")]
    pub in_progress_extension: String,

    /// Directory names that are never interesting at any depth.
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,

    /// File-name globs that are never interesting.
    #[serde(default = "default_noise_files")]
    pub noise_files: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_containers() -> Vec<String> {
    strings(&["apps", "deps"])
}

fn default_root_unit_dirs() -> Vec<String> {
    strings(&["src", "priv", "c_src", "ebin"])
}

fn default_source_dirs() -> Vec<String> {
    strings(&["src", "c_src", "priv"])
}

fn default_artifact_dir() -> String {
    "ebin".to_string()
}

fn default_artifact_extension() -> String {
    "beam".to_string()
}

fn default_in_progress_extension() -> String {
    "bea#".to_string()
}

fn default_ignored_dirs() -> Vec<String> {
    strings(&[".git", ".hg", ".svn", "CVS", "log"])
}

fn default_noise_files() -> Vec<String> {
    strings(&[".rebarinfo", "LICENSE", "*~", "*.swp", "*.swx", ".#*"])
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            containers: default_containers(),
            root_unit_dirs: default_root_unit_dirs(),
            source_dirs: default_source_dirs(),
            artifact_dir: default_artifact_dir(),
            artifact_extension: default_artifact_extension(),
            in_progress_extension: default_in_progress_extension(),
            ignored_dirs: default_ignored_dirs(),
            noise_files: default_noise_files(),
        }
    }
}

/// `[build]` section for the shell build backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Build tool executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments passed to every build.
    #[serde(default = "default_commands")]
    pub commands: Vec<String>,

    /// Flag used to narrow a build to one unit, e.g. `"--apps"`. When unset,
    /// a narrowed build only changes the working directory.
    #[serde(default)]
    pub unit_flag: Option<String>,
}

fn default_program() -> String {
    "rebar3".to_string()
}

fn default_commands() -> Vec<String> {
    strings(&["compile"])
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            commands: default_commands(),
            unit_flag: None,
        }
    }
}

/// `[load]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadSection {
    /// Shell command run to load a freshly compiled unit; `{unit}` is
    /// replaced with the unit name. Without it, loads are only logged.
    #[serde(default)]
    pub command: Option<String>,
}
