#![allow(dead_code)]

use hotbuild::config::{ConfigFile, RawConfigFile};
use hotbuild::types::MonitorBackend;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_backend(mut self, backend: MonitorBackend) -> Self {
        self.config.watch.backend = backend;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn with_container(mut self, dir: &str) -> Self {
        self.config.layout.containers.push(dir.to_string());
        self
    }

    pub fn with_source_dir(mut self, dir: &str) -> Self {
        self.config.layout.source_dirs.push(dir.to_string());
        self
    }

    pub fn with_noise_file(mut self, pattern: &str) -> Self {
        self.config.layout.noise_files.push(pattern.to_string());
        self
    }

    pub fn with_artifact_extensions(mut self, ext: &str, in_progress: &str) -> Self {
        self.config.layout.artifact_extension = ext.to_string();
        self.config.layout.in_progress_extension = in_progress.to_string();
        self
    }

    pub fn with_build_program(mut self, program: &str) -> Self {
        self.config.build.program = program.to_string();
        self
    }

    pub fn with_build_commands(mut self, commands: &[&str]) -> Self {
        self.config.build.commands = commands.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_unit_flag(mut self, flag: &str) -> Self {
        self.config.build.unit_flag = Some(flag.to_string());
        self
    }

    pub fn with_load_command(mut self, cmd: &str) -> Self {
        self.config.load.command = Some(cmd.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
