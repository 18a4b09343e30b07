// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HotbuildError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HotbuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch(cfg)?;
    validate_layout(cfg)?;
    validate_build(cfg)?;
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.debounce_ms == 0 {
        return Err(HotbuildError::ConfigError(
            "[watch].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.watch.poll_interval_ms == 0 {
        return Err(HotbuildError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_layout(cfg: &RawConfigFile) -> Result<()> {
    let layout = &cfg.layout;

    for (key, names) in [
        ("containers", &layout.containers),
        ("root_unit_dirs", &layout.root_unit_dirs),
        ("source_dirs", &layout.source_dirs),
        ("ignored_dirs", &layout.ignored_dirs),
    ] {
        for name in names {
            ensure_segment(key, name)?;
        }
    }
    ensure_segment("artifact_dir", &layout.artifact_dir)?;

    for (key, ext) in [
        ("artifact_extension", &layout.artifact_extension),
        ("in_progress_extension", &layout.in_progress_extension),
    ] {
        if ext.is_empty() || ext.contains('.') {
            return Err(HotbuildError::ConfigError(format!(
                "[layout].{key} must be a non-empty extension without dots (got {ext:?})"
            )));
        }
    }

    if layout.artifact_extension == layout.in_progress_extension {
        return Err(HotbuildError::ConfigError(format!(
            "[layout].artifact_extension and in_progress_extension must differ (both {:?})",
            layout.artifact_extension
        )));
    }

    for pattern in &layout.noise_files {
        Glob::new(pattern).map_err(|e| {
            HotbuildError::ConfigError(format!(
                "[layout].noise_files has invalid glob {pattern:?}: {e}"
            ))
        })?;
    }

    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.program.trim().is_empty() {
        return Err(HotbuildError::ConfigError(
            "[build].program must not be empty".to_string(),
        ));
    }
    if let Some(flag) = &cfg.build.unit_flag {
        if flag.trim().is_empty() {
            return Err(HotbuildError::ConfigError(
                "[build].unit_flag must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}

/// Layout names are matched against single path segments, so they must be
/// one segment themselves.
fn ensure_segment(key: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(HotbuildError::ConfigError(format!(
            "[layout].{key} entries must be single directory names (got {name:?})"
        )));
    }
    Ok(())
}
