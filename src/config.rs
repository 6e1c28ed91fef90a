//! Tool configuration module.
//!
//! Handles loading, validating, and persisting `config.toml`. User values
//! are merged over the stock defaults, so a config file only needs the keys
//! it wants to change.
//!
//! ## Config File Location
//!
//! `config.toml` lives in the config directory (`--config-dir`, default the
//! current directory). A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! language = "en"           # Status wording: "en" or "zh"
//!
//! [resize]
//! jpeg_quality = 95         # JPEG output quality (1-100)
//! filter = "lanczos3"       # lanczos3 | catmull-rom | gaussian | triangle
//!
//! [diff]
//! debounce_ms = 300         # Quiet period before `diff --watch` recomputes
//!
//! [export]
//! archive = true            # Bundle "download all" into one ZIP
//! download_spacing_ms = 100 # Pause between individual saves otherwise
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Persisted Preference
//!
//! The display language is the one value the tools write back:
//! [`save_language`] updates `language` in place and keeps every other key.

use crate::export::ExportOptions;
use crate::imaging::{Filter, Quality};
use crate::resize::ResizeOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Display language for status and error wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

/// Tool configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub language: Language,
    pub resize: ResizeConfig,
    pub diff: DiffConfig,
    pub export: ExportConfig,
}

impl ToolsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.resize.jpeg_quality) {
            return Err(ConfigError::Validation(
                "resize.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.diff.debounce_ms > 10_000 {
            return Err(ConfigError::Validation(
                "diff.debounce_ms must be at most 10000".into(),
            ));
        }
        if self.export.download_spacing_ms > 10_000 {
            return Err(ConfigError::Validation(
                "export.download_spacing_ms must be at most 10000".into(),
            ));
        }
        Ok(())
    }

    pub fn resize_options(&self) -> ResizeOptions {
        ResizeOptions {
            quality: Quality::new(self.resize.jpeg_quality),
            filter: self.resize.filter,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            archive: self.export.archive,
            spacing: Duration::from_millis(self.export.download_spacing_ms),
        }
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.diff.debounce_ms)
    }
}

/// Rescaler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub jpeg_quality: u32,
    pub filter: Filter,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            filter: Filter::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    pub debounce_ms: u64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

/// Bulk download settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Ignored when the `archive` feature is compiled out.
    pub archive: bool,
    pub download_spacing_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            archive: true,
            download_spacing_ms: 100,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolsConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if there is no `config.toml` in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolsConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<ToolsConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(dir = %dir.display(), language = config.language.code(), "loaded config");
    Ok(config)
}

/// Persist the display language, keeping every other key in the file.
///
/// Creates the directory and file when missing. Comments in an existing
/// file are not preserved.
pub fn save_language(dir: &Path, language: Language) -> Result<PathBuf, ConfigError> {
    let mut table = match load_raw_config(dir)? {
        Some(toml::Value::Table(table)) => table,
        _ => toml::map::Map::new(),
    };
    table.insert(
        "language".to_string(),
        toml::Value::String(language.code().to_string()),
    );

    // Reject a file that would no longer load
    let value = toml::Value::Table(table);
    resolve_config(stock_defaults_value()?, Some(value.clone()))?;

    fs::create_dir_all(dir)?;
    let path = dir.join(CONFIG_FILE);
    fs::write(&path, toml::to_string_pretty(&value)?)?;
    tracing::info!(path = %path.display(), language = language.code(), "saved language");
    Ok(path)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Toolbench Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Language for progress and status messages: "en" or "zh".
# `toolbench set-language` rewrites this key.
language = "en"

# ---------------------------------------------------------------------------
# Image rescaler
# ---------------------------------------------------------------------------
[resize]
# Quality for JPEG output (1-100). PNG, WebP, BMP and GIF use encoder defaults.
jpeg_quality = 95

# Resampling filter: "lanczos3", "catmull-rom", "gaussian" or "triangle".
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Text diff
# ---------------------------------------------------------------------------
[diff]
# With --watch, recompute only after the files have been quiet this long.
debounce_ms = 300

# ---------------------------------------------------------------------------
# Download all
# ---------------------------------------------------------------------------
[export]
# Bundle every result into resized_images_<millis>.zip.
# Without archive support, results are saved one by one.
archive = true

# Pause between individual saves, in milliseconds.
download_spacing_ms = 100
"##
}
