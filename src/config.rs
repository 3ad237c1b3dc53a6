//! Tool configuration module.
//!
//! Handles loading, validating, and merging `canvas.toml`. Stock defaults are
//! the base layer; a user file overrides any subset of them; command-line
//! flags and batch job fields override both.
//!
//! ## Config File Location
//!
//! `canvas.toml` in the working directory is picked up automatically.
//! `--config <path>` names a different file, which must then exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [extend]
//! padding_pct = 0.05        # Margin above/below the subject, as a fraction of its height
//!
//! [crop]
//! output_width = 1080
//! output_height = 1920
//! scale = 1.0
//!
//! [matte]
//! width = 1920
//! height = 1080
//! padding = 0.0             # Percent of each side, 0 <= padding < 50
//! color = "#000000"
//!
//! [output]
//! quality = 95              # JPEG/AVIF quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel batch workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::params::{
    BackgroundColor, CropRequest, DEFAULT_CROP_OUTPUT, DEFAULT_MATTE_CANVAS, DEFAULT_MATTE_COLOR,
    DEFAULT_SUBJECT_PADDING, ExtendRequest, MatteRequest, Quality,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "canvas.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `canvas.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Canvas extension defaults.
    pub extend: ExtendConfig,
    /// Crop-scale-center defaults.
    pub crop: CropConfig,
    /// Matte defaults.
    pub matte: MatteConfig,
    /// Encoder settings shared by every operation.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtendConfig {
    /// Fraction of the subject height added above and below it.
    pub padding_pct: f64,
}

impl Default for ExtendConfig {
    fn default() -> Self {
        Self {
            padding_pct: DEFAULT_SUBJECT_PADDING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub output_width: u32,
    pub output_height: u32,
    pub scale: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_CROP_OUTPUT.0,
            output_height: DEFAULT_CROP_OUTPUT.1,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatteConfig {
    pub width: u32,
    pub height: u32,
    /// Percent of each canvas side used as margin.
    pub padding: f64,
    /// Hex triplet, with or without `#`.
    pub color: String,
}

impl Default for MatteConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MATTE_CANVAS.0,
            height: DEFAULT_MATTE_CANVAS.1,
            padding: 0.0,
            color: DEFAULT_MATTE_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

impl CanvasConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Validation(msg));

        if !self.extend.padding_pct.is_finite() || self.extend.padding_pct < 0.0 {
            return invalid(format!(
                "extend.padding_pct must be a finite value >= 0 (got {})",
                self.extend.padding_pct
            ));
        }
        if self.crop.output_width == 0 || self.crop.output_height == 0 {
            return invalid("crop.output_width and crop.output_height must be positive".into());
        }
        if !self.crop.scale.is_finite() || self.crop.scale <= 0.0 {
            return invalid(format!("crop.scale must be positive (got {})", self.crop.scale));
        }
        if self.matte.width == 0 || self.matte.height == 0 {
            return invalid("matte.width and matte.height must be positive".into());
        }
        if !(0.0..50.0).contains(&self.matte.padding) {
            return invalid(format!(
                "matte.padding must be between 0 and 50 (got {})",
                self.matte.padding
            ));
        }
        if let Err(e) = BackgroundColor::parse(&self.matte.color) {
            return invalid(format!("matte.color: {e}"));
        }
        if !(1..=100).contains(&self.output.quality) {
            return invalid(format!(
                "output.quality must be 1-100 (got {})",
                self.output.quality
            ));
        }
        if self.processing.max_processes == Some(0) {
            return invalid("processing.max_processes must be at least 1".into());
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }

    /// Fill every field the request left unset from `[extend]`.
    pub fn fill_extend(&self, request: ExtendRequest) -> ExtendRequest {
        ExtendRequest {
            padding_pct: request.padding_pct.or(Some(self.extend.padding_pct)),
            ..request
        }
    }

    /// Fill every field the request left unset from `[crop]`.
    pub fn fill_crop(&self, request: CropRequest) -> CropRequest {
        CropRequest {
            output_width: request
                .output_width
                .or(Some(i64::from(self.crop.output_width))),
            output_height: request
                .output_height
                .or(Some(i64::from(self.crop.output_height))),
            scale: request.scale.or(Some(self.crop.scale)),
            ..request
        }
    }

    /// Fill every field the request left unset from `[matte]`.
    pub fn fill_matte(&self, request: MatteRequest) -> MatteRequest {
        MatteRequest {
            width: request.width.or(Some(i64::from(self.matte.width))),
            height: request.height.or(Some(i64::from(self.matte.height))),
            padding: request.padding.or(Some(self.matte.padding)),
            color: request.color.or_else(|| Some(self.matte.color.clone())),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CanvasConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CanvasConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CanvasConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// With an explicit path the file must exist. Without one, `canvas.toml` in
/// the working directory is used when present, stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<CanvasConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(CONFIG_FILE_NAME))?,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `canvas.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# product-canvas Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags and batch job fields override these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Canvas extension
# ---------------------------------------------------------------------------
[extend]
# Margin kept above and below the detected subject, as a fraction of the
# subject's height. 0.05 adds 5% on each side.
padding_pct = 0.05

# ---------------------------------------------------------------------------
# Crop, scale and center
# ---------------------------------------------------------------------------
[crop]
# Size of the black output canvas.
output_width = 1080
output_height = 1920

# Scale applied to the cropped region before centering.
scale = 1.0

# ---------------------------------------------------------------------------
# Matte
# ---------------------------------------------------------------------------
[matte]
# Size of the output canvas.
width = 1920
height = 1080

# Margin on each side as a percent of that side (0 <= padding < 50).
padding = 0.0

# Background color as a hex triplet.
color = "#000000"

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# JPEG/AVIF encoding quality (1 = worst, 100 = best).
# The format itself follows the output file extension.
quality = 95

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
