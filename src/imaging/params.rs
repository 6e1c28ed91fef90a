//! Parameter types for image operations.
//!
//! These structs describe *what* to render, not *how*. They sit between the
//! batch rescaler (which decides the target size and encoding for each output
//! scale) and the [`backend`](super::backend) (which does the pixel work), so
//! the batch logic can be tested against a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`Filter`]: Resampling filter. Nearest-neighbour is not offered.
//! - [`RenderParams`]: Target dimensions, output format, quality and filter for one artifact.

use super::formats::OutputFormat;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
///
/// Only JPEG output consumes it; the other formats use their encoder defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// High-quality resampling filters offered for rescaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    #[default]
    Lanczos3,
    CatmullRom,
    Gaussian,
    Triangle,
}

/// Everything a backend needs to produce one encoded artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
    pub filter: Filter,
}
