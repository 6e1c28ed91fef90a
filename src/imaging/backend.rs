//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the rescaler and
//! the comparison viewer need: decode, measure, and render (resample into a
//! new surface, then encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. The decoded image is an associated type so test doubles can stand
//! in without carrying pixels.

use super::params::RenderParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },
    #[error("Output of {width} × {height} pixels is too large")]
    TooLarge { width: u32, height: u32 },
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// A decoded, in-memory bitmap.
    type Image;

    /// Decode an encoded file held in memory.
    fn decode(&self, data: &[u8]) -> Result<Self::Image, BackendError>;

    /// Dimensions of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resample `image` to the requested size and encode it.
    fn render(&self, image: &Self::Image, params: &RenderParams) -> Result<Vec<u8>, BackendError>;
}
