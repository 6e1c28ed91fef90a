//! Pure Rust image backend on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP, BMP, GIF) | `image::load_from_memory` |
//! | Resample | `DynamicImage::resize_exact` (Lanczos3 unless configured otherwise) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with explicit quality |
//! | Encode → PNG, WebP, BMP, GIF | `DynamicImage::write_to` (encoder defaults, lossless WebP) |
//!
//! Decoded images are normalised to 8-bit RGBA, the same working space a
//! browser canvas uses, so every encoder receives a layout it supports.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::check_canvas_size;
use super::formats::OutputFormat;
use super::params::{Filter, RenderParams};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_type(filter: Filter) -> FilterType {
    match filter {
        Filter::Lanczos3 => FilterType::Lanczos3,
        Filter::CatmullRom => FilterType::CatmullRom,
        Filter::Gaussian => FilterType::Gaussian,
        Filter::Triangle => FilterType::Triangle,
    }
}

/// Encode a surface in the requested format.
fn encode(img: &DynamicImage, params: &RenderParams) -> Result<Vec<u8>, BackendError> {
    let encode_err = |e: image::ImageError| BackendError::Encode {
        format: params.format.mime_type(),
        message: e.to_string(),
    };

    let mut buf = Cursor::new(Vec::new());
    match params.format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, params.quality.value());
            rgb.write_with_encoder(encoder).map_err(encode_err)?;
        }
        other => img
            .write_to(&mut buf, other.image_format())
            .map_err(encode_err)?,
    }
    Ok(buf.into_inner())
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        let img = image::load_from_memory(data).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(DynamicImage::ImageRgba8(img.into_rgba8()))
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn render(&self, image: &DynamicImage, params: &RenderParams) -> Result<Vec<u8>, BackendError> {
        check_canvas_size(params.width, params.height)?;
        let resized = image.resize_exact(params.width, params.height, filter_type(params.filter));
        encode(&resized, params)
    }
}
