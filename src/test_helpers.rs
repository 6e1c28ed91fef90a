//! Shared test utilities for the toolbench test suite.
//!
//! Generates small encoded images in memory so tests never depend on
//! fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = png_bytes(40, 30);
//! let file = image_source("icon.png", 40, 30);
//! assert!(file.is_image());
//! ```

use crate::resize::SourceFile;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Encoded images
// =========================================================================

/// A gradient with some transparency, so resampling has something to do.
fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let a = if (x + y) % 7 == 0 { 128 } else { 255 };
        image::Rgba([r, g, 96, a])
    });
    DynamicImage::ImageRgba8(img)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// PNG-encoded gradient of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Png)
}

/// JPEG-encoded gradient of the given size (alpha dropped).
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgb8(gradient(width, height).to_rgb8());
    encode(rgb, ImageFormat::Jpeg)
}

// =========================================================================
// Source files
// =========================================================================

/// A PNG source file as the file picker would hand it over.
pub fn image_source(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/png", png_bytes(width, height))
}

/// A non-image source file.
pub fn text_source(name: &str) -> SourceFile {
    SourceFile::new(name, "text/plain", b"not an image".to_vec())
}
