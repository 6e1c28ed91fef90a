//! Image processing in pure Rust on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` → RGBA8 |
//! | **Resample** | `resize_exact` with Lanczos3 (configurable, never nearest) |
//! | **Encode** | JPEG at fixed quality, other formats at encoder defaults |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Formats**: Output encodings and MIME resolution
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod formats;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{MAX_EDGE, MAX_PIXELS, check_canvas_size, scale_factor, scaled_dimensions};
pub use formats::{OutputFormat, resolve_output_format};
pub use params::{Filter, Quality, RenderParams};
pub use rust_backend::RustBackend;
