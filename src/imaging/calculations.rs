//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::BackendError;

/// Longest edge a render target may have, in pixels.
pub const MAX_EDGE: u32 = 32_767;

/// Largest render target area, in pixels.
pub const MAX_PIXELS: u64 = 268_435_456;

/// Ratio between an output scale and the scale the source represents.
///
/// # Examples
/// ```
/// # use toolbench::imaging::scale_factor;
/// // A 2x asset rendered at 3x grows by half
/// assert_eq!(scale_factor(2.0, 3.0), 1.5);
/// ```
pub fn scale_factor(original_scale: f64, output_scale: f64) -> f64 {
    output_scale / original_scale
}

/// Calculate output dimensions for a scale factor.
///
/// Each edge is rounded to the nearest pixel and floored at 1, so tiny
/// factors never produce an empty image. Values beyond `u32::MAX` saturate.
///
/// # Examples
/// ```
/// # use toolbench::imaging::scaled_dimensions;
/// assert_eq!(scaled_dimensions((200, 100), 1.5), (300, 150));
/// assert_eq!(scaled_dimensions((200, 100), 0.0001), (1, 1));
/// ```
pub fn scaled_dimensions(source: (u32, u32), factor: f64) -> (u32, u32) {
    let (w, h) = source;
    (scale_edge(w, factor), scale_edge(h, factor))
}

/// Reject render targets too large to allocate.
///
/// Huge but finite output scales saturate [`scaled_dimensions`]; this check
/// turns them into an error before any pixel buffer is created.
///
/// # Examples
/// ```
/// # use toolbench::imaging::check_canvas_size;
/// assert!(check_canvas_size(4096, 4096).is_ok());
/// assert!(check_canvas_size(40_000, 10).is_err());
/// ```
pub fn check_canvas_size(width: u32, height: u32) -> Result<(), BackendError> {
    let area = width as u64 * height as u64;
    if width > MAX_EDGE || height > MAX_EDGE || area > MAX_PIXELS {
        return Err(BackendError::TooLarge { width, height });
    }
    Ok(())
}

fn scale_edge(edge: u32, factor: f64) -> u32 {
    let scaled = (edge as f64 * factor).round();
    if scaled.is_nan() {
        return 1;
    }
    scaled.max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_is_output_over_original() {
        assert_eq!(scale_factor(1.0, 2.0), 2.0);
        assert_eq!(scale_factor(2.0, 1.0), 0.5);
        assert_eq!(scale_factor(3.0, 3.0), 1.0);
    }

    #[test]
    fn identity_factor_keeps_dimensions() {
        assert_eq!(scaled_dimensions((640, 480), 1.0), (640, 480));
    }

    #[test]
    fn half_pixel_rounds_up() {
        // 3 * 0.5 = 1.5 → 2, matching the browser's Math.round
        assert_eq!(scaled_dimensions((3, 5), 0.5), (2, 3));
    }

    #[test]
    fn downscale_rounds_to_nearest() {
        // 101 * 2/3 = 67.33 → 67; 50 * 2/3 = 33.33 → 33
        assert_eq!(scaled_dimensions((101, 50), 2.0 / 3.0), (67, 33));
    }

    #[test]
    fn floor_of_one_pixel() {
        assert_eq!(scaled_dimensions((1, 1), 0.01), (1, 1));
        assert_eq!(scaled_dimensions((4000, 3), 1e-9), (1, 1));
    }

    #[test]
    fn floor_holds_across_factors() {
        for &(w, h) in &[(1, 1), (1, 1000), (37, 11), (5000, 5000)] {
            for &factor in &[1e-12, 1e-6, 0.001, 0.1, 0.49, 1.0, 3.7] {
                let (nw, nh) = scaled_dimensions((w, h), factor);
                assert!(nw >= 1 && nh >= 1, "{w}x{h} at {factor} → {nw}x{nh}");
            }
        }
    }

    #[test]
    fn canvas_limits() {
        assert!(check_canvas_size(1, 1).is_ok());
        assert!(check_canvas_size(MAX_EDGE, 8192).is_ok());
        assert!(matches!(
            check_canvas_size(MAX_EDGE + 1, 1),
            Err(BackendError::TooLarge { width: 32_768, height: 1 })
        ));
        assert!(check_canvas_size(1, MAX_EDGE + 1).is_err());
        // Both edges in range, area over the limit
        assert!(check_canvas_size(MAX_EDGE, MAX_EDGE).is_err());
    }

    #[test]
    fn saturated_dimensions_are_rejected() {
        let (w, h) = scaled_dimensions((10, 10), 1e12);
        assert_eq!((w, h), (u32::MAX, u32::MAX));
        assert!(check_canvas_size(w, h).is_err());
    }

    #[test]
    fn upscale_fractional() {
        assert_eq!(scaled_dimensions((120, 80), 1.25), (150, 100));
    }
}
