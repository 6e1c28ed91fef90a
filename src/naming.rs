//! Artifact file naming.
//!
//! Every rescaled image is named after its source with the output scale
//! appended: `{stem}-{scale}x{ext}`.
//!
//! - `icon.png` at 2 → `icon-2x.png`
//! - `Photo.JPG` at 1.5 → `Photo-1.5x.JPG`
//! - `logo` at 3 → `logo-3x.png` (no extension: `.png`)
//!
//! The extension keeps its original spelling; only the encoding lookup in
//! [`formats`](crate::imaging::formats) is case-insensitive.

/// Format a scale for use in a file name.
///
/// Renders with three decimals, then strips trailing zeros and a trailing
/// decimal point. A result that is empty or zero falls back to `"1"`.
///
/// - `2.0` → `"2"`
/// - `1.25` → `"1.25"`
/// - `0.3333` → `"0.333"`
/// - `0.0` → `"1"`
pub fn format_scale(scale: f64) -> String {
    let fixed = format!("{:.3}", scale);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    match trimmed {
        "" | "0" | "-0" => "1".to_string(),
        s => s.to_string(),
    }
}

/// Split a file name at its last `.` into `(stem, ext)`, `ext` including the dot.
///
/// Names without a usable extension get `.png`. A leading dot alone
/// (`.hidden`) does not start an extension.
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ".png"),
    }
}

/// Derive the artifact file name for one output scale.
pub fn artifact_file_name(original_name: &str, output_scale: f64) -> String {
    let (stem, ext) = split_file_name(original_name);
    format!("{}-{}x{}", stem, format_scale(output_scale), ext)
}
