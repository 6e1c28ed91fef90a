//! Scale input parsing.
//!
//! Two text inputs drive the rescaler:
//!
//! - the **original scale**, a single positive decimal (`"2"` means the source
//!   is already a 2x asset);
//! - the **output scales**, a list separated by `,` or the full-width `，`.
//!
//! Each entry is trimmed and parsed on its own, reading the longest leading
//! decimal number the way a browser's `parseFloat` does (`"2x"` → 2). Output
//! entries that are not positive finite numbers are dropped silently; only an
//! empty result is an error. Order and duplicates are preserved.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    #[error("Original scale must be a number greater than 0, got {0:?}")]
    InvalidOriginalScale(String),
    #[error("Enter at least one output scale")]
    NoOutputScales,
    #[error("No valid output scale in {0:?}; use positive numbers such as 1.5,2,3")]
    InvalidOutputScales(String),
}

/// A validated rescale request.
///
/// Invariants: `original_scale > 0`, every output scale `> 0`, and
/// `output_scales` is non-empty. All values are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleRequest {
    original_scale: f64,
    output_scales: Vec<f64>,
}

impl ScaleRequest {
    pub fn new(original_scale: f64, output_scales: Vec<f64>) -> Result<Self, ScaleError> {
        if !is_valid_scale(original_scale) {
            return Err(ScaleError::InvalidOriginalScale(original_scale.to_string()));
        }
        if output_scales.is_empty() {
            return Err(ScaleError::NoOutputScales);
        }
        if !output_scales.iter().all(|&s| is_valid_scale(s)) {
            let listed: Vec<String> = output_scales.iter().map(|s| s.to_string()).collect();
            return Err(ScaleError::InvalidOutputScales(listed.join(",")));
        }
        Ok(Self {
            original_scale,
            output_scales,
        })
    }

    /// Parse both text inputs into a request.
    pub fn parse(original: &str, outputs: &str) -> Result<Self, ScaleError> {
        let original_scale = parse_original_scale(original)?;
        let output_scales = parse_output_scales(outputs)?;
        Ok(Self {
            original_scale,
            output_scales,
        })
    }

    pub fn original_scale(&self) -> f64 {
        self.original_scale
    }

    pub fn output_scales(&self) -> &[f64] {
        &self.output_scales
    }
}

fn is_valid_scale(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Parse the original-scale input.
pub fn parse_original_scale(input: &str) -> Result<f64, ScaleError> {
    parse_leading_float(input)
        .filter(|&v| is_valid_scale(v))
        .ok_or_else(|| ScaleError::InvalidOriginalScale(input.trim().to_string()))
}

/// Parse the output-scale list, dropping invalid entries.
pub fn parse_output_scales(input: &str) -> Result<Vec<f64>, ScaleError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScaleError::NoOutputScales);
    }

    let scales: Vec<f64> = trimmed
        .split([',', '，'])
        .filter_map(parse_leading_float)
        .filter(|&v| is_valid_scale(v))
        .collect();

    if scales.is_empty() {
        return Err(ScaleError::InvalidOutputScales(trimmed.to_string()));
    }
    Ok(scales)
}

/// Parse the longest decimal prefix of `input` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fractional part, and an
/// exponent only when it is followed by digits. Returns `None` when no digit
/// is found.
fn parse_leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_float_matches_parse_float() {
        assert_eq!(parse_leading_float("2"), Some(2.0));
        assert_eq!(parse_leading_float("  1.5 "), Some(1.5));
        assert_eq!(parse_leading_float("2x"), Some(2.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("3."), Some(3.0));
        assert_eq!(parse_leading_float("1e2"), Some(100.0));
        assert_eq!(parse_leading_float("1e"), Some(1.0));
        assert_eq!(parse_leading_float("-1"), Some(-1.0));
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("Infinity"), None);
    }

    #[test]
    fn original_scale_accepts_positive_decimal() {
        assert_eq!(parse_original_scale("1"), Ok(1.0));
        assert_eq!(parse_original_scale(" 2.5 "), Ok(2.5));
    }

    #[test]
    fn original_scale_rejects_non_positive_and_garbage() {
        for input in ["0", "-1", "", "abc", "1e999"] {
            assert!(
                matches!(
                    parse_original_scale(input),
                    Err(ScaleError::InvalidOriginalScale(_))
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn output_scales_split_on_both_commas() {
        assert_eq!(parse_output_scales("1.5,2,3"), Ok(vec![1.5, 2.0, 3.0]));
        assert_eq!(parse_output_scales("1.5，2，3"), Ok(vec![1.5, 2.0, 3.0]));
        assert_eq!(parse_output_scales("1, 2，3"), Ok(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn output_scales_preserve_order_and_duplicates() {
        assert_eq!(parse_output_scales("3,1,3,2"), Ok(vec![3.0, 1.0, 3.0, 2.0]));
    }

    #[test]
    fn invalid_entries_are_dropped_silently() {
        assert_eq!(parse_output_scales("2,abc,-1,0,,3"), Ok(vec![2.0, 3.0]));
    }

    #[test]
    fn empty_output_list_is_an_error() {
        assert_eq!(parse_output_scales("   "), Err(ScaleError::NoOutputScales));
    }

    #[test]
    fn all_invalid_output_list_is_an_error() {
        assert!(matches!(
            parse_output_scales("0,-2,x"),
            Err(ScaleError::InvalidOutputScales(_))
        ));
        assert!(matches!(
            parse_output_scales(",,,"),
            Err(ScaleError::InvalidOutputScales(_))
        ));
    }

    #[test]
    fn request_parse_checks_original_first() {
        assert!(matches!(
            ScaleRequest::parse("0", ""),
            Err(ScaleError::InvalidOriginalScale(_))
        ));
        let req = ScaleRequest::parse("2", "1,4").unwrap();
        assert_eq!(req.original_scale(), 2.0);
        assert_eq!(req.output_scales(), &[1.0, 4.0]);
    }

    #[test]
    fn request_new_enforces_invariants() {
        assert!(ScaleRequest::new(1.0, vec![2.0]).is_ok());
        assert_eq!(
            ScaleRequest::new(1.0, vec![]),
            Err(ScaleError::NoOutputScales)
        );
        assert!(matches!(
            ScaleRequest::new(0.0, vec![1.0]),
            Err(ScaleError::InvalidOriginalScale(_))
        ));
        assert!(matches!(
            ScaleRequest::new(1.0, vec![2.0, f64::NAN]),
            Err(ScaleError::InvalidOutputScales(_))
        ));
    }
}
