//! CLI output formatting for all tools.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! icon.png - 64 × 64 - 2.1 KB
//!  33% Processing 1x (1/3)...
//!  67% Processing 1.5x (2/3)...
//! 100% Processing 2x (3/3)...
//! Results
//!     icon-1x.png  32 × 32 | 812 B
//!     icon-1.5x.png  48 × 48 | 1.42 KB
//!     icon-2x.png  64 × 64 | 2.1 KB
//! Saved resized_images_1718000000000.zip (3 files) → out/
//! ```
//!
//! ## Diff
//!
//! ```text
//! --- old.txt
//! ab[c][-x-]
//! +++ new.txt
//! ab[d]
//! 4 positions: 2 match, 1 mismatch, 1 removed, 0 added
//! ```
//!
//! # Architecture
//!
//! Each tool has `format_*` functions (pure, returning `String` or
//! `Vec<String>`) for testability and `print_*` wrappers that write to
//! stdout. Wording that users see during a resize follows the configured
//! [`Language`].

use crate::config::Language;
use crate::diff::{DiffResult, Side, render_side_plain};
use crate::export::ExportSummary;
use crate::naming::format_scale;
use crate::resize::{ProgressEvent, ResizeError, ResizedArtifact};
use crate::scales::ScaleError;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count, base 1024, at most two decimals.
///
/// ```text
/// 0       → 0 B
/// 1536    → 1.5 KB
/// 1048576 → 1 MB
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut index = 0;
    while index + 1 < SIZE_UNITS.len() && bytes >= 1024u64.pow(index as u32 + 1) {
        index += 1;
    }
    let value = bytes as f64 / 1024f64.powi(index as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[index])
}

/// `{name} - {w} × {h} - {size}`
pub fn format_image_info(name: &str, width: u32, height: u32, bytes: usize) -> String {
    format!(
        "{} - {} × {} - {}",
        name,
        width,
        height,
        format_file_size(bytes as u64)
    )
}

/// `{fileName}  {w} × {h} | {size}`
pub fn format_artifact_line(artifact: &ResizedArtifact) -> String {
    format!(
        "{}  {} × {} | {}",
        artifact.file_name,
        artifact.width,
        artifact.height,
        format_file_size(artifact.size() as u64)
    )
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Resize
// ============================================================================

/// One progress line: percentage, then the status wording.
pub fn format_progress_event(event: &ProgressEvent, language: Language) -> String {
    let percent = (event.fraction() * 100.0).round() as u32;
    let scale = format_scale(event.scale);
    let status = match language {
        Language::En => format!(
            "Processing {}x ({}/{})...",
            scale, event.current, event.total
        ),
        Language::Zh => format!("正在处理 {}x ({}/{})...", scale, event.current, event.total),
    };
    format!("{:>3}% {}", percent, status)
}

pub fn format_results(artifacts: &[ResizedArtifact], language: Language) -> Vec<String> {
    let title = match language {
        Language::En => "Results",
        Language::Zh => "处理结果",
    };
    let mut lines = vec![title.to_string()];
    lines.extend(
        artifacts
            .iter()
            .map(|a| format!("{}{}", indent(1), format_artifact_line(a))),
    );
    lines
}

pub fn format_export_summary(summary: &ExportSummary, dir: &Path) -> String {
    match summary {
        ExportSummary::Nothing => "Nothing to save".to_string(),
        ExportSummary::Archive { file_name, entries } => format!(
            "Saved {} ({} files) → {}",
            file_name,
            entries,
            dir.display()
        ),
        ExportSummary::Files { count } => {
            format!("Saved {} files → {}", count, dir.display())
        }
    }
}

/// User-facing wording for a rescaler failure.
pub fn format_resize_error(error: &ResizeError, language: Language) -> String {
    match (error, language) {
        (ResizeError::NoFile, Language::En) => "Please select an image first".to_string(),
        (ResizeError::NoFile, Language::Zh) => "请先选择图片".to_string(),
        (ResizeError::NotAnImage { name, .. }, Language::En) => {
            format!("Please select an image file ({})", name)
        }
        (ResizeError::NotAnImage { name, .. }, Language::Zh) => {
            format!("请选择图片文件 ({})", name)
        }
        (ResizeError::Scale(ScaleError::InvalidOriginalScale(_)), Language::En) => {
            "Original scale must be a number greater than 0".to_string()
        }
        (ResizeError::Scale(ScaleError::InvalidOriginalScale(_)), Language::Zh) => {
            "原始倍率必须是大于 0 的数字".to_string()
        }
        (ResizeError::Scale(ScaleError::NoOutputScales), Language::En) => {
            "Please enter at least one output scale".to_string()
        }
        (ResizeError::Scale(ScaleError::NoOutputScales), Language::Zh) => {
            "请至少输入一个输出倍率".to_string()
        }
        (ResizeError::Scale(ScaleError::InvalidOutputScales(_)), Language::En) => {
            "No valid output scales".to_string()
        }
        (ResizeError::Scale(ScaleError::InvalidOutputScales(_)), Language::Zh) => {
            "没有有效的输出倍率".to_string()
        }
        (ResizeError::Backend(e), Language::En) => format!("Processing failed: {}", e),
        (ResizeError::Backend(e), Language::Zh) => format!("处理失败: {}", e),
        (ResizeError::Blob(e), Language::En) => format!("Processing failed: {}", e),
        (ResizeError::Blob(e), Language::Zh) => format!("处理失败: {}", e),
    }
}

pub fn print_progress_event(event: &ProgressEvent, language: Language) {
    println!("{}", format_progress_event(event, language));
}

pub fn print_results(artifacts: &[ResizedArtifact], language: Language) {
    for line in format_results(artifacts, language) {
        println!("{}", line);
    }
}

// ============================================================================
// Text tools
// ============================================================================

pub fn format_diff_output(result: &DiffResult, left_label: &str, right_label: &str) -> Vec<String> {
    let stats = result.stats();
    let summary = if result.is_identical() {
        format!("{} positions: identical", result.len())
    } else {
        format!(
            "{} positions: {} match, {} mismatch, {} removed, {} added",
            result.len(),
            stats.matches,
            stats.mismatches,
            stats.removed,
            stats.added
        )
    };
    vec![
        format!("--- {}", left_label),
        render_side_plain(result, Side::Left),
        format!("+++ {}", right_label),
        render_side_plain(result, Side::Right),
        summary,
    ]
}

pub fn print_diff_output(result: &DiffResult, left_label: &str, right_label: &str) {
    for line in format_diff_output(result, left_label, right_label) {
        println!("{}", line);
    }
}

pub fn json_error_prefix(language: Language) -> &'static str {
    match language {
        Language::En => "JSON Format Error:",
        Language::Zh => "JSON格式错误：",
    }
}

/// Error prefix on its own line, then the parser's message.
pub fn format_json_error(message: &str, language: Language) -> String {
    format!("{}\n{}", json_error_prefix(language), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::character_diff;
    use crate::imaging::{BackendError, OutputFormat};

    fn artifact(name: &str, w: u32, h: u32, bytes: usize) -> ResizedArtifact {
        ResizedArtifact {
            file_name: name.to_string(),
            scale: 2.0,
            width: w,
            height: h,
            format: OutputFormat::Png,
            data: vec![0u8; bytes].into(),
        }
    }

    #[test]
    fn file_size_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1), "1 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_073_741_824), "1 GB");
        assert_eq!(format_file_size(1_099_511_627_776), "1 TB");
    }

    #[test]
    fn file_size_rounds_to_two_decimals() {
        assert_eq!(format_file_size(1234), "1.21 KB");
        assert_eq!(format_file_size(2_500_000), "2.38 MB");
    }

    #[test]
    fn file_size_caps_at_terabytes() {
        assert_eq!(format_file_size(1024u64.pow(5)), "1024 TB");
    }

    #[test]
    fn image_info_line() {
        assert_eq!(
            format_image_info("icon.png", 64, 32, 2048),
            "icon.png - 64 × 32 - 2 KB"
        );
    }

    #[test]
    fn artifact_line() {
        assert_eq!(
            format_artifact_line(&artifact("icon-2x.png", 128, 64, 512)),
            "icon-2x.png  128 × 64 | 512 B"
        );
    }

    #[test]
    fn progress_wording_follows_language() {
        let event = ProgressEvent {
            current: 1,
            total: 3,
            scale: 1.5,
            file_name: "a-1.5x.png".to_string(),
        };
        assert_eq!(
            format_progress_event(&event, Language::En),
            " 33% Processing 1.5x (1/3)..."
        );
        assert_eq!(
            format_progress_event(&event, Language::Zh),
            " 33% 正在处理 1.5x (1/3)..."
        );
    }

    #[test]
    fn results_listing() {
        let lines = format_results(
            &[artifact("a-1x.png", 10, 10, 100), artifact("a-2x.png", 20, 20, 300)],
            Language::En,
        );
        assert_eq!(
            lines,
            vec![
                "Results",
                "    a-1x.png  10 × 10 | 100 B",
                "    a-2x.png  20 × 20 | 300 B",
            ]
        );
    }

    #[test]
    fn export_summaries() {
        let dir = Path::new("out");
        assert_eq!(
            format_export_summary(
                &ExportSummary::Archive {
                    file_name: "resized_images_1.zip".to_string(),
                    entries: 3
                },
                dir
            ),
            "Saved resized_images_1.zip (3 files) → out"
        );
        assert_eq!(
            format_export_summary(&ExportSummary::Files { count: 2 }, dir),
            "Saved 2 files → out"
        );
    }

    #[test]
    fn resize_errors_are_localized() {
        let err = ResizeError::Scale(ScaleError::NoOutputScales);
        assert_eq!(
            format_resize_error(&err, Language::En),
            "Please enter at least one output scale"
        );
        assert_eq!(format_resize_error(&err, Language::Zh), "请至少输入一个输出倍率");

        let err = ResizeError::Backend(BackendError::Decode("bad header".to_string()));
        let message = format_resize_error(&err, Language::En);
        assert!(message.starts_with("Processing failed: "));
        assert!(message.contains("bad header"));
    }

    #[test]
    fn diff_output() {
        let diff = character_diff("abcx", "abd");
        assert_eq!(
            format_diff_output(&diff, "old.txt", "new.txt"),
            vec![
                "--- old.txt",
                "ab[c][-x-]",
                "+++ new.txt",
                "ab[d]",
                "4 positions: 2 match, 1 mismatch, 1 removed, 0 added",
            ]
        );
    }

    #[test]
    fn identical_diff_summary() {
        let diff = character_diff("same", "same");
        let lines = format_diff_output(&diff, "a", "b");
        assert_eq!(lines[4], "4 positions: identical");
    }

    #[test]
    fn json_error_has_prefix_line() {
        assert_eq!(
            format_json_error("expected value at line 1 column 6", Language::En),
            "JSON Format Error:\nexpected value at line 1 column 6"
        );
        assert!(format_json_error("x", Language::Zh).starts_with("JSON格式错误："));
    }
}
