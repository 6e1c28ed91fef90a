//! Output encodings and MIME type resolution.
//!
//! Artifacts keep the encoding of their source. The encoding is resolved with
//! a fixed precedence:
//!
//! 1. the file extension (case-insensitive) looked up in [`EXTENSION_TABLE`];
//! 2. the declared MIME type, if it is one of the five supported types;
//! 3. `image/png`.

use image::ImageFormat;

/// Encodings the rescaler can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
    Bmp,
    Gif,
}

const EXTENSION_TABLE: &[(&str, OutputFormat)] = &[
    ("png", OutputFormat::Png),
    ("jpg", OutputFormat::Jpeg),
    ("jpeg", OutputFormat::Jpeg),
    ("webp", OutputFormat::WebP),
    ("bmp", OutputFormat::Bmp),
    ("gif", OutputFormat::Gif),
];

const ALL: [OutputFormat; 5] = [
    OutputFormat::Png,
    OutputFormat::Jpeg,
    OutputFormat::WebP,
    OutputFormat::Bmp,
    OutputFormat::Gif,
];

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
        }
    }

    /// Look up a bare extension (no dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSION_TABLE
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, fmt)| *fmt)
    }

    /// Exact match against the supported MIME types.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        ALL.into_iter().find(|fmt| fmt.mime_type() == mime)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::WebP => ImageFormat::WebP,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
        }
    }

    /// Whether the encoder honours [`Quality`](super::Quality).
    pub fn is_lossy(self) -> bool {
        self == Self::Jpeg
    }
}

/// Resolve the output encoding for a source file.
///
/// Never fails: unknown inputs fall back to PNG.
pub fn resolve_output_format(file_name: &str, declared_mime: &str) -> OutputFormat {
    file_name
        .rsplit_once('.')
        .and_then(|(_, ext)| OutputFormat::from_extension(ext))
        .or_else(|| OutputFormat::from_mime_type(declared_mime))
        .unwrap_or(OutputFormat::Png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_extension_wins() {
        assert_eq!(
            resolve_output_format("photo.JPG", "image/jpeg"),
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn extension_beats_declared_type() {
        assert_eq!(
            resolve_output_format("icon.webp", "image/png"),
            OutputFormat::WebP
        );
    }

    #[test]
    fn declared_type_used_without_known_extension() {
        assert_eq!(
            resolve_output_format("scan.dat", "image/bmp"),
            OutputFormat::Bmp
        );
        assert_eq!(resolve_output_format("scan", "image/gif"), OutputFormat::Gif);
    }

    #[test]
    fn unsupported_declared_type_falls_back_to_png() {
        assert_eq!(
            resolve_output_format("picture.tiff", "image/tiff"),
            OutputFormat::Png
        );
        assert_eq!(resolve_output_format("blob", ""), OutputFormat::Png);
    }

    #[test]
    fn only_the_last_extension_counts() {
        assert_eq!(
            resolve_output_format("archive.png.jpeg", "image/png"),
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn only_jpeg_is_lossy() {
        for fmt in ALL {
            assert_eq!(fmt.is_lossy(), fmt == OutputFormat::Jpeg);
        }
    }

    #[test]
    fn mime_round_trip_through_table() {
        for fmt in ALL {
            assert_eq!(OutputFormat::from_mime_type(fmt.mime_type()), Some(fmt));
        }
    }
}
