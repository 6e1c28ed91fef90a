//! Image comparison viewer.
//!
//! Two slots, left (base) and right (compare), each hold one image. The
//! viewer becomes usable only once both are loaded. In overlay mode the
//! right image is drawn over the left at an adjustable opacity; in
//! side-by-side mode both are shown next to each other at full opacity.
//!
//! The rendered page is self-contained: both images are embedded as base64
//! data URIs, and the embedded script keeps the opacity slider and mode
//! switch working in the browser.

use crate::imaging::{BackendError, ImageBackend};
use crate::output::format_image_info;
use crate::page;
use crate::resize::SourceFile;
use base64::{Engine as _, engine::general_purpose};
use maud::{Markup, PreEscaped, html};
use thiserror::Error;

const JS: &str = include_str!("../static/compare.js");

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("{name} is not an image (type {declared_type:?})")]
    NotAnImage { name: String, declared_type: String },
    #[error("Could not read image: {0}")]
    Backend(#[from] BackendError),
    #[error("Load both a left and a right image first")]
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareMode {
    #[default]
    Overlay,
    SideBySide,
}

impl CompareMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareMode::Overlay => "overlay",
            CompareMode::SideBySide => "side-by-side",
        }
    }

    fn body_class(self) -> &'static str {
        match self {
            CompareMode::Overlay => "mode-overlay",
            CompareMode::SideBySide => "mode-side",
        }
    }
}

/// Overlay opacity, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opacity(f64);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);
    pub const HIDDEN: Opacity = Opacity(0.0);

    /// Clamps into range; NaN becomes fully opaque.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::OPAQUE;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `round(opacity * 100)%`
    pub fn percent_label(self) -> String {
        format!("{}%", (self.0 * 100.0).round() as u32)
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Left,
    Right,
}

/// An image accepted into a slot, with its pixel size.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub file: SourceFile,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    pub fn info_line(&self) -> String {
        format_image_info(&self.file.name, self.width, self.height, self.file.size())
    }

    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.file.declared_type,
            general_purpose::STANDARD.encode(&self.file.bytes)
        )
    }
}

#[derive(Debug, Default)]
pub struct CompareSession {
    left: Option<LoadedImage>,
    right: Option<LoadedImage>,
    mode: CompareMode,
    opacity: Opacity,
}

impl CompareSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `file` into `slot`, replacing what was there. Non-images and
    /// undecodable files leave the slot untouched.
    pub fn load<B: ImageBackend>(
        &mut self,
        backend: &B,
        slot: Slot,
        file: SourceFile,
    ) -> Result<&LoadedImage, CompareError> {
        if !file.is_image() {
            return Err(CompareError::NotAnImage {
                name: file.name,
                declared_type: file.declared_type,
            });
        }
        let image = backend.decode(&file.bytes)?;
        let dims = backend.dimensions(&image);
        tracing::debug!(?slot, file = %file.name, width = dims.width, height = dims.height, "loaded image");

        let loaded = LoadedImage {
            file,
            width: dims.width,
            height: dims.height,
        };
        Ok(self.slot_mut(slot).insert(loaded))
    }

    pub fn remove(&mut self, slot: Slot) {
        *self.slot_mut(slot) = None;
    }

    pub fn get(&self, slot: Slot) -> Option<&LoadedImage> {
        match slot {
            Slot::Left => self.left.as_ref(),
            Slot::Right => self.right.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<LoadedImage> {
        match slot {
            Slot::Left => &mut self.left,
            Slot::Right => &mut self.right,
        }
    }

    /// Controls are available only with both images present.
    pub fn is_ready(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn mode(&self) -> CompareMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CompareMode) {
        self.mode = mode;
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: Opacity) {
        self.opacity = opacity;
    }

    /// Holding the quick-compare control shows the right image fully;
    /// releasing it hides it.
    pub fn quick_compare(&mut self, pressed: bool) {
        self.opacity = if pressed {
            Opacity::OPAQUE
        } else {
            Opacity::HIDDEN
        };
    }

    pub fn render_page(&self) -> Result<Markup, CompareError> {
        let (Some(left), Some(right)) = (&self.left, &self.right) else {
            return Err(CompareError::NotReady);
        };
        let overlay = self.mode == CompareMode::Overlay;
        let opacity = self.opacity;
        let top_style = overlay.then(|| format!("opacity: {}", opacity.value()));
        let slider_value = (opacity.value() * 100.0).round() as u32;

        let content = html! {
            div.controls {
                label {
                    input type="radio" name="mode" value="overlay" checked[overlay];
                    " Overlay"
                }
                label {
                    input type="radio" name="mode" value="side-by-side" checked[!overlay];
                    " Side by Side"
                }
                span.opacity-control {
                    label for="opacity" { "Overlay Opacity " }
                    input id="opacity" type="range" min="0" max="100" value=(slider_value);
                    span id="opacity-value" { (opacity.percent_label()) }
                    button id="quick-compare" type="button" { "Quick Compare" }
                }
            }
            div.panes {
                p.info { (left.info_line()) }
                p.info { (right.info_line()) }
            }
            div.stage {
                img.base src=(left.data_uri()) alt=(left.file.name);
                img.top src=(right.data_uri()) alt=(right.file.name) style=[top_style];
            }
            script { (PreEscaped(JS)) }
        };

        Ok(page::base_document(
            "Image Compare",
            Some(self.mode.body_class()),
            content,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;

    fn png(name: &str) -> SourceFile {
        SourceFile::new(name, "image/png", vec![1, 2, 3, 4])
    }

    fn ready_session() -> CompareSession {
        let backend = MockBackend::with_dimensions(640, 480);
        let mut session = CompareSession::new();
        session.load(&backend, Slot::Left, png("before.png")).unwrap();
        session.load(&backend, Slot::Right, png("after.png")).unwrap();
        session
    }

    #[test]
    fn opacity_clamps_and_labels() {
        assert_eq!(Opacity::new(1.7).value(), 1.0);
        assert_eq!(Opacity::new(-0.2).value(), 0.0);
        assert_eq!(Opacity::new(f64::NAN), Opacity::OPAQUE);
        assert_eq!(Opacity::new(0.5).percent_label(), "50%");
        assert_eq!(Opacity::new(0.333).percent_label(), "33%");
        assert_eq!(Opacity::new(0.005).percent_label(), "1%");
        assert_eq!(Opacity::HIDDEN.percent_label(), "0%");
    }

    #[test]
    fn ready_only_with_both_images() {
        let backend = MockBackend::with_dimensions(10, 10);
        let mut session = CompareSession::new();
        assert!(!session.is_ready());
        session.load(&backend, Slot::Left, png("a.png")).unwrap();
        assert!(!session.is_ready());
        assert!(matches!(session.render_page(), Err(CompareError::NotReady)));
        session.load(&backend, Slot::Right, png("b.png")).unwrap();
        assert!(session.is_ready());

        session.remove(Slot::Left);
        assert!(!session.is_ready());
        assert!(session.get(Slot::Right).is_some());
    }

    #[test]
    fn rejects_non_images_and_keeps_slot() {
        let backend = MockBackend::with_dimensions(10, 10);
        let mut session = CompareSession::new();
        session.load(&backend, Slot::Left, png("a.png")).unwrap();

        let err = session
            .load(
                &backend,
                Slot::Left,
                SourceFile::new("a.txt", "text/plain", vec![]),
            )
            .unwrap_err();
        assert!(matches!(err, CompareError::NotAnImage { .. }));
        assert_eq!(session.get(Slot::Left).unwrap().file.name, "a.png");
        assert!(backend.get_operations().len() == 1);
    }

    #[test]
    fn undecodable_image_is_rejected() {
        let backend = MockBackend::failing_decode();
        let mut session = CompareSession::new();
        let err = session.load(&backend, Slot::Right, png("bad.png")).unwrap_err();
        assert!(matches!(err, CompareError::Backend(_)));
        assert!(session.get(Slot::Right).is_none());
    }

    #[test]
    fn loaded_image_reports_dimensions() {
        let session = ready_session();
        let left = session.get(Slot::Left).unwrap();
        assert_eq!((left.width, left.height), (640, 480));
        assert_eq!(left.info_line(), "before.png - 640 × 480 - 4 B");
        assert_eq!(left.data_uri(), "data:image/png;base64,AQIDBA==");
    }

    #[test]
    fn quick_compare_toggles_full_opacity() {
        let mut session = ready_session();
        session.quick_compare(true);
        assert_eq!(session.opacity(), Opacity::OPAQUE);
        session.quick_compare(false);
        assert_eq!(session.opacity(), Opacity::HIDDEN);
    }

    #[test]
    fn overlay_page_applies_opacity() {
        let mut session = ready_session();
        session.set_opacity(Opacity::new(0.25));
        let html = session.render_page().unwrap().into_string();

        assert!(html.contains(r#"<body class="mode-overlay">"#));
        assert!(html.contains("opacity: 0.25"));
        assert!(html.contains(">25%<"));
        assert!(html.contains("data:image/png;base64,AQIDBA=="));
        assert!(html.contains("before.png - 640 × 480 - 4 B"));
    }

    #[test]
    fn side_by_side_page_has_no_inline_opacity() {
        let mut session = ready_session();
        session.set_mode(CompareMode::SideBySide);
        let html = session.render_page().unwrap().into_string();

        assert!(html.contains(r#"<body class="mode-side">"#));
        assert!(!html.contains("style=\"opacity"));
        assert!(html.contains(r#"value="side-by-side" checked"#));
    }

    #[test]
    fn file_names_are_escaped() {
        let backend = MockBackend::with_dimensions(1, 1);
        let mut session = CompareSession::new();
        session
            .load(&backend, Slot::Left, png("<x>.png"))
            .unwrap();
        session.load(&backend, Slot::Right, png("b.png")).unwrap();
        let html = session.render_page().unwrap().into_string();
        assert!(!html.contains("<x>.png"));
        assert!(html.contains("&lt;x&gt;.png"));
    }
}
