//! Character-level text diff.
//!
//! The diff is **index-aligned**: position `i` of the left text is compared
//! with position `i` of the right text, with no attempt at sequence
//! alignment. A single character inserted at the start of the right text
//! therefore turns every following position into a mismatch instead of a
//! shift. Positions are Unicode scalar values.
//!
//! ```text
//! left  "abc"    right "abd"    →  a b [c|d]
//! left  "ab"     right "abc"    →  a b {+c}
//! ```
//!
//! Every call recomputes from scratch. Callers reacting to keystrokes or
//! file changes should coalesce triggers first (see [`crate::debounce`]).

use crate::page;
use maud::{Markup, html};

/// Outcome at one aligned position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffPosition {
    Match(char),
    Mismatch { left: char, right: char },
    /// Present only in the left text.
    Removed(char),
    /// Present only in the right text.
    Added(char),
}

/// Annotation carried by a character in one pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Match,
    Mismatch,
    Removed,
    Added,
}

impl Mark {
    /// CSS class used by the HTML rendering; matches carry none.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Mark::Match => None,
            Mark::Mismatch => Some("diff-mismatch"),
            Mark::Removed => Some("diff-removed"),
            Mark::Added => Some("diff-added"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatedChar {
    pub ch: char,
    pub mark: Mark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Per-position comparison of two texts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    positions: Vec<DiffPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    pub matches: usize,
    pub mismatches: usize,
    pub removed: usize,
    pub added: usize,
}

/// Compare two texts position by position.
pub fn character_diff(left: &str, right: &str) -> DiffResult {
    let mut l = left.chars();
    let mut r = right.chars();
    let mut positions = Vec::with_capacity(left.len().max(right.len()));

    loop {
        let position = match (l.next(), r.next()) {
            (None, None) => break,
            (Some(a), Some(b)) if a == b => DiffPosition::Match(a),
            (Some(a), Some(b)) => DiffPosition::Mismatch { left: a, right: b },
            (Some(a), None) => DiffPosition::Removed(a),
            (None, Some(b)) => DiffPosition::Added(b),
        };
        positions.push(position);
    }

    DiffResult { positions }
}

impl DiffResult {
    pub fn positions(&self) -> &[DiffPosition] {
        &self.positions
    }

    /// `max(len(left), len(right))` in chars.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_identical(&self) -> bool {
        self.positions
            .iter()
            .all(|p| matches!(p, DiffPosition::Match(_)))
    }

    /// The annotated characters of one pane. Positions with nothing on that
    /// side emit nothing.
    pub fn side(&self, side: Side) -> Vec<AnnotatedChar> {
        self.positions
            .iter()
            .filter_map(|p| match (side, *p) {
                (_, DiffPosition::Match(ch)) => Some(AnnotatedChar {
                    ch,
                    mark: Mark::Match,
                }),
                (Side::Left, DiffPosition::Mismatch { left, .. }) => Some(AnnotatedChar {
                    ch: left,
                    mark: Mark::Mismatch,
                }),
                (Side::Right, DiffPosition::Mismatch { right, .. }) => Some(AnnotatedChar {
                    ch: right,
                    mark: Mark::Mismatch,
                }),
                (Side::Left, DiffPosition::Removed(ch)) => Some(AnnotatedChar {
                    ch,
                    mark: Mark::Removed,
                }),
                (Side::Right, DiffPosition::Added(ch)) => Some(AnnotatedChar {
                    ch,
                    mark: Mark::Added,
                }),
                (Side::Left, DiffPosition::Added(_)) | (Side::Right, DiffPosition::Removed(_)) => {
                    None
                }
            })
            .collect()
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for p in &self.positions {
            match p {
                DiffPosition::Match(_) => stats.matches += 1,
                DiffPosition::Mismatch { .. } => stats.mismatches += 1,
                DiffPosition::Removed(_) => stats.removed += 1,
                DiffPosition::Added(_) => stats.added += 1,
            }
        }
        stats
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// One pane as escaped HTML: matches verbatim, everything else wrapped in a
/// `span` carrying its [`Mark::css_class`].
pub fn render_side_html(result: &DiffResult, side: Side) -> Markup {
    let chars = result.side(side);
    html! {
        @for c in &chars {
            @if let Some(class) = c.mark.css_class() {
                span class=(class) { (c.ch) }
            } @else {
                (c.ch)
            }
        }
    }
}

/// Standalone page with both panes side by side.
pub fn render_page(result: &DiffResult, left_label: &str, right_label: &str) -> Markup {
    let content = html! {
        div.panes {
            div.pane {
                p.info { (left_label) }
                pre.text { (render_side_html(result, Side::Left)) }
            }
            div.pane {
                p.info { (right_label) }
                pre.text { (render_side_html(result, Side::Right)) }
            }
        }
    };
    page::base_document("Text Diff", None, content)
}

/// One pane for a terminal: mismatches as `[x]`, removals as `[-x-]`,
/// additions as `{+x+}`.
pub fn render_side_plain(result: &DiffResult, side: Side) -> String {
    let mut out = String::new();
    for c in result.side(side) {
        match c.mark {
            Mark::Match => out.push(c.ch),
            Mark::Mismatch => {
                out.push('[');
                out.push(c.ch);
                out.push(']');
            }
            Mark::Removed => {
                out.push_str("[-");
                out.push(c.ch);
                out.push_str("-]");
            }
            Mark::Added => {
                out.push_str("{+");
                out.push(c.ch);
                out.push_str("+}");
            }
        }
    }
    out
}
