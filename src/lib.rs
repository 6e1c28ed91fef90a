//! # Toolbench
//!
//! Small offline utilities that would otherwise live in a browser tab: a
//! batch image rescaler, an image comparison viewer, a character-level text
//! diff and a JSON formatter. Everything runs in memory on local files; there
//! is no server and nothing is persisted except the display language.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resize`] | Batch rescaler: one artifact per output scale, plus the `ResizeSession` controller |
//! | [`scales`] | Parsing the original-scale and output-scale inputs |
//! | [`naming`] | `{stem}-{scale}x{ext}` artifact names |
//! | [`imaging`] | Backend seam and the pure-Rust `image` crate backend |
//! | [`blob`] | Transient object URLs, released on every exit path |
//! | [`export`] | Saving one artifact, or all of them as a ZIP / spaced saves |
//! | [`compare`] | Overlay and side-by-side image comparison page |
//! | [`diff`] | Index-aligned character diff with HTML and terminal rendering |
//! | [`debounce`] | Coalescing bursts of triggers before recomputing |
//! | [`json_format`] | JSON validation, indentation and highlighting |
//! | [`config`] | `config.toml` loading over stock defaults, language preference |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sequential Batches
//!
//! Output scales are rendered one after another from a single decoded
//! source. Progress is a plain `(i + 1) / total` and the first failure stops
//! the batch with earlier artifacts intact.
//!
//! ## Index-Aligned Diff
//!
//! The text diff compares position `i` with position `i`. It does not detect
//! insertions or shifts; callers that expect that behaviour rely on it.
//!
//! ## Highlighting From the Value Tree
//!
//! JSON tokens come from walking the parsed value, not from pattern matching
//! the serialized text, so a string value such as `"a\":"` is never mistaken
//! for a key.

pub mod blob;
pub mod compare;
pub mod config;
pub mod debounce;
pub mod diff;
pub mod export;
pub mod imaging;
pub mod json_format;
pub mod naming;
pub mod output;
mod page;
pub mod resize;
pub mod scales;

#[cfg(test)]
pub(crate) mod test_helpers;
