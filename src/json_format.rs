//! JSON formatting, validation and highlighting.
//!
//! Input is trimmed and parsed. Valid JSON is re-serialized with two-space
//! indentation and split into classified tokens for highlighting. The
//! tokens are produced from the parsed value tree, not by re-scanning the
//! serialized text, so strings containing quotes, colons or escapes are
//! always classified correctly. Concatenating the token texts yields the
//! output of `serde_json::to_string_pretty`, with object keys in their
//! original order, except that whole-number floats print without a
//! fraction (`1.0` and `1e2` become `1` and `100`).
//!
//! Parse failures are returned as [`JsonOutcome::Invalid`] carrying the
//! parser's message; formatting never fails.

use crate::page;
use maud::{Markup, html};
use serde_json::Value;

const INDENT: &str = "  ";

/// Highlight category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An object key including its trailing colon: `"name":`.
    Key,
    String,
    Number,
    Boolean,
    Null,
    /// Punctuation and whitespace.
    Plain,
}

impl TokenKind {
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            TokenKind::Key => Some("json-key"),
            TokenKind::String => Some("json-string"),
            TokenKind::Number => Some("json-number"),
            TokenKind::Boolean => Some("json-boolean"),
            TokenKind::Null => Some("json-null"),
            TokenKind::Plain => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

/// Successfully formatted JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedJson {
    value: Value,
    tokens: Vec<Token>,
}

impl FormattedJson {
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The indented text.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Escaped HTML with each classified token wrapped in a `span`.
    pub fn render_html(&self) -> Markup {
        html! {
            @for token in &self.tokens {
                @if let Some(class) = token.kind.css_class() {
                    span class=(class) { (token.text) }
                } @else {
                    (token.text)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonOutcome {
    /// Input was empty or whitespace only.
    Empty,
    Formatted(FormattedJson),
    /// The parser's error message, verbatim.
    Invalid(String),
}

/// Parse and format `input`.
pub fn format_json(input: &str) -> JsonOutcome {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return JsonOutcome::Empty;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => {
            let tokens = tokenize(&value);
            JsonOutcome::Formatted(FormattedJson { value, tokens })
        }
        Err(e) => {
            tracing::debug!(error = %e, "JSON parse failed");
            JsonOutcome::Invalid(e.to_string())
        }
    }
}

/// Classified tokens for the pretty rendering of `value`.
pub fn tokenize(value: &Value) -> Vec<Token> {
    let mut tokens = Tokens::default();
    tokens.value(value, 0);
    tokens.0
}

#[derive(Default)]
struct Tokens(Vec<Token>);

impl Tokens {
    fn push(&mut self, kind: TokenKind, text: String) {
        self.0.push(Token { kind, text });
    }

    /// Adjacent plain runs are merged into one token.
    fn plain(&mut self, text: &str) {
        match self.0.last_mut() {
            Some(last) if last.kind == TokenKind::Plain => last.text.push_str(text),
            _ => self.push(TokenKind::Plain, text.to_string()),
        }
    }

    fn newline(&mut self, depth: usize) {
        self.plain("\n");
        self.plain(&INDENT.repeat(depth));
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.push(TokenKind::Null, "null".to_string()),
            Value::Bool(b) => self.push(TokenKind::Boolean, b.to_string()),
            Value::Number(n) => self.push(TokenKind::Number, number_text(n)),
            Value::String(s) => self.push(TokenKind::String, quote(s)),
            Value::Array(items) if items.is_empty() => self.plain("[]"),
            Value::Object(map) if map.is_empty() => self.plain("{}"),
            Value::Array(items) => {
                self.plain("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.plain(",");
                    }
                    self.newline(depth + 1);
                    self.value(item, depth + 1);
                }
                self.newline(depth);
                self.plain("]");
            }
            Value::Object(map) => {
                self.plain("{");
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        self.plain(",");
                    }
                    self.newline(depth + 1);
                    self.push(TokenKind::Key, format!("{}:", quote(key)));
                    self.plain(" ");
                    self.value(item, depth + 1);
                }
                self.newline(depth);
                self.plain("}");
            }
        }
    }
}

/// Largest magnitude below which every whole `f64` is printed exactly.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Number text with whole-number floats written as integers.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < EXACT_INTEGER_LIMIT => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

/// A JSON string literal for `s`, escaped the way `serde_json` writes it.
fn quote(s: &str) -> String {
    Value::from(s).to_string()
}

// ============================================================================
// Rendering
// ============================================================================

/// Standalone page for a formatting outcome. Errors are shown after
/// `error_prefix`.
pub fn render_page(outcome: &JsonOutcome, error_prefix: &str) -> Markup {
    let content = html! {
        div.pane {
            pre.text {
                @match outcome {
                    JsonOutcome::Empty => {}
                    JsonOutcome::Formatted(formatted) => { (formatted.render_html()) }
                    JsonOutcome::Invalid(message) => {
                        span.json-error { (error_prefix) "\n" (message) }
                    }
                }
            }
        }
    };
    page::base_document("JSON Format", None, content)
}
