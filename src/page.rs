//! Shared HTML page shell for the tools' rendered output.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time templating, so all
//! interpolated text is escaped. The stylesheet is embedded at compile time.

use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/tools.css");

/// Renders a complete standalone HTML document.
pub fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                h1 { (title) }
                (content)
            }
        }
    }
}
