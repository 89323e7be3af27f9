//! The board's concrete renderer.
//!
//! Carries the utility classes the site styles guest messages with and the
//! hardening applied to user-supplied destinations:
//!
//! - links only render for absolute `http(s)://` destinations, anything
//!   else collapses to its inner text
//! - rendered links open in a new tab and carry
//!   `rel="noopener noreferrer nofollow"`
//! - images follow the same destination rule, collapsing to their alt text

use pulldown_cmark::HeadingLevel;

use crate::{
    is_absolute_http_url,
    writer::{escaped, escaped_href, NodeRenderer},
};

/// Classes for `<h1>` through `<h6>`, largest first.
const HEADING_CLASSES: [&str; 6] = [
    "text-2xl font-bold mb-4 mt-6",
    "text-xl font-semibold mb-3 mt-5",
    "text-lg font-medium mb-2 mt-4",
    "text-base font-medium mb-2 mt-3",
    "text-sm font-medium mb-1 mt-2",
    "text-xs font-medium mb-1 mt-2",
];

const LINK_CLASS: &str = "text-accent hover:text-accent/80 underline transition-colors";

const IMAGE_CLASS: &str = "custom-image-class";

pub struct SafeRenderer;

impl NodeRenderer for SafeRenderer {
    fn heading(&self, level: HeadingLevel, inner: &str) -> String {
        let n = level as usize;
        let class = HEADING_CLASSES[n - 1];
        format!("<h{n} class=\"{class}\">{inner}</h{n}>\n")
    }

    fn link(&self, dest: &str, title: &str, inner: &str) -> String {
        if !is_absolute_http_url(dest) {
            return inner.to_string();
        }
        let mut out = format!("<a href=\"{}\"", escaped_href(dest));
        if !title.is_empty() {
            out.push_str(" title=\"");
            out.push_str(&escaped(title));
            out.push('"');
        }
        out.push_str(" target=\"_blank\" rel=\"noopener noreferrer nofollow\" class=\"");
        out.push_str(LINK_CLASS);
        out.push_str("\">");
        out.push_str(inner);
        out.push_str("</a>");
        out
    }

    fn image(&self, dest: &str, title: &str, alt: &str) -> String {
        if !is_absolute_http_url(dest) {
            return escaped(alt);
        }
        let mut out = format!("<img src=\"{}\" alt=\"{}\"", escaped_href(dest), escaped(alt));
        if !title.is_empty() {
            out.push_str(" title=\"");
            out.push_str(&escaped(title));
            out.push('"');
        }
        out.push_str(" loading=\"lazy\" class=\"");
        out.push_str(IMAGE_CLASS);
        out.push_str("\">");
        out
    }

    fn list(&self, start: Option<u64>, inner: &str) -> String {
        match start {
            None => format!("<ul>\n{inner}</ul>\n"),
            Some(1) => format!("<ol>\n{inner}</ol>\n"),
            Some(n) => format!("<ol start=\"{n}\">\n{inner}</ol>\n"),
        }
    }

    fn task_marker(&self, checked: bool) -> String {
        if checked {
            "<input type=\"checkbox\" checked disabled> ".to_string()
        } else {
            "<input type=\"checkbox\" disabled> ".to_string()
        }
    }
}
