//! # Message Rendering
//!
//! Turns guest-book Markdown into the HTML fragment the board injects.
//! The pipeline is deliberately a thin application of two existing
//! libraries rather than a hand-rolled parser:
//!
//! 1. Line breaks are normalized so a single newline renders as a hard
//!    break, the way visitors expect from a comment box.
//! 2. `pulldown-cmark` parses the Markdown. A custom event walker swaps
//!    in the board's own markup for headings, links, images, lists, and
//!    task markers, and leaves raw HTML untouched.
//! 3. `ammonia` sanitizes the assembled fragment against a fixed
//!    allow-list as the final pass, so nothing upstream has to be
//!    trusted.
//!
//! # Hardening
//!
//! Every construct that can carry a destination goes through
//! [`is_absolute_http_url`]: links and images render only for absolute
//! `http://` or `https://` URLs and otherwise collapse to their text.
//! The sanitizer additionally denies relative URLs and non-http schemes
//! in raw HTML, strips `<script>`/`<style>` with their contents, and
//! drops every attribute outside the allow-list. There is no failure
//! path that falls back to unsanitized input; blank input renders to an
//! empty fragment.

use ammonia::{Builder, UrlRelative};
use once_cell::sync::Lazy;
use pulldown_cmark::{Options, Parser};
use regex::Regex;

mod safe;
mod writer;

pub use safe::SafeRenderer;
pub use writer::NodeRenderer;

static ABSOLUTE_HTTP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://.+").unwrap());

static CLEANER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder
        .tags(
            [
                "p", "br", "hr", "a", "em", "strong", "del", "h1", "h2", "h3", "h4", "h5",
                "h6", "ul", "ol", "li", "img", "input", "div", "span",
            ]
            .into_iter()
            .collect(),
        )
        .generic_attributes(["class"].into_iter().collect())
        .tag_attributes(
            [
                ("a", ["href", "title", "target", "rel"].into_iter().collect()),
                ("img", ["src", "alt", "title", "loading"].into_iter().collect()),
                ("ol", ["start"].into_iter().collect()),
                ("input", ["type", "checked", "disabled"].into_iter().collect()),
            ]
            .into_iter()
            .collect(),
        )
        .url_schemes(["http", "https"].into_iter().collect())
        .url_relative(UrlRelative::Deny)
        // `rel` is managed by the renderer and allowed through above.
        .link_rel(None);
    builder
});

/// Render untrusted Markdown to a sanitized HTML fragment.
///
/// Whitespace-only input renders to an empty string.
pub fn render_markdown(input: &str) -> String {
    render_markdown_with(input, &SafeRenderer)
}

/// [`render_markdown`] with a caller-supplied [`NodeRenderer`]. The
/// sanitizer pass still runs over whatever the renderer produces.
pub fn render_markdown_with<R: NodeRenderer>(input: &str, renderer: &R) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let prepared = normalize_line_breaks(trimmed);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(&prepared, options);

    let raw = writer::push_events(parser, renderer);
    sanitize(&raw)
}

/// Run the allow-list sanitizer over an HTML fragment.
pub fn sanitize(html: &str) -> String {
    CLEANER.clean(html).to_string()
}

/// Whether a destination is an absolute `http://` or `https://` URL,
/// case-insensitive in the scheme. Everything else (relative paths,
/// `javascript:`, `data:`, bare hosts) fails the check.
pub fn is_absolute_http_url(url: &str) -> bool {
    ABSOLUTE_HTTP.is_match(url)
}

/// Turn a lone newline into a Markdown hard break by appending two
/// trailing spaces, leaving blank lines (paragraph breaks) alone.
///
/// [`render_markdown`] applies this itself; the submission side also
/// runs it over drafts so the stored text already carries its breaks.
pub fn normalize_line_breaks(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len() + 8);
    for (i, ch) in input.char_indices() {
        if ch == '\n' {
            let after_newline = i == 0 || bytes[i - 1] == b'\n';
            let before_newline = bytes.get(i + 1) == Some(&b'\n');
            if !after_newline && !before_newline {
                out.push_str("  \n");
                continue;
            }
        }
        out.push(ch);
    }
    out
}
