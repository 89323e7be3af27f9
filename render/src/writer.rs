use pulldown_cmark::{Event, HeadingLevel, Tag, TagEnd};
use pulldown_cmark_escape::{escape_href, escape_html};

/// Rendering hooks for the node kinds the guest book customizes.
///
/// One method per kind, so the policy for each lives in exactly one place
/// instead of being patched onto a shared renderer object at runtime. The
/// walker in [`push_events`] handles all plain structure (paragraphs,
/// emphasis, breaks, rules, items) itself and defers to these hooks for the
/// rest.
pub trait NodeRenderer {
    /// A heading of the given level with its already-rendered inner HTML.
    fn heading(&self, level: HeadingLevel, inner: &str) -> String;

    /// A link. `title` may be empty. `inner` is already-rendered HTML.
    fn link(&self, dest: &str, title: &str, inner: &str) -> String;

    /// An image. `alt` is the plain text collected from the alt run.
    fn image(&self, dest: &str, title: &str, alt: &str) -> String;

    /// A whole list with its rendered items. `start` is `Some` for ordered
    /// lists, carrying the first item number.
    fn list(&self, start: Option<u64>, inner: &str) -> String;

    /// The checkbox marker at the front of a task-list item.
    fn task_marker(&self, checked: bool) -> String;
}

enum Frame {
    Heading(HeadingLevel),
    Link { dest: String, title: String },
    Image { dest: String, title: String },
    List { start: Option<u64> },
}

/// Walk a pulldown-cmark event stream into HTML, deferring headings, links,
/// images, lists, and task markers to `renderer`.
///
/// Inside an image's alt run only plain text is collected; nested markup
/// would otherwise end up escaped into the `alt` attribute as tag soup.
/// Raw HTML events are passed through untouched here and left to the final
/// sanitizer pass, matching how the sanitizer-last pipeline worked on the
/// site. A lone newline is a soft break and still becomes `<br>`.
pub(crate) fn push_events<'a, I, R>(events: I, renderer: &R) -> String
where
    I: Iterator<Item = Event<'a>>,
    R: NodeRenderer,
{
    let mut root = String::new();
    let mut frames: Vec<(Frame, String)> = Vec::new();
    let mut image_depth = 0usize;

    for event in events {
        if image_depth > 0 {
            // Alt-text run: balance nested image tags, collect text, drop
            // the rest.
            match event {
                Event::Start(Tag::Image { .. }) => image_depth += 1,
                Event::End(TagEnd::Image) => {
                    image_depth -= 1;
                    if image_depth == 0 {
                        if let Some((Frame::Image { dest, title }, alt)) = frames.pop() {
                            let html = renderer.image(&dest, &title, &alt);
                            top(&mut root, &mut frames).push_str(&html);
                        }
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    top(&mut root, &mut frames).push_str(&text);
                }
                Event::SoftBreak | Event::HardBreak => {
                    top(&mut root, &mut frames).push(' ');
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => top(&mut root, &mut frames).push_str("<p>"),
                Tag::Heading { level, .. } => {
                    frames.push((Frame::Heading(level), String::new()));
                }
                Tag::List(start) => frames.push((Frame::List { start }, String::new())),
                Tag::Item => top(&mut root, &mut frames).push_str("<li>"),
                Tag::Emphasis => top(&mut root, &mut frames).push_str("<em>"),
                Tag::Strong => top(&mut root, &mut frames).push_str("<strong>"),
                Tag::Strikethrough => top(&mut root, &mut frames).push_str("<del>"),
                Tag::Link {
                    dest_url, title, ..
                } => {
                    frames.push((
                        Frame::Link {
                            dest: dest_url.into_string(),
                            title: title.into_string(),
                        },
                        String::new(),
                    ));
                }
                Tag::Image {
                    dest_url, title, ..
                } => {
                    image_depth = 1;
                    frames.push((
                        Frame::Image {
                            dest: dest_url.into_string(),
                            title: title.into_string(),
                        },
                        String::new(),
                    ));
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Paragraph => top(&mut root, &mut frames).push_str("</p>\n"),
                TagEnd::Heading(_) => {
                    if let Some((Frame::Heading(level), inner)) = frames.pop() {
                        let html = renderer.heading(level, &inner);
                        top(&mut root, &mut frames).push_str(&html);
                    }
                }
                TagEnd::List(_) => {
                    if let Some((Frame::List { start }, inner)) = frames.pop() {
                        let html = renderer.list(start, &inner);
                        top(&mut root, &mut frames).push_str(&html);
                    }
                }
                TagEnd::Item => top(&mut root, &mut frames).push_str("</li>\n"),
                TagEnd::Emphasis => top(&mut root, &mut frames).push_str("</em>"),
                TagEnd::Strong => top(&mut root, &mut frames).push_str("</strong>"),
                TagEnd::Strikethrough => top(&mut root, &mut frames).push_str("</del>"),
                TagEnd::Link => {
                    if let Some((Frame::Link { dest, title }, inner)) = frames.pop() {
                        let html = renderer.link(&dest, &title, &inner);
                        top(&mut root, &mut frames).push_str(&html);
                    }
                }
                _ => {}
            },
            Event::Text(text) => escape_into(top(&mut root, &mut frames), &text),
            // No `code` tag in the allow-list, so inline code shows as its
            // literal text.
            Event::Code(text) => escape_into(top(&mut root, &mut frames), &text),
            Event::Html(html) | Event::InlineHtml(html) => {
                top(&mut root, &mut frames).push_str(&html);
            }
            Event::SoftBreak | Event::HardBreak => {
                top(&mut root, &mut frames).push_str("<br>\n");
            }
            Event::Rule => top(&mut root, &mut frames).push_str("<hr>\n"),
            Event::TaskListMarker(checked) => {
                let html = renderer.task_marker(checked);
                top(&mut root, &mut frames).push_str(&html);
            }
            _ => {}
        }
    }

    root
}

fn top<'a>(root: &'a mut String, frames: &'a mut Vec<(Frame, String)>) -> &'a mut String {
    match frames.last_mut() {
        Some((_, buf)) => buf,
        None => root,
    }
}

pub(crate) fn escape_into(out: &mut String, text: &str) {
    let _ = escape_html(&mut *out, text);
}

pub(crate) fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

pub(crate) fn escaped_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let _ = escape_href(&mut out, url);
    out
}
