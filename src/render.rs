//! HTML output for the topic browser.

use std::fmt::Write as _;

use pulldown_cmark::escape::{escape_href, escape_html};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use crate::viewer::TopicBrowser;

pub const NO_NOTES_FALLBACK: &str = "No notes found.";

const SIDEBAR_OPEN_PX: u32 = 340;
const SIDEBAR_CLOSED_PX: u32 = 78;

const LINK_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

fn push_escaped(out: &mut String, text: &str) {
    let _ = escape_html(&mut *out, text);
}

fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn escaped_href(href: &str) -> String {
    let mut out = String::with_capacity(href.len());
    let _ = escape_href(&mut out, href);
    out
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Keeps relative targets and `http`, `https` or `mailto` ones; anything else
/// becomes `#`. Browsers skip leading control characters and drop tabs and
/// newlines before reading a scheme, so the check does the same.
fn safe_href(dest: &str) -> &str {
    let cleaned: String = dest
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    match cleaned.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(end) if cleaned[end..].starts_with(':') => {
            let scheme = cleaned[..end].to_ascii_lowercase();
            if LINK_SCHEMES.contains(&scheme.as_str()) {
                dest
            } else {
                "#"
            }
        }
        _ => dest,
    }
}

/// Renders note markdown to HTML. Every element gets a `note-*` class and is
/// otherwise left as written; raw HTML in the source is shown as text.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(source.len() + source.len() / 2);
    // Inside an image, text goes to the alt attribute instead of the body.
    let mut image_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(Tag::Image(_, dest, title)) => {
                if image_depth == 0 {
                    let _ = write!(out, "<img class=\"note-img\" src=\"{}\"", escaped_href(safe_href(&dest)));
                    if !title.is_empty() {
                        let _ = write!(out, " title=\"{}\"", escaped(&title));
                    }
                    out.push_str(" alt=\"");
                }
                image_depth += 1;
            }
            Event::End(Tag::Image(..)) => {
                image_depth = image_depth.saturating_sub(1);
                if image_depth == 0 {
                    out.push_str("\" />");
                }
            }
            Event::Text(text) | Event::Code(text) if image_depth > 0 => push_escaped(&mut out, &text),
            Event::Start(_) | Event::End(_) if image_depth > 0 => {}
            Event::Start(tag) => start_tag(&mut out, tag),
            Event::End(tag) => end_tag(&mut out, tag),
            Event::Text(text) => push_escaped(&mut out, &text),
            Event::Code(code) => {
                out.push_str("<code class=\"note-code\">");
                push_escaped(&mut out, &code);
                out.push_str("</code>");
            }
            Event::Html(html) => push_escaped(&mut out, &html),
            Event::SoftBreak => out.push('\n'),
            Event::HardBreak => out.push_str("<br />\n"),
            Event::Rule => out.push_str("<hr class=\"note-rule\" />\n"),
            Event::TaskListMarker(done) => {
                out.push_str(if done { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(_) => {}
        }
    }

    out
}

fn start_tag(out: &mut String, tag: Tag<'_>) {
    match tag {
        Tag::Paragraph => out.push_str("<p class=\"note-p\">"),
        Tag::Heading(level, _, _) => {
            let rank = heading_rank(level);
            let _ = write!(out, "<h{rank} class=\"note-h{rank}\">");
        }
        Tag::BlockQuote => out.push_str("<blockquote class=\"note-quote\">\n"),
        Tag::CodeBlock(kind) => {
            out.push_str("<pre class=\"note-pre\"><code");
            if let CodeBlockKind::Fenced(info) = kind {
                let lang = info.split_whitespace().next().unwrap_or("");
                if !lang.is_empty() {
                    let _ = write!(out, " class=\"language-{}\"", escaped(lang));
                }
            }
            out.push('>');
        }
        Tag::List(Some(1)) => out.push_str("<ol class=\"note-ol\">\n"),
        Tag::List(Some(start)) => {
            let _ = write!(out, "<ol class=\"note-ol\" start=\"{start}\">\n");
        }
        Tag::List(None) => out.push_str("<ul class=\"note-ul\">\n"),
        Tag::Item => out.push_str("<li class=\"note-li\">"),
        Tag::Emphasis => out.push_str("<em>"),
        Tag::Strong => out.push_str("<strong>"),
        Tag::Strikethrough => out.push_str("<del>"),
        Tag::Link(_, dest, title) => {
            let _ = write!(out, "<a class=\"note-link\" href=\"{}\"", escaped_href(safe_href(&dest)));
            if !title.is_empty() {
                let _ = write!(out, " title=\"{}\"", escaped(&title));
            }
            out.push('>');
        }
        _ => {}
    }
}

fn end_tag(out: &mut String, tag: Tag<'_>) {
    match tag {
        Tag::Paragraph => out.push_str("</p>\n"),
        Tag::Heading(level, _, _) => {
            let _ = writeln!(out, "</h{}>", heading_rank(level));
        }
        Tag::BlockQuote => out.push_str("</blockquote>\n"),
        Tag::CodeBlock(_) => out.push_str("</code></pre>\n"),
        Tag::List(Some(_)) => out.push_str("</ol>\n"),
        Tag::List(None) => out.push_str("</ul>\n"),
        Tag::Item => out.push_str("</li>\n"),
        Tag::Emphasis => out.push_str("</em>"),
        Tag::Strong => out.push_str("</strong>"),
        Tag::Strikethrough => out.push_str("</del>"),
        Tag::Link(..) => out.push_str("</a>"),
        _ => {}
    }
}

/// Note body for the active topic, or the fallback text when it has none.
pub fn note_markdown(content: Option<&str>) -> &str {
    match content {
        Some(body) if !body.is_empty() => body,
        _ => NO_NOTES_FALLBACK,
    }
}

/// Path of the topics page. `#note` brings the content pane back to the top.
pub fn topics_path(course_id: &str, topic_id: Option<&str>, sidebar_collapsed: bool) -> String {
    let mut path = format!("/learn/courses/{}/topics", urlencoding::encode(course_id));
    let mut params = Vec::new();
    if let Some(topic) = topic_id {
        params.push(format!("topic={}", urlencoding::encode(topic)));
    }
    if sidebar_collapsed {
        params.push("sidebar=collapsed".to_string());
    }
    if !params.is_empty() {
        path.push('?');
        path.push_str(&params.join("&"));
    }
    path
}

fn topic_href(course_id: &str, topic_id: &str, collapsed: bool) -> String {
    format!("{}#note", topics_path(course_id, Some(topic_id), collapsed))
}

pub fn render_topics_page(browser: &TopicBrowser) -> String {
    let collapsed = browser.sidebar_collapsed();
    let course_id = browser.resolved_course_id().unwrap_or_default();
    let active_id = browser.active_topic_id();
    let sidebar_width = if collapsed { SIDEBAR_CLOSED_PX } else { SIDEBAR_OPEN_PX };

    let mut html = String::with_capacity(16 * 1024);
    let _ = write!(
        html,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
         <title>{title}</title>\n<style>{STYLESHEET}</style>\n</head>\n<body>\n<div class=\"page\">\n\
         <header class=\"header\">\n<div class=\"breadcrumb\">Learn / Courses / Topics</div>\n\
         <h1 class=\"course-title\">{title}</h1>\n</header>\n\
         <div class=\"layout\" style=\"grid-template-columns: {sidebar_width}px 1fr\">\n",
        title = escaped(browser.course_title()),
    );

    // Sidebar
    let _ = write!(
        html,
        "<aside class=\"sidebar{}\" style=\"width: {sidebar_width}px\">\n<div class=\"sidebar-header\">",
        if collapsed { " collapsed" } else { "" },
    );
    if !collapsed {
        html.push_str("<div class=\"sidebar-title\">Course Topics</div>");
    }
    let toggle_href = topics_path(course_id, active_id, !collapsed);
    let _ = write!(
        html,
        "<a class=\"collapse-btn\" href=\"{}\" aria-label=\"{}\">\
         <svg class=\"collapse-icon{}\" xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 24 24\" \
         fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\" stroke-linecap=\"round\" \
         stroke-linejoin=\"round\"><path d=\"m15 18-6-6 6-6\" /></svg></a></div>\n",
        escaped_href(&toggle_href),
        if collapsed { "Expand sidebar" } else { "Collapse sidebar" },
        if collapsed { " flipped" } else { "" },
    );

    html.push_str("<nav class=\"sidebar-list\">\n");
    for topic in browser.topics() {
        let active = if active_id == Some(topic.id.as_str()) { " active" } else { "" };
        let href = escaped_href(&topic_href(course_id, &topic.id, collapsed));
        if collapsed {
            let _ = writeln!(
                html,
                "<a class=\"topic-mini{active}\" href=\"{href}\" title=\"{}. {}\">{}</a>",
                topic.order,
                escaped(&topic.title),
                topic.order,
            );
        } else {
            let _ = writeln!(
                html,
                "<a class=\"topic-btn{active}\" href=\"{href}\"><span class=\"topic-order\">{}</span>\
                 <span class=\"topic-title\">{}</span></a>",
                topic.order,
                escaped(&topic.title),
            );
        }
    }
    html.push_str("</nav>\n</aside>\n");

    // Content pane
    html.push_str("<main class=\"main\" id=\"note\">\n");
    if browser.is_loading() {
        html.push_str("<div class=\"loading\">Loading...</div>\n");
    } else if let Some(topic) = browser.active_topic() {
        let _ = write!(
            html,
            "<div class=\"topic-header\"><div class=\"topic-kicker\">{}</div><div class=\"nav-btns\">",
            escaped(&topic.title),
        );
        push_nav_link(
            &mut html,
            browser.prev_topic().map(|t| topic_href(course_id, &t.id, collapsed)),
            "&larr; Previous",
        );
        push_nav_link(
            &mut html,
            browser.next_topic().map(|t| topic_href(course_id, &t.id, collapsed)),
            "Next &rarr;",
        );
        html.push_str("</div></div>\n<article class=\"note\">\n");
        let content = topic.note.as_ref().map(|n| n.content.as_str());
        html.push_str(&render_markdown(note_markdown(content)));
        html.push_str("</article>\n");
    }
    html.push_str("</main>\n</div>\n</div>\n</body>\n</html>\n");
    html
}

fn push_nav_link(html: &mut String, href: Option<String>, label: &str) {
    match href {
        Some(href) => {
            let _ = write!(html, "<a class=\"nav-btn\" href=\"{}\">{label}</a>", escaped_href(&href));
        }
        None => {
            let _ = write!(html, "<span class=\"nav-btn disabled\" aria-disabled=\"true\">{label}</span>");
        }
    }
}

pub fn render_not_found() -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n<title>Not Found</title>\n\
         <style>{STYLESHEET}</style>\n</head>\n<body>\n<div class=\"not-found\">Not Found</div>\n</body>\n</html>\n"
    )
}

const STYLESHEET: &str = r#"
body { margin: 0; }
.page { font-family: system-ui, Arial; color: #111; min-height: 100vh;
  background: linear-gradient(180deg, #dff2ff 0%, #cfeeff 60%, #cfeeff 100%); }
.header { border-bottom: 1px solid rgba(0,0,0,0.06); padding: 18px 22px; }
.breadcrumb { font-size: 13px; color: rgba(0,0,0,0.55); }
.course-title { margin: 6px 0 0; font-size: 28px; font-weight: 800; }
.layout { display: grid; gap: 26px; padding: 18px 22px 32px; align-items: start;
  transition: grid-template-columns 260ms ease; }
.sidebar { padding-top: 8px; transition: width 260ms ease; overflow: hidden; }
.sidebar-header { display: flex; align-items: center; justify-content: space-between; gap: 10px; }
.sidebar-title { font-size: 26px; font-weight: 800; color: #1e3a8a; letter-spacing: -0.02em; }
.collapse-btn { width: 44px; height: 34px; border-radius: 999px; border: 1px solid rgba(0,0,0,0.10);
  background: rgba(255,255,255,0.55); display: grid; place-items: center; color: #0a2a66; }
.collapse-icon { width: 20px; height: 20px; transition: transform 220ms ease; }
.collapse-icon.flipped { transform: rotate(180deg); }
.sidebar-list { display: flex; flex-direction: column; gap: 8px; margin-top: 12px;
  transition: opacity 200ms ease; }
.sidebar.collapsed .sidebar-list { margin-top: 10px; align-items: center; }
.topic-btn { display: flex; gap: 12px; padding: 10px 14px; border-radius: 999px; color: #0a2a66;
  text-decoration: none; font-weight: 600; }
.topic-btn:hover { background: rgba(255,255,255,0.6); }
.topic-btn.active, .topic-mini.active { background: #1e3a8a; color: #fff; }
.topic-order { min-width: 18px; opacity: 0.7; }
.topic-mini { width: 40px; height: 40px; border-radius: 999px; display: grid; place-items: center;
  background: rgba(255,255,255,0.55); color: #0a2a66; text-decoration: none; font-weight: 700; }
.main { min-width: 0; }
.topic-header { display: flex; justify-content: space-between; align-items: center; gap: 12px; }
.topic-kicker { font-size: 14px; font-weight: 700; color: #1e3a8a; text-transform: uppercase; }
.nav-btns { display: flex; gap: 8px; }
.nav-btn { padding: 8px 14px; border-radius: 999px; border: 1px solid rgba(0,0,0,0.12);
  background: #fff; color: #111; text-decoration: none; }
.nav-btn.disabled { opacity: 0.45; }
.note { margin-top: 14px; background: #fff; border-radius: 18px; padding: 22px 26px; line-height: 1.65; }
.note-h1 { font-size: 30px; margin: 0 0 14px; }
.note-h2 { font-size: 22px; margin: 22px 0 10px; }
.note-h3 { font-size: 18px; margin: 18px 0 8px; }
.note-p { margin: 0 0 12px; }
.note-li { margin: 4px 0; }
.note-code { background: rgba(0,0,0,0.06); padding: 1px 5px; border-radius: 6px; }
.note-pre { background: #0b1020; color: #e6edf3; padding: 14px 16px; border-radius: 12px; overflow-x: auto; }
.note-quote { border-left: 4px solid #93c5fd; margin: 0 0 12px; padding-left: 12px; color: #333; }
.note-img { max-width: 100%; }
.not-found { padding: 16px; font-family: system-ui, Arial; }
"#;
