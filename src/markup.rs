//! Inline markup helpers shared by the delta and markdown interpreters.
//!
//! Block text is carried as a small HTML-like subset (`<b>`, `<i>`, `<a>`,
//! `<br/>`) that the downstream typesetter understands. Everything that goes
//! into it is escaped here first.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::lookup::TaskLookup;

/// Matches a ClickUp task URL anywhere in a string and captures the task key
/// (the final path segment; the optional numeric team segment is skipped).
static TASK_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(?:app\.)?clickup\.com/t/(?:\d+/)?([A-Za-z0-9-]+)")
        .expect("valid task url regex")
});

/// `[text](url)` links. Applied before bold so markers inside link text
/// are not re-escaped.
static MD_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid markdown link regex"));

/// `**bold**` runs.
static MD_BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid markdown bold regex"));

/// Bare URLs inside plain text. Stops at whitespace or an escaped bracket.
static BARE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<]+").expect("valid bare url regex"));

/// Markup tags, for stripping when rendering a plain-text preview.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Escape text for the markup subset.
pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Canonical URL for a task id or custom id.
pub fn canonical_task_url(key: &str) -> String {
    format!("https://app.clickup.com/t/{key}")
}

/// Extract the task key from a ClickUp task URL, if it is one.
pub fn task_key_from_url(url: &str) -> Option<String> {
    TASK_URL_RE
        .captures(url)
        .map(|c| c[1].to_string())
}

/// Uniform chip label for task references: `[<display-id>] <name>`, with a
/// generic stand-in when no name is known.
pub fn chip_label(display_id: &str, name: &str) -> String {
    if name.is_empty() {
        format!("[{display_id}] ClickUp Task")
    } else {
        format!("[{display_id}] {name}")
    }
}

/// Convert the minimal inline markdown subset to markup: `[text](url)` then
/// `**bold**`, over escaped text. Everything else stays literal.
pub fn md_inline_to_html(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let t = esc(s);
    let t = MD_LINK_RE.replace_all(&t, |c: &Captures| {
        format!(r#"<a href="{}">{}</a>"#, &c[2], &c[1])
    });
    MD_BOLD_RE.replace_all(&t, "<b>$1</b>").into_owned()
}

/// Turn bare URLs in plain text into hyperlinks. Task URLs get the same
/// bracketed chip label as mentions, resolved through the lookup.
pub fn urlify_text(s: &str, lookup: &TaskLookup) -> String {
    let t = esc(s);
    BARE_URL_RE
        .replace_all(&t, |c: &Captures| {
            let url = &c[0];
            match task_key_from_url(url) {
                Some(key) => {
                    let (display_id, name) = lookup.display(&key);
                    let label = esc(&chip_label(&display_id, &name));
                    format!(r#"<a href="{url}">{label}</a>"#)
                }
                None => format!(r#"<a href="{url}">{url}</a>"#),
            }
        })
        .into_owned()
}

/// Reduce markup to plain text for the preview sink.
pub fn strip_markup(s: &str) -> String {
    let t = s.replace("<br/>", "\n");
    TAG_RE
        .replace_all(&t, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esc() {
        assert_eq!(esc("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_task_key_from_url() {
        assert_eq!(
            task_key_from_url("https://app.clickup.com/t/20419954/PERSON-20340"),
            Some("PERSON-20340".to_string())
        );
        assert_eq!(
            task_key_from_url("https://clickup.com/t/8675309"),
            Some("8675309".to_string())
        );
        assert_eq!(task_key_from_url("https://example.com/t/123"), None);
    }

    #[test]
    fn test_md_inline_links_before_bold() {
        assert_eq!(
            md_inline_to_html("see [**docs**](https://example.com) now"),
            r#"see <a href="https://example.com">**docs**</a> now"#
        );
        assert_eq!(md_inline_to_html("**hi** there"), "<b>hi</b> there");
    }

    #[test]
    fn test_urlify_plain_url() {
        let lookup = TaskLookup::default();
        assert_eq!(
            urlify_text("go to https://example.com/x now", &lookup),
            r#"go to <a href="https://example.com/x">https://example.com/x</a> now"#
        );
    }

    #[test]
    fn test_urlify_task_url_uses_chip_label() {
        let mut lookup = TaskLookup::default();
        lookup.record("123", "ABC-1", "Fix bug");
        assert_eq!(
            urlify_text("blocked by https://app.clickup.com/t/123", &lookup),
            r#"blocked by <a href="https://app.clickup.com/t/123">[ABC-1] Fix bug</a>"#
        );
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup(r#"a <b>b</b><br/><a href="u">c</a> &amp; d"#),
            "a b\nc & d"
        );
    }
}
