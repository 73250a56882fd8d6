//! Heading identifiers and self-links.

use super::decode_entities;
use crate::slug::slugify;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<h([1-6])(\s[^>]*)?>(.*?)</h[1-6]>").expect("valid heading regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)([^<>]*)>").expect("valid tag regex")
});

static ID_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+id\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid id attribute regex")
});

/// Inline tags that stay markup inside headings; anything else is escaped.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "code", "del", "em", "i", "kbd", "mark", "s", "small", "span",
    "strong", "sub", "sup",
];

/// Identifier used when a heading has no URL-safe text.
const PLACEHOLDER_ID: &str = "section";

/// Assigns unique ids in first-seen order: `setup`, `setup-1`, `setup-2`.
#[derive(Debug, Default)]
pub struct HeadingIds {
    counts: HashMap<String, usize>,
    used: HashSet<String>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, text: &str) -> String {
        let base = match slugify(text) {
            slug if slug.is_empty() => PLACEHOLDER_ID.to_string(),
            slug => slug,
        };

        let mut n = self.counts.get(&base).copied().unwrap_or(0);
        let mut id = if n == 0 {
            base.clone()
        } else {
            format!("{base}-{n}")
        };
        while self.used.contains(&id) {
            n += 1;
            id = format!("{base}-{n}");
        }

        self.counts.insert(base, n + 1);
        self.used.insert(id.clone());
        id
    }
}

/// Escape angle-bracket text that is not an allowed inline tag.
pub fn escape_disallowed_tags(inner: &str) -> String {
    TAG_RE
        .replace_all(inner, |caps: &Captures| {
            let name = caps[2].to_ascii_lowercase();
            if INLINE_TAGS.contains(&name.as_str()) {
                caps[0].to_string()
            } else {
                caps[0].replace('<', "&lt;").replace('>', "&gt;")
            }
        })
        .into_owned()
}

/// Plain text of a heading's inner HTML.
pub fn heading_text(inner: &str) -> String {
    let stripped = TAG_RE.replace_all(inner, "");
    decode_entities(&stripped).trim().to_string()
}

/// Give every heading a unique id and a leading self-link.
pub fn add_heading_anchors(html: &str) -> String {
    let mut ids = HeadingIds::new();

    HEADING_RE
        .replace_all(html, |caps: &Captures| {
            let level = &caps[1];
            let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let inner = escape_disallowed_tags(&caps[3]);
            let id = ids.assign(&heading_text(&inner));
            let attrs = ID_ATTR_RE.replace_all(attrs, "");

            format!(
                "<h{level} id=\"{id}\"{attrs}><a class=\"heading-anchor\" href=\"#{id}\" aria-label=\"Link to this section\">#</a>{inner}</h{level}>"
            )
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_is_injected() {
        let out = add_heading_anchors("<h2>Getting Started</h2>");
        assert_eq!(
            out,
            "<h2 id=\"getting-started\"><a class=\"heading-anchor\" href=\"#getting-started\" aria-label=\"Link to this section\">#</a>Getting Started</h2>"
        );
    }

    #[test]
    fn test_duplicate_headings_in_order() {
        let out = add_heading_anchors("<h2>Setup</h2><p>x</p><h3>Setup</h3><h2>Setup</h2>");
        let first = out.find("id=\"setup\"").unwrap();
        let second = out.find("id=\"setup-1\"").unwrap();
        let third = out.find("id=\"setup-2\"").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_suffix_collision_with_literal_heading() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.assign("Setup 1"), "setup-1");
        assert_eq!(ids.assign("Setup"), "setup");
        assert_eq!(ids.assign("Setup"), "setup-2");
    }

    #[test]
    fn test_existing_id_is_replaced() {
        let out = add_heading_anchors("<h1 id=\"custom\" class=\"title\">Hello</h1>");
        assert!(out.starts_with("<h1 id=\"hello\" class=\"title\">"));
        assert!(!out.contains("custom"));
    }

    #[test]
    fn test_inline_markup_is_stripped_for_id() {
        let out = add_heading_anchors("<h2>Using <code>cargo</code> &amp; <em>friends</em></h2>");
        assert!(out.contains("id=\"using-cargo-friends\""));
        assert!(out.contains("<code>cargo</code>"));
    }

    #[test]
    fn test_unknown_tags_are_escaped() {
        let out = add_heading_anchors("<h2>Vec<T> and <script>x</script></h2>");
        assert!(out.contains("Vec&lt;T&gt; and &lt;script&gt;x&lt;/script&gt;"));
        assert!(out.contains("id=\"vect-and-scriptxscript\""));
    }

    #[test]
    fn test_empty_slug_uses_placeholder() {
        let out = add_heading_anchors("<h2>???</h2><h2>日本</h2>");
        assert!(out.contains("id=\"section\""));
        assert!(out.contains("id=\"section-1\""));
    }
}
