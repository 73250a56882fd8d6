//! Callout blocks: `:::note Optional title` … `:::`.
//!
//! The inner content stays Markdown. It is wrapped in raw HTML separated by
//! blank lines, so lists and code inside a callout render normally.

use super::html_escape;
use super::preprocess::Fences;

/// Recognized callout kinds.
pub const CALLOUT_KINDS: &[&str] = &["note", "tip", "warning", "danger", "info"];

const CLOSE: &str = "\n</div>\n</div>\n\n";

/// Expand every callout block in `text`.
///
/// An unclosed callout takes all remaining lines as its content.
pub fn expand_callouts(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 128);
    let mut fences = Fences::default();
    let mut open = false;

    for line in text.split_inclusive('\n') {
        if !fences.consume(line) {
            if open && line.trim() == ":::" {
                out.push_str(CLOSE);
                open = false;
                continue;
            }
            if !open {
                if let Some((kind, title)) = parse_opening(line) {
                    out.push_str(&opening_html(kind, &title));
                    open = true;
                    continue;
                }
            }
        }
        out.push_str(line);
    }

    if open {
        tracing::debug!("Callout block was never closed; using remaining lines as content");
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(CLOSE);
    }

    out
}

/// Parse `:::kind title` into the kind and the effective title.
pub fn parse_opening(line: &str) -> Option<(&'static str, String)> {
    let rest = line.trim().strip_prefix(":::")?.trim_start();
    let word = rest.split_whitespace().next()?;
    let kind = CALLOUT_KINDS
        .iter()
        .copied()
        .find(|kind| kind.eq_ignore_ascii_case(word))?;

    let title = rest[word.len()..].trim();
    let title = if title.is_empty() {
        capitalize(kind)
    } else {
        title.to_string()
    };
    Some((kind, title))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn opening_html(kind: &str, title: &str) -> String {
    format!(
        "<div class=\"callout callout-{kind}\">\n<p class=\"callout-title\">{}</p>\n<div class=\"callout-content\">\n\n",
        html_escape(title)
    )
}
