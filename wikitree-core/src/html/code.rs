//! Code block containers, copy buttons and highlighted line ranges.

use super::decode_entities;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeSet;

static CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<pre([^>]*)><code([^>]*)>(.*?)</code></pre>").expect("valid code block regex")
});

static DATA_INFO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sdata-info="([^"]*)""#).expect("valid data-info regex"));

/// Upper bound for line numbers in a range, so `{1-99999999}` stays cheap.
const MAX_LINE: usize = 10_000;

const COPY_BUTTON: &str =
    "<button type=\"button\" class=\"copy-button\" aria-label=\"Copy code to clipboard\">Copy</button>";

/// Parse a line specification such as `2,4-5` into 1-based line numbers.
///
/// Surrounding braces are accepted. Reversed ranges are swapped; zero,
/// empty and malformed parts are ignored.
///
/// ```
/// use wikitree_core::html::parse_line_spec;
///
/// let lines: Vec<usize> = parse_line_spec("2,4-5").into_iter().collect();
/// assert_eq!(lines, vec![2, 4, 5]);
/// ```
pub fn parse_line_spec(spec: &str) -> BTreeSet<usize> {
    let spec = spec.trim().trim_start_matches('{').trim_end_matches('}');
    let mut lines = BTreeSet::new();

    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (Ok(start), Ok(end)) = (start.trim().parse::<usize>(), end.trim().parse())
                else {
                    continue;
                };
                let (low, high) = if start <= end { (start, end) } else { (end, start) };
                lines.extend(low.max(1)..=high.min(MAX_LINE));
            }
            None => {
                if let Ok(line) = part.parse::<usize>() {
                    if (1..=MAX_LINE).contains(&line) {
                        lines.insert(line);
                    }
                }
            }
        }
    }

    lines
}

/// The `{...}` part of an info string like `go {2,4-5}`.
pub fn line_spec_of(info: &str) -> Option<&str> {
    let open = info.find('{')?;
    let close = info[open..].find('}')? + open;
    Some(&info[open + 1..close])
}

/// Wrap each line of already-escaped code in a `line` span.
pub fn wrap_lines(code: &str, highlighted: &BTreeSet<usize>) -> String {
    let body = code.strip_suffix('\n').unwrap_or(code);
    let mut out = String::with_capacity(code.len() + 32 * body.lines().count());

    for (idx, line) in body.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        if highlighted.contains(&(idx + 1)) {
            out.push_str("<span class=\"line highlighted\">");
        } else {
            out.push_str("<span class=\"line\">");
        }
        out.push_str(line);
        out.push_str("</span>");
    }
    out.push('\n');
    out
}

/// Wrap every code block in a container with a copy button, splitting
/// lines and marking highlighted ones when the info string asks for it.
pub fn enhance_code_blocks(html: &str) -> String {
    CODE_BLOCK_RE
        .replace_all(html, |caps: &Captures| {
            let pre_attrs = &caps[1];
            let code_attrs = &caps[2];
            let code = &caps[3];

            let info = DATA_INFO_RE
                .captures(code_attrs)
                .map(|c| decode_entities(&c[1]))
                .unwrap_or_default();
            let code = match line_spec_of(&info) {
                Some(spec) => wrap_lines(code, &parse_line_spec(spec)),
                None => code.to_string(),
            };

            format!(
                "<div class=\"code-block\">{COPY_BUTTON}<pre{pre_attrs}><code{code_attrs}>{code}</code></pre></div>"
            )
        })
        .into_owned()
}
