//! Sub-path prefixing of root-relative URLs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static URL_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\s)(href|src|srcset|poster|data-[A-Za-z0-9_-]+)=("([^"]*)"|'([^']*)')"#)
        .expect("valid URL attribute regex")
});

/// Prefix every root-relative URL in link and media attributes.
///
/// `prefix` has no trailing slash, e.g. `/docs`. Protocol-relative URLs,
/// fragments and absolute URLs are left untouched. Every other value is
/// prefixed, even one that already starts with the prefix: `/docs/x/` may
/// be a page in a top-level `docs` folder.
pub fn prefix_internal_paths(html: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return html.to_string();
    }

    URL_ATTR_RE
        .replace_all(html, |caps: &Captures| {
            let attr = &caps[2];
            let (quote, value) = match caps.get(4) {
                Some(value) => ('"', value.as_str()),
                None => ('\'', caps.get(5).map(|m| m.as_str()).unwrap_or_default()),
            };

            let value = if attr == "srcset" {
                prefix_srcset(value, prefix)
            } else {
                prefix_url(value, prefix)
            };
            format!("{}{attr}={quote}{value}{quote}", &caps[1])
        })
        .into_owned()
}

fn prefix_url(url: &str, prefix: &str) -> String {
    if !url.starts_with('/') || url.starts_with("//") {
        return url.to_string();
    }
    format!("{prefix}{url}")
}

fn prefix_srcset(value: &str, prefix: &str) -> String {
    value
        .split(',')
        .map(|candidate| {
            let trimmed = candidate.trim_start();
            let lead = &candidate[..candidate.len() - trimmed.len()];
            match trimmed.split_once(char::is_whitespace) {
                Some((url, descriptor)) => {
                    format!("{lead}{} {descriptor}", prefix_url(url, prefix))
                }
                None => format!("{lead}{}", prefix_url(trimmed, prefix)),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
