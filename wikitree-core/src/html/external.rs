//! External link decoration.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<a(\s[^>]*)?>(.*?)</a>").expect("valid anchor regex"));

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\shref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid href regex")
});

static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid class regex")
});

const EXTERNAL_CLASS: &str = "external-link";

const ICON: &str = concat!(
    "<span class=\"external-link-icon\" aria-hidden=\"true\">\u{2197}</span>",
    "<span class=\"sr-only\"> (opens in a new tab)</span>"
);

/// Host part of an absolute or protocol-relative URL.
///
/// ```
/// use wikitree_core::html::external::url_host;
///
/// assert_eq!(url_host("https://user@Example.com:8080/x"), Some("Example.com"));
/// assert_eq!(url_host("//cdn.example.com"), Some("cdn.example.com"));
/// assert_eq!(url_host("/local/"), None);
/// ```
pub fn url_host(url: &str) -> Option<&str> {
    let rest = if let Some(rest) = url.strip_prefix("//") {
        rest
    } else {
        let (scheme, rest) = url.split_once("://")?;
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return None;
        }
        rest
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let host = match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    };
    (!host.is_empty()).then_some(host)
}

/// Whether a link leaves the site.
pub fn is_external(url: &str, site_host: Option<&str>) -> bool {
    match url_host(url) {
        Some(host) => match site_host {
            Some(site) => super::normalize_host(host) != site,
            None => true,
        },
        None => false,
    }
}

/// Mark links to other hosts so they open in a new tab.
///
/// `site_host` must already be normalized. Image links and links that
/// already carry the decoration are left alone.
pub fn decorate_external_links(html: &str, site_host: Option<&str>) -> String {
    ANCHOR_RE
        .replace_all(html, |caps: &Captures| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let inner = &caps[2];

            let href = HREF_RE
                .captures(attrs)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str());
            let decorate = match href {
                Some(href) => is_external(href, site_host),
                None => false,
            };
            if !decorate || inner.contains("<img") || inner.contains("external-link-icon") {
                return caps[0].to_string();
            }

            format!("<a{}>{inner}{ICON}</a>", decorate_attrs(attrs))
        })
        .into_owned()
}

fn decorate_attrs(attrs: &str) -> String {
    let mut attrs = match CLASS_RE.captures(attrs) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let (quote, existing) = match caps.get(1) {
                Some(value) => ('"', value.as_str()),
                None => ('\'', caps.get(2).map(|m| m.as_str()).unwrap_or_default()),
            };
            let classes = if existing.split_whitespace().any(|c| c == EXTERNAL_CLASS) {
                existing.to_string()
            } else if existing.trim().is_empty() {
                EXTERNAL_CLASS.to_string()
            } else {
                format!("{} {EXTERNAL_CLASS}", existing.trim())
            };
            format!(
                "{} class={quote}{classes}{quote}{}",
                &attrs[..whole.start],
                &attrs[whole.end..]
            )
        }
        None => format!("{attrs} class=\"{EXTERNAL_CLASS}\""),
    };

    if !attrs.contains(" target=") {
        attrs.push_str(" target=\"_blank\"");
    }
    if !attrs.contains(" rel=") {
        attrs.push_str(" rel=\"noopener noreferrer\"");
    }
    attrs
}
