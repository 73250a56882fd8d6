//! Internal link validation.
//!
//! Every root-relative link in a rendered document must point at a URL the
//! build produces. Misses are traced back to the Markdown source for a line
//! number and the reference as written.

use crate::html::{decode_entities, path_prefix};
use crate::markdown::crossrefs::scan_crossrefs;
use crate::markdown::preprocess::Fences;
use crate::markdown::DocumentContext;
use crate::slug::attachment_extension;
use crate::tree::ValidUrlSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

static ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<a(\s[^>]*)>(.*?)</a>").expect("valid anchor regex"));

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\shref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid href regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static INLINE_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!?\[([^\]]*)\]\(\s*(?:<([^>]*)>|([^)\s]+))(?:\s+"[^"]*")?\s*\)"#)
        .expect("valid inline link regex")
});

const MAX_SUGGESTIONS: usize = 3;

/// An internal link that resolves to no page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLinkReport {
    /// Source document, relative to the content root
    pub source: PathBuf,
    /// 1-based line in the source, when the link could be traced back
    pub line: Option<usize>,
    /// The reference as written in the source
    pub syntax: String,
    /// Link text
    pub text: String,
    /// The unresolved URL
    pub link_url: String,
    /// Up to three existing URLs that look close
    pub suggestions: Vec<String>,
}

/// Checks rendered documents against the set of valid URLs.
#[derive(Debug, Clone)]
pub struct LinkValidator<'a> {
    urls: &'a ValidUrlSet,
    prefix: String,
}

impl<'a> LinkValidator<'a> {
    /// `base_path` is the deployment sub-path, stripped from links first.
    pub fn new(urls: &'a ValidUrlSet, base_path: &str) -> Self {
        Self {
            urls,
            prefix: path_prefix(base_path),
        }
    }

    /// Report every unresolved internal link in `html`.
    ///
    /// `markdown` is the document's raw source, used to locate each miss.
    pub fn validate(
        &self,
        html: &str,
        doc: &DocumentContext,
        markdown: &str,
    ) -> Vec<BrokenLinkReport> {
        let mut seen = HashSet::new();
        let mut reports = Vec::new();

        for caps in ANCHOR_RE.captures_iter(html) {
            let Some(href) = HREF_RE
                .captures(&caps[1])
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| decode_entities(m.as_str()))
            else {
                continue;
            };
            let Some(url) = self.internal_url(&href) else {
                continue;
            };
            if !seen.insert(url.clone()) || self.urls.contains(&url) {
                continue;
            }

            let text = decode_entities(&TAG_RE.replace_all(&caps[2], "")).trim().to_string();
            let source = locate(markdown, doc, &url);
            tracing::debug!("Unresolved link {} in {}", url, doc.source.display());

            reports.push(BrokenLinkReport {
                source: doc.source.clone(),
                line: source.as_ref().map(|s| s.line),
                syntax: source
                    .as_ref()
                    .map(|s| s.syntax.clone())
                    .unwrap_or_else(|| href.clone()),
                text: source.map(|s| s.text).unwrap_or(text),
                suggestions: suggest(self.urls, &url),
                link_url: url,
            });
        }

        reports
    }

    /// Normalized site URL of a link, or `None` for links that are not
    /// checked.
    fn internal_url(&self, href: &str) -> Option<String> {
        if !href.starts_with('/') || href.starts_with("//") {
            return None;
        }

        let href = if self.prefix.is_empty() {
            href
        } else if href == self.prefix {
            "/"
        } else {
            match href.strip_prefix(&self.prefix) {
                Some(rest) if rest.starts_with('/') => rest,
                _ => href,
            }
        };

        let url = normalize_link(href)?;
        (url != "/").then_some(url)
    }
}

/// Drop query and fragment; add a trailing slash unless the last segment
/// has an extension. Attachment links yield `None`.
///
/// ```
/// use wikitree_core::validate::normalize_link;
///
/// assert_eq!(normalize_link("/a/b#frag").as_deref(), Some("/a/b/"));
/// assert_eq!(normalize_link("/a/page.html?x=1").as_deref(), Some("/a/page.html"));
/// assert_eq!(normalize_link("/img/logo.png"), None);
/// ```
pub fn normalize_link(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    if path.is_empty() {
        return None;
    }

    let last = path.rsplit('/').next().unwrap_or(path);
    if attachment_extension(last).is_some() {
        return None;
    }
    if last.contains('.') || path.ends_with('/') {
        Some(path.to_string())
    } else {
        Some(format!("{path}/"))
    }
}

struct SourceLink {
    line: usize,
    syntax: String,
    text: String,
}

/// Find where the Markdown source produces `url`.
fn locate(markdown: &str, doc: &DocumentContext, url: &str) -> Option<SourceLink> {
    let mut fences = Fences::default();

    for (idx, line) in markdown.lines().enumerate() {
        if fences.consume(line) {
            continue;
        }

        for crossref in scan_crossrefs(line) {
            if normalize_link(&crossref.url(doc)).as_deref() == Some(url) {
                return Some(SourceLink {
                    line: idx + 1,
                    syntax: crossref.syntax.to_string(),
                    text: crossref.text(),
                });
            }
        }

        for caps in INLINE_LINK_RE.captures_iter(line) {
            let target = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            if target.and_then(normalize_link).as_deref() == Some(url) {
                return Some(SourceLink {
                    line: idx + 1,
                    syntax: caps[0].to_string(),
                    text: caps[1].to_string(),
                });
            }
        }
    }

    None
}

/// Up to three valid URLs sharing path segments or name fragments with
/// `url`, closest first.
pub fn suggest(urls: &ValidUrlSet, url: &str) -> Vec<String> {
    let target = segments(url);
    let Some(target_last) = target.last().copied() else {
        return Vec::new();
    };

    let mut scored: Vec<(usize, &str)> = urls
        .iter()
        .filter_map(|candidate| {
            let parts = segments(candidate);
            let shared = target.iter().filter(|s| parts.contains(s)).count();
            let overlap = match parts.last() {
                Some(last) if *last != target_last => {
                    last.contains(target_last) || target_last.contains(last)
                }
                _ => false,
            };
            let score = shared * 2 + usize::from(overlap);
            (score > 0).then_some((score, candidate))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

fn segments(url: &str) -> Vec<&str> {
    url.split('/').filter(|s| !s.is_empty()).collect()
}
