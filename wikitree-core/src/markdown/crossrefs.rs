//! Cross-reference rewriting for `[[target]]` and `[[target|text]]` syntax.
//!
//! References become ordinary Markdown links before rendering. Resolution
//! works purely on names, so it needs no knowledge of which pages exist;
//! the link validator reports anything that does not resolve.

use super::preprocess::{DocumentContext, Fences};
use crate::slug::{attachment_extension, attachment_segment, is_index_slug, url_segment};

/// One `[[...]]` occurrence within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossRef<'a> {
    /// Byte offset of the reference (including a leading `!`) in its line
    pub start: usize,
    /// Byte offset just past the closing `]]`
    pub end: usize,
    /// The reference exactly as written
    pub syntax: &'a str,
    /// Target before the `|`
    pub target: &'a str,
    /// Explicit link text after the `|`
    pub label: Option<&'a str>,
    /// Written as `![[...]]`
    pub embed: bool,
}

impl<'a> CrossRef<'a> {
    /// Link text: the explicit label, else the last path segment of the target.
    pub fn text(&self) -> String {
        if let Some(label) = self.label.filter(|l| !l.is_empty()) {
            return label.to_string();
        }

        let (path, fragment) = split_fragment(self.target);
        let last = path.rsplit('/').next().unwrap_or(path).trim();
        if !last.is_empty() {
            last.to_string()
        } else {
            fragment.unwrap_or(self.target).trim().to_string()
        }
    }

    /// Resolved URL relative to the given document.
    pub fn url(&self, ctx: &DocumentContext) -> String {
        resolve_target(self.target, &ctx.folder)
    }
}

/// Split `inner` (the text between `[[` and `]]`) into target and label.
pub fn parse_crossref(inner: &str) -> (&str, Option<&str>) {
    match inner.split_once('|') {
        Some((target, label)) => (target.trim(), Some(label.trim())),
        None => (inner.trim(), None),
    }
}

/// Find every cross-reference in one line, skipping inline code spans.
pub fn scan_crossrefs(line: &str) -> Vec<CrossRef<'_>> {
    let bytes = line.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            i = match closing_backticks(bytes, i + run, run) {
                Some(close) => close + run,
                None => i + run,
            };
            continue;
        }

        if bytes[i..].starts_with(b"[[") {
            if let Some(rel_end) = line[i + 2..].find("]]") {
                let inner = &line[i + 2..i + 2 + rel_end];
                if !inner.trim().is_empty() && !inner.contains("[[") {
                    let embed = i > 0 && bytes[i - 1] == b'!';
                    let start = if embed { i - 1 } else { i };
                    let end = i + 2 + rel_end + 2;
                    let (target, label) = parse_crossref(inner);
                    found.push(CrossRef {
                        start,
                        end,
                        syntax: &line[start..end],
                        target,
                        label,
                        embed,
                    });
                    i = end;
                    continue;
                }
            }
        }

        i += 1;
    }

    found
}

fn closing_backticks(bytes: &[u8], from: usize, run: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let len = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            if len == run {
                return Some(i);
            }
            i += len;
        } else {
            i += 1;
        }
    }
    None
}

fn split_fragment(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((path, fragment)) => (path.trim(), Some(fragment)),
        None => (target.trim(), None),
    }
}

fn strip_md_extension(path: &str) -> &str {
    let len = path.len();
    if len > 3 && path.is_char_boundary(len - 3) && path[len - 3..].eq_ignore_ascii_case(".md") {
        &path[..len - 3]
    } else {
        path
    }
}

/// Resolve a cross-reference target to a site URL.
///
/// `folder` holds the URL segments of the referencing document's folder.
///
/// ```
/// use wikitree_core::markdown::resolve_target;
///
/// let guides = vec!["guides".to_string()];
/// assert_eq!(resolve_target("Setup", &guides), "/guides/setup/");
/// assert_eq!(resolve_target("Setup", &[]), "/setup/");
/// assert_eq!(resolve_target("file.md#section", &[]), "/file/#section");
/// assert_eq!(resolve_target("image.png", &[]), "/image.png");
/// ```
pub fn resolve_target(target: &str, folder: &[String]) -> String {
    let (path, fragment) = split_fragment(target.trim());
    let fragment = fragment.filter(|f| !f.is_empty());

    if path.is_empty() {
        return match fragment {
            Some(fragment) => format!("#{fragment}"),
            None => String::from("/"),
        };
    }

    let path = strip_md_extension(path);
    let rooted = path.contains('/');
    let raw: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let attachment = raw
        .last()
        .map(|last| attachment_extension(last).is_some())
        .unwrap_or(false);

    let mut segments: Vec<String> = if rooted { Vec::new() } else { folder.to_vec() };
    let last_index = raw.len().saturating_sub(1);
    for (idx, segment) in raw.iter().enumerate() {
        match *segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            name if idx == last_index && attachment => {
                segments.push(attachment_segment(name).unwrap_or_else(|| url_segment(name)));
            }
            name => segments.push(url_segment(name)),
        }
    }

    if !attachment && segments.last().map(|s| is_index_slug(s)).unwrap_or(false) {
        segments.pop();
    }

    let mut url = String::from("/");
    url.push_str(&segments.join("/"));
    if !attachment && !segments.is_empty() {
        url.push('/');
    }
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

fn link_destination(url: &str) -> String {
    if url.contains([' ', '(', ')', '<', '>']) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    }
}

/// Rewrite every cross-reference outside code into a Markdown link.
pub fn rewrite_crossrefs(text: &str, ctx: &DocumentContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut fences = Fences::default();

    for line in text.split_inclusive('\n') {
        if fences.consume(line) || !line.contains("[[") {
            out.push_str(line);
            continue;
        }

        let mut cursor = 0;
        for crossref in scan_crossrefs(line) {
            out.push_str(&line[cursor..crossref.start]);
            out.push('[');
            out.push_str(&escape_link_text(&crossref.text()));
            out.push_str("](");
            out.push_str(&link_destination(&crossref.url(ctx)));
            out.push(')');
            cursor = crossref.end;
        }
        out.push_str(&line[cursor..]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guides() -> DocumentContext {
        DocumentContext::new("guides/intro.md", vec!["guides".to_string()])
    }

    fn root() -> DocumentContext {
        DocumentContext::root("index.md")
    }

    #[test]
    fn test_relative_resolution() {
        assert_eq!(rewrite_crossrefs("[[Setup]]", &guides()), "[Setup](/guides/setup/)");
        assert_eq!(rewrite_crossrefs("[[Setup]]", &root()), "[Setup](/setup/)");
    }

    #[test]
    fn test_rooted_resolution() {
        assert_eq!(resolve_target("guides/Setup", &[]), "/guides/setup/");
        assert_eq!(
            resolve_target("Other Folder/01-Sub Page", &["x".to_string()]),
            "/other-folder/sub-page/"
        );
        assert_eq!(resolve_target("/guides/setup", &[]), "/guides/setup/");
    }

    #[test]
    fn test_dot_segments() {
        let folder = vec!["guides".to_string()];
        assert_eq!(resolve_target("../other", &folder), "/other/");
        assert_eq!(resolve_target("./a/b", &folder), "/a/b/");
        assert_eq!(resolve_target("a/../b", &folder), "/b/");
    }

    #[test]
    fn test_index_collapses_to_folder() {
        assert_eq!(resolve_target("folder/index", &[]), "/folder/");
        assert_eq!(resolve_target("folder/readme", &[]), "/folder/");
        assert_eq!(resolve_target("folder/README.md", &[]), "/folder/");
        assert_eq!(resolve_target("index", &[]), "/");
        assert_eq!(resolve_target("index", &["guides".to_string()]), "/guides/");
    }

    #[test]
    fn test_fragment_and_md_extension() {
        assert_eq!(resolve_target("file.md#section", &[]), "/file/#section");
        assert_eq!(resolve_target("file#Some Heading", &[]), "/file/#Some Heading");
        assert_eq!(resolve_target("file.md", &[]), "/file/");
        assert_eq!(resolve_target("#local", &[]), "#local");
        assert_eq!(resolve_target("file#", &[]), "/file/");
    }

    #[test]
    fn test_attachments_keep_extension() {
        assert_eq!(resolve_target("image.png", &[]), "/image.png");
        assert_eq!(
            resolve_target("My Photo.JPG", &["guides".to_string()]),
            "/guides/my-photo.JPG"
        );
        assert_eq!(resolve_target("assets/index.png", &[]), "/assets/index.png");
    }

    #[test]
    fn test_display_text() {
        let refs = scan_crossrefs("[[guides/setup.md#install]] and [[a|Custom]]");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].text(), "setup.md");
        assert_eq!(refs[1].text(), "Custom");
        assert_eq!(refs[1].syntax, "[[a|Custom]]");
    }

    #[test]
    fn test_embeds_rewrite_identically() {
        assert_eq!(
            rewrite_crossrefs("See ![[diagram.svg]] here", &root()),
            "See [diagram.svg](/diagram.svg) here"
        );
        let refs = scan_crossrefs("![[x]]");
        assert!(refs[0].embed);
        assert_eq!(refs[0].syntax, "![[x]]");
    }

    #[test]
    fn test_code_is_left_alone() {
        let text = "Use `[[Setup]]` literally\n```\n[[Setup]]\n```\nbut [[Setup]] here\n";
        let out = rewrite_crossrefs(text, &root());
        assert_eq!(
            out,
            "Use `[[Setup]]` literally\n```\n[[Setup]]\n```\nbut [Setup](/setup/) here\n"
        );
    }

    #[test]
    fn test_malformed_references() {
        assert_eq!(rewrite_crossrefs("[[unclosed", &root()), "[[unclosed");
        assert_eq!(rewrite_crossrefs("[[]] and [[ ]]", &root()), "[[]] and [[ ]]");
        assert_eq!(
            rewrite_crossrefs("[[a [[b]]", &root()),
            "[[a [b](/b/)"
        );
    }

    #[test]
    fn test_special_characters_in_output() {
        assert_eq!(
            rewrite_crossrefs("[[page#Two Words|see [this]]]", &root()),
            "[see \\[this](</page/#Two Words>)]"
        );
    }

    #[test]
    fn test_multibyte_text_around_references() {
        assert_eq!(
            rewrite_crossrefs("café → [[Setup]] ✓", &root()),
            "café → [Setup](/setup/) ✓"
        );
    }
}
