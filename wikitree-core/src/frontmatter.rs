//! Front matter detection, stripping and parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Metadata block at the top of a document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Frontmatter {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub draft: bool,
}

const DELIMITER: &str = "---";

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).trim_end() == DELIMITER
}

/// Split a document into its raw front matter block and the body.
///
/// Returns `None` when the text does not open with a delimiter line or the
/// block is never closed. The body has leading blank lines removed.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if !is_delimiter(first) {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter(line) {
            let yaml = &text[yaml_start..offset];
            let body = skip_blank_lines(&text[offset + line.len()..]);
            return Some((yaml, body));
        }
        offset += line.len();
    }

    None
}

fn skip_blank_lines(text: &str) -> &str {
    let mut rest = text;
    loop {
        match rest.find('\n') {
            Some(end) if rest[..end].trim().is_empty() => rest = &rest[end + 1..],
            None if rest.trim().is_empty() => return "",
            _ => return rest,
        }
    }
}

/// Remove a closed front matter block and the blank lines after it.
///
/// An unclosed block leaves the text untouched.
///
/// ```
/// use wikitree_core::frontmatter::strip_frontmatter;
///
/// assert_eq!(strip_frontmatter("---\ntitle: x\n---\n\n# Body\n"), "# Body\n");
/// assert_eq!(strip_frontmatter("---\nnever closed\n"), "---\nnever closed\n");
/// ```
pub fn strip_frontmatter(content: &str) -> &str {
    match split_frontmatter(content) {
        Some((_, body)) => body,
        None => content,
    }
}

/// Parse front matter from markdown content
///
/// Returns a tuple of (frontmatter, markdown_body).
/// If no front matter is present, returns default front matter with the full content as body.
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let Some((yaml, body)) = split_frontmatter(content) else {
        return Ok((Frontmatter::default(), content));
    };

    if yaml.trim().is_empty() {
        return Ok((Frontmatter::default(), body));
    }

    let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;
    Ok((frontmatter, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
title: Test Post
description: A test post
date: 2025-01-01
tags:
  - rust
  - docs
---

# Hello World

This is the content."#;

        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.description.as_deref(), Some("A test post"));
        assert_eq!(fm.date.as_deref(), Some("2025-01-01"));
        assert_eq!(fm.tags, vec!["rust", "docs"]);
        assert!(body.starts_with("# Hello World"));
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let content = "# Just Content\n\nNo front matter here.";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_frontmatter_with_draft() {
        let (fm, _) = parse_frontmatter("---\ndraft: true\n---\nBody").unwrap();
        assert!(fm.draft);
        assert_eq!(fm.title, None);
    }

    #[test]
    fn test_invalid_yaml() {
        let content = "---\ntitle: Test\ninvalid yaml: [unclosed\n---\n\nContent.";
        assert!(parse_frontmatter(content).is_err());
        // stripping does not care about the YAML itself
        assert_eq!(strip_frontmatter(content), "Content.");
    }

    #[test]
    fn test_unclosed_block_is_untouched() {
        let content = "---\ntitle: Oops\n\n# Heading\n";
        assert_eq!(strip_frontmatter(content), content);
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_delimiter_must_open_the_text() {
        let content = "Intro\n---\ntitle: x\n---\n";
        assert_eq!(strip_frontmatter(content), content);
    }

    #[test]
    fn test_blank_lines_after_block_are_removed() {
        let content = "---\ntitle: x\n---\n\n  \n\nFirst line\n\nSecond\n";
        assert_eq!(strip_frontmatter(content), "First line\n\nSecond\n");
    }

    #[test]
    fn test_crlf_and_empty_body() {
        assert_eq!(strip_frontmatter("---\r\ntitle: x\r\n---\r\nBody\r\n"), "Body\r\n");
        assert_eq!(strip_frontmatter("---\ntitle: x\n---\n\n"), "");
        assert_eq!(strip_frontmatter("---\ntitle: x\n---"), "");
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = parse_frontmatter("---\n---\nBody").unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "Body");
    }
}
