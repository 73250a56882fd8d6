//! Preprocess, render and postprocess together.

use super::*;
use crate::html::{PostProcessOptions, PostProcessor};

fn pipeline(markdown: &str, ctx: &DocumentContext) -> String {
    let preprocessed = preprocess(markdown, ctx);
    let html = CmarkRenderer::new().render(&preprocessed).unwrap();
    PostProcessor::new(&PostProcessOptions::default()).process(&html)
}

#[test]
fn test_callout_with_nested_list_and_code() {
    let md = ":::tip Try this\n- one\n- two\n\n```\ncode\n```\n:::\n";
    let html = pipeline(md, &DocumentContext::root("index.md"));
    assert!(html.contains("<div class=\"callout callout-tip\">"));
    assert!(html.contains("<p class=\"callout-title\">Try this</p>"));
    assert!(html.contains("<li>one</li>"));
    assert!(html.contains("<div class=\"code-block\">"));
    assert!(html.contains("code\n</code>"));
}

#[test]
fn test_crossref_becomes_link() {
    let ctx = DocumentContext::new("guides/intro.md", vec!["guides".to_string()]);
    let html = pipeline("See [[Setup|the setup page]].\n", &ctx);
    assert!(html.contains(r#"<a href="/guides/setup/">the setup page</a>"#));
}

#[test]
fn test_crossref_in_code_is_literal() {
    let html = pipeline("Use `[[Setup]]`.\n", &DocumentContext::root("index.md"));
    assert!(html.contains("<code>[[Setup]]</code>"));
    assert!(!html.contains("href=\"/setup/\""));
}

#[test]
fn test_highlighted_code_lines() {
    let md = "```go {2,4-5}\nfunc a() {}\nfunc b() {}\nfunc c() {}\nfunc d() {}\nfunc e() {}\nfunc f() {}\n```\n";
    let html = pipeline(md, &DocumentContext::root("index.md"));
    let marked: Vec<&str> = html
        .split('\n')
        .filter(|line| line.contains("<span class=\"line highlighted\">"))
        .collect();
    assert_eq!(marked.len(), 3);
    assert_eq!(html.matches("<span class=\"line").count(), 6);

    let flags: Vec<bool> = html
        .split('\n')
        .filter(|line| line.contains("<span class=\"line"))
        .map(|line| line.contains("line highlighted"))
        .collect();
    assert_eq!(flags, vec![false, true, false, true, true, false]);
}

#[test]
fn test_front_matter_and_heading_anchor() {
    let md = "---\ntitle: Page\n---\n\n# Hello *World*\n";
    let html = pipeline(md, &DocumentContext::root("page.md"));
    assert!(!html.contains("title: Page"));
    assert!(html.contains("<h1 id=\"hello-world\">"));
    assert!(html.contains("<em>World</em>"));
}
