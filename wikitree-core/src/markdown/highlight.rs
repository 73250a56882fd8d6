//! Code syntax highlighting using syntect.
//!
//! Fenced blocks are highlighted one line at a time so every output line is
//! self-contained markup. The full info string is kept in a `data-info`
//! attribute for the code block postprocessor.

use super::html_escape;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME: OnceLock<Theme> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    THEME.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        theme_set
            .themes
            .get("InspiredGitHub")
            .or_else(|| theme_set.themes.get("base16-ocean.light"))
            .cloned()
            .unwrap_or_default()
    })
}

/// Transformer for syntax highlighting code blocks
pub struct HighlightTransformer;

impl HighlightTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Replace fenced code blocks that carry an info string with highlighted HTML
    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, syntect::Error> {
        let mut result = Vec::with_capacity(events.len());
        let mut code_info: Option<String> = None;
        let mut code_content = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info)))
                    if !info.trim().is_empty() =>
                {
                    code_info = Some(info.trim().to_string());
                    code_content.clear();
                }
                Event::Text(text) if code_info.is_some() => {
                    code_content.push_str(text.as_ref());
                }
                Event::End(TagEnd::CodeBlock) if code_info.is_some() => {
                    if let Some(info) = code_info.take() {
                        let highlighted = self.highlight_code(&code_content, &info)?;
                        result.push(Event::Html(CowStr::Boxed(highlighted.into_boxed_str())));
                    }
                }
                other => result.push(other),
            }
        }

        Ok(result)
    }

    fn highlight_code(&self, code: &str, info: &str) -> Result<String, syntect::Error> {
        let lang = info.split_whitespace().next().unwrap_or_default();
        let ss = syntax_set();
        let syntax = ss
            .find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_extension(lang))
            .unwrap_or_else(|| ss.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme());
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let regions = highlighter.highlight_line(line, ss)?;
            let regions: Vec<(Style, &str)> = regions
                .into_iter()
                .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
                .filter(|(_, text)| !text.is_empty())
                .collect();
            lines.push(styled_line_to_highlighted_html(
                &regions,
                IncludeBackground::No,
            )?);
        }

        Ok(format!(
            "<pre class=\"highlight\"><code class=\"language-{}\" data-info=\"{}\">{}\n</code></pre>\n",
            html_escape(lang),
            html_escape(info),
            lines.join("\n")
        ))
    }
}

impl Default for HighlightTransformer {
    fn default() -> Self {
        Self::new()
    }
}
