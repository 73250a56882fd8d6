//! Markdown preprocessing and rendering.
//!
//! Preprocessing (front matter, callouts, cross-references) works on raw
//! text; rendering goes through the [`MarkdownRenderer`] capability.

pub mod callouts;
pub mod crossrefs;
pub mod highlight;
pub mod preprocess;

#[cfg(test)]
mod test_integration;

use pulldown_cmark::{html, Options, Parser};
use thiserror::Error;

pub use callouts::expand_callouts;
pub use crossrefs::{parse_crossref, resolve_target, rewrite_crossrefs, CrossRef};
pub use highlight::HighlightTransformer;
pub use preprocess::{preprocess, DocumentContext};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Syntax highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),

    #[error("Renderer failed: {0}")]
    Engine(String),
}

/// Renders preprocessed Markdown to HTML.
///
/// Implementations must be shareable across the worker pool.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// CommonMark renderer with tables, strikethrough, task lists, footnotes,
/// definition lists and highlighted fenced code.
pub struct CmarkRenderer {
    options: Options,
}

impl CmarkRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_DEFINITION_LIST);

        Self { options }
    }
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, self.options);
        let events = HighlightTransformer::new().transform(parser.collect())?;

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }
}

/// Escape text for HTML content and quoted attribute values.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
