//! Per-document preprocessing ahead of rendering.

use super::callouts::expand_callouts;
use super::crossrefs::rewrite_crossrefs;
use crate::frontmatter::strip_frontmatter;
use std::path::PathBuf;

/// Where a document sits in the site, for resolving relative references.
///
/// Passed explicitly into every call so documents can be processed in
/// parallel without shared state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
    /// Source path relative to the content root
    pub source: PathBuf,
    /// URL segments of the folder containing the document
    pub folder: Vec<String>,
}

impl DocumentContext {
    pub fn new(source: impl Into<PathBuf>, folder: Vec<String>) -> Self {
        Self {
            source: source.into(),
            folder,
        }
    }

    /// Context for a document at the site root.
    pub fn root(source: impl Into<PathBuf>) -> Self {
        Self::new(source, Vec::new())
    }
}

/// Strip front matter, expand callouts and rewrite cross-references.
pub fn preprocess(text: &str, ctx: &DocumentContext) -> String {
    let body = strip_frontmatter(text);
    let expanded = expand_callouts(body);
    rewrite_crossrefs(&expanded, ctx)
}

/// Tracks fenced code blocks while scanning a document line by line.
#[derive(Debug, Default)]
pub(crate) struct Fences {
    open: Option<(char, usize)>,
}

impl Fences {
    /// Feed the next line. Returns true when the line is part of a fenced
    /// code block, fence lines included.
    pub(crate) fn consume(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let run = |marker: char| trimmed.chars().take_while(|&c| c == marker).count();

        match self.open {
            Some((marker, len)) => {
                let closing = run(marker);
                if closing >= len && trimmed[closing..].trim().is_empty() {
                    self.open = None;
                }
                true
            }
            None => match trimmed.chars().next() {
                Some(marker @ ('`' | '~')) if run(marker) >= 3 => {
                    self.open = Some((marker, run(marker)));
                    true
                }
                _ => false,
            },
        }
    }
}
