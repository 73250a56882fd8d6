//! # wikitree-core
//!
//! Core library for the wikitree static site generator.
//!
//! Turns a folder of Markdown documents into a cross-linked site: the
//! folder hierarchy becomes URLs and navigation, `[[cross-references]]`
//! become links, and every internal link in the output is checked against
//! the pages the build produces.

pub mod builder;
pub mod config;
pub mod frontmatter;
pub mod html;
pub mod markdown;
pub mod slug;
pub mod tree;
pub mod validate;

pub use builder::{BuildError, RenderedPage, SiteBuild, SiteBuilder};
pub use config::Config;
pub use frontmatter::Frontmatter;
pub use html::{PostProcessOptions, PostProcessor};
pub use markdown::{CmarkRenderer, DocumentContext, MarkdownRenderer, RenderError};
pub use slug::{slug, slugify};
pub use tree::{NodeId, SiteNode, SiteTree, TreeError, TreeOptions, ValidUrlSet};
pub use validate::{BrokenLinkReport, LinkValidator};
