//! Site building logic - resolves the tree, then renders every document.

use crate::{
    config::Config,
    html::PostProcessor,
    markdown::{preprocess, CmarkRenderer, MarkdownRenderer, RenderError},
    tree::{NodeId, SiteTree, TreeError},
    validate::{BrokenLinkReport, LinkValidator},
};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// One document after the full pipeline.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub node: NodeId,
    pub url: String,
    pub title: String,
    pub html: String,
    pub reports: Vec<BrokenLinkReport>,
}

/// Result of a whole build.
#[derive(Debug)]
pub struct SiteBuild {
    pub tree: SiteTree,
    /// Pages in tree order
    pub pages: Vec<RenderedPage>,
    /// Broken links across every page
    pub reports: Vec<BrokenLinkReport>,
}

impl SiteBuild {
    pub fn has_broken_links(&self) -> bool {
        !self.reports.is_empty()
    }
}

/// Main site builder
pub struct SiteBuilder {
    config: Config,
    renderer: Box<dyn MarkdownRenderer>,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        Self::with_renderer(config, Box::new(CmarkRenderer::new()))
    }

    pub fn with_renderer(config: Config, renderer: Box<dyn MarkdownRenderer>) -> Self {
        Self { config, renderer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the entire site in memory
    pub fn build(&self) -> Result<SiteBuild, BuildError> {
        let source_dir = self.config.source_dir();
        tracing::info!("Building site from {}", source_dir.display());

        let tree = SiteTree::build(&source_dir, &self.config.tree_options())?;
        let documents = tree.documents();
        tracing::info!("Found {} documents", documents.len());

        let postprocessor = PostProcessor::new(&self.config.postprocess_options());
        let base_path = self.config.normalized_base_path();
        let validator = LinkValidator::new(tree.valid_urls(), &base_path);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.build.jobs)
            .build()?;

        let pages: Vec<RenderedPage> = pool.install(|| {
            documents
                .par_iter()
                .map(|&id| self.render_document(&tree, id, &postprocessor, &validator))
                .collect::<Result<Vec<_>, BuildError>>()
        })?;

        let reports: Vec<BrokenLinkReport> = pages
            .iter()
            .flat_map(|page| page.reports.iter().cloned())
            .collect();
        for report in &reports {
            tracing::warn!(
                "Broken link in {}{}: {} -> {}",
                report.source.display(),
                report.line.map(|l| format!(":{l}")).unwrap_or_default(),
                report.syntax,
                report.link_url
            );
        }

        tracing::info!(
            "Rendered {} pages with {} broken links",
            pages.len(),
            reports.len()
        );

        Ok(SiteBuild {
            tree,
            pages,
            reports,
        })
    }

    /// Run one document through preprocessing, rendering, postprocessing and
    /// link validation.
    pub fn render_document(
        &self,
        tree: &SiteTree,
        id: NodeId,
        postprocessor: &PostProcessor,
        validator: &LinkValidator<'_>,
    ) -> Result<RenderedPage, BuildError> {
        let node = tree.node(id);
        let path = tree.root_dir().join(&node.source);
        tracing::debug!("Rendering {} -> {}", node.source.display(), node.url);

        let bytes = fs::read(&path).map_err(|source| BuildError::Read {
            path: path.clone(),
            source,
        })?;
        let markdown = String::from_utf8_lossy(&bytes);

        let ctx = tree.document_context(id);
        let preprocessed = preprocess(&markdown, &ctx);
        let html = self
            .renderer
            .render(&preprocessed)
            .map_err(|source| BuildError::Render {
                path: node.source.clone(),
                source,
            })?;
        let html = postprocessor.process(&html);
        let reports = validator.validate(&html, &ctx, &markdown);

        Ok(RenderedPage {
            node: id,
            url: node.url.clone(),
            title: node.name.clone(),
            html,
            reports,
        })
    }
}
