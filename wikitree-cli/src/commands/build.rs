//! Build command implementation.

use super::format_report;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use wikitree_core::html::path_prefix;
use wikitree_core::markdown::html_escape as escape_html;
use wikitree_core::{Config, NodeId, RenderedPage, SiteBuilder, SiteTree};

/// Build the site and write it to the output directory.
///
/// Every page is rendered before anything is written, so a render failure
/// or a strict-mode link failure leaves the output untouched.
pub fn build_site(config: Config) -> Result<()> {
    tracing::info!("Building site: {}", config.site.title);

    let builder = SiteBuilder::new(config.clone());
    let site = builder.build().context("Failed to build site")?;

    for report in &site.reports {
        eprintln!("{}", format_report(report));
    }
    if config.build.strict_links && site.has_broken_links() {
        bail!("{} broken links", site.reports.len());
    }

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;
    let shell = PageShell::new(&config, &site.tree);

    for page in &site.pages {
        let html = shell.document(page);
        write_page(&output_dir, &page.url, &html)?;
    }

    let folders = site.tree.auto_index_folders();
    for &folder in &folders {
        let html = shell.listing(folder);
        write_page(&output_dir, site.tree.url(folder), &html)?;
    }

    copy_attachments(&site.tree, &output_dir)?;

    tracing::info!(
        "Wrote {} pages, {} listings and {} attachments to {}",
        site.pages.len(),
        folders.len(),
        site.tree.attachments().len(),
        output_dir.display()
    );
    Ok(())
}

/// Minimal HTML wrapper around rendered content.
struct PageShell<'a> {
    tree: &'a SiteTree,
    site_title: String,
    prefix: String,
}

impl<'a> PageShell<'a> {
    fn new(config: &Config, tree: &'a SiteTree) -> Self {
        Self {
            tree,
            site_title: config.site.title.clone(),
            prefix: path_prefix(&config.normalized_base_path()),
        }
    }

    fn href(&self, url: &str) -> String {
        format!("{}{}", self.prefix, url)
    }

    fn document(&self, page: &RenderedPage) -> String {
        let mut body = self.breadcrumbs(page.node);
        body.push_str("<article>\n");
        body.push_str(&page.html);
        body.push_str("</article>\n");
        body.push_str(&self.prev_next(page.node));
        self.wrap(&page.title, &body)
    }

    fn listing(&self, folder: NodeId) -> String {
        let name = &self.tree.node(folder).name;
        let mut body = self.breadcrumbs(folder);
        body.push_str(&format!(
            "<article class=\"auto-index\">\n<h1>{}</h1>\n<ul>\n",
            escape_html(name)
        ));
        for entry in self.tree.listing(folder) {
            let class = if entry.is_folder { "folder" } else { "page" };
            body.push_str(&format!(
                "<li class=\"{}\"><a href=\"{}\">{}</a></li>\n",
                class,
                escape_html(&self.href(&entry.url)),
                escape_html(&entry.name)
            ));
        }
        body.push_str("</ul>\n</article>\n");
        self.wrap(name, &body)
    }

    fn breadcrumbs(&self, id: NodeId) -> String {
        let current = self.tree.url(id);
        let crumbs: Vec<String> = self
            .tree
            .breadcrumbs(id)
            .into_iter()
            .filter(|&crumb| self.tree.url(crumb) != current)
            .map(|crumb| {
                let node = self.tree.node(crumb);
                format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&self.href(&node.url)),
                    escape_html(&node.name)
                )
            })
            .collect();
        if crumbs.is_empty() {
            return String::new();
        }
        format!(
            "<nav class=\"breadcrumbs\">{}</nav>\n",
            crumbs.join(" / ")
        )
    }

    fn prev_next(&self, id: NodeId) -> String {
        let (prev, next) = self.tree.prev_next(id);
        if prev.is_none() && next.is_none() {
            return String::new();
        }
        let link = |target: Option<NodeId>, rel: &str| {
            target
                .map(|t| {
                    let node = self.tree.node(t);
                    format!(
                        "<a rel=\"{}\" href=\"{}\">{}</a>",
                        rel,
                        escape_html(&self.href(&node.url)),
                        escape_html(&node.name)
                    )
                })
                .unwrap_or_default()
        };
        format!(
            "<nav class=\"prev-next\">{}{}</nav>\n",
            link(prev, "prev"),
            link(next, "next")
        )
    }

    fn wrap(&self, title: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{} | {}</title>\n</head>\n<body>\n\
             <header><a href=\"{}\">{}</a></header>\n<main>\n{}</main>\n</body>\n</html>\n",
            escape_html(title),
            escape_html(&self.site_title),
            escape_html(&self.href("/")),
            escape_html(&self.site_title),
            body
        )
    }
}

/// `<output>/<url segments>/index.html`
fn page_path(output_dir: &Path, url: &str) -> PathBuf {
    let mut path = output_dir.to_path_buf();
    for segment in url.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.join("index.html")
}

fn write_page(output_dir: &Path, url: &str, html: &str) -> Result<()> {
    let path = page_path(output_dir, url);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {} -> {}", url, path.display());
    Ok(())
}

fn copy_attachments(tree: &SiteTree, output_dir: &Path) -> Result<()> {
    for attachment in tree.attachments() {
        let src = tree.root_dir().join(&attachment.source);
        let dest = output_dir.join(attachment.url.trim_start_matches('/'));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(&src, &dest)
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path() {
        let out = Path::new("/out");
        assert_eq!(page_path(out, "/"), Path::new("/out/index.html"));
        assert_eq!(
            page_path(out, "/guides/setup/"),
            Path::new("/out/guides/setup/index.html")
        );
    }
}
