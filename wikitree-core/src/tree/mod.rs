//! Site tree resolution.
//!
//! One walk of the content root produces an arena of folders and documents
//! with resolved URLs, navigation order and folder pages, plus the set of
//! URLs the build will produce.
//!
//! # Folder pages
//!
//! A folder resolves to, in order:
//! 1. an `index` or `readme` document inside it,
//! 2. a sibling document sharing the folder's slug,
//! 3. a generated listing page.
//!
//! Adopted documents are hidden from navigation and served at the folder URL.

mod node;
mod scan;
mod urls;

pub use node::{Attachment, ListingEntry, NodeId, OrderingKey, SiteNode};
pub use scan::first_heading;
pub use urls::ValidUrlSet;

use crate::markdown::DocumentContext;
use crate::slug::{is_index_slug, url_segment};
use regex::Regex;
use scan::{ScannedDir, ScannedDoc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Cannot read content root {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Settings for the walk.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Matched against paths relative to the content root
    pub ignore_patterns: Vec<Regex>,
}

impl TreeOptions {
    /// Compile ignore patterns, skipping invalid ones with a warning.
    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut ignore_patterns = Vec::new();
        for pat in patterns {
            match Regex::new(pat.as_ref()) {
                Ok(re) => ignore_patterns.push(re),
                Err(err) => tracing::warn!("Invalid ignore pattern '{}': {}", pat.as_ref(), err),
            }
        }
        Self { ignore_patterns }
    }

    pub fn is_ignored(&self, rel: &str) -> bool {
        self.ignore_patterns.iter().any(|re| re.is_match(rel))
    }
}

/// The resolved site.
#[derive(Debug, Clone)]
pub struct SiteTree {
    root_dir: PathBuf,
    nodes: Vec<SiteNode>,
    by_url: HashMap<String, NodeId>,
    /// Folder nodes by source directory
    folders: HashMap<PathBuf, NodeId>,
    valid_urls: ValidUrlSet,
    attachments: Vec<Attachment>,
    drafts: Vec<PathBuf>,
}

impl SiteTree {
    /// Walk `root` and resolve every document and folder.
    pub fn build(root: impl AsRef<Path>, options: &TreeOptions) -> Result<Self, TreeError> {
        let root = root.as_ref();
        let scanned = scan::scan(root, options)?;

        let mut tree = Self {
            root_dir: root.to_path_buf(),
            nodes: Vec::new(),
            by_url: HashMap::new(),
            folders: HashMap::new(),
            valid_urls: ValidUrlSet::new(),
            attachments: Vec::new(),
            drafts: scanned.drafts,
        };

        match scanned.root {
            Some(dir) => {
                tree.insert_folder(dir, None, String::new(), Vec::new(), None);
            }
            None => {
                tracing::warn!("No documents found in {}", root.display());
                tree.insert_empty_root();
            }
        }
        tree.index_urls();
        tree.attachments = scanned
            .attachments
            .into_iter()
            .map(|(source, segment)| {
                let dir = source.parent().unwrap_or(Path::new(""));
                let mut url = folder_url(&tree.folder_segments(dir));
                url.push_str(&segment);
                Attachment { source, url }
            })
            .collect();

        tracing::info!(
            "Resolved {} documents and {} folders ({} drafts skipped)",
            tree.documents().len(),
            tree.nodes.iter().filter(|n| n.is_folder).count(),
            tree.drafts.len()
        );
        Ok(tree)
    }

    /// Content root the tree was built from.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SiteNode {
        &self.nodes[id.0]
    }

    pub fn url(&self, id: NodeId) -> &str {
        &self.nodes[id.0].url
    }

    /// Visible children in navigation order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn valid_urls(&self) -> &ValidUrlSet {
        &self.valid_urls
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Source paths skipped as drafts.
    pub fn drafts(&self) -> &[PathBuf] {
        &self.drafts
    }

    /// Visible node serving `url`; folders win over their adopted documents.
    pub fn find_by_url(&self, url: &str) -> Option<NodeId> {
        let trimmed = url.trim_end_matches('/');
        self.by_url
            .get(url)
            .or_else(|| self.by_url.get(&format!("{trimmed}/")))
            .or_else(|| self.by_url.get(trimmed))
            .copied()
    }

    /// Every published document, adopted ones included, in tree order.
    pub fn documents(&self) -> Vec<NodeId> {
        self.ids().filter(|&id| self.node(id).is_document()).collect()
    }

    /// Folders that get a generated listing page.
    pub fn auto_index_folders(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.node(id).needs_auto_index)
            .collect()
    }

    /// Resolution context for a document's cross-references.
    ///
    /// Relative targets resolve against the folder the file physically lives
    /// in, so a sibling-adopted document keeps its parent folder's context.
    pub fn document_context(&self, id: NodeId) -> DocumentContext {
        let source = &self.node(id).source;
        let dir = source.parent().unwrap_or(Path::new(""));
        DocumentContext::new(source.clone(), self.folder_segments(dir))
    }

    /// URL segments of a source directory as served, collision suffixes
    /// included. Directories outside the tree (no documents) extend their
    /// nearest resolved ancestor by name.
    fn folder_segments(&self, dir: &Path) -> Vec<String> {
        let mut unresolved = Vec::new();
        let mut current = Some(dir);
        while let Some(path) = current {
            if let Some(&folder) = self.folders.get(path) {
                let mut segments = self.node(folder).path_segments.clone();
                segments.extend(unresolved.into_iter().rev());
                return segments;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                unresolved.push(url_segment(name));
            }
            current = path.parent();
        }
        unresolved.reverse();
        unresolved
    }

    /// Path from the root down to `id`, both included.
    pub fn breadcrumbs(&self, id: NodeId) -> Vec<NodeId> {
        let mut trail = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            trail.push(parent);
            current = self.node(parent).parent;
        }
        trail.reverse();
        trail
    }

    /// Neighbouring pages in depth-first navigation order.
    ///
    /// A folder stands for its adopted document; folders without one have
    /// no neighbours.
    pub fn prev_next(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let target = self.node(id).adopted.unwrap_or(id);
        let order = self.navigation_order();
        match order.iter().position(|&page| page == target) {
            Some(pos) => (
                pos.checked_sub(1).map(|prev| order[prev]),
                order.get(pos + 1).copied(),
            ),
            None => (None, None),
        }
    }

    /// Documents in the order a reader walks the navigation.
    pub fn navigation_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.collect_pages(self.root(), &mut order);
        order
    }

    fn collect_pages(&self, folder: NodeId, order: &mut Vec<NodeId>) {
        if let Some(adopted) = self.node(folder).adopted {
            order.push(adopted);
        }
        for &child in self.children(folder) {
            if self.node(child).is_folder {
                self.collect_pages(child, order);
            } else {
                order.push(child);
            }
        }
    }

    /// Entries of a folder's generated listing: folders first, then
    /// case-insensitive alphabetical by name.
    pub fn listing(&self, folder: NodeId) -> Vec<ListingEntry> {
        let mut entries: Vec<ListingEntry> = self
            .children(folder)
            .iter()
            .map(|&id| {
                let node = self.node(id);
                ListingEntry {
                    node: id,
                    name: node.name.clone(),
                    url: node.url.clone(),
                    is_folder: node.is_folder,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.is_folder
                .cmp(&a.is_folder)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.url.cmp(&b.url))
        });
        entries
    }

    fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    fn push(&mut self, node: SiteNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn insert_empty_root(&mut self) {
        let root = empty_folder_node(String::from("Home"), PathBuf::new(), None);
        self.push(root);
        self.nodes[0].needs_auto_index = true;
    }

    /// Insert a folder and its subtree. `sibling_page` is a document from
    /// the parent folder that shares this folder's slug.
    fn insert_folder(
        &mut self,
        dir: ScannedDir,
        parent: Option<NodeId>,
        slug: String,
        segments: Vec<String>,
        sibling_page: Option<ScannedDoc>,
    ) -> NodeId {
        let url = folder_url(&segments);
        let mut node = empty_folder_node(dir.meta.display_name.clone(), dir.rel.clone(), parent);
        node.url = url.clone();
        node.slug = slug.clone();
        node.path_segments = segments.clone();
        node.ordering = OrderingKey {
            date: dir.meta.date,
            number: dir.meta.number,
            slug,
        };
        let folder = self.push(node);

        let ScannedDir {
            docs, dirs: subdirs, ..
        } = dir;

        let (index_doc, mut docs) = take_index_document(docs);
        let page = index_doc.or(sibling_page);

        match page {
            Some(doc) => {
                tracing::debug!("{} serves folder page {}", doc.rel.display(), url);
                let adopted = self.push(document_node(
                    doc,
                    Some(folder),
                    segments.clone(),
                    url.clone(),
                    true,
                ));
                let node = &mut self.nodes[folder.0];
                node.adopted = Some(adopted);
                node.clickable_target = Some(url);
            }
            None => {
                self.nodes[folder.0].needs_auto_index = true;
            }
        }

        // Sibling adoption: a document named like a subfolder without its
        // own index becomes that folder's page.
        let mut entries: Vec<Entry> = Vec::new();
        for sub in subdirs {
            let adopt = if has_index_document(&sub) {
                None
            } else {
                docs.iter()
                    .position(|doc| doc.meta.slug == sub.meta.slug)
                    .map(|pos| docs.remove(pos))
            };
            entries.push(Entry::Folder(sub, adopt));
        }
        entries.extend(docs.into_iter().map(Entry::Document));

        entries.sort_by(|a, b| a.key().cmp(&b.key()).then_with(|| a.rel().cmp(b.rel())));

        let mut slugs = SlugAllocator::default();
        for entry in entries {
            let base = entry.key().slug;
            let slug = slugs.allocate(&base);
            if slug != base {
                tracing::warn!(
                    "Slug collision in {}: {} is served as {}",
                    folder_url(&segments),
                    entry.rel().display(),
                    slug
                );
            }

            let mut child_segments = segments.clone();
            child_segments.push(slug.clone());
            let child = match entry {
                Entry::Folder(sub, adopt) => {
                    self.insert_folder(sub, Some(folder), slug, child_segments, adopt)
                }
                Entry::Document(mut doc) => {
                    doc.meta.slug = slug;
                    let url = folder_url(&child_segments);
                    self.push(document_node(doc, Some(folder), child_segments, url, false))
                }
            };
            self.nodes[folder.0].children.push(child);
        }

        folder
    }

    fn index_urls(&mut self) {
        let mut by_url = HashMap::new();
        let mut folders = HashMap::new();
        let mut valid = ValidUrlSet::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.is_folder {
                folders.insert(node.source.clone(), NodeId(idx));
            }
            if node.is_hidden {
                continue;
            }
            by_url.insert(node.url.clone(), NodeId(idx));
            valid.insert(&node.url);
        }
        self.by_url = by_url;
        self.folders = folders;
        self.valid_urls = valid;
    }
}

enum Entry {
    Folder(ScannedDir, Option<ScannedDoc>),
    Document(ScannedDoc),
}

impl Entry {
    fn key(&self) -> OrderingKey {
        let meta = match self {
            Entry::Folder(dir, _) => &dir.meta,
            Entry::Document(doc) => &doc.meta,
        };
        OrderingKey {
            date: meta.date,
            number: meta.number,
            slug: meta.slug.clone(),
        }
    }

    fn rel(&self) -> &Path {
        match self {
            Entry::Folder(dir, _) => &dir.rel,
            Entry::Document(doc) => &doc.rel,
        }
    }
}

/// Hands out unique sibling slugs: `setup`, `setup-1`, `setup-2`.
#[derive(Debug, Default)]
struct SlugAllocator {
    used: HashSet<String>,
}

impl SlugAllocator {
    fn allocate(&mut self, base: &str) -> String {
        let mut slug = base.to_string();
        let mut n = 0;
        while self.used.contains(&slug) {
            n += 1;
            slug = format!("{base}-{n}");
        }
        self.used.insert(slug.clone());
        slug
    }
}

fn has_index_document(dir: &ScannedDir) -> bool {
    dir.docs.iter().any(|doc| is_index_slug(&doc.meta.slug))
}

/// Split off the folder's own page: `index` wins over `readme`, then the
/// first by file name.
fn take_index_document(mut docs: Vec<ScannedDoc>) -> (Option<ScannedDoc>, Vec<ScannedDoc>) {
    let pick = docs
        .iter()
        .position(|doc| doc.meta.slug == "index")
        .or_else(|| docs.iter().position(|doc| doc.meta.slug == "readme"));
    let page = pick.map(|pos| docs.remove(pos));
    (page, docs)
}

fn folder_url(segments: &[String]) -> String {
    if segments.is_empty() {
        String::from("/")
    } else {
        format!("/{}/", segments.join("/"))
    }
}

fn empty_folder_node(name: String, source: PathBuf, parent: Option<NodeId>) -> SiteNode {
    SiteNode {
        name,
        path_segments: Vec::new(),
        slug: String::new(),
        is_folder: true,
        source,
        ordering: OrderingKey {
            date: crate::slug::date_from_mtime(std::time::SystemTime::UNIX_EPOCH),
            number: None,
            slug: String::new(),
        },
        is_hidden: false,
        clickable_target: None,
        adopted: None,
        needs_auto_index: false,
        children: Vec::new(),
        parent,
        url: String::from("/"),
    }
}

fn document_node(
    doc: ScannedDoc,
    parent: Option<NodeId>,
    path_segments: Vec<String>,
    url: String,
    is_hidden: bool,
) -> SiteNode {
    SiteNode {
        name: doc.title,
        path_segments,
        slug: doc.meta.slug.clone(),
        is_folder: false,
        source: doc.rel,
        ordering: OrderingKey {
            date: doc.meta.date,
            number: doc.meta.number,
            slug: doc.meta.slug,
        },
        is_hidden,
        clickable_target: None,
        adopted: None,
        needs_auto_index: false,
        children: Vec::new(),
        parent,
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn build(files: &[(&str, &str)]) -> (TempDir, SiteTree) {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            write(dir.path(), rel, content);
        }
        let tree = SiteTree::build(dir.path(), &TreeOptions::default()).unwrap();
        (dir, tree)
    }

    fn urls(tree: &SiteTree) -> Vec<&str> {
        tree.valid_urls().iter().collect()
    }

    #[test]
    fn test_basic_urls() {
        let (_dir, tree) = build(&[
            ("index.md", "# Home\n"),
            ("01-intro.md", "# Intro\n"),
            ("guides/setup.md", "Setup text\n"),
        ]);
        assert_eq!(urls(&tree), vec!["/", "/guides/", "/guides/setup/", "/intro/"]);
        assert_eq!(tree.url(tree.root()), "/");
    }

    #[test]
    fn test_index_adoption_hides_document() {
        let (_dir, tree) = build(&[
            ("guides/index.md", "# Guides\n"),
            ("guides/README.md", "# Readme\n"),
            ("guides/setup.md", "x"),
        ]);
        let folder = tree.find_by_url("/guides/").unwrap();
        let node = tree.node(folder);
        assert!(node.is_folder);
        assert!(!node.needs_auto_index);
        assert_eq!(node.clickable_target.as_deref(), Some("/guides/"));

        let adopted = tree.node(node.adopted.unwrap());
        assert!(adopted.is_hidden);
        assert_eq!(adopted.url, "/guides/");
        assert_eq!(adopted.source, PathBuf::from("guides/index.md"));
        assert!(tree.valid_urls().contains("/guides/readme/"));
    }

    #[test]
    fn test_sibling_adoption() {
        let (_dir, tree) = build(&[("Guides.md", "# All guides\n"), ("guides/setup.md", "x")]);
        let folder = tree.find_by_url("/guides/").unwrap();
        let adopted = tree.node(tree.node(folder).adopted.unwrap());
        assert_eq!(adopted.source, PathBuf::from("Guides.md"));
        assert_eq!(adopted.name, "All guides");
        assert!(adopted.is_hidden);
        assert_eq!(urls(&tree), vec!["/", "/guides/", "/guides/setup/"]);
        assert!(tree.node(tree.root()).needs_auto_index);
    }

    #[test]
    fn test_auto_index_and_listing_order() {
        let (_dir, tree) = build(&[
            ("notes/zebra.md", "# zebra\n"),
            ("notes/Apple.md", "# Apple\n"),
            ("notes/sub/x.md", "# X\n"),
        ]);
        let notes = tree.find_by_url("/notes/").unwrap();
        assert!(tree.node(notes).needs_auto_index);
        assert!(tree.auto_index_folders().contains(&notes));

        let names: Vec<String> = tree.listing(notes).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Sub", "Apple", "zebra"]);
    }

    #[test]
    fn test_drafts_are_excluded() {
        let (_dir, tree) = build(&[
            ("index.md", "# Home\n"),
            ("_secret.md", "# Secret\n"),
            ("wip.md", "---\ndraft: true\n---\n# WIP\n"),
            ("_private/page.md", "# Private\n"),
        ]);
        assert_eq!(urls(&tree), vec!["/"]);
        assert_eq!(tree.drafts().len(), 3);
        assert_eq!(tree.documents().len(), 1);
    }

    #[test]
    fn test_folders_without_documents_are_skipped() {
        let (_dir, tree) = build(&[
            ("index.md", "# Home\n"),
            ("assets/logo.png", "png"),
            ("empty/_draft.md", "x"),
            (".hidden/page.md", "# Hidden\n"),
        ]);
        assert_eq!(urls(&tree), vec!["/"]);
        assert_eq!(tree.attachments().len(), 1);
        assert_eq!(tree.attachments()[0].url, "/assets/logo.png");
    }

    #[test]
    fn test_slug_collisions_are_disambiguated() {
        let (_dir, tree) = build(&[
            ("index.md", "# Home\n"),
            ("01-setup.md", "# A\n"),
            ("02-Setup.markdown", "# B\n"),
            ("03_setup.md", "# C\n"),
        ]);
        let names: Vec<(&str, &str)> = tree
            .children(tree.root())
            .iter()
            .map(|&id| (tree.node(id).name.as_str(), tree.url(id)))
            .collect();
        assert_eq!(
            names,
            vec![("A", "/setup/"), ("B", "/setup-1/"), ("C", "/setup-2/")]
        );
    }

    #[test]
    fn test_titles() {
        let (_dir, tree) = build(&[
            ("a.md", "---\ntitle: From Front Matter\n---\n# Heading\n"),
            ("b.md", "Text\n\n# From *Heading*\n"),
            ("getting-started.md", "no heading\n"),
            ("bad.md", "---\ntitle: [unclosed\n---\n# Recovered\n"),
        ]);
        let name = |url: &str| tree.node(tree.find_by_url(url).unwrap()).name.clone();
        assert_eq!(name("/a/"), "From Front Matter");
        assert_eq!(name("/b/"), "From Heading");
        assert_eq!(name("/getting-started/"), "Getting Started");
        assert_eq!(name("/bad/"), "Recovered");
    }

    #[test]
    fn test_navigation_order_by_date_then_number() {
        let (_dir, tree) = build(&[
            ("2023-01-01-old.md", "# Old\n"),
            ("2024-06-01-new.md", "# New\n"),
            ("x.md", "---\ndate: 2020-01-01\n---\n# X\n"),
        ]);
        let order: Vec<&str> = tree
            .children(tree.root())
            .iter()
            .map(|&id| tree.url(id))
            .collect();
        assert_eq!(order, vec!["/new/", "/old/", "/x/"]);
    }

    #[test]
    fn test_breadcrumbs_and_prev_next() {
        let (_dir, tree) = build(&[
            ("index.md", "# Home\n"),
            ("guides/index.md", "# Guides\n"),
            ("guides/01-a.md", "# A\n"),
            ("guides/02-b.md", "# B\n"),
        ]);
        let a = tree.find_by_url("/guides/a/").unwrap();
        let b = tree.find_by_url("/guides/b/").unwrap();
        let guides = tree.find_by_url("/guides/").unwrap();

        let crumbs: Vec<&str> = tree.breadcrumbs(b).iter().map(|&id| tree.url(id)).collect();
        assert_eq!(crumbs, vec!["/", "/guides/", "/guides/b/"]);

        let (prev, next) = tree.prev_next(a);
        assert_eq!(prev, tree.node(guides).adopted);
        assert_eq!(next, Some(b));
        assert_eq!(tree.prev_next(b).1, None);
    }

    #[test]
    fn test_document_context() {
        let (_dir, tree) = build(&[("01-Guides/intro.md", "# Intro\n")]);
        let intro = tree.find_by_url("/guides/intro/").unwrap();
        let ctx = tree.document_context(intro);
        assert_eq!(ctx.folder, vec!["guides".to_string()]);
        assert_eq!(ctx.source, PathBuf::from("01-Guides/intro.md"));
    }

    #[test]
    fn test_colliding_folders_keep_their_own_urls() {
        let (_dir, tree) = build(&[
            ("index.md", "# Home\n"),
            ("01-notes/a.md", "# A\n"),
            ("01-notes/pic.png", "one"),
            ("02-Notes/b.md", "# B\n"),
            ("02-Notes/c.md", "# C\n"),
            ("02-Notes/pic.png", "two"),
            ("02-Notes/img/deep.png", "three"),
        ]);
        assert!(urls(&tree).contains(&"/notes-1/c/"));

        let b = tree.find_by_url("/notes-1/b/").unwrap();
        assert_eq!(tree.document_context(b).folder, vec!["notes-1".to_string()]);

        let attachments: Vec<(&Path, &str)> = tree
            .attachments()
            .iter()
            .map(|a| (a.source.as_path(), a.url.as_str()))
            .collect();
        assert_eq!(
            attachments,
            vec![
                (Path::new("01-notes/pic.png"), "/notes/pic.png"),
                (Path::new("02-Notes/img/deep.png"), "/notes-1/img/deep.png"),
                (Path::new("02-Notes/pic.png"), "/notes-1/pic.png"),
            ]
        );
    }

    #[test]
    fn test_sibling_adopted_context_is_its_physical_folder() {
        let (_dir, tree) = build(&[
            ("Guides.md", "# Guides\n"),
            ("guides/setup.md", "# Setup\n"),
        ]);
        let guides = tree.find_by_url("/guides/").unwrap();
        let page = tree.node(guides).adopted.unwrap();
        assert!(tree.document_context(page).folder.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_document_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.md", "# Home\n");
        std::os::unix::fs::symlink(dir.path().join("gone.md"), dir.path().join("broken.md"))
            .unwrap();

        match SiteTree::build(dir.path(), &TreeOptions::default()) {
            Err(TreeError::Read { path, .. }) => assert!(path.ends_with("broken.md")),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.md", "# Home\n");
        write(dir.path(), "node_modules/pkg/readme.md", "# Pkg\n");
        write(dir.path(), "notes/tmp.md", "# Tmp\n");
        let options = TreeOptions::with_patterns(&["^node_modules", r"tmp\.md$", "(invalid"]);
        let tree = SiteTree::build(dir.path(), &options).unwrap();
        assert_eq!(urls(&tree), vec!["/"]);
    }

    #[test]
    fn test_empty_and_missing_roots() {
        let (_dir, tree) = build(&[("notes.txt", "x")]);
        assert_eq!(urls(&tree), vec!["/"]);
        assert!(tree.documents().is_empty());
        assert!(tree.node(tree.root()).needs_auto_index);

        let missing = SiteTree::build("/definitely/not/here", &TreeOptions::default());
        assert!(matches!(missing, Err(TreeError::RootUnreadable { .. })));
    }
}
