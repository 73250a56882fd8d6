//! Nodes of the site tree.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Navigation order among siblings.
///
/// Newest date first, then ascending number with unnumbered entries after
/// numbered ones, then slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingKey {
    pub date: NaiveDate,
    pub number: Option<u32>,
    pub slug: String,
}

impl Ord for OrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| match (self.number, other.number) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.slug.cmp(&other.slug))
    }
}

impl PartialOrd for OrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One document or folder.
#[derive(Debug, Clone, Serialize)]
pub struct SiteNode {
    /// Display label
    pub name: String,
    /// URL segments from the root; empty for the root folder
    pub path_segments: Vec<String>,
    pub slug: String,
    pub is_folder: bool,
    /// Source path relative to the content root
    pub source: PathBuf,
    pub ordering: OrderingKey,
    /// Served at its folder's URL and left out of navigation
    pub is_hidden: bool,
    /// URL a folder resolves to through an adopted document
    pub clickable_target: Option<String>,
    /// Document adopted as this folder's page
    pub adopted: Option<NodeId>,
    /// Folder gets a generated listing page
    pub needs_auto_index: bool,
    /// Visible children in navigation order
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub url: String,
}

impl SiteNode {
    pub fn is_document(&self) -> bool {
        !self.is_folder
    }
}

/// A non-Markdown file copied to the output as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Source path relative to the content root
    pub source: PathBuf,
    pub url: String,
}

/// One entry of a generated folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub node: NodeId,
    pub name: String,
    pub url: String,
    pub is_folder: bool,
}
