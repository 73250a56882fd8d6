//! Filesystem walk and per-entry metadata.

use super::{TreeError, TreeOptions};
use crate::frontmatter::{parse_frontmatter, strip_frontmatter};
use crate::markdown::preprocess::Fences;
use crate::slug::{
    attachment_segment, date_from_mtime, extract_metadata, is_document_name, EntryMetadata,
};
use chrono::NaiveDate;
use pulldown_cmark::{Event, Parser};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A file or folder seen during the walk.
#[derive(Debug, Clone)]
struct RawEntry {
    rel: PathBuf,
    file_name: String,
    is_dir: bool,
    mtime: NaiveDate,
}

/// A Markdown document with the metadata the tree needs.
#[derive(Debug, Clone)]
pub(crate) struct ScannedDoc {
    pub rel: PathBuf,
    pub meta: EntryMetadata,
    pub title: String,
}

/// A folder holding at least one publishable document at some depth.
#[derive(Debug, Clone)]
pub(crate) struct ScannedDir {
    pub rel: PathBuf,
    pub meta: EntryMetadata,
    pub docs: Vec<ScannedDoc>,
    pub dirs: Vec<ScannedDir>,
}

/// Everything one walk of the content root yields.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    pub root: Option<ScannedDir>,
    /// Attachment paths with their final URL segment
    pub attachments: Vec<(PathBuf, String)>,
    pub drafts: Vec<PathBuf>,
}

pub(crate) fn scan(root: &Path, options: &TreeOptions) -> Result<Scan, TreeError> {
    fs::read_dir(root).map_err(|source| TreeError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut by_parent: HashMap<PathBuf, Vec<RawEntry>> = HashMap::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            keep_entry(rel, options)
        });

    for entry in walker {
        let entry = entry.map_err(|source| TreeError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;

        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("Skipping non UTF-8 path {}", entry.path().display());
            continue;
        };
        let metadata = entry.metadata().map_err(|source| TreeError::Walk {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let mtime = date_from_mtime(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH));
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let parent = rel.parent().map(Path::to_path_buf).unwrap_or_default();

        by_parent.entry(parent).or_default().push(RawEntry {
            rel,
            file_name,
            is_dir: entry.file_type().is_dir(),
            mtime,
        });
    }

    let mut walk = Walk {
        root,
        by_parent,
        scan: Scan::default(),
    };
    let root_meta = EntryMetadata {
        date: date_from_mtime(SystemTime::UNIX_EPOCH),
        has_date_prefix: false,
        number: None,
        slug: String::new(),
        display_name: String::from("Home"),
        is_draft: false,
    };
    walk.scan.root = walk.scan_dir(PathBuf::new(), root_meta)?;
    Ok(walk.scan)
}

fn keep_entry(rel: &Path, options: &TreeOptions) -> bool {
    let hidden = rel
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false);
    if hidden {
        return false;
    }

    let rel_str = rel.to_string_lossy().replace('\\', "/");
    if options.is_ignored(&rel_str) {
        tracing::debug!("Ignoring {} due to ignore_patterns", rel_str);
        return false;
    }
    true
}

struct Walk<'a> {
    root: &'a Path,
    by_parent: HashMap<PathBuf, Vec<RawEntry>>,
    scan: Scan,
}

impl Walk<'_> {
    /// Scan one folder; `None` when nothing publishable lives beneath it.
    fn scan_dir(
        &mut self,
        rel: PathBuf,
        meta: EntryMetadata,
    ) -> Result<Option<ScannedDir>, TreeError> {
        let entries = self.by_parent.remove(&rel).unwrap_or_default();
        let mut docs = Vec::new();
        let mut dirs = Vec::new();

        for entry in entries {
            let meta = extract_metadata(&entry.file_name, entry.mtime);
            if entry.is_dir {
                if meta.is_draft {
                    tracing::debug!("Skipping draft folder {}", entry.rel.display());
                    self.scan.drafts.push(entry.rel);
                    continue;
                }
                if let Some(dir) = self.scan_dir(entry.rel, meta)? {
                    dirs.push(dir);
                }
            } else if is_document_name(&entry.file_name) {
                if let Some(doc) = self.scan_doc(&entry, meta)? {
                    docs.push(doc);
                }
            } else if let Some(segment) = attachment_segment(&entry.file_name) {
                self.scan.attachments.push((entry.rel, segment));
            } else {
                tracing::debug!("Skipping unrecognized file {}", entry.rel.display());
            }
        }

        if docs.is_empty() && dirs.is_empty() {
            if !rel.as_os_str().is_empty() {
                tracing::debug!("Skipping folder without documents: {}", rel.display());
            }
            return Ok(None);
        }

        Ok(Some(ScannedDir {
            rel,
            meta,
            docs,
            dirs,
        }))
    }

    fn scan_doc(
        &mut self,
        entry: &RawEntry,
        mut meta: EntryMetadata,
    ) -> Result<Option<ScannedDoc>, TreeError> {
        let path = self.root.join(&entry.rel);
        let bytes = fs::read(&path).map_err(|source| TreeError::Read {
            path: path.clone(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);

        let (frontmatter, body) = match parse_frontmatter(&content) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(
                    "Ignoring malformed front matter in {}: {}",
                    entry.rel.display(),
                    err
                );
                (Default::default(), strip_frontmatter(&content))
            }
        };

        if meta.is_draft || frontmatter.draft {
            tracing::debug!("Skipping draft {}", entry.rel.display());
            self.scan.drafts.push(entry.rel.clone());
            return Ok(None);
        }

        if !meta.has_date_prefix {
            if let Some(date) = frontmatter
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            {
                meta.date = date;
            }
        }

        let title = frontmatter
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| first_heading(body))
            .unwrap_or_else(|| meta.display_name.clone());

        Ok(Some(ScannedDoc {
            rel: entry.rel.clone(),
            meta,
            title,
        }))
    }
}

/// Text of the first level-one ATX heading outside fenced code.
pub fn first_heading(body: &str) -> Option<String> {
    let mut fences = Fences::default();

    for line in body.lines() {
        if fences.consume(line) {
            continue;
        }
        let Some(rest) = line.strip_prefix('#') else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
            continue;
        }

        let text = heading_text(line);
        if !text.is_empty() {
            return Some(text);
        }
    }

    None
}

/// Plain text of a heading line, inline markup removed.
fn heading_text(line: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(line.trim()) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}
