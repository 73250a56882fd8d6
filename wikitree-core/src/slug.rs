//! Slug generation and filename metadata extraction.
//!
//! Every URL segment in the site goes through this module, so the tree
//! builder and the cross-reference resolver always agree on what a name
//! resolves to.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::SystemTime;

/// File extensions linked to as-is instead of as pages.
pub const ATTACHMENT_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "ico", "bmp", "pdf", "zip", "gz", "tar",
    "mp3", "mp4", "webm", "ogg", "wav", "csv", "json", "txt",
];

/// Extensions recognized as Markdown documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown"];

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-").expect("valid date prefix regex"));

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Whitespace and underscore runs become a single hyphen
/// - Anything outside `[a-z0-9-]` is dropped
/// - Repeated hyphens collapse, edge hyphens are trimmed
///
/// The result may be empty; use [`slug`] when a segment is required.
///
/// # Examples
///
/// ```
/// use wikitree_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// assert_eq!(slugify("C++ Programming"), "c-programming");
/// ```
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        }
    }

    out
}

/// Slug that is never empty.
///
/// Falls back to a deterministic `untitled-xxxxxxxx` placeholder derived from
/// the input when nothing URL-safe survives slugification.
pub fn slug(input: &str) -> String {
    let slug = slugify(input);
    if slug.is_empty() {
        placeholder_slug(input)
    } else {
        slug
    }
}

fn placeholder_slug(input: &str) -> String {
    let hash = blake3::hash(input.as_bytes()).to_hex();
    format!("untitled-{}", &hash[..8])
}

/// Metadata encoded in a file or folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Date from a `YYYY-MM-DD-` prefix, or the modification date
    pub date: NaiveDate,
    /// Explicit date prefix was present
    pub has_date_prefix: bool,
    /// Ordering number from a `NN-` style prefix
    pub number: Option<u32>,
    /// URL segment
    pub slug: String,
    /// Fallback display label
    pub display_name: String,
    /// Leading `_` marker
    pub is_draft: bool,
}

/// Extract ordering and URL metadata from a file or folder name.
///
/// ```
/// use chrono::NaiveDate;
/// use wikitree_core::slug::extract_metadata;
///
/// let mtime = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let meta = extract_metadata("2024-01-15-hello.md", mtime);
/// assert_eq!(meta.slug, "hello");
/// assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// ```
pub fn extract_metadata(filename: &str, mtime: NaiveDate) -> EntryMetadata {
    let parsed = parse_name(filename);
    EntryMetadata {
        date: parsed.date.unwrap_or(mtime),
        has_date_prefix: parsed.date.is_some(),
        number: parsed.number,
        slug: slug(parsed.remainder),
        display_name: display_name(parsed.remainder),
        is_draft: parsed.is_draft,
    }
}

/// URL segment a file or folder name resolves to.
pub fn url_segment(name: &str) -> String {
    slug(parse_name(name).remainder)
}

/// Day-precision date for a filesystem timestamp.
pub fn date_from_mtime(mtime: SystemTime) -> NaiveDate {
    DateTime::<Utc>::from(mtime).date_naive()
}

/// `index` and `readme` collapse into their folder URL.
pub fn is_index_slug(slug: &str) -> bool {
    slug == "index" || slug == "readme"
}

/// Recognized attachment extension of a name, as written.
pub fn attachment_extension(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    ATTACHMENT_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
        .then_some(ext)
}

/// URL segment of an attachment: slugified stem, extension kept as written.
///
/// Returns `None` for names without a recognized attachment extension.
pub fn attachment_segment(name: &str) -> Option<String> {
    let ext = attachment_extension(name)?;
    let stem = &name[..name.len() - ext.len() - 1];
    Some(format!("{}.{}", slug(stem), ext))
}

/// True for `.md` / `.markdown` names.
pub fn is_document_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty()
                && DOCUMENT_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Strip a Markdown extension if present.
pub fn strip_document_extension(name: &str) -> &str {
    if is_document_name(name) {
        name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
    } else {
        name
    }
}

struct ParsedName<'a> {
    is_draft: bool,
    date: Option<NaiveDate>,
    number: Option<u32>,
    remainder: &'a str,
}

fn parse_name(filename: &str) -> ParsedName<'_> {
    let mut rest = strip_document_extension(filename.trim());

    let is_draft = rest.starts_with('_');
    if is_draft {
        rest = &rest[1..];
    }

    let mut date = None;
    if let Some(caps) = DATE_PREFIX.captures(rest) {
        let parsed = (
            caps[1].parse::<i32>(),
            caps[2].parse::<u32>(),
            caps[3].parse::<u32>(),
        );
        if let (Ok(y), Ok(m), Ok(d)) = parsed {
            if let Some(valid) = NaiveDate::from_ymd_opt(y, m, d) {
                let consumed = caps.get(0).map(|m| m.end()).unwrap_or(0);
                if !rest[consumed..].trim().is_empty() {
                    date = Some(valid);
                    rest = &rest[consumed..];
                }
            }
        }
    }

    let mut number = None;
    if let Some((value, consumed)) = number_prefix(rest) {
        number = Some(value);
        rest = &rest[consumed..];
    }

    ParsedName {
        is_draft,
        date,
        number,
        remainder: rest.trim(),
    }
}

/// Leading `NN-`, `NN_` or `NN. ` ordering prefix.
///
/// A bare four-digit run is a year and is left in place.
fn number_prefix(name: &str) -> Option<(u32, usize)> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits == 4 {
        return None;
    }

    let after = &name[digits..];
    let separator = if after.starts_with('-') || after.starts_with('_') {
        1
    } else if after.starts_with(". ") {
        2
    } else {
        return None;
    };

    let consumed = digits + separator;
    if name[consumed..].trim().is_empty() {
        return None;
    }

    let value = name[..digits].parse::<u32>().ok()?;
    Some((value, consumed))
}

/// Word-split and capitalize a name: `getting-started` → `Getting Started`.
pub fn display_name(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
