//! End-to-end tests: content folder in, rendered pages and link reports out.

use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use wikitree_core::{Config, SiteBuilder, SiteTree, TreeOptions};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project(config: &str, files: &[(&str, &str)]) -> (TempDir, Config) {
    let dir = tempdir().unwrap();
    for (rel, content) in files {
        write(&dir.path().join("docs"), rel, content);
    }
    let config_path = dir.path().join("wikitree.yml");
    fs::write(&config_path, config).unwrap();
    let config = Config::from_file(&config_path).unwrap();
    (dir, config)
}

#[test]
fn test_only_the_unresolved_crossref_is_reported() {
    let (_dir, config) = project(
        "",
        &[
            ("index.md", "# Home\n"),
            ("guides/index.md", "# Guides\n"),
            (
                "guides/setup.md",
                "# Setup\n\nStart with [[intro]].\n\nThen read [[../other]].\n",
            ),
            ("other.md", "# Other\n"),
        ],
    );

    let build = SiteBuilder::new(config).build().unwrap();
    assert_eq!(build.reports.len(), 1);

    let report = &build.reports[0];
    assert_eq!(report.link_url, "/guides/intro/");
    assert_eq!(report.syntax, "[[intro]]");
    assert_eq!(report.text, "intro");
    assert_eq!(report.line, Some(3));
    assert_eq!(report.source, Path::new("guides/setup.md"));
    assert!(report.suggestions.len() <= 3);
    assert!(report.suggestions.contains(&"/guides/setup/".to_string()));
}

#[test]
fn test_every_url_is_unique_and_ordered() {
    let (_dir, config) = project(
        "",
        &[
            ("index.md", "# Home\n"),
            ("01-setup.md", "# Setup one\n"),
            ("02-setup.md", "# Setup two\n"),
            ("setup/index.md", "# Setup folder\n"),
        ],
    );
    let tree = SiteTree::build(config.source_dir(), &TreeOptions::default()).unwrap();

    let mut urls: Vec<&str> = tree.valid_urls().iter().collect();
    let count = urls.len();
    urls.dedup();
    assert_eq!(urls.len(), count);
    assert_eq!(urls, vec!["/", "/setup-1/", "/setup-2/", "/setup/"]);
}

#[test]
fn test_sub_path_deployment() {
    let (_dir, config) = project(
        "base_path: /docs/\nsite:\n  url: https://example.com\n",
        &[
            ("index.md", "# Home\n\n[[guides/setup]] and [Rust](https://www.rust-lang.org/)\n"),
            ("guides/setup.md", "# Setup\n\n![[diagram.png]]\n"),
            ("guides/diagram.png", "png"),
        ],
    );
    let build = SiteBuilder::new(config).build().unwrap();
    assert!(build.reports.is_empty(), "{:?}", build.reports);

    let home = build.pages.iter().find(|p| p.url == "/").unwrap();
    assert!(home.html.contains(r#"href="/docs/guides/setup/""#));
    assert!(home.html.contains("external-link"));

    let setup = build.pages.iter().find(|p| p.url == "/guides/setup/").unwrap();
    assert!(setup.html.contains(r#"href="/docs/guides/diagram.png""#));
    assert_eq!(build.tree.attachments()[0].url, "/guides/diagram.png");
}

#[test]
fn test_content_folder_named_like_base_path() {
    let (_dir, config) = project(
        "base_path: /docs/\n",
        &[
            ("index.md", "# Home\n\nRead [[docs/intro]].\n"),
            ("docs/intro.md", "# Intro\n"),
        ],
    );
    let build = SiteBuilder::new(config).build().unwrap();
    assert!(build.reports.is_empty(), "{:?}", build.reports);

    let home = build.pages.iter().find(|p| p.url == "/").unwrap();
    assert!(home.html.contains(r#"href="/docs/docs/intro/""#));
}

#[test]
fn test_relative_crossrefs_in_colliding_folders() {
    let (_dir, config) = project(
        "",
        &[
            ("index.md", "# Home\n"),
            ("01-notes/a.md", "# A\n"),
            ("02-Notes/b.md", "# B\n\n[[c]]\n"),
            ("02-Notes/c.md", "# C\n"),
        ],
    );
    let build = SiteBuilder::new(config).build().unwrap();
    assert!(build.reports.is_empty(), "{:?}", build.reports);

    let b = build.pages.iter().find(|p| p.url == "/notes-1/b/").unwrap();
    assert!(b.html.contains(r#"href="/notes-1/c/""#));
}

#[test]
fn test_callouts_code_and_headings_end_to_end() {
    let (_dir, config) = project(
        "",
        &[(
            "index.md",
            concat!(
                "---\ntitle: Start Here\n---\n\n",
                "## Setup\n\n:::warning\nCareful with `[[this]]`.\n:::\n\n",
                "## Setup\n\n```rust {2}\nfn a() {}\nfn b() {}\n```\n"
            ),
        )],
    );
    let build = SiteBuilder::new(config).build().unwrap();
    let page = &build.pages[0];

    assert_eq!(page.title, "Start Here");
    assert!(page.html.contains(r#"id="setup""#));
    assert!(page.html.contains(r#"id="setup-1""#));
    assert!(page.html.contains("callout-warning"));
    assert!(page.html.contains("<code>[[this]]</code>"));
    assert_eq!(page.html.matches("line highlighted").count(), 1);
    assert!(build.reports.is_empty());
}

#[test]
fn test_adopted_documents_render_at_folder_urls() {
    let (_dir, config) = project(
        "",
        &[
            ("Guides.md", "# Guides overview\n"),
            ("guides/setup.md", "# Setup\n\nSee [[/guides]].\n"),
        ],
    );
    let build = SiteBuilder::new(config).build().unwrap();

    let urls: Vec<&str> = build.pages.iter().map(|p| p.url.as_str()).collect();
    assert!(urls.contains(&"/guides/"));
    assert!(urls.contains(&"/guides/setup/"));
    assert!(build.reports.is_empty());

    let root = build.tree.root();
    assert!(build.tree.node(root).needs_auto_index);
    assert_eq!(build.tree.auto_index_folders(), vec![root]);
}
