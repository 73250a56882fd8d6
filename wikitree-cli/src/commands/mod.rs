//! CLI command implementations.

pub mod build;
pub mod check;
pub mod tree;

pub use build::build_site;
pub use check::check_site;
pub use tree::print_tree;

use anyhow::{bail, Context, Result};
use clap::Args;
use std::env;
use std::path::{Path, PathBuf};
use wikitree_core::{BrokenLinkReport, Config};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "wikitree.yml";

/// Flags that override values from the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Source directory containing the Markdown documents
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output directory for the generated site
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Deployment sub-path, e.g. /docs/
    #[arg(long)]
    pub base_path: Option<String>,

    /// Fail when any internal link is broken
    #[arg(long)]
    pub strict: bool,

    /// Worker threads for rendering (0 = available parallelism)
    #[arg(long, short)]
    pub jobs: Option<usize>,
}

/// Load the config file, falling back to defaults when the default file is
/// absent, then apply command-line overrides.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<Config> {
    let mut config = if path.exists() {
        tracing::debug!("Loading config from {}", path.display());
        Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
    } else if path == Path::new(DEFAULT_CONFIG) {
        tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG);
        Config::default()
    } else {
        bail!("Config file not found: {}", path.display());
    };

    let cwd = env::current_dir().context("Failed to read current directory")?;
    if let Some(source) = &overrides.source {
        config.paths.source = cwd.join(source);
    }
    if let Some(output) = &overrides.output {
        config.paths.output = cwd.join(output);
    }
    if let Some(base_path) = &overrides.base_path {
        config.base_path = base_path.clone();
    }
    if overrides.strict {
        config.build.strict_links = true;
    }
    if let Some(jobs) = overrides.jobs {
        config.build.jobs = jobs;
    }

    Ok(config)
}

/// One line per report, plus an indented suggestion line when there are any.
pub(crate) fn format_report(report: &BrokenLinkReport) -> String {
    let line = report
        .line
        .map(|l| format!(":{}", l))
        .unwrap_or_default();
    let mut out = format!(
        "{}{}: {} -> {}",
        report.source.display(),
        line,
        report.syntax,
        report.link_url
    );
    if !report.suggestions.is_empty() {
        out.push_str(&format!(
            "\n  did you mean: {}",
            report.suggestions.join(", ")
        ));
    }
    out
}
