//! Check internal links without writing output.

use super::format_report;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use wikitree_core::{BrokenLinkReport, Config, SiteBuilder};

#[derive(Serialize)]
struct CheckSummary<'a> {
    documents: usize,
    urls: usize,
    drafts: usize,
    broken_links: usize,
    reports: &'a [BrokenLinkReport],
}

/// Run the whole pipeline in memory and report broken links.
pub fn check_site(config: Config, json: bool) -> Result<()> {
    let strict = config.build.strict_links;
    let builder = SiteBuilder::new(config);
    let site = builder.build().context("Failed to build site for checking")?;

    let summary = CheckSummary {
        documents: site.pages.len(),
        urls: site.tree.valid_urls().len(),
        drafts: site.tree.drafts().len(),
        broken_links: site.reports.len(),
        reports: &site.reports,
    };

    if json {
        let payload = serde_json::to_string_pretty(&summary)?;
        println!("{}", payload);
    } else {
        println!(
            "Checked {} documents ({} urls, {} drafts skipped): {} broken links",
            summary.documents, summary.urls, summary.drafts, summary.broken_links
        );
        for report in summary.reports {
            println!("- {}", format_report(report));
        }
    }

    if strict && site.has_broken_links() {
        bail!("{} broken links", site.reports.len());
    }
    Ok(())
}
