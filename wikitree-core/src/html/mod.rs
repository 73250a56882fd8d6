//! HTML postprocessing of rendered documents.
//!
//! Works on the renderer's own serialized output, in a fixed order:
//! heading anchors, sub-path prefixing, external link decoration, code
//! block enhancement.

pub mod anchors;
pub mod code;
pub mod external;
pub mod prefix;

pub use anchors::add_heading_anchors;
pub use code::{enhance_code_blocks, parse_line_spec};
pub use external::decorate_external_links;
pub use prefix::prefix_internal_paths;

/// Settings shared by every document of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessOptions {
    /// Deployment sub-path such as `/docs/`; `/` disables prefixing
    pub base_path: String,
    /// Host of the site itself; links elsewhere are decorated as external
    pub site_host: Option<String>,
}

/// Applies every HTML enhancement to a rendered document.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    prefix: String,
    site_host: Option<String>,
}

impl PostProcessor {
    pub fn new(options: &PostProcessOptions) -> Self {
        Self {
            prefix: path_prefix(&options.base_path),
            site_host: options.site_host.as_deref().map(normalize_host),
        }
    }

    pub fn process(&self, html: &str) -> String {
        let html = add_heading_anchors(html);
        let html = if self.prefix.is_empty() {
            html
        } else {
            prefix_internal_paths(&html, &self.prefix)
        };
        let html = decorate_external_links(&html, self.site_host.as_deref());
        enhance_code_blocks(&html)
    }
}

/// `/docs/` → `/docs`, `/` → empty.
pub fn path_prefix(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Lowercase host without a `www.` prefix.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix() {
        assert_eq!(path_prefix("/"), "");
        assert_eq!(path_prefix(""), "");
        assert_eq!(path_prefix("/docs/"), "/docs");
        assert_eq!(path_prefix("docs/v2"), "/docs/v2");
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("WWW.Example.com"), "example.com");
        assert_eq!(normalize_host("docs.example.com"), "docs.example.com");
    }

    #[test]
    fn test_full_pipeline_order() {
        let processor = PostProcessor::new(&PostProcessOptions {
            base_path: "/docs/".to_string(),
            site_host: Some("example.com".to_string()),
        });
        let html = concat!(
            "<h2>Setup</h2>\n",
            "<p><a href=\"/guides/\">Guides</a> <a href=\"https://other.org/\">Other</a></p>\n",
            "<pre><code>x\n</code></pre>\n"
        );
        let out = processor.process(html);
        assert!(out.contains(r##"<h2 id="setup"><a class="heading-anchor" href="#setup""##));
        assert!(out.contains(r#"<a href="/docs/guides/">Guides</a>"#));
        assert!(out.contains(r#"target="_blank""#));
        assert!(out.contains(r#"<div class="code-block">"#));
    }
}
