//! Configuration parsing and management.

use crate::html::{normalize_host, PostProcessOptions};
use crate::tree::TreeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the wikitree.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    /// Deployment sub-path, e.g. `/docs/`
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Regexes matched against paths relative to the source folder
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub build: BuildConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_base_path() -> String {
    String::from("/")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Public URL; its host decides which links are external
    #[serde(default)]
    pub url: Option<String>,
}

fn default_title() -> String {
    String::from("Documentation")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from("docs")
}

fn default_output() -> PathBuf {
    PathBuf::from("public")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Fail the build on unresolved internal links
    #[serde(default)]
    pub strict_links: bool,

    /// Worker threads for document processing; 0 uses available parallelism
    #[serde(default)]
    pub jobs: usize,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration from YAML text; relative paths stay relative to
    /// the working directory.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Get the source directory, resolved relative to config file
    pub fn source_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.source)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }

    /// Normalized base path with leading and trailing slash ("/foo/" or "/")
    pub fn normalized_base_path(&self) -> String {
        normalize_base_url(&self.base_path)
    }

    /// Host of `site.url`, lowercased and without `www.`
    pub fn site_host(&self) -> Option<String> {
        let url = self.site.url.as_deref()?.trim();
        let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
        let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        let host = authority.rsplit('@').next().unwrap_or(authority);
        let host = host.split(':').next().unwrap_or(host);
        (!host.is_empty()).then(|| normalize_host(host))
    }

    /// Walk settings derived from this config
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions::with_patterns(&self.ignore_patterns)
    }

    /// HTML postprocessing settings derived from this config
    pub fn postprocess_options(&self) -> PostProcessOptions {
        PostProcessOptions {
            base_path: self.normalized_base_path(),
            site_host: self.site_host(),
        }
    }
}

impl Default for Config {
    /// Built-in defaults, used when no config file exists
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            paths: PathsConfig::default(),
            base_path: default_base_path(),
            ignore_patterns: Vec::new(),
            build: BuildConfig::default(),
            config_path: None,
        }
    }
}

/// Ensure base URLs have a leading and trailing slash
pub fn normalize_base_url(raw: &str) -> String {
    if raw.is_empty() {
        return "/".to_string();
    }

    let mut s = raw.trim().to_string();
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    if !s.ends_with('/') {
        s.push('/');
    }

    // Collapse duplicate slashes (but keep leading)
    while s.contains("//") {
        s = s.replace("//", "/");
    }

    s
}
