//! The set of URLs a build produces pages for.

use std::collections::BTreeSet;

/// Resolved page URLs, trailing-slash normalized.
///
/// Built once after tree resolution and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidUrlSet {
    urls: BTreeSet<String>,
}

impl ValidUrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, url: &str) {
        self.urls.insert(normalize(url));
    }

    /// Membership accepting `/a/b/`, `/a/b` and exact forms alike.
    ///
    /// ```
    /// use wikitree_core::tree::ValidUrlSet;
    ///
    /// let urls: ValidUrlSet = ["/guides/setup/"].into_iter().collect();
    /// assert!(urls.contains("/guides/setup"));
    /// assert!(urls.contains("/guides/setup/"));
    /// assert!(!urls.contains("/guides/"));
    /// ```
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url) || self.urls.contains(&normalize(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ValidUrlSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for url in iter {
            set.insert(url.as_ref());
        }
        set
    }
}

fn normalize(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        String::from("/")
    } else {
        format!("{trimmed}/")
    }
}
