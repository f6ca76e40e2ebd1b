//! Namespace names derived from the deploy version.
//!
//! Exactly two namespaces are current at any time. Anything else in the
//! store belongs to an older deploy and is pruned on activate.

pub const STATIC_PREFIX: &str = "static-";
pub const PAGES_PREFIX: &str = "pages-";

/// Current namespace names for one app version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRegistry {
    version: String,
    static_namespace: String,
    pages_namespace: String,
}

impl VersionRegistry {
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            static_namespace: format!("{STATIC_PREFIX}{version}"),
            pages_namespace: format!("{PAGES_PREFIX}{version}"),
            version,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Namespace for immutable static assets.
    pub fn static_namespace(&self) -> &str {
        &self.static_namespace
    }

    /// Namespace for cached HTML pages.
    pub fn pages_namespace(&self) -> &str {
        &self.pages_namespace
    }

    pub fn current(&self) -> [&str; 2] {
        [&self.static_namespace, &self.pages_namespace]
    }

    pub fn is_current(&self, name: &str) -> bool {
        self.current().contains(&name)
    }

    /// Names in `existing` that are not current, in their original order.
    pub fn stale<'a>(&self, existing: &'a [String]) -> Vec<&'a str> {
        existing
            .iter()
            .map(String::as_str)
            .filter(|name| !self.is_current(name))
            .collect()
    }
}
