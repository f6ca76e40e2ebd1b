//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { field: field.into(), reason: reason.into() }
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `app_version` or `user_agent` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - a manifest entry does not start with `/`
    /// - `offline_page` is missing from `pages`
    /// - `max_redirects` exceeds 20
    /// - `timeout_ms` is set outside 100ms..=5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_version.trim().is_empty() {
            return Err(ConfigError::invalid("app_version", "must not be empty"));
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        let origin = url::Url::parse(&self.origin).map_err(|e| ConfigError::invalid("origin", e.to_string()))?;
        if !matches!(origin.scheme(), "http" | "https") || origin.host_str().is_none() {
            return Err(ConfigError::invalid("origin", "must be an absolute http(s) URL"));
        }

        for (field, paths) in [("static_assets", &self.static_assets), ("pages", &self.pages)] {
            if let Some(bad) = paths.iter().find(|p| !p.starts_with('/')) {
                return Err(ConfigError::invalid(field, format!("entry {bad:?} must start with '/'")));
            }
        }

        if !self.pages.contains(&self.offline_page) {
            return Err(ConfigError::invalid(
                "offline_page",
                format!("{} must be listed in pages", self.offline_page),
            ));
        }

        if self.max_redirects > 20 {
            return Err(ConfigError::invalid("max_redirects", "must not exceed 20"));
        }

        if let Some(ms) = self.timeout_ms
            && !(100..=300_000).contains(&ms)
        {
            return Err(ConfigError::invalid("timeout_ms", "must be between 100ms and 5 minutes (300000ms)"));
        }

        if self.static_assets.is_empty() {
            tracing::warn!("static_assets is empty; only pages will be pre-cached");
        }

        Ok(())
    }
}
