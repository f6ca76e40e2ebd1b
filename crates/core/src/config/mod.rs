//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFLINE_AGENT_*)
//! 2. TOML config file (if OFFLINE_AGENT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFLINE_AGENT_*)
/// 2. TOML config file (if OFFLINE_AGENT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deploy version. Namespaces are named `static-<version>` and
    /// `pages-<version>`; bumping it is how old caches get invalidated.
    ///
    /// Set via OFFLINE_AGENT_APP_VERSION environment variable.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Origin of the hosted application. Requests to any other origin
    /// are never intercepted.
    ///
    /// Set via OFFLINE_AGENT_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    ///
    /// Set via OFFLINE_AGENT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional request timeout in milliseconds. Unset means the agent
    /// relies on the transport's own failure signal.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Static asset paths pre-cached at install.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Page paths pre-cached at install. Must include `offline_page`.
    #[serde(default = "default_pages")]
    pub pages: Vec<String>,

    /// Page served when a navigation fails and has no cached copy.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,

    /// Run install and activate when the host starts.
    #[serde(default = "default_true")]
    pub install_on_start: bool,
}

fn default_app_version() -> String {
    "v1.0.0".into()
}

fn default_origin() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offline-agent-cache.sqlite")
}

fn default_user_agent() -> String {
    "offline-agent/0.1".into()
}

fn default_max_redirects() -> usize {
    5
}

fn default_static_assets() -> Vec<String> {
    vec![
        "/static/manifest.json".into(),
        "/static/icons/icon-192.png".into(),
        "/static/icons/icon-512.png".into(),
    ]
}

fn default_pages() -> Vec<String> {
    vec!["/".into(), "/offline".into()]
}

fn default_offline_page() -> String {
    "/offline".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_version: default_app_version(),
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: None,
            max_redirects: default_max_redirects(),
            static_assets: default_static_assets(),
            pages: default_pages(),
            offline_page: default_offline_page(),
            install_on_start: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFLINE_AGENT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFLINE_AGENT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
