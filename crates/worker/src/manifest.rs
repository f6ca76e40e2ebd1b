//! Build-time pre-cache manifest.

use offline_client::resolve;
use offline_core::{AppConfig, Error};
use url::Url;

/// URLs fetched and stored at install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub static_assets: Vec<String>,
    pub pages: Vec<String>,
    /// Served for failed navigations with no cached copy. Always in `pages`.
    pub offline_page: String,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl Manifest {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            static_assets: config.static_assets.clone(),
            pages: config.pages.clone(),
            offline_page: config.offline_page.clone(),
        }
    }

    /// The offline page must be pre-cached, or the page fallback has nothing to serve.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.pages.contains(&self.offline_page) {
            return Err(Error::InvalidInput(format!(
                "offline page {} is not in the pages manifest",
                self.offline_page
            )));
        }
        Ok(())
    }

    pub fn static_urls(&self, origin: &Url) -> Result<Vec<Url>, Error> {
        resolve_all(origin, &self.static_assets)
    }

    pub fn page_urls(&self, origin: &Url) -> Result<Vec<Url>, Error> {
        resolve_all(origin, &self.pages)
    }

    pub fn offline_url(&self, origin: &Url) -> Result<Url, Error> {
        resolve(origin, &self.offline_page).map_err(|e| Error::InvalidUrl(e.to_string()))
    }
}

fn resolve_all(origin: &Url, paths: &[String]) -> Result<Vec<Url>, Error> {
    paths
        .iter()
        .map(|path| resolve(origin, path).map_err(|e| Error::InvalidUrl(e.to_string())))
        .collect()
}
