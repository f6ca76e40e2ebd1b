//! Request classification.
//!
//! Rules are evaluated in a fixed order and the first match wins.

use offline_client::same_origin;
use offline_core::{FetchRequest, Method};
use schemars::JsonSchema;
use serde::Serialize;
use url::Url;

/// Path prefixes for authentication and API traffic. Never cached.
pub const API_PREFIXES: &[&str] = &["/api/", "/auth/", "/login", "/logout"];

/// Path prefix for immutable static assets.
pub const STATIC_ASSET_PREFIX: &str = "/static/";

/// Routing policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    /// Network first; synthetic 503 when offline.
    Api,
    /// Cache first; fetch and store on a miss.
    StaticAsset,
    /// Network first; cached copy or offline page when offline.
    Page,
    /// Not intercepted.
    Ignored,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::StaticAsset => "static_asset",
            Self::Page => "page",
            Self::Ignored => "ignored",
        }
    }
}

/// Classify a request relative to the worker's own origin.
pub fn classify(request: &FetchRequest, origin: &Url) -> RequestClass {
    if request.method != Method::Get || !same_origin(&request.url, origin) {
        return RequestClass::Ignored;
    }

    let path = request.url.path();
    if API_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        RequestClass::Api
    } else if path.starts_with(STATIC_ASSET_PREFIX) {
        RequestClass::StaticAsset
    } else {
        RequestClass::Page
    }
}
