//! URL canonicalization and origin checks.

use url::{Origin, Url};

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string so equal resources produce equal cache keys.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an http(s) scheme
/// 3. Lowercase the host (done by the parser)
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve a path (or any relative reference) against the app origin.
pub fn resolve(origin: &Url, path: &str) -> Result<Url, UrlError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut joined = origin.join(path).map_err(|e| UrlError::InvalidUrl(format!("{path}: {e}")))?;
    joined.set_fragment(None);
    Ok(joined)
}

/// Whether two URLs share scheme, host and port.
///
/// Opaque origins (e.g. `data:` URLs) are never same-origin with anything.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (a.origin(), b.origin()) {
        (Origin::Tuple(..), Origin::Tuple(..)) => a.origin() == b.origin(),
        _ => false,
    }
}
