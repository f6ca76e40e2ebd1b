//! HTTP value types exchanged between the router, the network and the cache.
//!
//! Responses are plain values. A [`ResponseSnapshot`] handed to the cache is
//! a clone of the one handed back to the caller, never a shared handle.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use url::Url;

use crate::Error;
use crate::cache::hash::compute_request_key;

/// HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Other(m) => m,
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let method = match upper.as_str() {
            "" => return Err(Error::InvalidInput("empty method".into())),
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            _ if upper.chars().all(|c| c.is_ascii_alphabetic() || c == '-') => Self::Other(upper),
            _ => return Err(Error::InvalidInput(format!("invalid method: {s}"))),
        };
        Ok(method)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intercepted outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// A bare GET for the given URL.
    pub fn get(url: Url) -> Self {
        Self { method: Method::Get, url, headers: Vec::new() }
    }

    /// Parse `url` and build a GET request for it.
    pub fn get_str(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::get(url))
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The identity under which this request is cached.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method.clone(), &self.url)
    }
}

/// Cache address of a request: method plus URL, fragment stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self { method, url: url.into() }
    }

    /// Stable hex digest used as the storage key.
    pub fn hash(&self) -> String {
        compute_request_key(self.method.as_str(), &self.url)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Captured copy of an HTTP response: safe to store and to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ResponseSnapshot {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// 2xx, the `Response.ok` notion.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!(" Post ".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("PROPFIND".parse::<Method>().unwrap(), Method::Other("PROPFIND".into()));
        assert!("".parse::<Method>().is_err());
        assert!("GE T".parse::<Method>().is_err());
    }

    #[test]
    fn test_request_key_strips_fragment() {
        let a = FetchRequest::get_str("https://app.test/page#top").unwrap();
        let b = FetchRequest::get_str("https://app.test/page").unwrap();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().hash(), b.key().hash());
    }

    #[test]
    fn test_request_key_keeps_query() {
        let a = FetchRequest::get_str("https://app.test/page?a=1").unwrap();
        let b = FetchRequest::get_str("https://app.test/page?a=2").unwrap();
        assert_ne!(a.key().hash(), b.key().hash());
    }

    #[test]
    fn test_request_key_differs_by_method() {
        let get = FetchRequest::get_str("https://app.test/api/x").unwrap();
        let head = get.clone().with_method(Method::Head);
        assert_ne!(get.key().hash(), head.key().hash());
    }

    #[test]
    fn test_snapshot_success_range() {
        assert!(ResponseSnapshot::new(200, vec![], "").is_success());
        assert!(ResponseSnapshot::new(204, vec![], "").is_success());
        assert!(!ResponseSnapshot::new(304, vec![], "").is_success());
        assert!(!ResponseSnapshot::new(404, vec![], "").is_success());
    }

    #[test]
    fn test_snapshot_header_lookup() {
        let snap = ResponseSnapshot::new(200, vec![("Content-Type".into(), "text/html".into())], "<html>");
        assert_eq!(snap.content_type(), Some("text/html"));
        assert_eq!(snap.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(snap.header("etag"), None);
    }
}
