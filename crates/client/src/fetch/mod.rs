//! Live network fetches for the offline agent.
//!
//! ### Semantics
//! - Any HTTP status is a completed fetch and is returned as-is.
//! - Only transport failures (DNS, connect, TLS, reset, body read) become
//!   `Error::Network`.
//! - No deadline is imposed unless `FetchConfig::timeout` is set.
//! - Dropping the returned future abandons the request.
//!
//! ### URL handling
//! - Manifest paths are resolved against the app origin.
//! - Fragments never reach the network or the cache key.

pub mod url;

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, canonicalize, resolve, same_origin};

use offline_core::{Error, FetchRequest, Network, ResponseSnapshot};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "offline-agent/0.1")
    pub user_agent: String,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "offline-agent/0.1".to_string(), timeout: None, max_redirects: 5 }
    }
}

impl From<&offline_core::AppConfig> for FetchConfig {
    fn from(config: &offline_core::AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), max_redirects: config.max_redirects }
    }
}

/// HTTP client backing the agent's network seam.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn send(&self, request: &FetchRequest) -> Result<ResponseSnapshot, Error> {
        let start = Instant::now();
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let mut url = request.url.clone();
        url.set_fragment(None);

        let mut builder = self.http.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} {}: {e}", request.method, request.url)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response from {}: {e}", request.url)))?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status,
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(ResponseSnapshot { status, headers, body })
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, Error> {
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offline_core::Method;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        });
        (base, handle)
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "offline-agent/0.1");
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = offline_core::AppConfig { timeout_ms: Some(2_000), ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.user_agent, app.user_agent);
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        assert!(FetchClient::new(FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let (base, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 4\r\nConnection: close\r\n\r\nnope",
        )
        .await;
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let request = FetchRequest::get_str(&format!("{base}/static/missing.css#frag"))
            .unwrap()
            .with_header("X-Requested-With", "offline-agent-test");

        let response = client.fetch(&request).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(response.content_type(), Some("text/plain"));
        assert_eq!(&response.body[..], b"nope");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /static/missing.css HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("x-requested-with: offline-agent-test"));
    }

    #[tokio::test]
    async fn test_method_is_forwarded() {
        let (base, server) =
            serve_once("HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let request = FetchRequest::get_str(&format!("{base}/api/ping")).unwrap().with_method(Method::Head);

        let response = client.fetch(&request).await.unwrap();
        assert_eq!(response.status, 204);
        assert!(server.await.unwrap().starts_with("HEAD /api/ping"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let request = FetchRequest::get_str(&format!("http://{addr}/")).unwrap();

        let err = client.fetch(&request).await.unwrap_err();
        assert!(err.is_network(), "unexpected error: {err}");
    }
}
