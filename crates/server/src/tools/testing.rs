//! Test doubles for tool tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use offline_core::{AppConfig, CacheDb, Error, FetchRequest, Network, ResponseSnapshot};
use offline_worker::OfflineWorker;
use rmcp::model::CallToolResult;

pub const ORIGIN: &str = "http://127.0.0.1:5000";

/// Network answering from a fixed path table; anything else fails.
#[derive(Default)]
pub struct TableNetwork {
    routes: Mutex<HashMap<String, ResponseSnapshot>>,
}

impl TableNetwork {
    pub fn with_default_manifest() -> Self {
        let network = Self::default();
        for path in ["/static/manifest.json", "/static/icons/icon-192.png", "/static/icons/icon-512.png"] {
            network.respond(path, ResponseSnapshot::new(200, vec![], "asset"));
        }
        network.respond("/", ResponseSnapshot::new(200, vec![("Content-Type".into(), "text/html".into())], "home"));
        network.respond(
            "/offline",
            ResponseSnapshot::new(200, vec![("Content-Type".into(), "text/html".into())], "offline"),
        );
        network
    }

    pub fn respond(&self, path: &str, response: ResponseSnapshot) {
        self.routes.lock().unwrap().insert(format!("{ORIGIN}{path}"), response);
    }

    pub fn clear(&self) {
        self.routes.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for TableNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, Error> {
        self.routes
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("unreachable: {}", request.url)))
    }
}

pub type TestWorker = OfflineWorker<CacheDb, TableNetwork>;

pub async fn worker() -> (Arc<TableNetwork>, TestWorker) {
    let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let network = Arc::new(TableNetwork::with_default_manifest());
    let worker = OfflineWorker::from_config(&AppConfig::default(), db, network.clone()).unwrap();
    (network, worker)
}

/// Parse the JSON text content of a tool result.
pub fn output<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
