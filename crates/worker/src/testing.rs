//! Scripted collaborators for worker tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use offline_core::{CacheDb, CacheStore, Error, FetchRequest, NamespaceSummary, Network, RequestKey, ResponseSnapshot};
use tokio::sync::{Barrier, Notify};

pub const ORIGIN: &str = "http://127.0.0.1:5000";

pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

pub fn get(path: &str) -> FetchRequest {
    FetchRequest::get_str(&url(path)).unwrap()
}

pub fn html(body: &str) -> ResponseSnapshot {
    ResponseSnapshot::new(200, vec![("Content-Type".into(), "text/html".into())], body.to_string())
}

#[derive(Clone)]
enum Script {
    Respond(ResponseSnapshot),
    Fail,
    Hang,
}

/// Increments `abandoned` when a hanging fetch is dropped before completing.
struct AbandonGuard<'a>(&'a AtomicUsize);

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Network whose answers are scripted per URL. Unscripted URLs fail.
#[derive(Default)]
pub struct FakeNetwork {
    scripts: Mutex<HashMap<String, Script>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
    barrier: Mutex<Option<Arc<Barrier>>>,
    pub abandoned: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, response: ResponseSnapshot) -> &Self {
        self.scripts.lock().unwrap().insert(url(path), Script::Respond(response));
        self
    }

    pub fn fail(&self, path: &str) -> &Self {
        self.scripts.lock().unwrap().insert(url(path), Script::Fail);
        self
    }

    pub fn hang(&self, path: &str) -> &Self {
        self.scripts.lock().unwrap().insert(url(path), Script::Hang);
        self
    }

    /// Hold every fetch until `barrier` has as many waiters as it was sized for.
    pub fn rendezvous(&self, barrier: Arc<Barrier>) {
        *self.barrier.lock().unwrap() = Some(barrier);
    }

    /// Fail every request until switched back on.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        let target = url(path);
        self.calls.lock().unwrap().iter().filter(|u| **u == target).count()
    }

    /// Serve the default manifest successfully.
    pub fn with_default_manifest() -> Self {
        let network = Self::new();
        network
            .respond("/static/manifest.json", ResponseSnapshot::new(200, vec![], "{}"))
            .respond("/static/icons/icon-192.png", ResponseSnapshot::new(200, vec![], vec![0x89, b'P']))
            .respond("/static/icons/icon-512.png", ResponseSnapshot::new(200, vec![], vec![0x89, b'P', b'N']))
            .respond("/", html("<h1>Home</h1>"))
            .respond("/offline", html("<h1>You are offline</h1>"));
        network
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, Error> {
        let target = request.url.to_string();
        self.calls.lock().unwrap().push(target.clone());

        let barrier = self.barrier.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {target}")));
        }

        let script = self.scripts.lock().unwrap().get(&target).cloned();
        match script {
            Some(Script::Respond(response)) => Ok(response),
            Some(Script::Hang) => {
                let _guard = AbandonGuard(&self.abandoned);
                futures_util::future::pending::<()>().await;
                unreachable!()
            }
            Some(Script::Fail) | None => Err(Error::Network(format!("unreachable: {target}"))),
        }
    }
}

/// Real store with injectable failures and a gate on single puts.
pub struct FlakyStore {
    pub inner: CacheDb,
    fail_deletes: HashSet<String>,
    fail_list: bool,
    fail_get: bool,
    put_gate: Option<Arc<Notify>>,
}

impl FlakyStore {
    pub fn new(inner: CacheDb) -> Self {
        Self { inner, fail_deletes: HashSet::new(), fail_list: false, fail_get: false, put_gate: None }
    }

    pub fn failing_delete(mut self, name: &str) -> Self {
        self.fail_deletes.insert(name.to_string());
        self
    }

    pub fn failing_get(mut self) -> Self {
        self.fail_get = true;
        self
    }

    /// Each `put` waits for one `notify_one` on `gate` before writing.
    pub fn gated_puts(mut self, gate: Arc<Notify>) -> Self {
        self.put_gate = Some(gate);
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn open_namespace(&self, name: &str) -> Result<(), Error> {
        self.inner.open_namespace(name).await
    }

    async fn put_all(&self, namespace: &str, entries: &[(RequestKey, ResponseSnapshot)]) -> Result<(), Error> {
        self.inner.put_all(namespace, entries).await
    }

    async fn get(&self, namespace: &str, key: &RequestKey) -> Result<Option<ResponseSnapshot>, Error> {
        if self.fail_get {
            return Err(Error::CorruptEntry(format!("{key} unreadable")));
        }
        self.inner.get(namespace, key).await
    }

    async fn put(&self, namespace: &str, key: &RequestKey, snapshot: &ResponseSnapshot) -> Result<(), Error> {
        if let Some(gate) = &self.put_gate {
            gate.notified().await;
        }
        self.inner.put(namespace, key, snapshot).await
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        if self.fail_list {
            return Err(Error::CorruptEntry("namespace index unreadable".into()));
        }
        self.inner.list_namespaces().await
    }

    async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        if self.fail_deletes.contains(name) {
            return Err(Error::CorruptEntry(format!("{name} is locked")));
        }
        self.inner.delete_namespace(name).await
    }

    async fn namespace_summaries(&self) -> Result<Vec<NamespaceSummary>, Error> {
        self.inner.namespace_summaries().await
    }
}
