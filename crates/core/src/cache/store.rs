//! The cache seam the worker is written against.
//!
//! The worker never touches storage directly; it goes through [`CacheStore`]
//! so that tests can wrap or replace the backing store.

use async_trait::async_trait;

use super::connection::CacheDb;
use super::namespaces::NamespaceSummary;
use crate::Error;
use crate::http::{RequestKey, ResponseSnapshot};

/// Persistent, namespaced key to response store.
///
/// Implementations provide their own concurrency safety. Concurrent `put`s to
/// the same key resolve last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open a namespace, creating it if absent.
    async fn open_namespace(&self, name: &str) -> Result<(), Error>;

    /// Store every entry, or none of them.
    async fn put_all(&self, namespace: &str, entries: &[(RequestKey, ResponseSnapshot)]) -> Result<(), Error>;

    async fn get(&self, namespace: &str, key: &RequestKey) -> Result<Option<ResponseSnapshot>, Error>;

    /// Insert or overwrite one entry. Creates the namespace if absent.
    async fn put(&self, namespace: &str, key: &RequestKey, snapshot: &ResponseSnapshot) -> Result<(), Error>;

    async fn list_namespaces(&self) -> Result<Vec<String>, Error>;

    /// Returns whether the namespace existed.
    async fn delete_namespace(&self, name: &str) -> Result<bool, Error>;

    async fn namespace_summaries(&self) -> Result<Vec<NamespaceSummary>, Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open_namespace(&self, name: &str) -> Result<(), Error> {
        self.create_namespace(name).await
    }

    async fn put_all(&self, namespace: &str, entries: &[(RequestKey, ResponseSnapshot)]) -> Result<(), Error> {
        self.put_entries(namespace, entries).await
    }

    async fn get(&self, namespace: &str, key: &RequestKey) -> Result<Option<ResponseSnapshot>, Error> {
        self.get_entry(namespace, key).await
    }

    async fn put(&self, namespace: &str, key: &RequestKey, snapshot: &ResponseSnapshot) -> Result<(), Error> {
        self.put_entry(namespace, key, snapshot).await
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        self.namespace_names().await
    }

    async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        self.drop_namespace(name).await
    }

    async fn namespace_summaries(&self) -> Result<Vec<NamespaceSummary>, Error> {
        self.summarize_namespaces().await
    }
}
