//! Namespace operations.
//!
//! A namespace is one cache generation (e.g. `static-v1.0.0`). Deleting a
//! namespace drops all of its entries through the foreign key cascade.

use super::connection::CacheDb;
use crate::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Namespace name with its entry count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NamespaceSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

impl CacheDb {
    /// Create a namespace if it does not exist yet.
    pub async fn create_namespace(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    pub async fn has_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM namespaces WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// All namespace names, oldest first.
    pub async fn namespace_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Drop a namespace and its entries.
    ///
    /// Returns false if no such namespace existed.
    pub async fn drop_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Every namespace with the number of entries it holds.
    pub async fn summarize_namespaces(&self) -> Result<Vec<NamespaceSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<NamespaceSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT n.name, n.created_at, COUNT(e.key_hash)
                     FROM namespaces n LEFT JOIN entries e ON e.namespace = n.name
                     GROUP BY n.name, n.created_at
                     ORDER BY n.created_at ASC, n.name ASC",
                )?;
                let summaries = stmt
                    .query_map([], |row| {
                        Ok(NamespaceSummary {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await
            .map_err(Error::from)
    }
}
