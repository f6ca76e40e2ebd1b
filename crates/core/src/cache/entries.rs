//! Entry CRUD operations.
//!
//! Entries are stored as full response snapshots: status, ordered headers
//! and body bytes. Writes to the same key overwrite (last write wins).

use super::connection::CacheDb;
use crate::Error;
use crate::http::{RequestKey, ResponseSnapshot};
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Transaction};

/// One row to write: the request identity and the snapshot stored under it.
struct Row {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl Row {
    fn encode(key: &RequestKey, snapshot: &ResponseSnapshot) -> Result<Self, Error> {
        let headers_json =
            serde_json::to_string(&snapshot.headers).map_err(|e| Error::CorruptEntry(format!("{key}: {e}")))?;
        Ok(Self {
            key_hash: key.hash(),
            method: key.method.to_string(),
            url: key.url.clone(),
            status: snapshot.status,
            headers_json,
            body: snapshot.body.to_vec(),
        })
    }
}

fn upsert(tx: &Transaction<'_>, namespace: &str, row: &Row, stored_at: &str) -> Result<(), rusqlite::Error> {
    tx.execute(
        "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
        params![namespace, stored_at],
    )?;
    tx.execute(
        "INSERT INTO entries (namespace, key_hash, method, url, status, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(namespace, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            namespace,
            &row.key_hash,
            &row.method,
            &row.url,
            row.status,
            &row.headers_json,
            &row.body,
            stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Insert or replace a single entry, creating the namespace if needed.
    pub async fn put_entry(&self, namespace: &str, key: &RequestKey, snapshot: &ResponseSnapshot) -> Result<(), Error> {
        let row = Row::encode(key, snapshot)?;
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                upsert(&tx, &namespace, &row, &chrono::Utc::now().to_rfc3339())?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert many entries in one transaction.
    ///
    /// Either every entry lands or none does.
    pub async fn put_entries(&self, namespace: &str, entries: &[(RequestKey, ResponseSnapshot)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(key, snapshot)| Row::encode(key, snapshot))
            .collect::<Result<Vec<_>, _>>()?;
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let stored_at = chrono::Utc::now().to_rfc3339();
                let tx = conn.transaction()?;
                for row in &rows {
                    upsert(&tx, &namespace, row, &stored_at)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry by request identity.
    ///
    /// Returns None if the namespace or the entry doesn't exist.
    pub async fn get_entry(&self, namespace: &str, key: &RequestKey) -> Result<Option<ResponseSnapshot>, Error> {
        let namespace = namespace.to_string();
        let key_hash = key.hash();
        let label = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<ResponseSnapshot>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body FROM entries WHERE namespace = ?1 AND key_hash = ?2",
                    params![namespace, key_hash],
                    |row| Ok((row.get::<_, u16>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?)),
                );

                match result {
                    Ok((status, headers_json, body)) => {
                        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::CorruptEntry(format!("{label}: {e}")))?;
                        Ok(Some(ResponseSnapshot { status, headers, body: Bytes::from(body) }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// URLs stored in a namespace, sorted.
    pub async fn entry_urls(&self, namespace: &str) -> Result<Vec<String>, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE namespace = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![namespace], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
