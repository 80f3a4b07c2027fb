use std::{collections::HashMap, path::PathBuf, sync::Arc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// On-disk shape: the row map plus the id sequence, persisted together so the
/// sequence survives restarts and deleted ids are never handed out again.
#[derive(Serialize, Deserialize)]
struct Table<V> {
    next_seq: u64,
    rows: HashMap<u64, V>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self { next_seq: 1, rows: HashMap::new() }
    }
}

/// Generic JSON file-backed table with store-assigned integer ids.
///
/// Persists the whole table to a JSON file on every mutation and hands out
/// monotonically increasing `u64` ids on insert. Intended for lightweight
/// record sets where a database is overkill.
///
/// All mutations run under a single write lock, so a read-modify-write through
/// [`JsonTableStore::update_row`] is one logical operation: concurrent callers
/// on the same id serialize instead of losing updates.
#[derive(Clone)]
pub struct JsonTableStore<V> {
    inner: Arc<RwLock<Table<V>>>,
    file_path: PathBuf,
}

impl<V> JsonTableStore<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty table if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let table: Table<V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!(
                    "corrupt data file {}: {}",
                    file_path.display(),
                    e
                ))
            })?,
            Err(_) => {
                let empty = Table::<V>::default();
                fs::write(
                    &file_path,
                    serde_json::to_vec(&empty).map_err(|e| ServiceError::Storage(e.to_string()))?,
                )
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(table)), file_path }))
    }

    /// Write the given table state to disk. Called while the caller still
    /// holds the write lock so a failed write can be rolled back before any
    /// reader sees the change.
    async fn persist(&self, table: &Table<V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(table).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Insert a new row built from the assigned id; persists and returns the row.
    /// On a failed write the row and the id sequence are rolled back.
    pub async fn insert<F>(&self, make: F) -> Result<V, ServiceError>
    where
        F: FnOnce(u64) -> V,
    {
        let mut table = self.inner.write().await;
        let id = table.next_seq;
        table.next_seq += 1;
        let row = make(id);
        table.rows.insert(id, row.clone());
        if let Err(e) = self.persist(&table).await {
            table.rows.remove(&id);
            table.next_seq = id;
            return Err(e);
        }
        Ok(row)
    }

    /// Like [`JsonTableStore::insert`], but first checks the conflict
    /// predicate against existing rows inside the same critical section that
    /// assigns the id. Returns `Ok(None)` when a conflicting row exists, so
    /// two racing inserts of the same logical record cannot both land.
    pub async fn insert_unique<P, F>(&self, conflict: P, make: F) -> Result<Option<V>, ServiceError>
    where
        P: Fn(&V) -> bool,
        F: FnOnce(u64) -> V,
    {
        let mut table = self.inner.write().await;
        if table.rows.values().any(|v| conflict(v)) {
            return Ok(None);
        }
        let id = table.next_seq;
        table.next_seq += 1;
        let row = make(id);
        table.rows.insert(id, row.clone());
        if let Err(e) = self.persist(&table).await {
            table.rows.remove(&id);
            table.next_seq = id;
            return Err(e);
        }
        Ok(Some(row))
    }

    /// Get a row by id.
    pub async fn get(&self, id: u64) -> Option<V> {
        let table = self.inner.read().await;
        table.rows.get(&id).cloned()
    }

    /// First row matching the predicate, if any.
    pub async fn find<P>(&self, pred: P) -> Option<V>
    where
        P: Fn(&V) -> bool,
    {
        let table = self.inner.read().await;
        table.rows.values().find(|v| pred(v)).cloned()
    }

    /// All rows in ascending id order.
    pub async fn list(&self) -> Vec<V> {
        let table = self.inner.read().await;
        let mut entries: Vec<(u64, V)> =
            table.rows.iter().map(|(k, v)| (*k, v.clone())).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Remove a row and persist; returns whether it existed. A failed write
    /// puts the row back.
    pub async fn remove(&self, id: u64) -> Result<bool, ServiceError> {
        let mut table = self.inner.write().await;
        let Some(prev) = table.rows.remove(&id) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(&table).await {
            table.rows.insert(id, prev);
            return Err(e);
        }
        Ok(true)
    }

    /// Replace a row atomically: the closure sees the current row and either
    /// returns the replacement or an error, in which case nothing is written.
    /// A failed write restores the prior row. Returns `Ok(None)` when the id
    /// is unknown.
    pub async fn update_row<F>(&self, id: u64, apply: F) -> Result<Option<V>, ServiceError>
    where
        F: FnOnce(&V) -> Result<V, ServiceError>,
    {
        let mut table = self.inner.write().await;
        let Some(current) = table.rows.get(&id) else {
            return Ok(None);
        };
        let replacement = apply(current)?;
        let prev = current.clone();
        table.rows.insert(id, replacement.clone());
        if let Err(e) = self.persist(&table).await {
            table.rows.insert(id, prev);
            return Err(e);
        }
        Ok(Some(replacement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_table_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn table_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonTableStore::<String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        // insert assigns monotonic ids starting at 1
        let a = store.insert(|id| format!("row-{}", id)).await?;
        let b = store.insert(|id| format!("row-{}", id)).await?;
        assert_eq!(a, "row-1");
        assert_eq!(b, "row-2");
        assert_eq!(store.get(1).await.as_deref(), Some("row-1"));
        assert!(store.find(|v| v == "row-2").await.is_some());

        // update_row replaces atomically
        let updated = store.update_row(1, |_| Ok("row-1-v2".to_string())).await?;
        assert_eq!(updated.as_deref(), Some("row-1-v2"));

        // failing closure leaves the row untouched
        let res = store
            .update_row(1, |_| Err(ServiceError::Validation("nope".into())))
            .await;
        assert!(res.is_err());
        assert_eq!(store.get(1).await.as_deref(), Some("row-1-v2"));

        // unknown id is Ok(None)
        assert!(store.update_row(99, |v| Ok(v.clone())).await?.is_none());

        // remove and reload persistence
        assert!(store.remove(2).await?);
        let reloaded = JsonTableStore::<String>::new(&tmp).await?;
        assert_eq!(reloaded.list().await, vec!["row-1-v2".to_string()]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn insert_unique_rejects_conflicting_row() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonTableStore::<String>::new(&tmp).await?;

        let first = store
            .insert_unique(|v| v.ends_with("-taken"), |id| format!("{}-taken", id))
            .await?;
        assert_eq!(first.as_deref(), Some("1-taken"));

        // Conflict: no row is written and the sequence does not advance.
        let second = store
            .insert_unique(|v| v.ends_with("-taken"), |id| format!("{}-taken", id))
            .await?;
        assert!(second.is_none());
        assert_eq!(store.list().await.len(), 1);

        let third = store.insert(|id| format!("row-{}", id)).await?;
        assert_eq!(third, "row-2");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_data_file_is_a_storage_error() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        tokio::fs::write(&tmp, b"{ not json").await?;

        let res = JsonTableStore::<String>::new(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_memory_state() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonTableStore::<String>::new(&tmp).await?;
        store.insert(|id| format!("row-{}", id)).await?;

        // Make the data file unwritable by replacing it with a directory.
        tokio::fs::remove_file(&tmp).await?;
        tokio::fs::create_dir(&tmp).await?;

        assert!(store.insert(|id| format!("row-{}", id)).await.is_err());
        assert!(store
            .insert_unique(|_| false, |id| format!("row-{}", id))
            .await
            .is_err());
        assert!(store.update_row(1, |_| Ok("changed".to_string())).await.is_err());
        assert!(store.remove(1).await.is_err());

        // None of the failed mutations is visible to readers.
        assert_eq!(store.get(1).await.as_deref(), Some("row-1"));
        assert_eq!(store.list().await, vec!["row-1".to_string()]);

        // Writable again: the rolled-back sequence hands out id 2, not a
        // later one burned by the failed attempts.
        tokio::fs::remove_dir(&tmp).await?;
        let second = store.insert(|id| format!("row-{}", id)).await?;
        assert_eq!(second, "row-2");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonTableStore::<u32>::new(&tmp).await?;

        store.insert(|_| 10).await?;
        store.insert(|_| 20).await?;
        assert!(store.remove(2).await?);

        // The sequence keeps going even across a reload.
        let reloaded = JsonTableStore::<u32>::new(&tmp).await?;
        reloaded.insert(|id| {
            assert_eq!(id, 3);
            30
        })
        .await?;
        assert!(reloaded.get(2).await.is_none());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
