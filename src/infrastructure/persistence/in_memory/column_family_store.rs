//! # In-Memory Column-Family Store
//!
//! In-memory implementation of [`ColumnFamilyStore`] for testing and for
//! running the server without a database.
//!
//! Rows are kept per collection in key order, so indexed scans return
//! matches in ascending key order. The store can be switched offline to
//! exercise transport-failure paths.

use crate::domain::value_objects::RecordId;
use crate::infrastructure::persistence::traits::{
    ColumnFamilyStore, ColumnMap, IndexClause, KeyedRow, StoreError, StoreResult,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

type Collection = BTreeMap<RecordId, ColumnMap>;

/// In-memory implementation of [`ColumnFamilyStore`].
///
/// Uses a thread-safe `HashMap` of collections. Clones share storage.
#[derive(Debug, Clone)]
pub struct InMemoryColumnFamilyStore {
    storage: Arc<RwLock<HashMap<String, Collection>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryColumnFamilyStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns the number of rows in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.storage
            .try_read()
            .map(|guard| guard.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Returns true if no collection holds any row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage
            .try_read()
            .map(|guard| guard.values().all(BTreeMap::is_empty))
            .unwrap_or(true)
    }

    /// Marks the store reachable or unreachable.
    ///
    /// While unreachable every operation fails with `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Clears all collections.
    pub async fn clear(&self) {
        let mut storage = self.storage.write().await;
        storage.clear();
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("in-memory store is offline"))
        }
    }
}

impl Default for InMemoryColumnFamilyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ColumnFamilyStore for InMemoryColumnFamilyStore {
    async fn get(&self, collection: &str, key: &RecordId) -> StoreResult<ColumnMap> {
        self.ensure_available()?;
        let storage = self.storage.read().await;
        storage
            .get(collection)
            .and_then(|rows| rows.get(key))
            .filter(|columns| !columns.is_empty())
            .cloned()
            .ok_or_else(|| StoreError::key_not_found(collection, *key))
    }

    async fn insert(
        &self,
        collection: &str,
        key: &RecordId,
        columns: ColumnMap,
    ) -> StoreResult<()> {
        self.ensure_available()?;
        let mut storage = self.storage.write().await;
        let row = storage
            .entry(collection.to_owned())
            .or_default()
            .entry(*key)
            .or_default();
        row.extend(columns);
        Ok(())
    }

    async fn get_indexed_slices(
        &self,
        collection: &str,
        clause: &IndexClause,
    ) -> StoreResult<Vec<KeyedRow>> {
        self.ensure_available()?;
        let storage = self.storage.read().await;
        let Some(rows) = storage.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter(|(_, columns)| clause.matches(columns))
            .take(clause.count())
            .map(|(key, columns)| (*key, columns.clone()))
            .collect())
    }
}
