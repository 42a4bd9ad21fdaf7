//! CatalogStore: redb-backed snapshot persistence.
//!
//! One snapshot per provider, JSON-serialized into redb's `&[u8]` value
//! column. A snapshot is replaced wholesale on refresh and never edited in
//! place. The store supports both on-disk and in-memory backends (the
//! latter for testing).

use std::path::Path;
use std::sync::Arc;

use cloud_pricing_core::ProviderId;
use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::tables::CATALOGS;
use crate::types::StoredCatalog;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Thread-safe snapshot store backed by redb.
#[derive(Clone)]
pub struct CatalogStore {
    db: Arc<Database>,
}

impl CatalogStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "catalog store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory catalog store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(CATALOGS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Insert or replace a provider snapshot.
    pub fn put_catalog(&self, stored: &StoredCatalog) -> StoreResult<()> {
        let key = stored.table_key();
        let value = serde_json::to_vec(stored).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(CATALOGS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, rows = stored.catalog.len(), "catalog stored");
        Ok(())
    }

    pub fn get_catalog(&self, provider: &ProviderId) -> StoreResult<Option<StoredCatalog>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(CATALOGS).map_err(map_err!(Table))?;
        match table.get(provider.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let stored: StoredCatalog =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    /// List all snapshots, ordered by provider id.
    pub fn list_catalogs(&self) -> StoreResult<Vec<StoredCatalog>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(CATALOGS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let stored: StoredCatalog =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(stored);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_pricing_core::{Catalog, CpuRamUnitPrice, InstanceRecord};

    fn id(name: &str) -> ProviderId {
        ProviderId::parse(name).unwrap()
    }

    fn fixed(provider: &str, refreshed_at: u64) -> StoredCatalog {
        StoredCatalog {
            provider: id(provider),
            refreshed_at,
            catalog: Catalog::Fixed {
                instances: vec![
                    InstanceRecord::new("m5.large", 2, 8.0, Some(0.096)).with_extra("region", "us-east-2"),
                ],
            },
        }
    }

    #[test]
    fn catalog_put_and_get() {
        let store = CatalogStore::open_in_memory().unwrap();
        let snap = fixed("aws", 1000);

        store.put_catalog(&snap).unwrap();
        assert_eq!(store.get_catalog(&id("aws")).unwrap(), Some(snap));
    }

    #[test]
    fn catalog_get_nonexistent_returns_none() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert!(store.get_catalog(&id("aws")).unwrap().is_none());
    }

    #[test]
    fn put_replaces_whole_snapshot() {
        let store = CatalogStore::open_in_memory().unwrap();
        store.put_catalog(&fixed("gcp", 1000)).unwrap();

        let custom = StoredCatalog {
            provider: id("gcp"),
            refreshed_at: 2000,
            catalog: Catalog::Custom {
                cpu: vec![CpuRamUnitPrice::new("N1", 0.033, 0.0045)],
                gpu: Vec::new(),
            },
        };
        store.put_catalog(&custom).unwrap();

        let got = store.get_catalog(&id("gcp")).unwrap().unwrap();
        assert_eq!(got.refreshed_at, 2000);
        assert_eq!(got.catalog.kind(), "custom");
        assert_eq!(store.list_catalogs().unwrap().len(), 1);
    }

    #[test]
    fn list_is_ordered_by_provider() {
        let store = CatalogStore::open_in_memory().unwrap();
        store.put_catalog(&fixed("gcp", 1)).unwrap();
        store.put_catalog(&fixed("aws", 1)).unwrap();

        let providers: Vec<String> = store
            .list_catalogs()
            .unwrap()
            .into_iter()
            .map(|s| s.provider.to_string())
            .collect();
        assert_eq!(providers, vec!["aws", "gcp"]);
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("catalogs.redb");

        {
            let store = CatalogStore::open(&db_path).unwrap();
            store.put_catalog(&fixed("aws", 1000)).unwrap();
        }

        let store = CatalogStore::open(&db_path).unwrap();
        let snap = store.get_catalog(&id("aws")).unwrap().unwrap();
        let Catalog::Fixed { instances } = snap.catalog else {
            panic!("expected a fixed catalog");
        };
        assert_eq!(instances[0].extra["region"], "us-east-2");
    }
}
