//! ProviderGateway: the load/refresh orchestration around the store.
//!
//! `load` serves a stored snapshot while it is fresh and rebuilds it from the
//! table source otherwise. A stale snapshot is never served: when its
//! refresh fails the load fails.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use cloud_pricing_core::{Catalog, PricingConfig, ProviderId};
use cloud_pricing_match::{CatalogSource, MatchError};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::normalize::normalize;
use crate::source::TableSource;
use crate::store::CatalogStore;
use crate::types::{SnapshotStatus, StoredCatalog};

/// Current time as unix seconds.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub struct ProviderGateway {
    store: CatalogStore,
    source: Box<dyn TableSource>,
    config: PricingConfig,
}

impl ProviderGateway {
    pub fn new(store: CatalogStore, source: Box<dyn TableSource>, config: PricingConfig) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// True iff a snapshot exists and is younger than the provider's max age.
    pub fn is_fresh(&self, provider: &ProviderId, now: u64) -> StoreResult<bool> {
        let max_age = self.config.max_age(provider);
        Ok(self
            .store
            .get_catalog(provider)?
            .is_some_and(|stored| stored.is_fresh(now, max_age)))
    }

    pub fn load(&self, provider: &ProviderId) -> StoreResult<StoredCatalog> {
        self.load_at(provider, now_unix())
    }

    /// Return the stored snapshot, refreshing it first when missing or stale.
    pub fn load_at(&self, provider: &ProviderId, now: u64) -> StoreResult<StoredCatalog> {
        let max_age = self.config.max_age(provider);
        match self.store.get_catalog(provider)? {
            Some(stored) if stored.is_fresh(now, max_age) => {
                debug!(%provider, age_secs = stored.age(now).as_secs(), "serving stored table");
                Ok(stored)
            }
            Some(stored) => {
                warn!(%provider, age_secs = stored.age(now).as_secs(), "stored table is stale, refreshing");
                self.refresh_at(provider, now)
            }
            None => {
                debug!(%provider, "no stored table, refreshing");
                self.refresh_at(provider, now)
            }
        }
    }

    pub fn refresh(&self, provider: &ProviderId) -> StoreResult<StoredCatalog> {
        self.refresh_at(provider, now_unix())
    }

    /// Rebuild the snapshot from the table source, replacing any stored one.
    pub fn refresh_at(&self, provider: &ProviderId, now: u64) -> StoreResult<StoredCatalog> {
        let table = self.source.fetch(provider)?;
        let catalog =
            normalize(provider, table, &self.config).map_err(|source| StoreError::Invalid {
                provider: provider.clone(),
                source,
            })?;
        let stored = StoredCatalog {
            provider: provider.clone(),
            refreshed_at: now,
            catalog,
        };
        self.store.put_catalog(&stored)?;
        info!(%provider, kind = stored.catalog.kind(), rows = stored.catalog.len(), "table refreshed");
        Ok(stored)
    }

    /// Refresh every provider in `providers`, stopping at the first failure.
    pub fn refresh_all(&self, providers: &[ProviderId]) -> StoreResult<Vec<StoredCatalog>> {
        let now = now_unix();
        providers
            .iter()
            .map(|provider| self.refresh_at(provider, now))
            .collect()
    }

    pub fn status(&self) -> StoreResult<Vec<SnapshotStatus>> {
        self.status_at(now_unix())
    }

    /// Snapshot age and freshness for every configured provider.
    pub fn status_at(&self, now: u64) -> StoreResult<Vec<SnapshotStatus>> {
        self.config
            .provider_ids()
            .into_iter()
            .map(|provider| {
                let max_age = self.config.max_age(&provider);
                let status = match self.store.get_catalog(&provider)? {
                    Some(stored) => SnapshotStatus {
                        kind: Some(stored.catalog.kind().to_string()),
                        rows: stored.catalog.len(),
                        refreshed_at: Some(stored.refreshed_at),
                        age_secs: Some(stored.age(now).as_secs()),
                        fresh: stored.is_fresh(now, max_age),
                        provider,
                    },
                    None => SnapshotStatus {
                        provider,
                        kind: None,
                        rows: 0,
                        refreshed_at: None,
                        age_secs: None,
                        fresh: false,
                    },
                };
                Ok::<_, StoreError>(status)
            })
            .collect()
    }
}

impl CatalogSource for ProviderGateway {
    fn snapshot(&self, provider: &ProviderId) -> Result<Arc<Catalog>, MatchError> {
        match self.load(provider) {
            Ok(stored) => Ok(Arc::new(stored.catalog)),
            Err(e) => {
                warn!(%provider, error = %e, "table unavailable");
                Err(MatchError::MissingTable {
                    provider: provider.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
