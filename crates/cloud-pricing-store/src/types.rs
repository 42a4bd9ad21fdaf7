//! Persisted snapshot types.

use std::time::Duration;

use cloud_pricing_core::{Catalog, ProviderId};
use serde::{Deserialize, Serialize};

/// A provider's catalog as of its last refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCatalog {
    pub provider: ProviderId,
    /// Unix timestamp (seconds) of the refresh that produced this snapshot.
    pub refreshed_at: u64,
    pub catalog: Catalog,
}

impl StoredCatalog {
    pub fn table_key(&self) -> String {
        self.provider.to_string()
    }

    pub fn age(&self, now: u64) -> Duration {
        Duration::from_secs(now.saturating_sub(self.refreshed_at))
    }

    /// Fresh while strictly younger than `max_age`.
    pub fn is_fresh(&self, now: u64, max_age: Duration) -> bool {
        self.age(now) < max_age
    }
}

/// Snapshot summary for one configured provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStatus {
    pub provider: ProviderId,
    /// `fixed` or `custom`; `None` when no snapshot exists.
    pub kind: Option<String>,
    pub rows: usize,
    pub refreshed_at: Option<u64>,
    pub age_secs: Option<u64>,
    pub fresh: bool,
}
