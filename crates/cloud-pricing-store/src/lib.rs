//! Pricing table snapshots: persistence, sources and refresh.
//!
//! Provider tables are read from a [`TableSource`], normalized, and kept in
//! a redb database one snapshot per provider. [`ProviderGateway`] serves
//! snapshots to the matcher and rebuilds them once they age past the
//! provider's freshness window.

pub mod error;
pub mod gateway;
pub mod normalize;
pub mod source;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use gateway::{ProviderGateway, now_unix};
pub use normalize::normalize;
pub use source::{DirectorySource, SourceError, SourceTable, TableSource};
pub use store::CatalogStore;
pub use types::{SnapshotStatus, StoredCatalog};
