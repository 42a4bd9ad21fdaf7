//! redb table definitions for the pricing snapshot store.

use redb::TableDefinition;

/// Provider snapshots keyed by `{provider_id}`, JSON-serialized [`StoredCatalog`](crate::StoredCatalog) values.
pub const CATALOGS: TableDefinition<&str, &[u8]> = TableDefinition::new("catalogs");
