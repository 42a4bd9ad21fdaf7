pub mod query;
pub mod status;
pub mod update;

use anyhow::Context;
use cloud_pricing_core::PricingConfig;
use cloud_pricing_store::{CatalogStore, DirectorySource, ProviderGateway};

const DATABASE_FILE: &str = "catalogs.redb";

/// Open the snapshot database under the configured data directory.
pub fn open_gateway(config: &PricingConfig) -> anyhow::Result<ProviderGateway> {
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let store = CatalogStore::open(&data_dir.join(DATABASE_FILE))?;
    let source = DirectorySource::new(config.source_dir());
    Ok(ProviderGateway::new(store, Box::new(source), config.clone()))
}
