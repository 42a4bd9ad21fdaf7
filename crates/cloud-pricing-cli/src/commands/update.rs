use cloud_pricing_core::{PricingConfig, ProviderSelection};

pub fn update(config: &PricingConfig, providers: &str) -> anyhow::Result<()> {
    let providers = ProviderSelection::parse(providers)?.resolve(&config.provider_ids())?;
    let gateway = super::open_gateway(config)?;

    for stored in gateway.refresh_all(&providers)? {
        println!(
            "✓ {} ({}, {} rows)",
            stored.provider,
            stored.catalog.kind(),
            stored.catalog.len()
        );
    }

    Ok(())
}
