use std::path::Path;

use cloud_pricing_core::PricingConfig;

use crate::output;

pub fn status(config: &PricingConfig, format: &str) -> anyhow::Result<()> {
    let gateway = super::open_gateway(config)?;
    let status = gateway.status()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        _ => {
            print!("{}", output::format_status(&status));
        }
    }

    Ok(())
}

pub fn init(tables: &Path) -> anyhow::Result<()> {
    print!("{}", PricingConfig::scaffold(tables).to_toml_string()?);
    Ok(())
}
