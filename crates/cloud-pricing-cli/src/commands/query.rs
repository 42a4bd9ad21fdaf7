use std::path::PathBuf;

use clap::Args;
use cloud_pricing_core::{PricingConfig, ProviderSelection};
use cloud_pricing_match::{InstanceQuery, MultiProviderAggregator};
use tracing::info;

use crate::output;

#[derive(Args)]
pub struct QueryArgs {
    /// Minimum number of CPUs
    #[arg(short, long, default_value_t = 4)]
    pub cpus: u32,
    /// Minimum RAM in GB
    #[arg(short, long, default_value_t = 8.0)]
    pub ram: f64,
    /// Minimum number of GPUs (0 ignores GPU columns)
    #[arg(short, long, default_value_t = 0)]
    pub gpus: u32,
    /// Minimum total GPU RAM in GB (default: [query].gpu_ram_gb, 10)
    #[arg(long)]
    pub gpu_ram: Option<f64>,
    /// Number of rows to show (default: [query].limit, 10)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    /// Show every column
    #[arg(short, long)]
    pub verbose: bool,
    /// Include instances without a published price
    #[arg(short = 'P', long)]
    pub unknown_price: bool,
    /// Rank by spot price instead of on-demand
    #[arg(short, long)]
    pub spot: bool,
    /// Refresh the selected provider tables before ranking
    #[arg(short = 'U', long)]
    pub update: bool,
    /// Comma-separated providers, or "all"
    #[arg(long, default_value = "all")]
    pub providers: String,
    /// Write results to a .csv or .json file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl QueryArgs {
    fn to_query(&self, config: &PricingConfig) -> InstanceQuery {
        InstanceQuery::new(self.cpus, self.ram)
            .gpus(self.gpus, self.gpu_ram.unwrap_or_else(|| config.default_gpu_ram_gb()))
            .limit(Some(self.limit.unwrap_or_else(|| config.default_limit())))
            .verbose(self.verbose)
            .include_unknown_price(self.unknown_price)
            .spot(self.spot)
            .ram_per_cpu_advisory_gb(config.ram_per_cpu_advisory_gb())
    }
}

pub fn query(config: &PricingConfig, args: &QueryArgs) -> anyhow::Result<()> {
    let providers = ProviderSelection::parse(&args.providers)?.resolve(&config.provider_ids())?;
    let gateway = super::open_gateway(config)?;

    if args.update {
        gateway.refresh_all(&providers)?;
    }

    let query = args.to_query(config);
    let result = MultiProviderAggregator::new(&gateway, providers).filter(&query)?;

    for advisory in &result.advisories {
        eprintln!("warning: [{}] {}", advisory.provider, advisory.advisory);
    }

    match &args.out {
        Some(path) => {
            output::write_file(path, &result.table)?;
            info!(path = %path.display(), rows = result.table.len(), "results written");
        }
        None => print!("{}", output::format_table(&result.table)),
    }

    Ok(())
}
