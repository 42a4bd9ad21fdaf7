use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "cloud-pricing",
    about = "Find the cheapest cloud instances for a minimum resource requirement",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to cloud-pricing.toml (default: built-in settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank instances across providers by hourly price
    Query(commands::query::QueryArgs),
    /// Rebuild provider tables from the table directory
    Update {
        /// Comma-separated providers, or "all"
        #[arg(long, default_value = "all")]
        providers: String,
    },
    /// Show snapshot age and freshness per provider
    Status {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Print a cloud-pricing.toml scaffold
    Init {
        /// Directory holding the `<provider>.json` tables
        #[arg(long, default_value = "tables")]
        tables: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cloud_pricing=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cloud_pricing_core::PricingConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Query(args) => commands::query::query(&config, &args),
        Commands::Update { providers } => commands::update::update(&config, &providers),
        Commands::Status { format } => commands::status::status(&config, &format),
        Commands::Init { tables } => commands::status::init(&tables),
    }
}
