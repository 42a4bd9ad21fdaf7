pub mod config;
pub mod provider;
pub mod types;

pub use config::PricingConfig;
pub use provider::{ProviderError, ProviderId, ProviderSelection};
pub use types::*;
