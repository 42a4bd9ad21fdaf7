//! cloud-pricing.toml configuration parser.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

pub const DEFAULT_MAX_AGE_DAYS: u64 = 7;
pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_GPU_RAM_GB: f64 = 10.0;
pub const DEFAULT_RAM_PER_CPU_ADVISORY_GB: f64 = 8.0;

const DATA_DIR_NAME: &str = ".cloud-pricing-data";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub query: QueryDefaults,
    /// GPU model name → memory of one GPU in GB.
    #[serde(default = "default_gpu_memory")]
    pub gpu_memory: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
    pub max_age_days: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory with one normalized `<provider>.json` table per provider.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub max_age_days: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryDefaults {
    pub limit: Option<usize>,
    pub gpu_ram_gb: Option<f64>,
    pub ram_per_cpu_advisory_gb: Option<f64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            source: SourceConfig::default(),
            providers: default_providers(),
            query: QueryDefaults::default(),
            gpu_memory: default_gpu_memory(),
        }
    }
}

impl PricingConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PricingConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Directory holding the snapshot database.
    pub fn data_dir(&self) -> PathBuf {
        match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DATA_DIR_NAME),
        }
    }

    /// Directory the provider tables are read from on refresh.
    pub fn source_dir(&self) -> PathBuf {
        match &self.source.dir {
            Some(dir) => dir.clone(),
            None => self.data_dir().join("tables"),
        }
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id.clone()).collect()
    }

    /// How long a provider snapshot stays fresh.
    pub fn max_age(&self, provider: &ProviderId) -> Duration {
        let days = self
            .providers
            .iter()
            .find(|p| &p.id == provider)
            .and_then(|p| p.max_age_days)
            .or(self.storage.max_age_days)
            .unwrap_or(DEFAULT_MAX_AGE_DAYS);
        Duration::from_secs(days * SECONDS_PER_DAY)
    }

    pub fn default_limit(&self) -> usize {
        self.query.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn default_gpu_ram_gb(&self) -> f64 {
        self.query.gpu_ram_gb.unwrap_or(DEFAULT_GPU_RAM_GB)
    }

    pub fn ram_per_cpu_advisory_gb(&self) -> f64 {
        self.query
            .ram_per_cpu_advisory_gb
            .unwrap_or(DEFAULT_RAM_PER_CPU_ADVISORY_GB)
    }

    /// Memory of a single GPU of the given model, matched case-insensitively.
    pub fn gpu_memory_gb(&self, model: &str) -> Option<f64> {
        self.gpu_memory
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(model.trim()))
            .map(|(_, gb)| *gb)
    }

    /// Scaffold a config that reads tables from `source_dir`.
    pub fn scaffold(source_dir: &Path) -> Self {
        PricingConfig {
            storage: StorageConfig {
                data_dir: None,
                max_age_days: Some(DEFAULT_MAX_AGE_DAYS),
            },
            source: SourceConfig {
                dir: Some(source_dir.to_path_buf()),
            },
            query: QueryDefaults {
                limit: Some(DEFAULT_LIMIT),
                gpu_ram_gb: Some(DEFAULT_GPU_RAM_GB),
                ram_per_cpu_advisory_gb: Some(DEFAULT_RAM_PER_CPU_ADVISORY_GB),
            },
            ..Self::default()
        }
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    ["aws", "azure", "gcp"]
        .into_iter()
        .filter_map(|name| ProviderId::parse(name).ok())
        .map(|id| ProviderConfig {
            id,
            max_age_days: None,
        })
        .collect()
}

fn default_gpu_memory() -> BTreeMap<String, f64> {
    [
        ("K80", 12.0),
        ("M60", 8.0),
        ("P100", 16.0),
        ("P4", 8.0),
        ("P40", 24.0),
        ("T4", 16.0),
        ("V100", 16.0),
    ]
    .into_iter()
    .map(|(name, gb)| (name.to_string(), gb))
    .collect()
}
