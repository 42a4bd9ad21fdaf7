//! Resource thresholds and ranking options shared by every matcher.

use std::fmt;

use cloud_pricing_core::config::{
    DEFAULT_GPU_RAM_GB, DEFAULT_LIMIT, DEFAULT_RAM_PER_CPU_ADVISORY_GB,
};
use serde::{Deserialize, Serialize};

use crate::table::Column;

/// Which hourly price a query ranks by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    #[default]
    OnDemand,
    /// Discounted, preemptible price.
    Spot,
}

impl PriceKind {
    pub fn from_spot(spot: bool) -> Self {
        if spot { PriceKind::Spot } else { PriceKind::OnDemand }
    }

    pub fn is_spot(self) -> bool {
        self == PriceKind::Spot
    }

    /// The result column holding this price.
    pub fn column(self) -> Column {
        match self {
            PriceKind::OnDemand => Column::Price,
            PriceKind::Spot => Column::SpotPrice,
        }
    }
}

/// Minimum resources plus ranking options for a single filter call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceQuery {
    pub cpus: u32,
    pub ram_gb: f64,
    /// GPUs are only used as a filter when this is non-zero.
    pub min_gpus: u32,
    /// Minimum total GPU memory across all attached GPUs.
    pub min_gpu_ram_gb: f64,
    /// Maximum number of rows to return; `None` is unbounded.
    pub limit: Option<usize>,
    /// Return every column instead of the display set.
    pub verbose: bool,
    /// Keep rows whose selected price is zero or missing.
    pub include_unknown_price: bool,
    pub price: PriceKind,
    /// RAM per CPU above which custom shapes get an advisory.
    pub ram_per_cpu_advisory_gb: f64,
}

impl InstanceQuery {
    pub fn new(cpus: u32, ram_gb: f64) -> Self {
        Self {
            cpus,
            ram_gb,
            min_gpus: 0,
            min_gpu_ram_gb: DEFAULT_GPU_RAM_GB,
            limit: Some(DEFAULT_LIMIT),
            verbose: false,
            include_unknown_price: false,
            price: PriceKind::OnDemand,
            ram_per_cpu_advisory_gb: DEFAULT_RAM_PER_CPU_ADVISORY_GB,
        }
    }

    pub fn gpus(mut self, min_gpus: u32, min_gpu_ram_gb: f64) -> Self {
        self.min_gpus = min_gpus;
        self.min_gpu_ram_gb = min_gpu_ram_gb;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn include_unknown_price(mut self, include: bool) -> Self {
        self.include_unknown_price = include;
        self
    }

    pub fn spot(mut self, spot: bool) -> Self {
        self.price = PriceKind::from_spot(spot);
        self
    }

    pub fn ram_per_cpu_advisory_gb(mut self, threshold_gb: f64) -> Self {
        self.ram_per_cpu_advisory_gb = threshold_gb;
        self
    }

    pub fn wants_gpus(&self) -> bool {
        self.min_gpus > 0
    }
}

/// A non-blocking condition reported alongside results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Custom shapes with this much RAM per CPU may be billed extra.
    HighRamPerCpu { ram_per_cpu_gb: f64, threshold_gb: f64 },
    /// Even `max_count` GPUs of this option cannot reach the requested GPU memory.
    GpuRamShortfall {
        option: String,
        count: u32,
        gpu_ram_gb: f64,
        requested_gb: f64,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::HighRamPerCpu {
                ram_per_cpu_gb,
                threshold_gb,
            } => write!(
                f,
                "{ram_per_cpu_gb:.1} GB of RAM per CPU is above {threshold_gb} GB and may lead to additional costs"
            ),
            Advisory::GpuRamShortfall {
                option,
                count,
                gpu_ram_gb,
                requested_gb,
            } => write!(
                f,
                "{count}x {option} provides {gpu_ram_gb} GB of GPU RAM, less than the requested {requested_gb} GB"
            ),
        }
    }
}
