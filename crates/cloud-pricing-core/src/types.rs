//! Shared pricing types used across cloud-pricing crates.
//!
//! Prices are USD per hour, memory is GB. A price of `None` means the
//! provider did not publish one (unknown price).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A predefined instance type from a fixed catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Provider SKU / instance type label, e.g. `m5.xlarge`.
    pub name: String,
    pub cpus: u32,
    pub ram_gb: f64,
    #[serde(default)]
    pub gpus: u32,
    /// Total GPU memory across every GPU on the instance.
    #[serde(default)]
    pub gpu_ram_gb: f64,
    #[serde(default)]
    pub gpu_name: String,
    #[serde(default)]
    pub price_per_hour: Option<f64>,
    #[serde(default)]
    pub spot_price_per_hour: Option<f64>,
    /// Provider-opaque columns (region, OS, tenancy, ...). Only shown in verbose output.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl InstanceRecord {
    /// A CPU-only record with an on-demand price.
    pub fn new(name: &str, cpus: u32, ram_gb: f64, price_per_hour: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            cpus,
            ram_gb,
            gpus: 0,
            gpu_ram_gb: 0.0,
            gpu_name: String::new(),
            price_per_hour,
            spot_price_per_hour: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_gpus(mut self, gpus: u32, gpu_ram_gb: f64, gpu_name: &str) -> Self {
        self.gpus = gpus;
        self.gpu_ram_gb = gpu_ram_gb;
        self.gpu_name = gpu_name.to_string();
        self
    }

    pub fn with_spot(mut self, spot_price_per_hour: Option<f64>) -> Self {
        self.spot_price_per_hour = spot_price_per_hour;
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Price for the requested market (spot or on-demand).
    pub fn price(&self, spot: bool) -> Option<f64> {
        if spot {
            self.spot_price_per_hour
        } else {
            self.price_per_hour
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_number(&self.name, "ram_gb", self.ram_gb)?;
        check_number(&self.name, "gpu_ram_gb", self.gpu_ram_gb)?;
        if let Some(price) = self.price_per_hour {
            check_number(&self.name, "price_per_hour", price)?;
        }
        if let Some(price) = self.spot_price_per_hour {
            check_number(&self.name, "spot_price_per_hour", price)?;
        }
        if self.gpus == 0 && self.gpu_ram_gb > 0.0 {
            return Err(ValidationError::GpuRamWithoutGpus {
                record: self.name.clone(),
                gpu_ram_gb: self.gpu_ram_gb,
            });
        }
        Ok(())
    }
}

/// Per-unit CPU and RAM pricing for one customizable shape family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuRamUnitPrice {
    pub name: String,
    /// Cost per CPU-hour.
    pub price_per_hour: f64,
    /// Cost per GB-RAM-hour.
    pub ram_price_per_hour: f64,
}

impl CpuRamUnitPrice {
    pub fn new(name: &str, price_per_hour: f64, ram_price_per_hour: f64) -> Self {
        Self {
            name: name.to_string(),
            price_per_hour,
            ram_price_per_hour,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_number(&self.name, "price_per_hour", self.price_per_hour)?;
        check_number(&self.name, "ram_price_per_hour", self.ram_price_per_hour)
    }
}

/// A GPU SKU that can be attached to a customizable instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuUnitOption {
    pub name: String,
    /// Memory of a single GPU.
    pub gpu_ram_gb: f64,
    /// Cost per GPU-hour for one unit.
    pub price_per_hour: f64,
    /// Maximum number of GPUs attachable to one instance.
    pub max_count: u32,
}

impl GpuUnitOption {
    pub fn new(name: &str, gpu_ram_gb: f64, price_per_hour: f64, max_count: u32) -> Self {
        Self {
            name: name.to_string(),
            gpu_ram_gb,
            price_per_hour,
            max_count,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_number(&self.name, "price_per_hour", self.price_per_hour)?;
        if !self.gpu_ram_gb.is_finite() || self.gpu_ram_gb <= 0.0 {
            return Err(ValidationError::InvalidGpuRam {
                option: self.name.clone(),
                gpu_ram_gb: self.gpu_ram_gb,
            });
        }
        if self.max_count == 0 {
            return Err(ValidationError::ZeroMaxCount {
                option: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// The pricing table of a single provider.
///
/// Fixed providers publish a list of predefined instance types; custom
/// providers publish unit prices that are composed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Catalog {
    Fixed {
        instances: Vec<InstanceRecord>,
    },
    Custom {
        cpu: Vec<CpuRamUnitPrice>,
        #[serde(default)]
        gpu: Vec<GpuUnitOption>,
    },
}

impl Catalog {
    pub fn kind(&self) -> &'static str {
        match self {
            Catalog::Fixed { .. } => "fixed",
            Catalog::Custom { .. } => "custom",
        }
    }

    /// Number of rows in the table (CPU/RAM rows for custom catalogs).
    pub fn len(&self) -> usize {
        match self {
            Catalog::Fixed { instances } => instances.len(),
            Catalog::Custom { cpu, .. } => cpu.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every row, stopping at the first invalid one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Catalog::Fixed { instances } => instances.iter().try_for_each(InstanceRecord::validate),
            Catalog::Custom { cpu, gpu } => {
                cpu.iter().try_for_each(CpuRamUnitPrice::validate)?;
                gpu.iter().try_for_each(GpuUnitOption::validate)
            }
        }
    }
}

/// Whether a price counts as known for ranking.
///
/// A literal zero is treated the same as a missing price: provider tables
/// use 0 where no price was published.
pub fn is_known_price(price: Option<f64>) -> bool {
    matches!(price, Some(p) if p.is_finite() && p > 0.0)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{record}: {field} must be a finite, non-negative number (got {value})")]
    InvalidNumber {
        record: String,
        field: &'static str,
        value: f64,
    },
    #[error("{record}: gpu_ram_gb is {gpu_ram_gb} but the instance has no GPUs")]
    GpuRamWithoutGpus { record: String, gpu_ram_gb: f64 },
    #[error("{option}: gpu_ram_gb must be positive (got {gpu_ram_gb})")]
    InvalidGpuRam { option: String, gpu_ram_gb: f64 },
    #[error("{option}: max_count must be at least 1")]
    ZeroMaxCount { option: String },
}

fn check_number(record: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidNumber {
            record: record.to_string(),
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_price_excludes_zero_and_missing() {
        assert!(is_known_price(Some(0.2)));
        assert!(!is_known_price(Some(0.0)));
        assert!(!is_known_price(None));
        assert!(!is_known_price(Some(f64::NAN)));
    }

    #[test]
    fn gpu_ram_requires_gpus() {
        let mut record = InstanceRecord::new("odd", 4, 16.0, Some(0.1));
        record.gpu_ram_gb = 16.0;
        assert!(matches!(
            record.validate(),
            Err(ValidationError::GpuRamWithoutGpus { .. })
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let record = InstanceRecord::new("neg", 4, 16.0, Some(-1.0));
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("price_per_hour"));
    }

    #[test]
    fn gpu_option_needs_capacity() {
        assert!(GpuUnitOption::new("T4", 16.0, 0.35, 0).validate().is_err());
        assert!(GpuUnitOption::new("T4", 0.0, 0.35, 4).validate().is_err());
        assert!(GpuUnitOption::new("T4", 16.0, 0.35, 4).validate().is_ok());
    }

    #[test]
    fn parse_fixed_catalog_with_opaque_columns() {
        let json = r#"{
            "kind": "fixed",
            "instances": [
                {"name": "m5.xlarge", "cpus": 4, "ram_gb": 16.0,
                 "price_per_hour": 0.192, "region": "US East (Ohio)", "tenancy": "Shared"}
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let Catalog::Fixed { instances } = &catalog else {
            panic!("expected a fixed catalog");
        };
        assert_eq!(instances[0].gpus, 0);
        assert_eq!(instances[0].spot_price_per_hour, None);
        assert_eq!(instances[0].extra["region"], "US East (Ohio)");
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn parse_custom_catalog_without_gpus() {
        let json = r#"{"kind": "custom", "cpu": [{"name": "N1", "price_per_hour": 0.033, "ram_price_per_hour": 0.0045}]}"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.kind(), "custom");
        assert_eq!(catalog.len(), 1);
    }
}
