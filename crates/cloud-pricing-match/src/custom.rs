//! Price composition for customizable instance shapes.
//!
//! Custom providers bill CPU, RAM and GPUs per unit. A quote is built for
//! every CPU/RAM family, and when GPUs are requested every family is paired
//! with every GPU option:
//!
//! ```text
//! total = cpu_rate * cpus + ram_rate * ram_gb + gpu_rate * count
//! count = min(max(min_gpus, ceil(min_gpu_ram_gb / gpu_ram_gb)), max_count)
//! ```
//!
//! GPU options that cannot reach the requested GPU memory even at
//! `max_count` are still quoted at `max_count` (best effort) and reported
//! through [`Advisory::GpuRamShortfall`].

use cloud_pricing_core::{CpuRamUnitPrice, GpuUnitOption};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::{Advisory, InstanceQuery, PriceKind};
use crate::table::{Column, ResultRow, ResultTable};

/// Label of the `Type` column for composed rows.
pub const CUSTOM_TYPE: &str = "custom";

/// A GPU bundle attached to a composed quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedGpu {
    pub name: String,
    pub count: u32,
    /// Total memory across the attached GPUs.
    pub gpu_ram_gb: f64,
    /// Hourly price of all attached GPUs.
    pub price_per_hour: f64,
    /// Whether the bundle reaches the requested GPU memory.
    pub meets_ram_request: bool,
}

/// A synthesized price for one CPU/RAM family, optionally with GPUs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedQuote {
    pub name: String,
    pub cpus: u32,
    pub ram_gb: f64,
    pub cpu_price_per_hour: f64,
    pub ram_price_per_hour: f64,
    pub gpu: Option<AttachedGpu>,
    pub price_per_hour: f64,
}

impl ComposedQuote {
    fn to_row(&self) -> ResultRow {
        let mut row = ResultRow::new(&self.name, self.cpus, self.ram_gb);
        row.instance_type = Some(CUSTOM_TYPE.to_string());
        if let Some(gpu) = &self.gpu {
            row.gpus = Some(gpu.count);
            row.gpu_ram_gb = Some(gpu.gpu_ram_gb);
            row.gpu_name = Some(gpu.name.clone());
        }
        row.price_per_hour = Some(self.price_per_hour);
        row
    }
}

/// Quotes and advisories from one composition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    pub quotes: Vec<ComposedQuote>,
    pub advisories: Vec<Advisory>,
}

impl Composition {
    /// Project quotes into the fixed display column set.
    pub fn to_table(&self, with_gpus: bool) -> ResultTable {
        let mut columns = vec![Column::Name, Column::Type, Column::Cpus, Column::RamGb];
        if with_gpus {
            columns.extend([Column::Gpus, Column::GpuRamGb, Column::GpuName]);
        }
        columns.push(Column::Price);
        ResultTable::new(columns, self.quotes.iter().map(ComposedQuote::to_row).collect())
    }
}

/// Composes quotes from per-unit CPU/RAM and GPU price tables.
#[derive(Debug, Clone, Copy)]
pub struct CustomInstanceComposer<'a> {
    cpu: &'a [CpuRamUnitPrice],
    gpu: &'a [GpuUnitOption],
}

impl<'a> CustomInstanceComposer<'a> {
    pub fn new(cpu: &'a [CpuRamUnitPrice], gpu: &'a [GpuUnitOption]) -> Self {
        Self { cpu, gpu }
    }

    /// Build every quote for the query, cheapest first. Never truncates.
    pub fn compose(&self, query: &InstanceQuery) -> Composition {
        let mut advisories = Vec::new();
        if let Some(advisory) = ram_per_cpu_advisory(query) {
            debug!(%advisory, "custom shape advisory");
            advisories.push(advisory);
        }

        let base: Vec<ComposedQuote> = self
            .cpu
            .iter()
            .map(|unit| cpu_ram_quote(unit, query.cpus, query.ram_gb))
            .collect();

        let mut quotes = if query.wants_gpus() {
            let bundles: Vec<AttachedGpu> = self
                .gpu
                .iter()
                .map(|option| attach_gpus(option, query.min_gpus, query.min_gpu_ram_gb))
                .collect();

            for bundle in bundles.iter().filter(|b| !b.meets_ram_request) {
                let advisory = Advisory::GpuRamShortfall {
                    option: bundle.name.clone(),
                    count: bundle.count,
                    gpu_ram_gb: bundle.gpu_ram_gb,
                    requested_gb: query.min_gpu_ram_gb,
                };
                debug!(%advisory, "best-effort gpu bundle");
                advisories.push(advisory);
            }

            base.iter()
                .flat_map(|quote| bundles.iter().map(move |bundle| with_gpu(quote, bundle)))
                .collect()
        } else {
            base
        };

        quotes.sort_by(|a, b| a.price_per_hour.total_cmp(&b.price_per_hour));

        debug!(
            families = self.cpu.len(),
            gpu_options = self.gpu.len(),
            quotes = quotes.len(),
            "custom quotes composed"
        );

        Composition { quotes, advisories }
    }

    /// Composed quotes as a result table ranked by on-demand price.
    pub fn filter(&self, query: &InstanceQuery) -> (ResultTable, Vec<Advisory>) {
        let composition = self.compose(query);
        let mut table = composition.to_table(query.wants_gpus());
        table.sort_by_price(PriceKind::OnDemand);
        (table, composition.advisories)
    }
}

/// Number of GPUs of `option` needed for `min_gpus` and `min_gpu_ram_gb`,
/// capped at what the option can attach.
pub fn gpu_count(option: &GpuUnitOption, min_gpus: u32, min_gpu_ram_gb: f64) -> u32 {
    let for_ram = if option.gpu_ram_gb > 0.0 {
        (min_gpu_ram_gb / option.gpu_ram_gb).ceil()
    } else {
        f64::INFINITY
    };
    let wanted = f64::from(min_gpus).max(for_ram);
    // Float-to-int casts saturate, so an infinite request lands on max_count.
    (wanted as u32).min(option.max_count)
}

fn attach_gpus(option: &GpuUnitOption, min_gpus: u32, min_gpu_ram_gb: f64) -> AttachedGpu {
    let count = gpu_count(option, min_gpus, min_gpu_ram_gb);
    let gpu_ram_gb = option.gpu_ram_gb * f64::from(count);
    AttachedGpu {
        name: option.name.clone(),
        count,
        gpu_ram_gb,
        price_per_hour: option.price_per_hour * f64::from(count),
        meets_ram_request: gpu_ram_gb >= min_gpu_ram_gb,
    }
}

fn cpu_ram_quote(unit: &CpuRamUnitPrice, cpus: u32, ram_gb: f64) -> ComposedQuote {
    let cpu_price_per_hour = unit.price_per_hour * f64::from(cpus);
    let ram_price_per_hour = unit.ram_price_per_hour * ram_gb;
    ComposedQuote {
        name: unit.name.clone(),
        cpus,
        ram_gb,
        cpu_price_per_hour,
        ram_price_per_hour,
        gpu: None,
        price_per_hour: cpu_price_per_hour + ram_price_per_hour,
    }
}

fn with_gpu(quote: &ComposedQuote, bundle: &AttachedGpu) -> ComposedQuote {
    ComposedQuote {
        gpu: Some(bundle.clone()),
        price_per_hour: quote.price_per_hour + bundle.price_per_hour,
        ..quote.clone()
    }
}

fn ram_per_cpu_advisory(query: &InstanceQuery) -> Option<Advisory> {
    if query.cpus == 0 {
        return None;
    }
    let ram_per_cpu_gb = query.ram_gb / f64::from(query.cpus);
    (ram_per_cpu_gb > query.ram_per_cpu_advisory_gb).then_some(Advisory::HighRamPerCpu {
        ram_per_cpu_gb,
        threshold_gb: query.ram_per_cpu_advisory_gb,
    })
}
