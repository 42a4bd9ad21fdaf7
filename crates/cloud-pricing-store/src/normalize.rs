//! Turn a raw provider table into a validated catalog.

use cloud_pricing_core::{
    Catalog, GpuUnitOption, InstanceRecord, PricingConfig, ProviderId, ValidationError,
    is_known_price,
};
use tracing::debug;

use crate::source::SourceTable;

/// Validate `table` and apply the refresh-time enrichments:
/// GPU memory is filled in from `[gpu_memory]` where a table left it at zero,
/// and fixed tables that list `gpu_options` gain one row per attachable
/// GPU bundle.
pub fn normalize(
    provider: &ProviderId,
    table: SourceTable,
    config: &PricingConfig,
) -> Result<Catalog, ValidationError> {
    let catalog = match table {
        SourceTable::Fixed {
            instances,
            gpu_options,
            gpu_families,
        } => {
            let mut instances: Vec<InstanceRecord> = instances
                .into_iter()
                .map(|record| fill_instance_gpu_ram(record, config))
                .collect();
            let gpu_options: Vec<GpuUnitOption> = gpu_options
                .into_iter()
                .map(|option| fill_option_gpu_ram(option, config))
                .collect();
            gpu_options.iter().try_for_each(GpuUnitOption::validate)?;

            let attached = attach_gpus(&instances, &gpu_options, &gpu_families);
            debug!(%provider, base = instances.len(), attached = attached.len(), "fixed table normalized");
            instances.extend(attached);
            Catalog::Fixed { instances }
        }
        SourceTable::Custom { cpu, gpu } => {
            let gpu = gpu
                .into_iter()
                .map(|option| fill_option_gpu_ram(option, config))
                .collect();
            Catalog::Custom { cpu, gpu }
        }
    };
    catalog.validate()?;
    Ok(catalog)
}

fn fill_instance_gpu_ram(mut record: InstanceRecord, config: &PricingConfig) -> InstanceRecord {
    if record.gpus > 0 && record.gpu_ram_gb == 0.0 {
        if let Some(per_gpu) = config.gpu_memory_gb(&record.gpu_name) {
            record.gpu_ram_gb = per_gpu * f64::from(record.gpus);
        }
    }
    record
}

fn fill_option_gpu_ram(mut option: GpuUnitOption, config: &PricingConfig) -> GpuUnitOption {
    if option.gpu_ram_gb == 0.0 {
        if let Some(per_gpu) = config.gpu_memory_gb(&option.name) {
            option.gpu_ram_gb = per_gpu;
        }
    }
    option
}

/// Counts a GPU option can be attached in: 1, 2, 4, ... up to `max_count`.
pub fn attachable_counts(max_count: u32) -> impl Iterator<Item = u32> {
    std::iter::successors(Some(1u32), |n| n.checked_mul(2)).take_while(move |n| *n <= max_count)
}

/// One row per GPU-less instance in `families`, per option, per attachable count.
fn attach_gpus(
    instances: &[InstanceRecord],
    options: &[GpuUnitOption],
    families: &[String],
) -> Vec<InstanceRecord> {
    let mut attached = Vec::new();
    for instance in instances {
        if instance.gpus > 0 || !families.iter().any(|f| instance.name.starts_with(f.as_str())) {
            continue;
        }
        for option in options {
            for count in attachable_counts(option.max_count) {
                let scale = f64::from(count);
                let price = is_known_price(instance.price_per_hour)
                    .then(|| instance.price_per_hour.unwrap_or_default() + option.price_per_hour * scale);
                let mut row = instance.clone();
                row.name = format!("{} with {}x {}", instance.name, count, option.name);
                row.gpus = count;
                row.gpu_ram_gb = option.gpu_ram_gb * scale;
                row.gpu_name = option.name.clone();
                row.price_per_hour = price;
                row.spot_price_per_hour = None;
                attached.push(row);
            }
        }
    }
    attached
}
