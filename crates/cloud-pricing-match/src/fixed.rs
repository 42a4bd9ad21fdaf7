//! Matching against catalogs of predefined instance types.

use std::collections::BTreeSet;

use cloud_pricing_core::{InstanceRecord, is_known_price};
use tracing::debug;

use crate::query::InstanceQuery;
use crate::table::{Column, ResultRow, ResultTable};

/// Filters a fixed catalog by resource thresholds and price availability.
///
/// The catalog is borrowed; every call builds a new [`ResultTable`].
#[derive(Debug, Clone, Copy)]
pub struct FixedInstanceMatcher<'a> {
    instances: &'a [InstanceRecord],
}

impl<'a> FixedInstanceMatcher<'a> {
    pub fn new(instances: &'a [InstanceRecord]) -> Self {
        Self { instances }
    }

    /// Rows meeting the query thresholds, cheapest first, truncated to `query.limit`.
    pub fn filter(&self, query: &InstanceQuery) -> ResultTable {
        let spot = query.price.is_spot();

        let rows: Vec<ResultRow> = self
            .instances
            .iter()
            .filter(|r| query.include_unknown_price || is_known_price(r.price(spot)))
            .filter(|r| meets_thresholds(r, query))
            .map(|r| project(r, query))
            .collect();

        debug!(
            catalog = self.instances.len(),
            matched = rows.len(),
            cpus = query.cpus,
            ram_gb = query.ram_gb,
            "fixed catalog filtered"
        );

        let mut table = ResultTable::new(self.columns(query), rows);
        table.sort_by_price(query.price);
        table.truncate(query.limit);
        table
    }

    fn columns(&self, query: &InstanceQuery) -> Vec<Column> {
        if !query.verbose {
            let mut columns = vec![Column::Name, Column::Cpus, Column::RamGb];
            if query.wants_gpus() {
                columns.extend([Column::Gpus, Column::GpuRamGb]);
            }
            columns.push(query.price.column());
            return columns;
        }

        let extra: BTreeSet<&String> = self
            .instances
            .iter()
            .flat_map(|r| r.extra.keys())
            .collect();

        let mut columns = vec![
            Column::Name,
            Column::Cpus,
            Column::RamGb,
            Column::Gpus,
            Column::GpuRamGb,
            Column::GpuName,
            Column::Price,
            Column::SpotPrice,
        ];
        columns.extend(extra.into_iter().map(|k| Column::Extra(k.clone())));
        columns
    }
}

fn meets_thresholds(record: &InstanceRecord, query: &InstanceQuery) -> bool {
    if record.cpus < query.cpus || record.ram_gb < query.ram_gb {
        return false;
    }
    if query.wants_gpus() {
        return record.gpus >= query.min_gpus && record.gpu_ram_gb >= query.min_gpu_ram_gb;
    }
    true
}

fn project(record: &InstanceRecord, query: &InstanceQuery) -> ResultRow {
    let mut row = ResultRow::new(&record.name, record.cpus, record.ram_gb);

    if query.verbose {
        row.gpus = Some(record.gpus);
        row.gpu_ram_gb = Some(record.gpu_ram_gb);
        row.gpu_name = (!record.gpu_name.is_empty()).then(|| record.gpu_name.clone());
        row.price_per_hour = record.price_per_hour;
        row.spot_price_per_hour = record.spot_price_per_hour;
        row.extra = record.extra.clone();
        return row;
    }

    if query.wants_gpus() {
        row.gpus = Some(record.gpus);
        row.gpu_ram_gb = Some(record.gpu_ram_gb);
    }
    if query.price.is_spot() {
        row.spot_price_per_hour = record.spot_price_per_hour;
    } else {
        row.price_per_hour = record.price_per_hour;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PriceKind;

    fn catalog() -> Vec<InstanceRecord> {
        vec![
            InstanceRecord::new("A", 4, 16.0, Some(0.20)),
            InstanceRecord::new("B", 8, 32.0, Some(0.45)),
            InstanceRecord::new("C", 4, 16.0, Some(0.60)).with_gpus(1, 16.0, "T4"),
        ]
    }

    fn names(table: &ResultTable) -> Vec<&str> {
        table.rows().iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn cpu_only_query_keeps_gpu_instances() {
        let instances = catalog();
        let table = FixedInstanceMatcher::new(&instances).filter(&InstanceQuery::new(4, 16.0));
        assert_eq!(names(&table), vec!["A", "B", "C"]);
        assert_eq!(
            table.columns(),
            &[Column::Name, Column::Cpus, Column::RamGb, Column::Price]
        );
    }

    #[test]
    fn thresholds_exclude_small_instances() {
        let instances = catalog();
        let table = FixedInstanceMatcher::new(&instances).filter(&InstanceQuery::new(8, 16.0));
        assert_eq!(names(&table), vec!["B"]);
    }

    #[test]
    fn gpu_query_requires_count_and_memory() {
        let instances = catalog();
        let matcher = FixedInstanceMatcher::new(&instances);

        let table = matcher.filter(&InstanceQuery::new(1, 1.0).gpus(1, 10.0));
        assert_eq!(names(&table), vec!["C"]);
        assert!(table.columns().contains(&Column::GpuRamGb));

        let table = matcher.filter(&InstanceQuery::new(1, 1.0).gpus(1, 24.0));
        assert!(table.is_empty());
    }

    #[test]
    fn unknown_prices_are_dropped_unless_requested() {
        let mut instances = catalog();
        instances.push(InstanceRecord::new("free", 4, 16.0, Some(0.0)));
        instances.push(InstanceRecord::new("unpriced", 4, 16.0, None));
        let matcher = FixedInstanceMatcher::new(&instances);

        let table = matcher.filter(&InstanceQuery::new(4, 16.0));
        assert_eq!(table.len(), 3);

        let table = matcher.filter(&InstanceQuery::new(4, 16.0).include_unknown_price(true));
        assert_eq!(names(&table), vec!["free", "A", "B", "C", "unpriced"]);
    }

    #[test]
    fn spot_ranks_by_spot_price() {
        let instances = vec![
            InstanceRecord::new("a", 2, 8.0, Some(0.10)).with_spot(Some(0.09)),
            InstanceRecord::new("b", 2, 8.0, Some(0.20)).with_spot(Some(0.04)),
            InstanceRecord::new("c", 2, 8.0, Some(0.05)),
        ];
        let q = InstanceQuery::new(2, 8.0).spot(true);
        let table = FixedInstanceMatcher::new(&instances).filter(&q);

        assert_eq!(names(&table), vec!["b", "a"]);
        assert_eq!(table.columns().last(), Some(&Column::SpotPrice));
        assert_eq!(table.rows()[0].price(PriceKind::OnDemand), None);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let instances = catalog();
        let matcher = FixedInstanceMatcher::new(&instances);

        let table = matcher.filter(&InstanceQuery::new(1, 1.0).limit(Some(2)));
        assert_eq!(names(&table), vec!["A", "B"]);

        let table = matcher.filter(&InstanceQuery::new(1, 1.0).limit(None));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn verbose_carries_opaque_columns() {
        let instances = vec![
            InstanceRecord::new("m5.xlarge", 4, 16.0, Some(0.192))
                .with_extra("region", "US East (Ohio)")
                .with_extra("tenancy", "Shared"),
        ];
        let table = FixedInstanceMatcher::new(&instances).filter(&InstanceQuery::new(1, 1.0).verbose(true));

        assert!(table.columns().contains(&Column::Extra("region".to_string())));
        assert!(table.columns().contains(&Column::SpotPrice));
        let records = table.records();
        assert_eq!(records[0]["tenancy"], "Shared");
        assert_eq!(records[0]["GPUs"], 0);
    }

    #[test]
    fn source_catalog_is_untouched() {
        let instances = catalog();
        let before = instances.clone();
        let _ = FixedInstanceMatcher::new(&instances).filter(&InstanceQuery::new(1, 1.0).verbose(true));
        assert_eq!(instances, before);
    }
}
