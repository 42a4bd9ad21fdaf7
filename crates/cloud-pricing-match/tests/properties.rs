//! Property tests for matching, composition and cross-provider ranking.

use std::collections::HashMap;
use std::sync::Arc;

use cloud_pricing_core::{Catalog, CpuRamUnitPrice, GpuUnitOption, InstanceRecord, ProviderId, is_known_price};
use cloud_pricing_match::{
    CustomInstanceComposer, FixedInstanceMatcher, InstanceQuery, MultiProviderAggregator,
    PriceKind, RankInstances, ResultTable,
};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn arb_price() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        3 => (1u32..5_000).prop_map(|cents| Some(f64::from(cents) / 1_000.0)),
        1 => Just(None),
        1 => Just(Some(0.0)),
    ]
}

/// A fixed catalog with unique names `i0`, `i1`, ...
fn arb_instances(max: usize) -> impl Strategy<Value = Vec<InstanceRecord>> {
    proptest::collection::vec((1u32..65, 1u32..257, 0u32..5, arb_price(), arb_price()), 0..=max)
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (cpus, ram, gpus, price, spot))| {
                    let record = InstanceRecord::new(&format!("i{i}"), cpus, f64::from(ram), price)
                        .with_spot(spot);
                    if gpus > 0 {
                        record.with_gpus(gpus, f64::from(gpus) * 16.0, "T4")
                    } else {
                        record
                    }
                })
                .collect()
        })
}

fn arb_cpu_units(max: usize) -> impl Strategy<Value = Vec<CpuRamUnitPrice>> {
    proptest::collection::vec((1u32..100, 1u32..20), 0..=max).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (cpu, ram))| {
                CpuRamUnitPrice::new(&format!("F{i}"), f64::from(cpu) / 1_000.0, f64::from(ram) / 1_000.0)
            })
            .collect()
    })
}

fn arb_gpu_options(max: usize) -> impl Strategy<Value = Vec<GpuUnitOption>> {
    proptest::collection::vec((1u32..5, 1u32..300, 1u32..9), 0..=max).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (ram_x8, price, max_count))| {
                GpuUnitOption::new(&format!("G{i}"), f64::from(ram_x8 * 8), f64::from(price) / 100.0, max_count)
            })
            .collect()
    })
}

fn prices(table: &ResultTable, kind: PriceKind) -> Vec<Option<f64>> {
    table.rows().iter().map(|r| r.price(kind)).collect()
}

fn is_sorted(prices: &[Option<f64>]) -> bool {
    prices.windows(2).all(|w| match (w[0], w[1]) {
        (Some(a), Some(b)) => a <= b,
        (None, Some(_)) => false,
        _ => true,
    })
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_fixed_rows_meet_thresholds(
        instances in arb_instances(40),
        cpus in 0u32..64,
        ram in 0u32..256,
        include_unknown in any::<bool>(),
    ) {
        let query = InstanceQuery::new(cpus, f64::from(ram))
            .limit(None)
            .include_unknown_price(include_unknown);
        let table = FixedInstanceMatcher::new(&instances).filter(&query);
        for row in table.rows() {
            prop_assert!(row.cpus >= cpus);
            prop_assert!(row.ram_gb >= f64::from(ram));
        }
    }

    #[test]
    fn prop_fixed_output_sorted_by_selected_price(
        instances in arb_instances(40),
        spot in any::<bool>(),
        include_unknown in any::<bool>(),
    ) {
        let query = InstanceQuery::new(1, 1.0)
            .limit(None)
            .spot(spot)
            .include_unknown_price(include_unknown);
        let table = FixedInstanceMatcher::new(&instances).filter(&query);
        prop_assert!(is_sorted(&prices(&table, query.price)));
    }

    #[test]
    fn prop_unknown_prices_dropped_or_kept_exactly_once(
        instances in arb_instances(40),
        cpus in 0u32..32,
        spot in any::<bool>(),
    ) {
        let strict = InstanceQuery::new(cpus, 0.0).limit(None).spot(spot);
        let table = FixedInstanceMatcher::new(&instances).filter(&strict);
        prop_assert!(table.rows().iter().all(|r| is_known_price(r.price(strict.price))));

        let lenient = strict.clone().include_unknown_price(true);
        let table = FixedInstanceMatcher::new(&instances).filter(&lenient);
        let mut got: Vec<&str> = table.rows().iter().map(|r| r.name.as_str()).collect();
        let mut want: Vec<&str> = instances
            .iter()
            .filter(|r| r.cpus >= cpus)
            .map(|r| r.name.as_str())
            .collect();
        got.sort_unstable();
        want.sort_unstable();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn prop_min_gpus_filters_on_gpu_columns(
        instances in arb_instances(40),
        min_gpus in 1u32..4,
        min_gpu_ram in 0u32..64,
    ) {
        let query = InstanceQuery::new(0, 0.0)
            .gpus(min_gpus, f64::from(min_gpu_ram))
            .limit(None)
            .verbose(true);
        let table = FixedInstanceMatcher::new(&instances).filter(&query);
        for row in table.rows() {
            prop_assert!(row.gpus.unwrap_or_default() >= min_gpus);
            prop_assert!(row.gpu_ram_gb.unwrap_or_default() >= f64::from(min_gpu_ram));
        }
    }

    #[test]
    fn prop_composer_output_size(
        cpu in arb_cpu_units(6),
        gpu in arb_gpu_options(6),
        cpus in 1u32..32,
        ram in 1u32..128,
        min_gpus in 0u32..4,
    ) {
        let query = InstanceQuery::new(cpus, f64::from(ram)).gpus(min_gpus, 10.0);
        let composition = CustomInstanceComposer::new(&cpu, &gpu).compose(&query);
        let expected = if min_gpus > 0 { cpu.len() * gpu.len() } else { cpu.len() };
        prop_assert_eq!(composition.quotes.len(), expected);
        prop_assert!(composition
            .quotes
            .windows(2)
            .all(|w| w[0].price_per_hour <= w[1].price_per_hour));
    }

    #[test]
    fn prop_aggregate_limit_keeps_global_cheapest(
        aws in arb_instances(20),
        azure in arb_instances(20),
        cpu in arb_cpu_units(4),
        limit in 0usize..15,
        cpus in 0u32..16,
    ) {
        let ids: Vec<ProviderId> = ["aws", "azure", "gcp"]
            .iter()
            .map(|p| ProviderId::parse(p).unwrap())
            .collect();
        let mut tables: HashMap<ProviderId, Arc<Catalog>> = HashMap::new();
        tables.insert(ids[0].clone(), Arc::new(Catalog::Fixed { instances: aws }));
        tables.insert(ids[1].clone(), Arc::new(Catalog::Fixed { instances: azure }));
        tables.insert(ids[2].clone(), Arc::new(Catalog::Custom { cpu, gpu: Vec::new() }));

        let query = InstanceQuery::new(cpus, 4.0).limit(Some(limit));
        let unbounded = query.clone().limit(None);

        // Reference ranking: concatenate in registration order, then stable-sort.
        let mut all: Vec<(String, String, f64)> = Vec::new();
        for id in &ids {
            for row in tables[id].rank(&unbounded).table.rows() {
                if let Some(price) = row.price(PriceKind::OnDemand) {
                    all.push((id.to_string(), row.name.clone(), price));
                }
            }
        }
        all.sort_by(|a, b| a.2.total_cmp(&b.2));
        all.truncate(limit);

        let result = MultiProviderAggregator::new(&tables, ids).filter(&query).unwrap();
        prop_assert!(result.table.len() <= limit);
        let got: Vec<(String, String, f64)> = result
            .table
            .rows()
            .iter()
            .filter_map(|r| {
                let provider = r.provider.as_ref()?.to_string();
                Some((provider, r.name.clone(), r.price(PriceKind::OnDemand)?))
            })
            .collect();
        prop_assert_eq!(got, all);
    }

    #[test]
    fn prop_filters_are_idempotent(
        instances in arb_instances(30),
        cpu in arb_cpu_units(4),
        gpu in arb_gpu_options(4),
        min_gpus in 0u32..3,
    ) {
        let query = InstanceQuery::new(2, 8.0).gpus(min_gpus, 24.0).limit(None);

        let fixed = FixedInstanceMatcher::new(&instances);
        prop_assert_eq!(
            serde_json::to_string(&fixed.filter(&query).records()).unwrap(),
            serde_json::to_string(&fixed.filter(&query).records()).unwrap()
        );

        let composer = CustomInstanceComposer::new(&cpu, &gpu);
        prop_assert_eq!(composer.filter(&query), composer.filter(&query));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn fixed_catalog_end_to_end() {
    let instances = vec![
        InstanceRecord::new("A", 4, 16.0, Some(0.20)),
        InstanceRecord::new("B", 8, 32.0, Some(0.45)),
        InstanceRecord::new("C", 4, 16.0, Some(0.60)).with_gpus(1, 16.0, "T4"),
    ];
    let table = FixedInstanceMatcher::new(&instances).filter(&InstanceQuery::new(4, 16.0));

    let got: Vec<(&str, Option<f64>)> = table
        .rows()
        .iter()
        .map(|r| (r.name.as_str(), r.price_per_hour))
        .collect();
    assert_eq!(got, vec![("A", Some(0.20)), ("B", Some(0.45)), ("C", Some(0.60))]);
}

#[test]
fn custom_shape_end_to_end() {
    let cpu = vec![CpuRamUnitPrice::new("X", 0.05, 0.01)];
    let composition = CustomInstanceComposer::new(&cpu, &[]).compose(&InstanceQuery::new(4, 16.0));
    assert_eq!(composition.quotes.len(), 1);
    assert!((composition.quotes[0].price_per_hour - 0.36).abs() < 1e-9);
}
