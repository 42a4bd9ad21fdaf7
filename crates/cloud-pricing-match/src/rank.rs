//! The shared "produce ranked rows given thresholds" seam.

use cloud_pricing_core::Catalog;

use crate::custom::CustomInstanceComposer;
use crate::fixed::FixedInstanceMatcher;
use crate::query::{Advisory, InstanceQuery};
use crate::table::ResultTable;

/// Ranked rows for one provider plus any advisories raised on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranked {
    pub table: ResultTable,
    pub advisories: Vec<Advisory>,
}

/// Anything that can turn resource thresholds into price-ranked rows.
pub trait RankInstances {
    fn rank(&self, query: &InstanceQuery) -> Ranked;
}

impl RankInstances for FixedInstanceMatcher<'_> {
    fn rank(&self, query: &InstanceQuery) -> Ranked {
        Ranked {
            table: self.filter(query),
            advisories: Vec::new(),
        }
    }
}

impl RankInstances for CustomInstanceComposer<'_> {
    fn rank(&self, query: &InstanceQuery) -> Ranked {
        let (table, advisories) = self.filter(query);
        Ranked { table, advisories }
    }
}

/// Dispatch on the catalog shape: fixed catalogs are filtered, custom ones composed.
impl RankInstances for Catalog {
    fn rank(&self, query: &InstanceQuery) -> Ranked {
        match self {
            Catalog::Fixed { instances } => FixedInstanceMatcher::new(instances).rank(query),
            Catalog::Custom { cpu, gpu } => CustomInstanceComposer::new(cpu, gpu).rank(query),
        }
    }
}
