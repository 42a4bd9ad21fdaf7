//! Cross-provider ranking.
//!
//! Each provider is ranked without a limit so no row is dropped before the
//! global sort, then the tables are concatenated in registration order,
//! re-sorted by the selected price and truncated.

use std::collections::HashMap;
use std::sync::Arc;

use cloud_pricing_core::{Catalog, ProviderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::query::{Advisory, InstanceQuery};
use crate::rank::RankInstances;
use crate::table::ResultTable;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no pricing table available for provider {provider}: {reason}")]
    MissingTable { provider: ProviderId, reason: String },
}

/// Supplies the latest table snapshot for a provider.
pub trait CatalogSource {
    fn snapshot(&self, provider: &ProviderId) -> Result<Arc<Catalog>, MatchError>;
}

impl<S: CatalogSource + ?Sized> CatalogSource for &S {
    fn snapshot(&self, provider: &ProviderId) -> Result<Arc<Catalog>, MatchError> {
        (**self).snapshot(provider)
    }
}

impl CatalogSource for HashMap<ProviderId, Arc<Catalog>> {
    fn snapshot(&self, provider: &ProviderId) -> Result<Arc<Catalog>, MatchError> {
        self.get(provider)
            .cloned()
            .ok_or_else(|| MatchError::MissingTable {
                provider: provider.clone(),
                reason: "table not loaded".to_string(),
            })
    }
}

/// An advisory raised while ranking one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAdvisory {
    pub provider: ProviderId,
    pub advisory: Advisory,
}

/// The merged, ranked result across providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregated {
    pub table: ResultTable,
    pub advisories: Vec<ProviderAdvisory>,
}

/// Runs each provider's matcher or composer and ranks the union.
pub struct MultiProviderAggregator<S> {
    source: S,
    providers: Vec<ProviderId>,
}

impl<S: CatalogSource> MultiProviderAggregator<S> {
    /// Providers are ranked in the order given; that order breaks price ties.
    pub fn new(source: S, providers: Vec<ProviderId>) -> Self {
        Self { source, providers }
    }

    pub fn providers(&self) -> &[ProviderId] {
        &self.providers
    }

    /// Rank every provider for `query` and keep the globally cheapest rows.
    ///
    /// A provider whose table cannot be loaded fails the whole call rather
    /// than silently shrinking the result.
    pub fn filter(&self, query: &InstanceQuery) -> Result<Aggregated, MatchError> {
        let unbounded = query.clone().limit(None);

        let mut tables = Vec::with_capacity(self.providers.len());
        let mut advisories = Vec::new();

        for provider in &self.providers {
            let catalog = self.source.snapshot(provider)?;
            let ranked = catalog.rank(&unbounded);
            debug!(
                provider = %provider,
                kind = catalog.kind(),
                rows = ranked.table.len(),
                "provider ranked"
            );
            advisories.extend(ranked.advisories.into_iter().map(|advisory| ProviderAdvisory {
                provider: provider.clone(),
                advisory,
            }));
            tables.push(ranked.table.with_provider(provider));
        }

        let mut table = ResultTable::concat(tables);
        table.sort_by_price(query.price);
        table.truncate(query.limit);

        Ok(Aggregated { table, advisories })
    }
}
