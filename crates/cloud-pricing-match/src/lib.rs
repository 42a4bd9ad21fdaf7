//! Cloud pricing engine: catalog matching, custom composition, ranking.
//!
//! This crate is pure and synchronous: it reads already-loaded provider
//! tables and returns new result tables. Loading and refreshing tables is
//! `cloud-pricing-store`'s job.
//!
//! # Components
//!
//! - **`fixed`**: filter predefined instance catalogs by thresholds
//! - **`custom`**: compose quotes from per-unit CPU/RAM/GPU prices
//! - **`rank`**: the `RankInstances` trait shared by both
//! - **`aggregate`**: merge and rank results across providers
//! - **`table`**: result rows and column sets for rendering

pub mod aggregate;
pub mod custom;
pub mod fixed;
pub mod query;
pub mod rank;
pub mod table;

pub use aggregate::{Aggregated, CatalogSource, MatchError, MultiProviderAggregator, ProviderAdvisory};
pub use custom::{AttachedGpu, ComposedQuote, Composition, CustomInstanceComposer, gpu_count};
pub use fixed::FixedInstanceMatcher;
pub use query::{Advisory, InstanceQuery, PriceKind};
pub use rank::{RankInstances, Ranked};
pub use table::{Column, ResultRow, ResultTable};
