//! Result tables handed to the presentation layer.
//!
//! A [`ResultTable`] is an ordered list of rows plus the named column set
//! that should be rendered. Tables from different providers can be
//! concatenated even when their column sets differ; a row simply has no
//! value for a column its provider never produced.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use cloud_pricing_core::ProviderId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::PriceKind;

/// A named output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Provider,
    Name,
    Type,
    Cpus,
    RamGb,
    Gpus,
    GpuRamGb,
    GpuName,
    Price,
    SpotPrice,
    /// A provider-opaque column such as `region`.
    Extra(String),
}

impl Column {
    pub fn label(&self) -> &str {
        match self {
            Column::Provider => "Provider",
            Column::Name => "Name",
            Column::Type => "Type",
            Column::Cpus => "CPUs",
            Column::RamGb => "RAM (GB)",
            Column::Gpus => "GPUs",
            Column::GpuRamGb => "GPU RAM (GB)",
            Column::GpuName => "GPU Name",
            Column::Price => "Price ($/hr)",
            Column::SpotPrice => "Spot ($/hr)",
            Column::Extra(name) => name,
        }
    }

    pub fn is_price(&self) -> bool {
        matches!(self, Column::Price | Column::SpotPrice)
    }
}

/// One output row. Fields a projection leaves out are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub provider: Option<ProviderId>,
    pub name: String,
    pub instance_type: Option<String>,
    pub cpus: u32,
    pub ram_gb: f64,
    pub gpus: Option<u32>,
    pub gpu_ram_gb: Option<f64>,
    pub gpu_name: Option<String>,
    pub price_per_hour: Option<f64>,
    pub spot_price_per_hour: Option<f64>,
    pub extra: BTreeMap<String, Value>,
}

impl ResultRow {
    pub fn new(name: &str, cpus: u32, ram_gb: f64) -> Self {
        Self {
            provider: None,
            name: name.to_string(),
            instance_type: None,
            cpus,
            ram_gb,
            gpus: None,
            gpu_ram_gb: None,
            gpu_name: None,
            price_per_hour: None,
            spot_price_per_hour: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn price(&self, kind: PriceKind) -> Option<f64> {
        match kind {
            PriceKind::OnDemand => self.price_per_hour,
            PriceKind::Spot => self.spot_price_per_hour,
        }
    }

    /// Value of `column` for this row; `None` when the row has no value.
    pub fn cell(&self, column: &Column) -> Option<Value> {
        match column {
            Column::Provider => self.provider.as_ref().map(|p| Value::from(p.as_str())),
            Column::Name => Some(Value::from(self.name.as_str())),
            Column::Type => self.instance_type.as_deref().map(Value::from),
            Column::Cpus => Some(Value::from(self.cpus)),
            Column::RamGb => Some(Value::from(self.ram_gb)),
            Column::Gpus => self.gpus.map(Value::from),
            Column::GpuRamGb => self.gpu_ram_gb.map(Value::from),
            Column::GpuName => self.gpu_name.as_deref().map(Value::from),
            Column::Price => self.price_per_hour.map(Value::from),
            Column::SpotPrice => self.spot_price_per_hour.map(Value::from),
            Column::Extra(name) => self.extra.get(name).cloned(),
        }
    }
}

/// An ordered set of rows with the columns to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<Column>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(columns: Vec<Column>, rows: Vec<ResultRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stable ascending sort by the selected price; rows without one sort last.
    pub fn sort_by_price(&mut self, kind: PriceKind) {
        self.rows
            .sort_by(|a, b| compare_prices(a.price(kind), b.price(kind)));
    }

    /// Keep at most `limit` rows. `None` keeps everything.
    pub fn truncate(&mut self, limit: Option<usize>) {
        if let Some(limit) = limit {
            self.rows.truncate(limit);
        }
    }

    /// Tag every row with `provider` and put the provider column first.
    pub fn with_provider(mut self, provider: &ProviderId) -> Self {
        for row in &mut self.rows {
            row.provider = Some(provider.clone());
        }
        if !self.columns.contains(&Column::Provider) {
            self.columns.insert(0, Column::Provider);
        }
        self
    }

    /// Concatenate tables in order. The column set is the union of all
    /// inputs, ordered by first appearance.
    pub fn concat(tables: impl IntoIterator<Item = ResultTable>) -> Self {
        let mut out = ResultTable::default();
        for table in tables {
            for column in table.columns {
                if !out.columns.contains(&column) {
                    out.columns.push(column);
                }
            }
            out.rows.extend(table.rows);
        }
        out
    }

    /// Rows as JSON objects keyed by column label, in column order. Missing cells are `null`.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.label().to_string(), row.cell(c).unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }
}

fn compare_prices(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => a.total_cmp(&b),
        (Some(a), _) if !a.is_nan() => Ordering::Less,
        (_, Some(b)) if !b.is_nan() => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
