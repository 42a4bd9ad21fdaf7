//! Rendering of result tables: aligned text, CSV and JSON.

use std::path::Path;

use anyhow::bail;
use cloud_pricing_match::{Column, ResultTable};
use cloud_pricing_store::SnapshotStatus;
use serde_json::Value;

const MISSING: &str = "-";

/// Aligned text table. Numbers are right-aligned, prices shown with 4 decimals.
pub fn format_table(table: &ResultTable) -> String {
    if table.is_empty() {
        return "No instances match the requested resources.\n".to_string();
    }

    let columns = table.columns();
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| format_cell(c, row.cell(c).as_ref()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.label().chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad(c.label(), *w, right_aligned(c)))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(columns.iter().zip(&widths))
            .map(|(cell, (c, w))| pad(cell, *w, right_aligned(c)))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}

fn right_aligned(column: &Column) -> bool {
    matches!(
        column,
        Column::Cpus | Column::RamGb | Column::Gpus | Column::GpuRamGb | Column::Price | Column::SpotPrice
    )
}

fn pad(text: &str, width: usize, right: bool) -> String {
    if right {
        format!("{text:>width$}")
    } else {
        format!("{text:<width$}")
    }
}

fn format_cell(column: &Column, value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) if s.is_empty() => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if column.is_price() => match n.as_f64() {
            Some(price) => format!("{price:.4}"),
            None => n.to_string(),
        },
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Write `table` to `path`, choosing the format from the file extension.
pub fn write_file(path: &Path, table: &ResultTable) -> anyhow::Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let bytes = match extension.as_deref() {
        Some("csv") => to_csv(table)?,
        Some("json") => to_json(table)?.into_bytes(),
        _ => bail!(
            "unsupported output file {}: use a .csv or .json extension",
            path.display()
        ),
    };
    std::fs::write(path, bytes)?;
    Ok(())
}

/// CSV with a header row of column labels; missing cells are empty.
pub fn to_csv(table: &ResultTable) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns().iter().map(Column::label))?;
    for row in table.rows() {
        writer.write_record(table.columns().iter().map(|c| match row.cell(c) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        }))?;
    }
    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// JSON array of row objects keyed by column label.
pub fn to_json(table: &ResultTable) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(&table.records())?;
    out.push('\n');
    Ok(out)
}

pub fn format_status(status: &[SnapshotStatus]) -> String {
    let mut out = String::new();
    for entry in status {
        match (&entry.kind, entry.age_secs) {
            (Some(kind), Some(age)) => {
                let marker = if entry.fresh { "✓" } else { "⚠️ stale" };
                out.push_str(&format!(
                    "  {:<10} {:<7} {:>6} rows  {:>8}  {marker}\n",
                    entry.provider.as_str(),
                    kind,
                    entry.rows,
                    format_age(age),
                ));
            }
            _ => {
                out.push_str(&format!("  {:<10} no snapshot\n", entry.provider.as_str()));
            }
        }
    }
    out
}

fn format_age(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}
