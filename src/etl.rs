//! CSV -> SQLite loader with full-reload semantics.
//!
//! All six CSVs are read and validated before the store is touched, so a
//! missing or malformed input never leaves a half-written store. Writes are
//! per-table transactions; a failure while writing a later table leaves the
//! earlier ones replaced (no cross-table rollback).

use anyhow::{anyhow, bail, Context, Result};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Config;
use crate::data::{
    default_manifest_path, file_sha256, validate_schema, ColumnType, TableSpec, TABLES,
};
use crate::logging::{error, info, obj, v_count, v_str, warn, Domain, StageTimer};
use crate::model::{format_timestamp, parse_timestamp};
use crate::storage::SupplyStore;

/// One CSV parsed into store-ready rows.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub spec: TableSpec,
    pub rows: Vec<Vec<Value>>,
    /// Non-empty date cells that failed to parse and were stored as NULL.
    pub coerced_dates: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLoad {
    pub table: String,
    pub source: String,
    pub sha256: String,
    pub rows: usize,
    pub coerced_dates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadManifest {
    pub store: String,
    pub loaded_at: String,
    pub tables: Vec<TableLoad>,
}

/// Canonical date text, or NULL for anything unparseable.
pub fn clean_date(raw: &str) -> Value {
    match parse_timestamp(raw) {
        Some(ts) => Value::Text(format_timestamp(&ts)),
        None => Value::Null,
    }
}

fn convert_cell(raw: &str, ty: ColumnType) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    Ok(match ty {
        ColumnType::Integer => Value::Integer(
            raw.parse::<i64>()
                .map_err(|e| anyhow!("invalid integer '{}': {}", raw, e))?,
        ),
        ColumnType::Real => Value::Real(
            raw.parse::<f64>()
                .map_err(|e| anyhow!("invalid number '{}': {}", raw, e))?,
        ),
        ColumnType::Text => Value::Text(raw.to_string()),
        ColumnType::Timestamp => clean_date(raw),
    })
}

/// Reads one CSV, checks its header against `spec`, and converts every cell.
pub fn load_csv(path: &Path, spec: &TableSpec) -> Result<LoadedTable> {
    if !path.exists() {
        bail!(
            "missing input file {} (run `generate_mock_data` first or supply it)",
            path.display()
        );
    }
    let schema = validate_schema(path, spec)?;
    if !schema.ok {
        bail!("{}: {}", path.display(), schema.message);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    let mut coerced_dates = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record
            .with_context(|| format!("{}: malformed record at line {}", path.display(), line))?;
        let mut row = Vec::with_capacity(spec.columns.len());
        for ((column, ty), raw) in spec.columns.iter().zip(record.iter()) {
            let value = convert_cell(raw, *ty).with_context(|| {
                format!("{}: line {} column `{}`", path.display(), line, column)
            })?;
            if *ty == ColumnType::Timestamp && value == Value::Null && !raw.is_empty() {
                coerced_dates += 1;
            }
            row.push(value);
        }
        rows.push(row);
    }

    info(
        Domain::Etl,
        "csv_loaded",
        obj(&[
            ("file", v_str(spec.file)),
            ("rows", v_count(rows.len())),
            ("coerced_dates", v_count(coerced_dates)),
        ]),
    );
    if coerced_dates > 0 {
        warn(
            Domain::Etl,
            "dates_coerced",
            obj(&[
                ("file", v_str(spec.file)),
                ("columns", v_str(&spec.date_columns().join(","))),
                ("count", v_count(coerced_dates)),
            ]),
        );
    }

    Ok(LoadedTable {
        spec: *spec,
        rows,
        coerced_dates,
        sha256: file_sha256(path)?,
    })
}

/// Loads every table in [`TABLES`] order, replacing existing tables, and
/// writes a JSON load manifest next to the store.
pub fn run_etl(config: &Config) -> Result<Vec<TableLoad>> {
    let _timer = StageTimer::start(Domain::Etl, "etl");

    let mut loaded = Vec::with_capacity(TABLES.len());
    for spec in TABLES.iter() {
        loaded.push(load_csv(&config.csv_path(spec.file), spec)?);
    }

    let mut store = SupplyStore::open(&config.sqlite_path)?;
    info(
        Domain::Etl,
        "store_opened",
        obj(&[("path", v_str(&config.sqlite_path.display().to_string()))]),
    );

    let mut loads = Vec::with_capacity(loaded.len());
    for table in &loaded {
        match store.replace_table(&table.spec, &table.rows) {
            Ok(rows) => {
                info(
                    Domain::Etl,
                    "table_written",
                    obj(&[("table", v_str(table.spec.name)), ("rows", v_count(rows))]),
                );
                loads.push(TableLoad {
                    table: table.spec.name.to_string(),
                    source: config.csv_path(table.spec.file).display().to_string(),
                    sha256: table.sha256.clone(),
                    rows,
                    coerced_dates: table.coerced_dates,
                });
            }
            Err(err) => {
                let done: Vec<&str> = loads.iter().map(|l: &TableLoad| l.table.as_str()).collect();
                error(
                    Domain::Etl,
                    "partial_load",
                    obj(&[
                        ("failed_table", v_str(table.spec.name)),
                        ("already_replaced", v_str(&done.join(","))),
                        ("msg", v_str("store left partially reloaded")),
                    ]),
                );
                return Err(err);
            }
        }
    }

    let manifest = LoadManifest {
        store: config.sqlite_path.display().to_string(),
        loaded_at: crate::logging::ts_now(),
        tables: loads.clone(),
    };
    let manifest_path = default_manifest_path(&config.sqlite_path);
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;
    info(
        Domain::Etl,
        "etl_complete",
        obj(&[
            ("tables", v_count(loads.len())),
            ("manifest", v_str(&manifest_path.display().to_string())),
        ]),
    );
    Ok(loads)
}
