//! Table catalogue and CSV schema checks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Stored as canonical text; unparseable values become NULL.
    Timestamp,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub file: &'static str,
    pub columns: &'static [(&'static str, ColumnType)],
}

impl TableSpec {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    pub fn date_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|(_, ty)| *ty == ColumnType::Timestamp)
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn create_sql(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|(name, ty)| format!("\"{}\" {}", name, ty.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE \"{}\" ({})", self.name, cols)
    }

    pub fn insert_sql(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|(name, _)| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ");
        let params = (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO \"{}\" ({}) VALUES ({})", self.name, cols, params)
    }
}

use self::ColumnType::{Integer, Real, Text, Timestamp};

pub const PRODUCTS: TableSpec = TableSpec {
    name: "products",
    file: "products.csv",
    columns: &[
        ("product_id", Integer),
        ("sku", Text),
        ("product_name", Text),
        ("category", Text),
        ("unit", Text),
        ("safety_stock", Integer),
    ],
};

pub const SUPPLIERS: TableSpec = TableSpec {
    name: "suppliers",
    file: "suppliers.csv",
    columns: &[
        ("supplier_id", Integer),
        ("supplier_name", Text),
        ("location", Text),
        ("rating", Real),
    ],
};

pub const PURCHASE_ORDERS: TableSpec = TableSpec {
    name: "purchase_orders",
    file: "purchase_orders.csv",
    columns: &[
        ("purchase_order_id", Integer),
        ("product_id", Integer),
        ("supplier_id", Integer),
        ("quantity", Integer),
        ("lead_time_days", Integer),
        ("purchase_order_date", Timestamp),
    ],
};

pub const INVENTORY: TableSpec = TableSpec {
    name: "inventory",
    file: "inventory.csv",
    columns: &[
        ("inventory_id", Integer),
        ("product_id", Integer),
        ("quantity", Integer),
        ("warehouse_location", Text),
        ("last_updated", Timestamp),
    ],
};

pub const INBOUND_RECORDS: TableSpec = TableSpec {
    name: "inbound_records",
    file: "inbound_records.csv",
    columns: &[
        ("inbound_id", Integer),
        ("purchase_order_id", Integer),
        ("product_id", Integer),
        ("quantity_received", Integer),
        ("received_date", Timestamp),
    ],
};

pub const SALES_ORDERS: TableSpec = TableSpec {
    name: "sales_orders",
    file: "sales_orders.csv",
    columns: &[
        ("sales_order_id", Integer),
        ("product_id", Integer),
        ("quantity_sold", Integer),
        ("sales_order_date", Timestamp),
        ("customer_name", Text),
        ("status", Text),
    ],
};

/// Load order. Parents come before the tables referencing them.
pub const TABLES: [TableSpec; 6] = [
    PRODUCTS,
    SUPPLIERS,
    PURCHASE_ORDERS,
    INVENTORY,
    INBOUND_RECORDS,
    SALES_ORDERS,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub expected: Vec<String>,
    pub ok: bool,
    pub message: String,
}

pub fn validate_schema(path: &Path, spec: &TableSpec) -> Result<SchemaReport> {
    let header = read_header(path)?;
    let expected = spec
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    let ok = header == expected;
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("schema mismatch: got {:?} expected {:?}", header, expected)
    };
    Ok(SchemaReport {
        columns: header,
        expected,
        ok,
        message,
    })
}

pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let header = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?;
    Ok(header.iter().map(|s| s.to_string()).collect())
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// `supply_chain.db` -> `supply_chain.db.manifest.json`
pub fn default_manifest_path(store_path: &Path) -> PathBuf {
    let mut p = store_path.to_path_buf();
    let fname = store_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("store.db");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
