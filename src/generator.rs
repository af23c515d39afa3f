//! Mock data generator for the six supply-chain tables.
//!
//! The `generate_*` functions are pure given an RNG; [`run_generator`] wires
//! them together and writes the CSVs.

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::config::{Config, GeneratorConfig};
use crate::data::{
    INBOUND_RECORDS, INVENTORY, PRODUCTS, PURCHASE_ORDERS, SALES_ORDERS, SUPPLIERS,
};
use crate::logging::{info, obj, v_count, v_str, Domain, StageTimer};
use crate::model::{
    InboundRecord, InventorySnapshot, Product, PurchaseOrder, SalesOrder, SalesStatus, Supplier,
};

pub const CATEGORIES: [&str; 3] = ["A", "B", "C"];
pub const LOCATIONS: [&str; 3] = ["CN", "US", "EU"];

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// First purchase order and earliest sales order.
pub fn series_start() -> NaiveDateTime {
    midnight(2023, 1, 1)
}

/// Inventory snapshots are stamped at most 29 days before this.
pub fn inventory_as_of() -> NaiveDateTime {
    midnight(2023, 12, 1)
}

/// Smallest acceptable receipt for an order: ceil(80% of `ordered`).
pub fn min_received(ordered: u32) -> u32 {
    (ordered * 4).div_ceil(5)
}

pub fn generate_products<R: Rng>(rng: &mut R, n: usize) -> Vec<Product> {
    (0..n)
        .map(|i| Product {
            product_id: i as u32 + 1,
            sku: format!("SKU{}", 1000 + i),
            product_name: format!("Product {}", i),
            category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
            unit: "pcs".to_string(),
            safety_stock: rng.gen_range(50..200),
        })
        .collect()
}

pub fn generate_suppliers<R: Rng>(rng: &mut R, n: usize) -> Vec<Supplier> {
    (0..n)
        .map(|i| Supplier {
            supplier_id: i as u32 + 1,
            supplier_name: format!("Supplier {}", i),
            location: LOCATIONS[rng.gen_range(0..LOCATIONS.len())].to_string(),
            rating: (rng.gen_range(3.0..5.0_f64) * 100.0).round() / 100.0,
        })
        .collect()
}

/// Orders are spaced one hour apart starting at [`series_start`].
pub fn generate_purchase_orders<R: Rng>(
    rng: &mut R,
    products: &[Product],
    suppliers: &[Supplier],
    n: usize,
) -> Result<Vec<PurchaseOrder>> {
    if n > 0 && (products.is_empty() || suppliers.is_empty()) {
        bail!(
            "cannot generate {} purchase orders without products and suppliers ({} products, {} suppliers)",
            n,
            products.len(),
            suppliers.len()
        );
    }
    let start = series_start();
    Ok((0..n)
        .map(|i| PurchaseOrder {
            purchase_order_id: i as u32 + 1,
            product_id: products[rng.gen_range(0..products.len())].product_id,
            supplier_id: suppliers[rng.gen_range(0..suppliers.len())].supplier_id,
            quantity: rng.gen_range(1..500),
            lead_time_days: rng.gen_range(1..40),
            purchase_order_date: start + Duration::hours(i as i64),
        })
        .collect())
}

/// One snapshot per (product, warehouse) pair, warehouses named `WH1..WHn`.
pub fn generate_inventory<R: Rng>(
    rng: &mut R,
    products: &[Product],
    n_warehouses: usize,
) -> Vec<InventorySnapshot> {
    let as_of = inventory_as_of();
    let mut records = Vec::with_capacity(products.len() * n_warehouses);
    for product in products {
        for wid in 1..=n_warehouses {
            records.push(InventorySnapshot {
                inventory_id: records.len() as u32 + 1,
                product_id: product.product_id,
                quantity: rng.gen_range(0..1000),
                warehouse_location: format!("WH{}", wid),
                last_updated: as_of - Duration::days(rng.gen_range(0..30)),
            });
        }
    }
    records
}

/// One receipt per purchase order, arriving exactly `lead_time_days` later.
pub fn generate_inbound_records<R: Rng>(
    rng: &mut R,
    purchase_orders: &[PurchaseOrder],
) -> Vec<InboundRecord> {
    purchase_orders
        .iter()
        .enumerate()
        .map(|(i, po)| InboundRecord {
            inbound_id: i as u32 + 1,
            purchase_order_id: po.purchase_order_id,
            product_id: po.product_id,
            quantity_received: rng.gen_range(min_received(po.quantity)..=po.quantity),
            received_date: po.purchase_order_date + Duration::days(po.lead_time_days as i64),
        })
        .collect()
}

pub fn generate_sales_orders<R: Rng>(
    rng: &mut R,
    products: &[Product],
    n: usize,
) -> Result<Vec<SalesOrder>> {
    if n > 0 && products.is_empty() {
        bail!("cannot generate {} sales orders without products", n);
    }
    let start = series_start();
    Ok((0..n)
        .map(|i| SalesOrder {
            sales_order_id: i as u32 + 1,
            product_id: products[rng.gen_range(0..products.len())].product_id,
            quantity_sold: rng.gen_range(1..100),
            sales_order_date: start + Duration::days(rng.gen_range(0..365)),
            customer_name: format!("Customer {}", rng.gen_range(1..500)),
            status: SalesStatus::ALL[rng.gen_range(0..SalesStatus::ALL.len())],
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct GeneratedData {
    pub seed: u64,
    pub products: Vec<Product>,
    pub suppliers: Vec<Supplier>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub inventory: Vec<InventorySnapshot>,
    pub inbound_records: Vec<InboundRecord>,
    pub sales_orders: Vec<SalesOrder>,
}

/// Builds all six tables from one seeded RNG without touching the filesystem.
pub fn generate_all(cfg: &GeneratorConfig, seed: u64) -> Result<GeneratedData> {
    let mut rng = StdRng::seed_from_u64(seed);
    let products = generate_products(&mut rng, cfg.n_products);
    let suppliers = generate_suppliers(&mut rng, cfg.n_suppliers);
    let purchase_orders =
        generate_purchase_orders(&mut rng, &products, &suppliers, cfg.n_purchase_orders)?;
    let inventory = generate_inventory(&mut rng, &products, cfg.n_warehouses);
    let inbound_records = generate_inbound_records(&mut rng, &purchase_orders);
    let sales_orders = generate_sales_orders(&mut rng, &products, cfg.n_sales_orders)?;
    Ok(GeneratedData {
        seed,
        products,
        suppliers,
        purchase_orders,
        inventory,
        inbound_records,
        sales_orders,
    })
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T], headers: &[&str]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    // Written explicitly so an empty table still carries its header.
    writer.write_record(headers)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Generates the mock dataset and writes the six CSVs into `config.raw_dir`,
/// overwriting whatever is there.
pub fn run_generator(config: &Config) -> Result<GeneratedData> {
    let _timer = StageTimer::start(Domain::Generate, "generate_mock_data");
    fs::create_dir_all(&config.raw_dir).with_context(|| {
        format!(
            "failed to create raw data directory {}",
            config.raw_dir.display()
        )
    })?;
    info(
        Domain::Generate,
        "dir_ready",
        obj(&[("path", v_str(&config.raw_dir.display().to_string()))]),
    );

    let seed = config.generator.seed.unwrap_or_else(rand::random);
    info(Domain::Generate, "seed", obj(&[("seed", json!(seed))]));
    let data = generate_all(&config.generator, seed)?;

    let outputs: [(&str, usize); 6] = [
        (PRODUCTS.file, data.products.len()),
        (SUPPLIERS.file, data.suppliers.len()),
        (PURCHASE_ORDERS.file, data.purchase_orders.len()),
        (INVENTORY.file, data.inventory.len()),
        (INBOUND_RECORDS.file, data.inbound_records.len()),
        (SALES_ORDERS.file, data.sales_orders.len()),
    ];
    write_csv(&config.csv_path(PRODUCTS.file), &data.products, &PRODUCTS.column_names())?;
    write_csv(&config.csv_path(SUPPLIERS.file), &data.suppliers, &SUPPLIERS.column_names())?;
    write_csv(
        &config.csv_path(PURCHASE_ORDERS.file),
        &data.purchase_orders,
        &PURCHASE_ORDERS.column_names(),
    )?;
    write_csv(&config.csv_path(INVENTORY.file), &data.inventory, &INVENTORY.column_names())?;
    write_csv(
        &config.csv_path(INBOUND_RECORDS.file),
        &data.inbound_records,
        &INBOUND_RECORDS.column_names(),
    )?;
    write_csv(
        &config.csv_path(SALES_ORDERS.file),
        &data.sales_orders,
        &SALES_ORDERS.column_names(),
    )?;

    for (file, rows) in outputs {
        info(
            Domain::Generate,
            "csv_written",
            obj(&[
                ("file", v_str(file)),
                ("rows", v_count(rows)),
                ("path", v_str(&config.csv_path(file).display().to_string())),
            ]),
        );
    }
    Ok(data)
}
