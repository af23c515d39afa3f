//! Read-only reporting queries over the loaded store.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::dashboard::bundle::EfficiencyBundle;
use crate::dashboard::chart::Figure;
use crate::data::TABLES;
use crate::logging::{info, obj, v_count, v_num, Domain};
use crate::model::SalesStatus;
use crate::storage::SupplyStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadTimeSummary {
    /// `None` when there are no purchase orders.
    pub avg_lead_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierLeadTime {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub orders: u64,
    pub avg_lead_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRate {
    pub ordered: u64,
    pub received: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub orders: u64,
    pub units: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyKpis {
    pub avg_lead_time_days: Option<f64>,
    pub fill_rate: f64,
    pub total_sales_orders: u64,
    pub delivered_rate: f64,
    pub cancelled_rate: f64,
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn avg_lead_time(store: &SupplyStore) -> Result<LeadTimeSummary> {
    store.require_table("purchase_orders")?;
    let avg: Option<f64> = store.conn().query_row(
        "SELECT AVG(lead_time_days) AS avg_lead_time FROM purchase_orders",
        [],
        |row| row.get(0),
    )?;
    Ok(LeadTimeSummary { avg_lead_time: avg })
}

/// Opens the store at the configured path and returns its average lead time.
pub fn get_avg_lead_time(config: &Config) -> Result<LeadTimeSummary> {
    let store = SupplyStore::open_existing(&config.sqlite_path)?;
    let summary = avg_lead_time(&store)?;
    info(
        Domain::Query,
        "avg_lead_time",
        obj(&[(
            "avg_lead_time",
            summary.avg_lead_time.map(v_num).unwrap_or_default(),
        )]),
    );
    Ok(summary)
}

/// Slowest suppliers first. Orders without a supplier or a lead time are skipped.
pub fn lead_time_by_supplier(
    store: &SupplyStore,
    limit: usize,
) -> Result<Vec<SupplierLeadTime>> {
    store.require_table("purchase_orders")?;
    store.require_table("suppliers")?;
    let mut stmt = store.conn().prepare(
        "SELECT po.supplier_id, COALESCE(s.supplier_name, ''), COUNT(*), AVG(po.lead_time_days) AS avg_lt
         FROM purchase_orders po
         LEFT JOIN suppliers s ON s.supplier_id = po.supplier_id
         WHERE po.supplier_id IS NOT NULL AND po.lead_time_days IS NOT NULL
         GROUP BY po.supplier_id
         ORDER BY avg_lt DESC, po.supplier_id
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(SupplierLeadTime {
                supplier_id: row.get(0)?,
                supplier_name: row.get(1)?,
                orders: row.get::<_, i64>(2)? as u64,
                avg_lead_time: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("lead time by supplier query failed")?;
    Ok(rows)
}

/// Received over ordered units for every purchase order with a receipt.
pub fn fill_rate(store: &SupplyStore) -> Result<FillRate> {
    store.require_table("purchase_orders")?;
    store.require_table("inbound_records")?;
    let (ordered, received): (i64, i64) = store.conn().query_row(
        "SELECT COALESCE(SUM(po.quantity), 0), COALESCE(SUM(ib.quantity_received), 0)
         FROM inbound_records ib
         JOIN purchase_orders po ON po.purchase_order_id = ib.purchase_order_id",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let (ordered, received) = (ordered.max(0) as u64, received.max(0) as u64);
    Ok(FillRate {
        ordered,
        received,
        rate: ratio(received, ordered),
    })
}

/// Order and unit counts for every status, zero-filled, in status order.
pub fn sales_status_breakdown(store: &SupplyStore) -> Result<Vec<StatusCount>> {
    store.require_table("sales_orders")?;
    let mut stmt = store.conn().prepare(
        "SELECT status, COUNT(*), COALESCE(SUM(quantity_sold), 0)
         FROM sales_orders GROUP BY status",
    )?;
    let mut counts: IndexMap<String, (u64, u64)> = SalesStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), (0, 0)))
        .collect();
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?.unwrap_or_default(),
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;
    for row in rows {
        let (status, orders, units) = row?;
        let entry = counts.entry(status).or_insert((0, 0));
        entry.0 += orders.max(0) as u64;
        entry.1 += units.max(0) as u64;
    }
    Ok(counts
        .into_iter()
        .map(|(status, (orders, units))| StatusCount {
            status,
            orders,
            units,
        })
        .collect())
}

pub fn row_counts(store: &SupplyStore) -> Result<Vec<(String, u64)>> {
    TABLES
        .iter()
        .map(|t| -> Result<(String, u64)> {
            Ok((t.name.to_string(), store.row_count(t.name)?))
        })
        .collect()
}

pub fn efficiency_snapshot(store: &SupplyStore) -> Result<EfficiencyKpis> {
    let lead = avg_lead_time(store)?;
    let fill = fill_rate(store)?;
    let statuses = sales_status_breakdown(store)?;
    let total: u64 = statuses.iter().map(|s| s.orders).sum();
    let count_of = |status: SalesStatus| {
        statuses
            .iter()
            .find(|s| s.status == status.as_str())
            .map(|s| s.orders)
            .unwrap_or(0)
    };
    let kpis = EfficiencyKpis {
        avg_lead_time_days: lead.avg_lead_time,
        fill_rate: fill.rate,
        total_sales_orders: total,
        delivered_rate: ratio(count_of(SalesStatus::Delivered), total),
        cancelled_rate: ratio(count_of(SalesStatus::Cancelled), total),
    };
    info(
        Domain::Query,
        "efficiency_snapshot",
        obj(&[
            ("avg_lead_time_days", kpis.avg_lead_time_days.map(v_num).unwrap_or_default()),
            ("fill_rate", v_num(kpis.fill_rate)),
            ("sales_orders", v_count(total as usize)),
        ]),
    );
    Ok(kpis)
}

/// Efficiency-view bundle computed from the store. Forecast charts come from
/// the external analysis stage and are left empty here.
pub fn build_efficiency_bundle(
    store: &SupplyStore,
    top_suppliers: usize,
) -> Result<EfficiencyBundle> {
    let kpis = efficiency_snapshot(store)?;
    let suppliers = lead_time_by_supplier(store, top_suppliers)?;
    let statuses = sales_status_breakdown(store)?;

    let lead_time_chart = if suppliers.is_empty() {
        None
    } else {
        let names: Vec<String> = suppliers.iter().map(|s| s.supplier_name.clone()).collect();
        let avgs: Vec<f64> = suppliers.iter().map(|s| s.avg_lead_time).collect();
        Some(Figure::bar(
            "Average lead time by supplier (slowest first)",
            "Supplier",
            "Average lead time (days)",
            &names,
            &avgs,
        ))
    };
    let sales_status_chart = if kpis.total_sales_orders == 0 {
        None
    } else {
        let labels: Vec<String> = statuses.iter().map(|s| s.status.clone()).collect();
        let values: Vec<f64> = statuses.iter().map(|s| s.orders as f64).collect();
        Some(Figure::donut("Sales orders by status", &labels, &values))
    };

    Ok(EfficiencyBundle {
        kpis,
        forecast_charts: IndexMap::new(),
        lead_time_chart,
        sales_status_chart,
        supplier_lead_times: suppliers,
    })
}
