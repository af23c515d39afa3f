//! Row types for the six supply-chain tables.
//!
//! Field names match the CSV headers and the store's column names one to one.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Canonical text form for every timestamp written to CSV or the store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Lenient timestamp parsing. Returns `None` for anything unrecognised so the
/// caller can store NULL instead of failing the load.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ACCEPTED_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Writes a timestamp in [`TIMESTAMP_FORMAT`].
pub fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub product_id: u32,
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub unit: String,
    pub safety_stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Supplier {
    pub supplier_id: u32,
    pub supplier_name: String,
    pub location: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrder {
    pub purchase_order_id: u32,
    pub product_id: u32,
    pub supplier_id: u32,
    pub quantity: u32,
    pub lead_time_days: u32,
    #[serde(serialize_with = "serialize_timestamp")]
    pub purchase_order_date: NaiveDateTime,
}

/// Stock on hand for one (product, warehouse) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySnapshot {
    pub inventory_id: u32,
    pub product_id: u32,
    pub quantity: u32,
    pub warehouse_location: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_updated: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundRecord {
    pub inbound_id: u32,
    pub purchase_order_id: u32,
    pub product_id: u32,
    pub quantity_received: u32,
    #[serde(serialize_with = "serialize_timestamp")]
    pub received_date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SalesStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl SalesStatus {
    pub const ALL: [SalesStatus; 4] = [
        SalesStatus::Pending,
        SalesStatus::Shipped,
        SalesStatus::Delivered,
        SalesStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SalesStatus::Pending => "Pending",
            SalesStatus::Shipped => "Shipped",
            SalesStatus::Delivered => "Delivered",
            SalesStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesOrder {
    pub sales_order_id: u32,
    pub product_id: u32,
    pub quantity_sold: u32,
    #[serde(serialize_with = "serialize_timestamp")]
    pub sales_order_date: NaiveDateTime,
    pub customer_name: String,
    pub status: SalesStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_canonical_and_variants() {
        let canonical = parse_timestamp("2023-01-01 05:00:00").unwrap();
        assert_eq!(format_timestamp(&canonical), "2023-01-01 05:00:00");
        assert_eq!(parse_timestamp("2023-01-01T05:00:00"), Some(canonical));
        assert_eq!(parse_timestamp("2023-01-01 05:00:00.000"), Some(canonical));
        assert_eq!(parse_timestamp("2023-01-01T05:00:00Z"), Some(canonical));
        assert_eq!(
            parse_timestamp("2023-01-01").map(|t| format_timestamp(&t)),
            Some("2023-01-01 00:00:00".to_string())
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2023-13-45"), None);
    }

    #[test]
    fn test_status_serializes_as_name() {
        for status in SalesStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
