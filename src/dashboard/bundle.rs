//! Result bundles handed to the dashboard by the upstream analysis stage.
//!
//! Both views read a JSON document whose top-level keys mirror the analysis
//! output. Every non-optional field is required; a missing key fails the load.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use super::chart::Figure;
use crate::metrics::{EfficiencyKpis, SupplierLeadTime};

/// Inventory-age buckets used as columns of the health summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthBucket {
    Normal,
    Backlogged,
    Severe,
}

impl HealthBucket {
    pub const ALL: [HealthBucket; 3] = [
        HealthBucket::Normal,
        HealthBucket::Backlogged,
        HealthBucket::Severe,
    ];

    /// Column name in the health summary; also the chart series name.
    pub fn column(&self) -> &'static str {
        match self {
            HealthBucket::Normal => "Normal (<100 days)",
            HealthBucket::Backlogged => "Backlogged (100-500 days)",
            HealthBucket::Severe => "Severe backlog (500+ days)",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            HealthBucket::Normal => "#66bb6a",
            HealthBucket::Backlogged => "#ffa726",
            HealthBucket::Severe => "#ef5350",
        }
    }
}

/// One category row: `category` plus one count per bucket column present.
/// Non-numeric extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRow {
    pub category: String,
    #[serde(flatten)]
    pub columns: Map<String, Value>,
}

impl HealthRow {
    pub fn count(&self, bucket: HealthBucket) -> Option<u64> {
        self.columns
            .get(bucket.column())
            .and_then(Value::as_f64)
            .map(|v| v.max(0.0) as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthSummary {
    pub rows: Vec<HealthRow>,
}

impl HealthSummary {
    pub fn categories(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.category.clone()).collect()
    }

    pub fn has_bucket(&self, bucket: HealthBucket) -> bool {
        self.rows.iter().any(|r| r.columns.contains_key(bucket.column()))
    }

    /// Per-category counts; a row without the column counts as zero.
    pub fn bucket_values(&self, bucket: HealthBucket) -> Vec<u64> {
        self.rows.iter().map(|r| r.count(bucket).unwrap_or(0)).collect()
    }

    pub fn bucket_total(&self, bucket: HealthBucket) -> u64 {
        self.bucket_values(bucket).iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub sku: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Qualitative analysis of one SKU. `reason` is ordered, first = primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuAnalysis {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub reason: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub primary_reason: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Inputs of the inventory-health view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBundle {
    pub fig_heatmap_full: Figure,
    pub abnormal_sku_charts: IndexMap<String, Figure>,
    pub category_comparison_charts: IndexMap<String, Figure>,
    pub abnormal_sku_list: Vec<AnomalyRecord>,
    pub health_summary: HealthSummary,
    pub abnormal_analysis: Vec<SkuAnalysis>,
    pub optimization_suggestions: Vec<Suggestion>,
}

/// Inputs of the efficiency view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyBundle {
    pub kpis: EfficiencyKpis,
    pub forecast_charts: IndexMap<String, Figure>,
    #[serde(default)]
    pub lead_time_chart: Option<Figure>,
    #[serde(default)]
    pub sales_status_chart: Option<Figure>,
    #[serde(default)]
    pub supplier_lead_times: Vec<SupplierLeadTime>,
}

fn read_bundle<T: serde::de::DeserializeOwned>(path: &Path, producer: &str) -> Result<T> {
    if !path.exists() {
        bail!(
            "analysis results not found: {} (run {} first to produce it)",
            path.display(),
            producer
        );
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("analysis bundle {} is incomplete or malformed", path.display()))
}

pub fn load_inventory_bundle(path: &Path) -> Result<InventoryBundle> {
    read_bundle(path, "the inventory analysis")
}

pub fn load_efficiency_bundle(path: &Path) -> Result<EfficiencyBundle> {
    read_bundle(path, "`efficiency_metrics`")
}

pub fn save_bundle<T: Serialize>(path: &Path, bundle: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_string_pretty(bundle)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(rows: Value) -> HealthSummary {
        serde_json::from_value(rows).unwrap()
    }

    #[test]
    fn test_missing_bucket_column_counts_as_zero() {
        let s = summary(json!([
            {"category": "A", "Normal (<100 days)": 4, "Backlogged (100-500 days)": 2},
            {"category": "B", "Normal (<100 days)": 1, "Backlogged (100-500 days)": 3},
        ]));
        assert!(s.has_bucket(HealthBucket::Normal));
        assert!(!s.has_bucket(HealthBucket::Severe));
        assert_eq!(s.bucket_total(HealthBucket::Normal), 5);
        assert_eq!(s.bucket_total(HealthBucket::Backlogged), 5);
        assert_eq!(s.bucket_total(HealthBucket::Severe), 0);
        assert_eq!(s.categories(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_non_numeric_columns_are_ignored() {
        let s = summary(json!([
            {"category": "A", "Normal (<100 days)": 2.0, "note": "seasonal"},
        ]));
        assert_eq!(s.bucket_values(HealthBucket::Normal), vec![2]);
    }

    #[test]
    fn test_bundle_without_required_key_is_rejected() {
        let raw = json!({
            "fig_heatmap_full": {"data": [], "layout": {}},
            "abnormal_sku_charts": {},
            "category_comparison_charts": {},
            "abnormal_sku_list": [],
            "health_summary": [],
            "abnormal_analysis": [],
        });
        let err = serde_json::from_value::<InventoryBundle>(raw).unwrap_err();
        assert!(err.to_string().contains("optimization_suggestions"));
    }

    #[test]
    fn test_chart_maps_keep_insertion_order() {
        let raw = r#"{
            "fig_heatmap_full": {"data": [], "layout": {}},
            "abnormal_sku_charts": {"SKU1009": {}, "SKU1001": {}, "SKU1005": {}},
            "category_comparison_charts": {},
            "abnormal_sku_list": [{"sku": "SKU1009", "days": 600}],
            "health_summary": [],
            "abnormal_analysis": [{"sku": "SKU1009", "reason": []}],
            "optimization_suggestions": []
        }"#;
        let bundle: InventoryBundle = serde_json::from_str(raw).unwrap();
        let keys: Vec<&str> = bundle.abnormal_sku_charts.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["SKU1009", "SKU1001", "SKU1005"]);
        assert_eq!(bundle.abnormal_sku_list[0].extra["days"], 600);
    }

    #[test]
    fn test_missing_bundle_file_names_path() {
        let err = load_inventory_bundle(Path::new("/nonexistent/bundle.json")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/bundle.json"));
        assert!(msg.contains("inventory analysis"));
    }
}
