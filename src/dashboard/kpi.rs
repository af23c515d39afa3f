use indexmap::IndexMap;
use std::collections::HashSet;

use super::bundle::{AnomalyRecord, HealthBucket, HealthSummary, SkuAnalysis, Suggestion};
use super::chart::{BarSeries, Figure};

/// Bucket for analyses that carry no reason at all.
pub const OTHER_REASON: &str = "Other";

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryKpis {
    pub total_skus: usize,
    pub anomaly_count: usize,
    pub anomaly_rate: f64,
    pub normal_count: u64,
    pub backlog_count: u64,
    pub severe_count: u64,
}

impl InventoryKpis {
    pub fn compute(
        anomalies: &[AnomalyRecord],
        suggestions: &[Suggestion],
        health: &HealthSummary,
    ) -> Self {
        let total_skus = anomalies
            .iter()
            .map(|a| a.sku.as_str())
            .collect::<HashSet<_>>()
            .len();
        let anomaly_count = suggestions.len();
        let anomaly_rate = if total_skus > 0 {
            anomaly_count as f64 / total_skus as f64
        } else {
            0.0
        };
        Self {
            total_skus,
            anomaly_count,
            anomaly_rate,
            normal_count: health.bucket_total(HealthBucket::Normal),
            backlog_count: health.bucket_total(HealthBucket::Backlogged),
            severe_count: health.bucket_total(HealthBucket::Severe),
        }
    }

    /// `count` as a percentage of all SKUs; 0 when there are none.
    pub fn percent_of_skus(&self, count: u64) -> f64 {
        if self.total_skus == 0 {
            0.0
        } else {
            count as f64 / self.total_skus as f64 * 100.0
        }
    }
}

/// Counts primary (first) reasons in first-seen order.
pub fn tally_primary_reasons(analyses: &[SkuAnalysis]) -> IndexMap<String, u64> {
    let mut tally: IndexMap<String, u64> = IndexMap::new();
    for analysis in analyses {
        let reason = analysis
            .reason
            .first()
            .map(String::as_str)
            .unwrap_or(OTHER_REASON);
        *tally.entry(reason.to_string()).or_insert(0) += 1;
    }
    tally
}

pub fn reason_distribution_chart(tally: &IndexMap<String, u64>) -> Figure {
    let labels: Vec<String> = tally.keys().cloned().collect();
    let values: Vec<f64> = tally.values().map(|v| *v as f64).collect();
    Figure::donut("Backlog reasons of anomalous SKUs", &labels, &values)
}

/// Stacked health counts per category. Buckets absent from the summary get no series.
pub fn health_by_category_chart(summary: &HealthSummary) -> Figure {
    let series: Vec<BarSeries> = HealthBucket::ALL
        .iter()
        .filter(|b| summary.has_bucket(**b))
        .map(|b| BarSeries {
            name: b.column().to_string(),
            values: summary.bucket_values(*b).iter().map(|v| *v as f64).collect(),
            color: Some(b.color().to_string()),
        })
        .collect();
    Figure::stacked_bar(
        "Inventory health by category",
        "Category",
        "SKU count",
        &summary.categories(),
        &series,
    )
}
