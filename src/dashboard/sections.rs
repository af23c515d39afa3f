//! HTML fragments for the dashboard tabs. Shared by both views.

use anyhow::Result;
use indexmap::IndexMap;

use super::bundle::Suggestion;
use super::chart::{ChartEmbedder, Figure};
use super::kpi::InventoryKpis;

pub const SKU_PLACEHOLDER: &str =
    "Single-SKU charts could not be generated; check the analysis data for completeness.";
pub const CATEGORY_PLACEHOLDER: &str =
    "Category comparison charts could not be generated; check the analysis data for completeness.";

pub fn kpi_card(class: &str, title: &str, value: &str, note: Option<&str>) -> String {
    let note = note
        .map(|n| format!("\n            <span class=\"kpi-percent\">{}</span>", n))
        .unwrap_or_default();
    format!(
        r#"
        <div class="kpi-card {class}">
            <h4>{title}</h4>
            <p class="kpi-value">{value}</p>{note}
        </div>"#,
        class = class,
        title = title,
        value = value,
        note = note,
    )
}

pub fn tab(id: &str, active: bool, title: &str, body: &str) -> String {
    format!(
        "<div class=\"tab-content{}\" id=\"{}\">\n    <h2>{}</h2>\n{}\n</div>\n",
        if active { " active" } else { "" },
        id,
        title,
        body
    )
}

pub fn placeholder(message: &str) -> String {
    format!("<div class=\"placeholder\">{}</div>", message)
}

pub fn overview_section(kpis: &InventoryKpis) -> String {
    let pct = |count: u64| format!("{:.1}%", kpis.percent_of_skus(count));
    let cards = [
        kpi_card("kpi-normal", "Anomalous SKUs", &kpis.total_skus.to_string(), None),
        kpi_card(
            "kpi-success",
            "Normal SKUs",
            &kpis.normal_count.to_string(),
            Some(&pct(kpis.normal_count)),
        ),
        kpi_card(
            "kpi-warning",
            "Backlogged SKUs",
            &kpis.backlog_count.to_string(),
            Some(&pct(kpis.backlog_count)),
        ),
        kpi_card(
            "kpi-danger",
            "Severely backlogged SKUs",
            &kpis.severe_count.to_string(),
            Some(&pct(kpis.severe_count)),
        ),
        kpi_card(
            "kpi-info",
            "Anomaly rate",
            &format!("{:.1}%", kpis.anomaly_rate * 100.0),
            Some(&format!("{}/{}", kpis.anomaly_count, kpis.total_skus)),
        ),
    ];
    let body = format!("    <div class=\"kpi-container\">{}\n    </div>", cards.concat());
    tab("overview", true, "KPI Overview", &body)
}

pub fn heatmap_section(embedder: &mut ChartEmbedder, heatmap: &Figure) -> Result<String> {
    let body = format!(
        r#"    <p class="legend-note">
        <span class="item"><span style="color:#1e90ff;">Light blue</span> = 0-100 days (normal stock)</span>
        <span class="item"><span style="color:#ff8c00;">Orange</span> = 100-500 days (backlog)</span>
        <span class="item"><span style="color:#dc143c;">Red</span> = 500+ days (severe backlog)</span>
    </p>
    <div class="chart-panel">
{}
    </div>"#,
        embedder.embed(heatmap)?
    );
    Ok(tab("heatmap", false, "SKU Days-of-Inventory Heatmap (global scan)", &body))
}

pub fn analysis_section(
    embedder: &mut ChartEmbedder,
    reasons: &Figure,
    health: &Figure,
) -> Result<String> {
    let body = format!(
        "    <div class=\"chart-grid\">\n        <div class=\"chart-panel\">\n{}        </div>\n        <div class=\"chart-panel\">\n{}        </div>\n    </div>",
        embedder.embed(reasons)?,
        embedder.embed(health)?
    );
    Ok(tab("analysis", false, "Backlog Reason Analysis", &body))
}

/// One titled block per chart, or `empty_message` when there are none.
pub fn chart_blocks<F>(
    embedder: &mut ChartEmbedder,
    charts: &IndexMap<String, Figure>,
    heading: F,
    empty_message: &str,
) -> Result<String>
where
    F: Fn(usize, &str) -> String,
{
    if charts.is_empty() {
        return Ok(placeholder(empty_message));
    }
    let mut html = String::from("<div style=\"margin-top:20px;\">\n");
    for (idx, (key, fig)) in charts.iter().enumerate() {
        html.push_str(&format!(
            "    <div class=\"chart-block chart-panel\">\n        <h3>{}</h3>\n{}    </div>\n",
            heading(idx + 1, key),
            embedder.embed(fig)?
        ));
    }
    html.push_str("</div>");
    Ok(html)
}

pub fn single_sku_section(
    embedder: &mut ChartEmbedder,
    charts: &IndexMap<String, Figure>,
) -> Result<String> {
    let body = chart_blocks(
        embedder,
        charts,
        |idx, sku| format!("Analysis {}: {}", idx, sku),
        SKU_PLACEHOLDER,
    )?;
    Ok(tab("single-sku", false, "Anomalous SKU Deep Dive", &body))
}

pub fn category_section(
    embedder: &mut ChartEmbedder,
    charts: &IndexMap<String, Figure>,
) -> Result<String> {
    let body = chart_blocks(
        embedder,
        charts,
        |_, category| format!("Category: {}", category),
        CATEGORY_PLACEHOLDER,
    )?;
    Ok(tab(
        "category-compare",
        false,
        "Anomalous SKU Comparison by Category",
        &body,
    ))
}

/// Alternating row shading: even rows (1-based) are grey.
pub fn row_color(row: usize) -> &'static str {
    if row % 2 == 0 {
        "#f9f9f9"
    } else {
        "#ffffff"
    }
}

pub fn suggestions_section(suggestions: &[Suggestion]) -> String {
    let mut rows = String::new();
    for (idx, item) in suggestions.iter().enumerate() {
        let actions = item
            .suggestions
            .iter()
            .map(|s| format!("• {}", s))
            .collect::<Vec<_>>()
            .join("<br>");
        rows.push_str(&format!(
            r#"
            <tr style="background-color:{color};">
                <td class="sku-cell"><strong>{sku}</strong></td>
                <td>{name}</td>
                <td><span class="category-badge">{category}</span></td>
                <td><span class="reason-badge">{reason}</span></td>
                <td class="suggestion-cell">{actions}</td>
            </tr>"#,
            color = row_color(idx + 1),
            sku = item.sku,
            name = item.product_name,
            category = item.category,
            reason = item.primary_reason,
            actions = actions,
        ));
    }
    let body = format!(
        r#"    <table class="suggestions-table">
        <thead>
            <tr>
                <th>SKU</th>
                <th>Product</th>
                <th>Category</th>
                <th>Primary reason</th>
                <th>Suggested actions</th>
            </tr>
        </thead>
        <tbody>{}
        </tbody>
    </table>"#,
        rows
    );
    tab("suggestions", false, "Optimization Suggestions for Anomalous SKUs", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpis(total: usize) -> InventoryKpis {
        InventoryKpis {
            total_skus: total,
            anomaly_count: 1,
            anomaly_rate: if total > 0 { 1.0 / total as f64 } else { 0.0 },
            normal_count: 2,
            backlog_count: 1,
            severe_count: 0,
        }
    }

    #[test]
    fn test_overview_has_five_cards() {
        let html = overview_section(&kpis(4));
        assert_eq!(html.matches("class=\"kpi-card ").count(), 5);
        assert!(html.contains("50.0%"));
        assert!(html.contains("1/4"));
        assert!(html.contains("tab-content active"));
    }

    #[test]
    fn test_overview_with_no_skus_has_zero_percentages() {
        let html = overview_section(&kpis(0));
        assert!(html.contains("0.0%"));
        assert!(!html.contains("NaN"));
        assert!(!html.contains("inf%"));
    }

    #[test]
    fn test_empty_sku_charts_render_placeholder() {
        let mut embedder = ChartEmbedder::new();
        let html = single_sku_section(&mut embedder, &IndexMap::new()).unwrap();
        assert!(html.contains(SKU_PLACEHOLDER));
        assert!(html.contains("id=\"single-sku\""));
        assert_eq!(embedder.charts_embedded(), 0);
    }

    #[test]
    fn test_sku_blocks_are_numbered_in_order() {
        let mut charts = IndexMap::new();
        charts.insert("SKU1003".to_string(), Figure::default());
        charts.insert("SKU1001".to_string(), Figure::default());
        let mut embedder = ChartEmbedder::new();
        let html = single_sku_section(&mut embedder, &charts).unwrap();
        let first = html.find("Analysis 1: SKU1003").unwrap();
        let second = html.find("Analysis 2: SKU1001").unwrap();
        assert!(first < second);
        assert_eq!(embedder.charts_embedded(), 2);
    }

    #[test]
    fn test_suggestion_rows_alternate_and_bullet() {
        let rows = vec![
            Suggestion {
                sku: "SKU1".to_string(),
                product_name: "Product 1".to_string(),
                category: "A".to_string(),
                primary_reason: "Overstock".to_string(),
                suggestions: vec!["Cut reorder point".to_string(), "Run promotion".to_string()],
            },
            Suggestion {
                sku: "SKU2".to_string(),
                product_name: "Product 2".to_string(),
                category: "B".to_string(),
                primary_reason: "Slow sales".to_string(),
                suggestions: vec![],
            },
        ];
        let html = suggestions_section(&rows);
        assert!(html.contains("background-color:#ffffff"));
        assert!(html.contains("background-color:#f9f9f9"));
        assert!(html.contains("• Cut reorder point<br>• Run promotion"));
        assert!(html.contains("<span class=\"reason-badge\">Overstock</span>"));
        assert!(html.contains("<span class=\"category-badge\">B</span>"));
    }
}
