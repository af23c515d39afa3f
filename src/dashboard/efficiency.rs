//! Efficiency view: lead time, fill rate and sales status, plus any forecast
//! charts supplied by the analysis stage.

use anyhow::{Context, Result};
use std::fs;

use super::bundle::EfficiencyBundle;
use super::chart::ChartEmbedder;
use super::sections::{chart_blocks, kpi_card, placeholder, row_color, tab};
use super::template::write_stylesheet;
use super::{generated_at, DashboardOutput, RenderedDashboard};
use crate::config::Config;
use crate::logging::{info, obj, v_count, v_str, Domain, StageTimer};
use crate::metrics::{EfficiencyKpis, SupplierLeadTime};

pub const FORECAST_PLACEHOLDER: &str =
    "No forecast charts were supplied with the efficiency results.";

const TAB_SCRIPT: &str = r#"  <script>
    document.querySelectorAll('.tab-button').forEach(function (button) {
      button.addEventListener('click', function () {
        document.querySelectorAll('.tab-button').forEach(function (b) { b.classList.remove('active'); });
        document.querySelectorAll('.tab-content').forEach(function (c) { c.classList.remove('active'); });
        button.classList.add('active');
        var target = document.getElementById(button.dataset.tab);
        if (target) { target.classList.add('active'); }
        window.dispatchEvent(new Event('resize'));
      });
    });
  </script>"#;

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn kpi_section(kpis: &EfficiencyKpis) -> String {
    let lead = kpis
        .avg_lead_time_days
        .map(|d| format!("{:.1} days", d))
        .unwrap_or_else(|| "n/a".to_string());
    let cards = [
        kpi_card("kpi-normal", "Average lead time", &lead, None),
        kpi_card("kpi-success", "Fill rate", &percent(kpis.fill_rate), Some("received / ordered")),
        kpi_card(
            "kpi-info",
            "Sales orders",
            &kpis.total_sales_orders.to_string(),
            None,
        ),
        kpi_card("kpi-success", "Delivered", &percent(kpis.delivered_rate), None),
        kpi_card("kpi-danger", "Cancelled", &percent(kpis.cancelled_rate), None),
    ];
    let body = format!("    <div class=\"kpi-container\">{}\n    </div>", cards.concat());
    tab("efficiency-kpis", true, "Efficiency KPIs", &body)
}

fn supplier_table(rows: &[SupplierLeadTime]) -> String {
    if rows.is_empty() {
        return placeholder("No supplier lead times available.");
    }
    let mut body = String::new();
    for (idx, row) in rows.iter().enumerate() {
        body.push_str(&format!(
            "\n            <tr style=\"background-color:{}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td></tr>",
            row_color(idx + 1),
            row.supplier_id,
            row.supplier_name,
            row.orders,
            row.avg_lead_time
        ));
    }
    format!(
        r#"    <table class="data-table">
        <thead>
            <tr><th>Supplier ID</th><th>Supplier</th><th>Orders</th><th>Avg lead time (days)</th></tr>
        </thead>
        <tbody>{}
        </tbody>
    </table>"#,
        body
    )
}

/// Composes the efficiency document.
pub fn render_efficiency_dashboard(
    bundle: &EfficiencyBundle,
    timestamp: &str,
) -> Result<RenderedDashboard> {
    let mut embedder = ChartEmbedder::new();
    let kpi_html = kpi_section(&bundle.kpis);

    let mut supplier_body = String::new();
    if let Some(fig) = &bundle.lead_time_chart {
        supplier_body.push_str(&format!(
            "    <div class=\"chart-panel\">\n{}    </div>\n",
            embedder.embed(fig)?
        ));
    }
    supplier_body.push_str(&supplier_table(&bundle.supplier_lead_times));
    let supplier_html = tab("suppliers", false, "Supplier Lead Times", &supplier_body);

    let status_body = match &bundle.sales_status_chart {
        Some(fig) => format!(
            "    <div class=\"chart-panel\">\n{}    </div>",
            embedder.embed(fig)?
        ),
        None => placeholder("No sales orders loaded."),
    };
    let status_html = tab("sales-status", false, "Sales Order Status", &status_body);

    let forecast_body = chart_blocks(
        &mut embedder,
        &bundle.forecast_charts,
        |_, name| name.to_string(),
        FORECAST_PLACEHOLDER,
    )?;
    let forecast_html = tab("forecasts", false, "Forecasts", &forecast_body);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Supply Chain Efficiency Dashboard</title>
  <link rel="stylesheet" href="styles.css">
</head>
<body>
  <header class="header">
    <h1>Supply Chain Efficiency Dashboard</h1>
    <p class="header-sub">Generated {timestamp}</p>
  </header>

  <nav class="tabs">
    <button class="tab-button active" data-tab="efficiency-kpis">KPIs</button>
    <button class="tab-button" data-tab="suppliers">Suppliers</button>
    <button class="tab-button" data-tab="sales-status">Sales Status</button>
    <button class="tab-button" data-tab="forecasts">Forecasts</button>
  </nav>

  <main class="container">
{kpi}{suppliers}{status}{forecast}  </main>

  <footer class="footer">Static report. Regenerate with the <code>efficiency_dashboard</code> stage.</footer>

{script}
</body>
</html>
"#,
        timestamp = timestamp,
        kpi = kpi_html,
        suppliers = supplier_html,
        status = status_html,
        forecast = forecast_html,
        script = TAB_SCRIPT,
    );
    Ok(RenderedDashboard {
        html,
        charts_embedded: embedder.charts_embedded(),
    })
}

pub fn run_efficiency_dashboard(
    config: &Config,
    bundle: &EfficiencyBundle,
) -> Result<DashboardOutput> {
    let _timer = StageTimer::start(Domain::Dashboard, "efficiency_dashboard");
    fs::create_dir_all(&config.dashboard_dir)
        .with_context(|| format!("failed to create {}", config.dashboard_dir.display()))?;

    let rendered = render_efficiency_dashboard(bundle, &generated_at())?;
    let stylesheet_path = config.stylesheet_path();
    write_stylesheet(&config.static_css_path, &stylesheet_path)?;
    let html_path = config.efficiency_html_path();
    fs::write(&html_path, &rendered.html)
        .with_context(|| format!("failed to write {}", html_path.display()))?;

    info(
        Domain::Dashboard,
        "efficiency_dashboard_written",
        obj(&[
            ("path", v_str(&html_path.display().to_string())),
            ("forecast_charts", v_count(bundle.forecast_charts.len())),
            ("charts_embedded", v_count(rendered.charts_embedded)),
        ]),
    );
    Ok(DashboardOutput {
        html_path,
        stylesheet_path,
        charts_embedded: rendered.charts_embedded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::chart::{Figure, PLOTLY_CDN};
    use indexmap::IndexMap;

    fn bundle() -> EfficiencyBundle {
        EfficiencyBundle {
            kpis: EfficiencyKpis {
                avg_lead_time_days: Some(12.25),
                fill_rate: 0.9,
                total_sales_orders: 40,
                delivered_rate: 0.25,
                cancelled_rate: 0.1,
            },
            forecast_charts: IndexMap::new(),
            lead_time_chart: None,
            sales_status_chart: None,
            supplier_lead_times: vec![SupplierLeadTime {
                supplier_id: 3,
                supplier_name: "Supplier 2".to_string(),
                orders: 7,
                avg_lead_time: 18.0,
            }],
        }
    }

    #[test]
    fn test_renders_kpis_and_placeholders() {
        let out = render_efficiency_dashboard(&bundle(), "2024-01-01 00:00:00").unwrap();
        assert!(out.html.contains("12.2 days") || out.html.contains("12.3 days"));
        assert!(out.html.contains("90.0%"));
        assert!(out.html.contains(FORECAST_PLACEHOLDER));
        assert!(out.html.contains("<td>Supplier 2</td>"));
        assert!(out.html.contains("href=\"styles.css\""));
        assert_eq!(out.charts_embedded, 0);
        assert!(!out.html.contains(PLOTLY_CDN));
    }

    #[test]
    fn test_missing_lead_time_shows_na() {
        let mut b = bundle();
        b.kpis.avg_lead_time_days = None;
        let out = render_efficiency_dashboard(&b, "t").unwrap();
        assert!(out.html.contains(">n/a<"));
    }

    #[test]
    fn test_library_script_included_once() {
        let mut b = bundle();
        b.lead_time_chart = Some(Figure::default());
        b.sales_status_chart = Some(Figure::default());
        b.forecast_charts.insert("SKU1001 forecast".to_string(), Figure::default());
        let out = render_efficiency_dashboard(&b, "t").unwrap();
        assert_eq!(out.charts_embedded, 3);
        assert_eq!(out.html.matches(PLOTLY_CDN).count(), 1);
        assert!(out.html.contains("<h3>SKU1001 forecast</h3>"));
    }
}
