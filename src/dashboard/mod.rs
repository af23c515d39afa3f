//! Static HTML dashboards over pre-computed analysis bundles.
//!
//! Two views share the rendering toolkit in this module:
//! - the inventory-health view ([`run_dashboard`]), template driven;
//! - the efficiency view ([`efficiency::run_efficiency_dashboard`]), composed inline.

pub mod bundle;
pub mod chart;
pub mod efficiency;
pub mod kpi;
pub mod sections;
pub mod template;

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::logging::{info, obj, v_count, v_str, warn, Domain, StageTimer};
use bundle::InventoryBundle;
use chart::ChartEmbedder;
use kpi::{
    health_by_category_chart, reason_distribution_chart, tally_primary_reasons, InventoryKpis,
};

pub use bundle::{load_efficiency_bundle, load_inventory_bundle, EfficiencyBundle};
pub use efficiency::run_efficiency_dashboard;

#[derive(Debug, Clone)]
pub struct DashboardOutput {
    pub html_path: PathBuf,
    pub stylesheet_path: PathBuf,
    pub charts_embedded: usize,
}

/// Rendered document plus the number of charts it embeds.
#[derive(Debug, Clone)]
pub struct RenderedDashboard {
    pub html: String,
    pub charts_embedded: usize,
}

pub fn generated_at() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Renders the inventory-health document into `template`.
pub fn render_inventory_dashboard(
    bundle: &InventoryBundle,
    template: &str,
    timestamp: &str,
) -> Result<RenderedDashboard> {
    let kpis = InventoryKpis::compute(
        &bundle.abnormal_sku_list,
        &bundle.optimization_suggestions,
        &bundle.health_summary,
    );
    let reasons = tally_primary_reasons(&bundle.abnormal_analysis);
    let reason_fig = reason_distribution_chart(&reasons);
    let health_fig = health_by_category_chart(&bundle.health_summary);

    // Document order: the first chart embedded carries the library script.
    let mut embedder = ChartEmbedder::new();
    let overview_html = sections::overview_section(&kpis);
    let heatmap_html = sections::heatmap_section(&mut embedder, &bundle.fig_heatmap_full)?;
    let analysis_html = sections::analysis_section(&mut embedder, &reason_fig, &health_fig)?;
    let single_sku_html = sections::single_sku_section(&mut embedder, &bundle.abnormal_sku_charts)?;
    let category_html =
        sections::category_section(&mut embedder, &bundle.category_comparison_charts)?;
    let suggestions_html = sections::suggestions_section(&bundle.optimization_suggestions);

    let html = template::render_template(
        template,
        &[
            ("overview_html", &overview_html),
            ("heatmap_html", &heatmap_html),
            ("analysis_overview_html", &analysis_html),
            ("single_sku_html", &single_sku_html),
            ("category_comparison_html", &category_html),
            ("suggestions_table_html", &suggestions_html),
            ("timestamp", timestamp),
        ],
    );
    Ok(RenderedDashboard {
        html,
        charts_embedded: embedder.charts_embedded(),
    })
}

/// Builds the inventory-health dashboard and writes it with its stylesheet.
pub fn run_dashboard(config: &Config, bundle: &InventoryBundle) -> Result<DashboardOutput> {
    let _timer = StageTimer::start(Domain::Dashboard, "dashboard");
    fs::create_dir_all(&config.dashboard_dir)
        .with_context(|| format!("failed to create {}", config.dashboard_dir.display()))?;

    let template_src = template::load_template(&config.template_path)?;
    let rendered = render_inventory_dashboard(bundle, &template_src, &generated_at())?;
    let leftover = template::unresolved_placeholders(&rendered.html);
    if !leftover.is_empty() {
        warn(
            Domain::Dashboard,
            "unresolved_placeholders",
            obj(&[("names", v_str(&leftover.join(",")))]),
        );
    }

    let stylesheet_path = config.stylesheet_path();
    template::write_stylesheet(&config.static_css_path, &stylesheet_path)?;
    let html_path = config.dashboard_html_path();
    fs::write(&html_path, &rendered.html)
        .with_context(|| format!("failed to write {}", html_path.display()))?;

    info(
        Domain::Dashboard,
        "dashboard_written",
        obj(&[
            ("path", v_str(&html_path.display().to_string())),
            ("sku_charts", v_count(bundle.abnormal_sku_charts.len())),
            ("category_charts", v_count(bundle.category_comparison_charts.len())),
            ("suggestions", v_count(bundle.optimization_suggestions.len())),
            ("charts_embedded", v_count(rendered.charts_embedded)),
        ]),
    );
    Ok(DashboardOutput {
        html_path,
        stylesheet_path,
        charts_embedded: rendered.charts_embedded,
    })
}
