use serde_json::{json, Value};
use std::fs;
use supply_chain_analytics::config::{Config, GeneratorConfig};
use supply_chain_analytics::dashboard::bundle::{save_bundle, InventoryBundle};
use supply_chain_analytics::dashboard::chart::PLOTLY_CDN;
use supply_chain_analytics::dashboard::sections::{CATEGORY_PLACEHOLDER, SKU_PLACEHOLDER};
use supply_chain_analytics::dashboard::template::{unresolved_placeholders, DEFAULT_STYLESHEET};
use supply_chain_analytics::dashboard::{
    load_efficiency_bundle, load_inventory_bundle, run_dashboard, run_efficiency_dashboard,
};
use supply_chain_analytics::etl::run_etl;
use supply_chain_analytics::generator::run_generator;
use supply_chain_analytics::metrics::build_efficiency_bundle;
use supply_chain_analytics::storage::SupplyStore;
use tempfile::TempDir;

fn figure(kind: &str, title: &str) -> Value {
    json!({
        "data": [{"type": kind, "x": [1, 2, 3], "y": [4, 5, 6]}],
        "layout": {"title": {"text": title}}
    })
}

fn fixture() -> Value {
    json!({
        "fig_heatmap_full": figure("heatmap", "Days of inventory"),
        "abnormal_sku_charts": {
            "SKU1004": figure("scatter", "SKU1004 trend"),
            "SKU1001": figure("scatter", "SKU1001 trend")
        },
        "category_comparison_charts": {
            "A": figure("bar", "Category A")
        },
        "abnormal_sku_list": [
            {"sku": "SKU1004", "doi": 640.0},
            {"sku": "SKU1001", "doi": 210.5},
            {"sku": "SKU1001", "doi": 180.0}
        ],
        "health_summary": [
            {"category": "A", "Normal (<100 days)": 3, "Backlogged (100-500 days)": 1, "Severe backlog (500+ days)": 1},
            {"category": "B", "Normal (<100 days)": 2, "Backlogged (100-500 days)": 0, "Severe backlog (500+ days)": 0}
        ],
        "abnormal_analysis": [
            {"sku": "SKU1004", "reason": ["Overstock", "Slow sales"]},
            {"sku": "SKU1001", "reason": []}
        ],
        "optimization_suggestions": [
            {
                "sku": "SKU1004",
                "product_name": "Product 4",
                "category": "A",
                "primary_reason": "Overstock",
                "suggestions": ["Pause replenishment", "Transfer stock"]
            },
            {
                "sku": "SKU1001",
                "product_name": "Product 1",
                "category": "A",
                "primary_reason": "Other",
                "suggestions": ["Review demand plan"]
            }
        ]
    })
}

fn write_fixture(cfg: &Config, value: &Value) {
    fs::create_dir_all(&cfg.dashboard_dir).unwrap();
    fs::write(cfg.inventory_bundle_path(), serde_json::to_string(value).unwrap()).unwrap();
}

#[test]
fn test_inventory_dashboard_end_to_end() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::with_root(dir.path());
    write_fixture(&cfg, &fixture());

    let bundle = load_inventory_bundle(&cfg.inventory_bundle_path()).unwrap();
    let out = run_dashboard(&cfg, &bundle).unwrap();

    let html = fs::read_to_string(&out.html_path).unwrap();
    assert_eq!(out.html_path, dir.path().join("dashboards").join("supply_chain_dashboard.html"));
    // heatmap, reasons, health, two SKU charts, one category chart
    assert_eq!(out.charts_embedded, 6);
    assert_eq!(html.matches(PLOTLY_CDN).count(), 1);
    assert!(unresolved_placeholders(&html).is_empty());
    assert!(html.contains("Analysis 1: SKU1004"));
    assert!(html.contains("Analysis 2: SKU1001"));
    assert!(html.contains("Category: A"));
    assert!(html.contains("• Pause replenishment<br>• Transfer stock"));
    // Two distinct SKUs, two suggestion records.
    assert!(html.contains("2/2"));

    // No override in place, so the built-in stylesheet is written.
    assert_eq!(fs::read_to_string(&out.stylesheet_path).unwrap(), DEFAULT_STYLESHEET);
}

#[test]
fn test_empty_chart_maps_render_placeholders() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::with_root(dir.path());
    let mut value = fixture();
    value["abnormal_sku_charts"] = json!({});
    value["category_comparison_charts"] = json!({});
    write_fixture(&cfg, &value);

    let bundle = load_inventory_bundle(&cfg.inventory_bundle_path()).unwrap();
    let out = run_dashboard(&cfg, &bundle).unwrap();
    let html = fs::read_to_string(&out.html_path).unwrap();
    assert!(html.contains(SKU_PLACEHOLDER));
    assert!(html.contains(CATEGORY_PLACEHOLDER));
    assert_eq!(out.charts_embedded, 3);
}

#[test]
fn test_template_and_stylesheet_overrides_are_used() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::with_root(dir.path());
    write_fixture(&cfg, &fixture());
    fs::create_dir_all(cfg.template_path.parent().unwrap()).unwrap();
    fs::write(
        &cfg.template_path,
        "<html><body>{{overview_html}}<i>{{timestamp}}</i>{{suggestions_table_html}}</body></html>",
    )
    .unwrap();
    fs::create_dir_all(cfg.static_css_path.parent().unwrap()).unwrap();
    fs::write(&cfg.static_css_path, "body { margin: 0; }").unwrap();

    let bundle = load_inventory_bundle(&cfg.inventory_bundle_path()).unwrap();
    let out = run_dashboard(&cfg, &bundle).unwrap();
    let html = fs::read_to_string(&out.html_path).unwrap();
    assert!(html.starts_with("<html><body>"));
    assert!(html.contains("Optimization Suggestions"));
    assert!(!html.contains("{{timestamp}}"));
    assert_eq!(fs::read_to_string(&out.stylesheet_path).unwrap(), "body { margin: 0; }");
}

#[test]
fn test_bundle_missing_a_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::with_root(dir.path());
    let mut value = fixture();
    value.as_object_mut().unwrap().remove("health_summary");
    write_fixture(&cfg, &value);

    let err = format!("{:#}", load_inventory_bundle(&cfg.inventory_bundle_path()).unwrap_err());
    assert!(err.contains("health_summary"));
    assert!(err.contains("incomplete or malformed"));
}

#[test]
fn test_missing_bundle_names_path_and_upstream_step() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::with_root(dir.path());
    let err = load_inventory_bundle(&cfg.inventory_bundle_path()).unwrap_err().to_string();
    assert!(err.contains("inventory_analysis_results.json"));
    assert!(err.contains("first"));

    let err = load_efficiency_bundle(&cfg.efficiency_bundle_path()).unwrap_err().to_string();
    assert!(err.contains("efficiency_metrics"));
}

#[test]
fn test_bundle_survives_save_and_load() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::with_root(dir.path());
    let bundle: InventoryBundle = serde_json::from_value(fixture()).unwrap();
    save_bundle(&cfg.inventory_bundle_path(), &bundle).unwrap();
    let loaded = load_inventory_bundle(&cfg.inventory_bundle_path()).unwrap();
    let keys: Vec<&String> = loaded.abnormal_sku_charts.keys().collect();
    assert_eq!(keys, vec!["SKU1004", "SKU1001"]);
}

#[test]
fn test_efficiency_dashboard_from_loaded_store() {
    let dir = TempDir::new().unwrap();
    let mut cfg = Config::with_root(dir.path());
    cfg.generator = GeneratorConfig {
        n_products: 5,
        n_suppliers: 2,
        n_purchase_orders: 10,
        n_warehouses: 1,
        n_sales_orders: 20,
        seed: Some(7),
    };
    run_generator(&cfg).unwrap();
    run_etl(&cfg).unwrap();

    let store = SupplyStore::open_existing(&cfg.sqlite_path).unwrap();
    let bundle = build_efficiency_bundle(&store, 10).unwrap();
    save_bundle(&cfg.efficiency_bundle_path(), &bundle).unwrap();

    let loaded = load_efficiency_bundle(&cfg.efficiency_bundle_path()).unwrap();
    assert_eq!(loaded.kpis.total_sales_orders, 20);
    assert!((loaded.kpis.fill_rate - bundle.kpis.fill_rate).abs() < 1e-9);
    let out = run_efficiency_dashboard(&cfg, &loaded).unwrap();
    let html = fs::read_to_string(&out.html_path).unwrap();
    assert_eq!(out.html_path, dir.path().join("dashboards").join("efficiency_dashboard.html"));
    assert_eq!(html.matches(PLOTLY_CDN).count(), 1);
    assert_eq!(out.charts_embedded, 2);
    assert!(html.contains("Supplier Lead Times"));
    assert!(out.stylesheet_path.exists());
}
