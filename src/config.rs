use std::path::PathBuf;

/// Record counts and seed for the mock data generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub n_products: usize,
    pub n_suppliers: usize,
    pub n_purchase_orders: usize,
    pub n_warehouses: usize,
    pub n_sales_orders: usize,
    /// Fixed seed for reproducible output; a fresh one is drawn when unset.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_products: 200,
            n_suppliers: 50,
            n_purchase_orders: 5000,
            n_warehouses: 5,
            n_sales_orders: 3000,
            seed: None,
        }
    }
}

/// Filesystem layout shared by every stage. All paths hang off `root` unless
/// overridden.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub raw_dir: PathBuf,
    pub sqlite_path: PathBuf,
    pub dashboard_dir: PathBuf,
    /// Optional HTML template override; the built-in template is used when absent.
    pub template_path: PathBuf,
    /// Optional stylesheet override; the built-in stylesheet is used when absent.
    pub static_css_path: PathBuf,
    pub generator: GeneratorConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            raw_dir: root.join("data").join("raw"),
            sqlite_path: root.join("supply_chain.db"),
            dashboard_dir: root.join("dashboards"),
            template_path: root.join("templates").join("dashboard_template.html"),
            static_css_path: root.join("static").join("styles.css"),
            generator: GeneratorConfig::default(),
            root,
        }
    }

    pub fn from_env() -> Self {
        let root = std::env::var("SCA_ROOT").unwrap_or_else(|_| ".".to_string());
        let mut cfg = Self::with_root(root);
        if let Ok(v) = std::env::var("RAW_DIR") {
            cfg.raw_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SQLITE_PATH") {
            cfg.sqlite_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DASHBOARD_DIR") {
            cfg.dashboard_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("TEMPLATE_PATH") {
            cfg.template_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("STATIC_CSS") {
            cfg.static_css_path = PathBuf::from(v);
        }
        let defaults = GeneratorConfig::default();
        cfg.generator = GeneratorConfig {
            n_products: env_or("N_PRODUCTS", defaults.n_products),
            n_suppliers: env_or("N_SUPPLIERS", defaults.n_suppliers),
            n_purchase_orders: env_or("N_PURCHASE_ORDERS", defaults.n_purchase_orders),
            n_warehouses: env_or("N_WAREHOUSES", defaults.n_warehouses),
            n_sales_orders: env_or("N_SALES_ORDERS", defaults.n_sales_orders),
            seed: std::env::var("SEED").ok().and_then(|v| v.parse().ok()),
        };
        cfg
    }

    pub fn csv_path(&self, file_name: &str) -> PathBuf {
        self.raw_dir.join(file_name)
    }

    pub fn inventory_bundle_path(&self) -> PathBuf {
        self.dashboard_dir.join("inventory_analysis_results.json")
    }

    pub fn efficiency_bundle_path(&self) -> PathBuf {
        self.dashboard_dir.join("efficiency_results.json")
    }

    pub fn dashboard_html_path(&self) -> PathBuf {
        self.dashboard_dir.join("supply_chain_dashboard.html")
    }

    pub fn efficiency_html_path(&self) -> PathBuf {
        self.dashboard_dir.join("efficiency_dashboard.html")
    }

    pub fn stylesheet_path(&self) -> PathBuf {
        self.dashboard_dir.join("styles.css")
    }
}
