use anyhow::{bail, Result};
use supply_chain_analytics::config::Config;
use supply_chain_analytics::dashboard::bundle::save_bundle;
use supply_chain_analytics::dashboard::{
    load_efficiency_bundle, load_inventory_bundle, run_dashboard, run_efficiency_dashboard,
};
use supply_chain_analytics::etl::run_etl;
use supply_chain_analytics::generator::run_generator;
use supply_chain_analytics::logging::{info, obj, run_id, v_str, warn, Domain};
use supply_chain_analytics::metrics::{build_efficiency_bundle, get_avg_lead_time};
use supply_chain_analytics::storage::SupplyStore;

const USAGE: &str = "usage: supply-chain-analytics [generate|etl|metrics|dashboard|efficiency|all]";

fn metrics(cfg: &Config) -> Result<()> {
    let summary = get_avg_lead_time(cfg)?;
    let store = SupplyStore::open_existing(&cfg.sqlite_path)?;
    let bundle = build_efficiency_bundle(&store, 10)?;
    save_bundle(&cfg.efficiency_bundle_path(), &bundle)?;
    match summary.avg_lead_time {
        Some(avg) => println!("avg_lead_time={:.2}", avg),
        None => println!("avg_lead_time=NULL"),
    }
    Ok(())
}

fn inventory_dashboard(cfg: &Config) -> Result<()> {
    let bundle = load_inventory_bundle(&cfg.inventory_bundle_path())?;
    let out = run_dashboard(cfg, &bundle)?;
    println!("dashboard written to {}", out.html_path.display());
    Ok(())
}

fn efficiency_dashboard(cfg: &Config) -> Result<()> {
    let bundle = load_efficiency_bundle(&cfg.efficiency_bundle_path())?;
    let out = run_efficiency_dashboard(cfg, &bundle)?;
    println!("efficiency dashboard written to {}", out.html_path.display());
    Ok(())
}

fn run_all(cfg: &Config) -> Result<()> {
    let data = run_generator(cfg)?;
    println!("mock data written (seed {})", data.seed);
    let loads = run_etl(cfg)?;
    println!("{} tables loaded into {}", loads.len(), cfg.sqlite_path.display());
    metrics(cfg)?;
    efficiency_dashboard(cfg)?;
    // The inventory bundle comes from an external analysis step.
    if cfg.inventory_bundle_path().exists() {
        inventory_dashboard(cfg)?;
    } else {
        warn(
            Domain::System,
            "inventory_dashboard_skipped",
            obj(&[(
                "missing",
                v_str(&cfg.inventory_bundle_path().display().to_string()),
            )]),
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let stage = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let cfg = Config::from_env();
    info(
        Domain::System,
        "start",
        obj(&[("stage", v_str(&stage)), ("run_id", v_str(run_id()))]),
    );
    match stage.as_str() {
        "generate" => {
            let data = run_generator(&cfg)?;
            println!("mock data written (seed {})", data.seed);
        }
        "etl" => {
            let loads = run_etl(&cfg)?;
            println!("{} tables loaded into {}", loads.len(), cfg.sqlite_path.display());
        }
        "metrics" => metrics(&cfg)?,
        "dashboard" => inventory_dashboard(&cfg)?,
        "efficiency" => efficiency_dashboard(&cfg)?,
        "all" => run_all(&cfg)?,
        other => bail!("unknown stage `{}`\n{}", other, USAGE),
    }
    Ok(())
}
