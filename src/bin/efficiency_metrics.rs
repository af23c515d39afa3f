use supply_chain_analytics::config::Config;
use supply_chain_analytics::dashboard::bundle::save_bundle;
use supply_chain_analytics::metrics::{build_efficiency_bundle, get_avg_lead_time, row_counts};
use supply_chain_analytics::storage::SupplyStore;

fn run(cfg: &Config) -> anyhow::Result<()> {
    let summary = get_avg_lead_time(cfg)?;
    match summary.avg_lead_time {
        Some(avg) => println!("avg_lead_time={:.2}", avg),
        None => println!("avg_lead_time=NULL"),
    }

    let store = SupplyStore::open_existing(&cfg.sqlite_path)?;
    for (table, rows) in row_counts(&store)? {
        println!("{:<16} {}", table, rows);
    }
    let bundle = build_efficiency_bundle(&store, 10)?;
    println!(
        "fill_rate={:.3} delivered={:.3} cancelled={:.3} sales_orders={}",
        bundle.kpis.fill_rate,
        bundle.kpis.delivered_rate,
        bundle.kpis.cancelled_rate,
        bundle.kpis.total_sales_orders
    );
    let path = cfg.efficiency_bundle_path();
    save_bundle(&path, &bundle)?;
    println!("efficiency results saved to {}", path.display());
    Ok(())
}

fn main() {
    let cfg = Config::from_env();
    if let Err(err) = run(&cfg) {
        eprintln!("efficiency metrics failed: {:#}", err);
        std::process::exit(1);
    }
}
