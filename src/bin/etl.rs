use supply_chain_analytics::config::Config;
use supply_chain_analytics::etl::run_etl;

fn main() {
    let cfg = Config::from_env();
    let loads = match run_etl(&cfg) {
        Ok(loads) => loads,
        Err(err) => {
            eprintln!("etl failed: {:#}", err);
            std::process::exit(1);
        }
    };
    for load in &loads {
        println!(
            "{:<16} rows={:<6} coerced_dates={:<4} sha256={}",
            load.table,
            load.rows,
            load.coerced_dates,
            &load.sha256[..12.min(load.sha256.len())]
        );
    }
    println!("data loaded into {}", cfg.sqlite_path.display());
}
