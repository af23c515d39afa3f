use supply_chain_analytics::config::Config;
use supply_chain_analytics::dashboard::{load_inventory_bundle, run_dashboard};

fn main() {
    let cfg = Config::from_env();
    let result = load_inventory_bundle(&cfg.inventory_bundle_path())
        .and_then(|bundle| run_dashboard(&cfg, &bundle));
    match result {
        Ok(out) => {
            println!("dashboard written to {}", out.html_path.display());
            println!("stylesheet written to {}", out.stylesheet_path.display());
        }
        Err(err) => {
            eprintln!("dashboard generation failed: {:#}", err);
            std::process::exit(1);
        }
    }
}
