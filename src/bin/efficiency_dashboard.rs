use supply_chain_analytics::config::Config;
use supply_chain_analytics::dashboard::{load_efficiency_bundle, run_efficiency_dashboard};

fn main() {
    let cfg = Config::from_env();
    let result = load_efficiency_bundle(&cfg.efficiency_bundle_path())
        .and_then(|bundle| run_efficiency_dashboard(&cfg, &bundle));
    match result {
        Ok(out) => println!(
            "efficiency dashboard written to {} ({} charts)",
            out.html_path.display(),
            out.charts_embedded
        ),
        Err(err) => {
            eprintln!("efficiency dashboard generation failed: {:#}", err);
            std::process::exit(1);
        }
    }
}
