use supply_chain_analytics::config::Config;
use supply_chain_analytics::generator::run_generator;

fn main() {
    let cfg = Config::from_env();
    match run_generator(&cfg) {
        Ok(data) => {
            println!("mock data written to {} (seed {})", cfg.raw_dir.display(), data.seed);
            println!(
                "products={} suppliers={} purchase_orders={} inventory={} inbound_records={} sales_orders={}",
                data.products.len(),
                data.suppliers.len(),
                data.purchase_orders.len(),
                data.inventory.len(),
                data.inbound_records.len(),
                data.sales_orders.len()
            );
        }
        Err(err) => {
            eprintln!("mock data generation failed: {:#}", err);
            std::process::exit(1);
        }
    }
}
