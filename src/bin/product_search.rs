use clap::Parser;
use product_search::cli::{ProductSearchCli, init_tracing, run_product_search};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = ProductSearchCli::parse();
    run_product_search(&cli)
}
