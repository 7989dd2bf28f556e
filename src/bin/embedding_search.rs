use clap::Parser;
use product_search::cli::{EmbeddingSearchCli, init_tracing, run_embedding_search};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = EmbeddingSearchCli::parse();
    run_embedding_search(&cli)
}
