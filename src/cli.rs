//! Command-line front ends for the two search modes.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::catalog::{DisplayRecord, load_catalog};
use crate::config::{OutputFormat, SearchConfig};
use crate::search::embedder_registry::get_embedder;
use crate::search::lexicon::{LexicalExpander, open_lexicon};
use crate::search::pipeline::SearchPipeline;

const NO_RESULTS: &str = "No matching products found.";

/// Flags shared by both binaries. Unset flags fall back to `PRODUCT_SEARCH_*`
/// variables, then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Embedder name or id (minilm, bert-base, hash). Defaults to the best available.
    #[arg(long)]
    pub embedder: Option<String>,

    /// Data dir holding `models/` (and `wordnet/`). Defaults to platform data dir.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Number of results to return (at least 1)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub top_k: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl CommonArgs {
    fn apply(&self, cfg: &mut SearchConfig) {
        if let Some(embedder) = &self.embedder {
            cfg.embedder = Some(embedder.clone());
        }
        if let Some(data_dir) = &self.data_dir {
            cfg.data_dir = data_dir.clone();
        }
        if let Some(top_k) = self.top_k {
            cfg.top_k = top_k;
        }
        if let Some(format) = self.format {
            cfg.format = format;
        }
    }
}

/// Rank a whole catalog against a free-text query.
#[derive(Parser, Debug)]
#[command(
    name = "embedding-search",
    version,
    about = "Rank every product in a CSV catalog by semantic similarity to a query"
)]
pub struct EmbeddingSearchCli {
    /// Free-text query
    pub query: String,

    /// Catalog CSV with embeddingText, displayTitle, url, imageUrl, price, discount columns
    pub csv_path: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl EmbeddingSearchCli {
    pub fn config(&self) -> SearchConfig {
        let mut cfg = SearchConfig::from_env();
        self.common.apply(&mut cfg);
        cfg.catalog_path = self.csv_path.clone();
        cfg
    }
}

/// Expand a keyword into synonyms, filter the catalog, rank the survivors.
#[derive(Parser, Debug)]
#[command(
    name = "product-search",
    version,
    about = "Find catalog rows matching a keyword or its synonyms, ranked by similarity"
)]
pub struct ProductSearchCli {
    /// Keyword to expand and search for
    pub keyword: String,

    /// Catalog CSV (default: products_list.csv)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// WordNet dict directory or JSON synonym file (default: <data-dir>/wordnet)
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ProductSearchCli {
    pub fn config(&self) -> SearchConfig {
        let mut cfg = SearchConfig::from_env();
        self.common.apply(&mut cfg);
        if let Some(catalog) = &self.catalog {
            cfg.catalog_path = catalog.clone();
        }
        if let Some(lexicon) = &self.lexicon {
            cfg.lexicon_path = Some(lexicon.clone());
        }
        cfg
    }
}

/// Log to stderr so stdout carries only results. `RUST_LOG` overrides the
/// default `warn` level. Colors only when stderr is a terminal.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

pub fn run_embedding_search(cli: &EmbeddingSearchCli) -> Result<()> {
    let cfg = cli.config();
    debug!(?cfg, "resolved configuration");

    let rows = load_catalog(&cfg.catalog_path)?;
    let embedder = get_embedder(&cfg.data_dir, cfg.embedder.as_deref())
        .context("failed to initialize embedder")?;
    let model = embedder.info();
    info!(
        embedder = %model.id,
        dimension = model.dimension,
        semantic = model.is_semantic,
        "embedder ready"
    );

    let pipeline = SearchPipeline::new(embedder).with_top_k(cfg.top_k);
    let records = pipeline
        .rank_catalog(&cli.query, &rows)
        .with_context(|| format!("search for '{}' failed", cli.query))?;

    write_stdout(&render_records(&records, cfg.format)?)
}

pub fn run_product_search(cli: &ProductSearchCli) -> Result<()> {
    let cfg = cli.config();
    debug!(?cfg, "resolved configuration");

    let lexicon_path = cfg.resolved_lexicon_path();
    let database = open_lexicon(&lexicon_path).with_context(|| {
        format!(
            "failed to open lexical database at {}",
            lexicon_path.display()
        )
    })?;
    let rows = load_catalog(&cfg.catalog_path)?;
    let embedder = get_embedder(&cfg.data_dir, cfg.embedder.as_deref())
        .context("failed to initialize embedder")?;
    let model = embedder.info();
    info!(
        embedder = %model.id,
        dimension = model.dimension,
        semantic = model.is_semantic,
        lexicon = database.id(),
        "search components ready"
    );

    let pipeline = SearchPipeline::new(embedder)
        .with_expander(LexicalExpander::new(database))
        .with_top_k(cfg.top_k);
    let ids = pipeline
        .filter_then_rank(&cli.keyword, &rows)
        .with_context(|| format!("search for '{}' failed", cli.keyword))?;

    write_stdout(&render_ids(&ids, cfg.format)?)
}

/// Display records as a JSON array, or `title - url` lines.
pub fn render_records(records: &[DisplayRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Text if records.is_empty() => Ok(NO_RESULTS.to_string()),
        OutputFormat::Text => Ok(records
            .iter()
            .map(|r| format!("{} - {}", r.title, r.url))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Row ids as a JSON array, or one per line.
pub fn render_ids(ids: &[usize], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(ids)?),
        OutputFormat::Text if ids.is_empty() => Ok(NO_RESULTS.to_string()),
        OutputFormat::Text => Ok(ids
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn write_stdout(body: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{body}").context("failed to write results")?;
    out.flush()?;
    Ok(())
}
