//! End-to-end pipeline scenarios with injected encoders.

mod util;

use product_search::catalog::{CatalogRow, load_catalog};
use product_search::search::embedder::Embedder;
use product_search::search::hash_embedder::HashEmbedder;
use product_search::search::lexicon::{LexicalExpander, SynonymTable, open_lexicon};
use product_search::search::pipeline::{SearchError, SearchMode, SearchOutcome, SearchPipeline};
use serde_json::json;
use std::sync::Arc;
use util::{ScriptedEmbedder, TempFixtureDir, TestTracing, rows};

fn jacket_expander() -> LexicalExpander {
    let table = SynonymTable::from_senses([(
        "jacket",
        vec![vec!["jacket", "coat"], vec!["jacket", "crown"]],
    )]);
    LexicalExpander::new(Arc::new(table))
}

fn apparel_embedder() -> ScriptedEmbedder {
    ScriptedEmbedder::new(3)
        .with("red running shoes", vec![0.9, 0.1, 0.0])
        .with("blue jacket", vec![0.0, 0.2, 0.9])
        .with("shoes", vec![1.0, 0.0, 0.0])
        .with("jacket", vec![0.0, 0.0, 1.0])
}

#[test]
fn encoders_accept_empty_text() {
    let scripted = apparel_embedder();
    assert_eq!(scripted.embed("").unwrap(), vec![0.0; 3]);
    assert_eq!(scripted.embed_batch(&["", "shoes"]).unwrap().len(), 2);

    let hash = HashEmbedder::default_dimension();
    assert_eq!(hash.embed("").unwrap().len(), hash.dimension());
}

#[test]
fn rank_catalog_puts_shoe_row_first_for_shoes_query() {
    let catalog = rows(&["red running shoes", "blue jacket"]);
    let pipeline = SearchPipeline::new(Arc::new(apparel_embedder()));

    let records = pipeline.rank_catalog("shoes", &catalog).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], catalog[0].display_record());
    assert_eq!(records[1], catalog[1].display_record());
}

#[test]
fn rank_catalog_with_hash_embedder_prefers_shared_tokens() {
    let catalog = rows(&["red running shoes", "blue jacket"]);
    let pipeline = SearchPipeline::new(Arc::new(HashEmbedder::default_dimension()));

    let records = pipeline.rank_catalog("shoes", &catalog).unwrap();
    assert_eq!(records[0].title, "Product 0");
}

#[test]
fn filter_then_rank_returns_only_the_jacket_row() {
    let catalog = rows(&["red running shoes", "blue jacket", "wool socks"]);
    let pipeline =
        SearchPipeline::new(Arc::new(apparel_embedder())).with_expander(jacket_expander());

    let ids = pipeline.filter_then_rank("jacket", &catalog).unwrap();
    assert_eq!(ids, vec![1]);
}

#[test]
fn filter_then_rank_with_no_matches_is_empty_and_never_encodes() {
    let catalog = rows(&["red running shoes", "wool socks"]);
    let embedder = Arc::new(apparel_embedder());
    let pipeline = SearchPipeline::new(embedder.clone()).with_expander(jacket_expander());

    let ids = pipeline.filter_then_rank("jacket", &catalog).unwrap();

    assert!(ids.is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[test]
fn filter_then_rank_encodes_each_survivor_and_the_query() {
    let catalog = rows(&["blue jacket", "leather coat", "wool socks", "gold crown"]);
    let embedder = Arc::new(apparel_embedder());
    let pipeline = SearchPipeline::new(embedder.clone())
        .with_expander(jacket_expander())
        .with_top_k(10);

    let ids = pipeline.filter_then_rank("jacket", &catalog).unwrap();

    // 3 survivors (jacket, coat, crown) plus the keyword itself.
    assert_eq!(embedder.calls(), 4);
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], 0, "exact jacket row scores highest");
    assert!(!ids.contains(&2));
}

#[test]
fn top_k_is_capped_by_eligible_rows() {
    let catalog = rows(&["red running shoes", "   "]);
    let pipeline = SearchPipeline::new(Arc::new(apparel_embedder())).with_top_k(2);

    let records = pipeline.rank_catalog("shoes", &catalog).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn synonym_match_survives_filter() {
    let catalog = rows(&["leather coat", "wool socks"]);
    let pipeline =
        SearchPipeline::new(Arc::new(apparel_embedder())).with_expander(jacket_expander());

    assert_eq!(pipeline.filter_then_rank("Jacket", &catalog).unwrap(), vec![0]);
}

#[test]
fn equal_scores_keep_catalog_order() {
    // Every row maps to the fallback zero vector, so all scores tie at 0.
    let catalog = rows(&["alpha", "beta", "gamma", "delta"]);
    let pipeline = SearchPipeline::new(Arc::new(ScriptedEmbedder::new(3))).with_top_k(3);

    let first = pipeline.rank_catalog("query", &catalog).unwrap();
    let second = pipeline.rank_catalog("query", &catalog).unwrap();

    let titles: Vec<&str> = first.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Product 0", "Product 1", "Product 2"]);
    assert_eq!(first, second);
}

#[test]
fn empty_query_is_rejected_in_both_modes() {
    let catalog = rows(&["blue jacket"]);
    let pipeline =
        SearchPipeline::new(Arc::new(apparel_embedder())).with_expander(jacket_expander());

    assert!(matches!(
        pipeline.run(SearchMode::RankCatalog, "", &catalog),
        Err(SearchError::EmptyQuery)
    ));
    assert!(matches!(
        pipeline.run(SearchMode::FilterThenRank, " \t", &catalog),
        Err(SearchError::EmptyQuery)
    ));
}

#[test]
fn empty_catalog_returns_empty_without_encoding() {
    let embedder = Arc::new(apparel_embedder());
    let pipeline = SearchPipeline::new(embedder.clone()).with_expander(jacket_expander());
    let catalog: Vec<CatalogRow> = Vec::new();

    assert_eq!(
        pipeline.run(SearchMode::RankCatalog, "shoes", &catalog).unwrap(),
        SearchOutcome::Records(Vec::new())
    );
    assert_eq!(
        pipeline.run(SearchMode::FilterThenRank, "jacket", &catalog).unwrap(),
        SearchOutcome::Identifiers(Vec::new())
    );
    assert_eq!(embedder.calls(), 0);
}

#[test]
fn dimension_mismatch_surfaces_as_error() {
    struct Lopsided;
    impl Embedder for Lopsided {
        fn embed(&self, text: &str) -> product_search::search::embedder::EmbedderResult<Vec<f32>> {
            Ok(if text == "shoes" { vec![1.0, 0.0] } else { vec![1.0] })
        }
        fn dimension(&self) -> usize {
            2
        }
        fn id(&self) -> &str {
            "lopsided"
        }
        fn is_semantic(&self) -> bool {
            false
        }
    }

    let catalog = rows(&["red running shoes"]);
    let err = SearchPipeline::new(Arc::new(Lopsided))
        .rank_catalog("shoes", &catalog)
        .unwrap_err();
    assert!(matches!(err, SearchError::DimensionMismatch(_)));
}

#[test]
fn batch_and_single_encoding_rank_identically() {
    let catalog = rows(&[
        "red running shoes",
        "blue jacket",
        "leather coat",
        "jacket with hood",
    ]);
    let pipeline = SearchPipeline::new(Arc::new(HashEmbedder::default_dimension()))
        .with_expander(LexicalExpander::new(Arc::new(SynonymTable::new())))
        .with_top_k(4);

    // Mode A encodes in one batch, Mode B row by row; over the same
    // candidate set they must agree.
    let jacket_rows: Vec<CatalogRow> = catalog
        .iter()
        .filter(|r| r.searchable_text.contains("jacket"))
        .cloned()
        .collect();
    let by_batch: Vec<String> = pipeline
        .rank_catalog("jacket", &jacket_rows)
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    let by_row: Vec<String> = pipeline
        .filter_then_rank("jacket", &catalog)
        .unwrap()
        .into_iter()
        .map(|id| format!("Product {id}"))
        .collect();

    assert_eq!(by_batch.len(), 2);
    assert_eq!(by_batch, by_row);
}

#[test]
fn pipeline_runs_from_files_on_disk() {
    let fixture = TempFixtureDir::new();
    let catalog_path = fixture.write_catalog(&[
        ("Trail Shoes", "red running shoes"),
        ("Rain Jacket", "blue waterproof jacket"),
        ("Pea Coat", "navy wool coat"),
    ]);
    let lexicon_path = fixture.write_synonyms(json!({
        "jacket": [["jacket", "coat"]]
    }));

    let catalog = load_catalog(&catalog_path).unwrap();
    let database = open_lexicon(&lexicon_path).unwrap();
    let pipeline = SearchPipeline::new(Arc::new(HashEmbedder::default_dimension()))
        .with_expander(LexicalExpander::new(database))
        .with_top_k(5);

    let mut ids = pipeline.filter_then_rank("jacket", &catalog).unwrap();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn search_emits_completion_log() {
    let tracing = TestTracing::new();
    let _guard = tracing.install();

    let catalog = rows(&["red running shoes", "blue jacket"]);
    let pipeline = SearchPipeline::new(Arc::new(apparel_embedder()));
    pipeline.rank_catalog("shoes", &catalog).unwrap();

    tracing.assert_contains("search complete");
    tracing.assert_contains("rank_catalog");
}
