use product_search::catalog::CatalogRow;
use product_search::search::embedder::{Embedder, EmbedderResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Embedder that maps each configured phrase to a fixed vector and counts
/// every text it is asked to encode. Unknown text, including the empty
/// string, gets the fallback vector.
#[allow(dead_code)]
pub struct ScriptedEmbedder {
    table: Vec<(String, Vec<f32>)>,
    fallback: Vec<f32>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            table: Vec::new(),
            fallback: vec![0.0; dimension],
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.fallback.len());
        self.table.push((text.to_lowercase(), vector));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for ScriptedEmbedder {
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = text.to_lowercase();
        Ok(self
            .table
            .iter()
            .find(|(t, _)| *t == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn dimension(&self) -> usize {
        self.fallback.len()
    }

    fn id(&self) -> &str {
        "scripted"
    }

    fn is_semantic(&self) -> bool {
        true
    }
}

/// Build display-ready rows from searchable texts; ids are positions.
#[allow(dead_code)]
pub fn rows(texts: &[&str]) -> Vec<CatalogRow> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            CatalogRow::new(i, *text).with_display(
                format!("Product {i}"),
                format!("https://shop.example/p/{i}"),
                format!("https://img.example/p/{i}.png"),
                format!("{}.99", 10 + i),
                "",
            )
        })
        .collect()
}

/// Temp dir holding a catalog CSV and, optionally, a JSON synonym table.
#[allow(dead_code)]
pub struct TempFixtureDir {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TempFixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    /// Write `products.csv` with one row per `(title, text)` pair.
    pub fn write_catalog(&self, products: &[(&str, &str)]) -> PathBuf {
        let path = self.dir.path().join("products.csv");
        let mut writer = csv::Writer::from_path(&path).expect("create catalog");
        writer
            .write_record([
                "displayTitle",
                "embeddingText",
                "url",
                "imageUrl",
                "productType",
                "discount",
                "price",
            ])
            .expect("header");
        for (i, (title, text)) in products.iter().enumerate() {
            writer
                .write_record([
                    title.to_string(),
                    text.to_string(),
                    format!("https://shop.example/p/{i}"),
                    format!("https://img.example/p/{i}.png"),
                    "apparel".to_string(),
                    String::new(),
                    "19.99".to_string(),
                ])
                .expect("row");
        }
        writer.flush().expect("flush");
        path
    }

    /// Write `synonyms.json` in the `{"word": [["lemma", ...], ...]}` shape.
    pub fn write_synonyms(&self, json: serde_json::Value) -> PathBuf {
        let path = self.dir.path().join("synonyms.json");
        std::fs::write(&path, serde_json::to_vec_pretty(&json).unwrap()).expect("write synonyms");
        path
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}
