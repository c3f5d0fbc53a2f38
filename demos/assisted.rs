//! Assisted extraction with the deterministic fallback.
//!
//! Without the `http` feature (or without `VARIGEN_API_KEY`) the extraction
//! service is a stand-in that always fails, so the scan takes over.
//!
//! ```text
//! RUST_LOG=varigen=debug cargo run --example assisted --features http
//! ```

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;
use varigen::{Engine, ExtractionRequest, ExtractionService, ParseFailure};

struct Offline;

#[async_trait]
impl ExtractionService for Offline {
    async fn extract(&self, _: &ExtractionRequest) -> Result<String, ParseFailure> {
        Err(ParseFailure::Unavailable {
            reason: "no extraction service configured".into(),
        })
    }
}

#[cfg(feature = "http")]
fn service() -> Box<dyn ExtractionService> {
    match varigen::HttpExtractor::from_env() {
        Ok(extractor) => Box::new(extractor),
        Err(_) => Box::new(Offline),
    }
}

#[cfg(not(feature = "http"))]
fn service() -> Box<dyn ExtractionService> {
    Box::new(Offline)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = Engine::default();
    let parser = engine.assisted_parser(service());

    let prompt = "S to 2XL, black, white and navy blue, price 49.90, 2XL +5, stock 20";
    let rule_set = parser.resolve(prompt).await;
    println!("{}", serde_json::to_string_pretty(&rule_set).unwrap_or_default());

    match engine.expand(&rule_set) {
        Ok(variants) => {
            for variant in &variants {
                println!("{variant}");
            }
        }
        Err(problems) => println!("{problems}"),
    }
}
