use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use varigen::{
    Engine, EngineConfig, ExtractionRequest, ExtractionService, ParseFailure, PromptParser,
    EXTRACTION_INSTRUCTION,
};

const PROMPT: &str = "S'den L'ye kadar kırmızı ve mavi, fiyat 120";

/// Replies with a fixed body and records what it was asked.
struct Recording {
    reply: String,
    seen: Mutex<Vec<ExtractionRequest>>,
}

impl Recording {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_owned(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ExtractionService for Recording {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ParseFailure> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

struct QuotaExhausted;

#[async_trait]
impl ExtractionService for QuotaExhausted {
    async fn extract(&self, _: &ExtractionRequest) -> Result<String, ParseFailure> {
        Err(ParseFailure::Unavailable {
            reason: "429 quota exhausted".into(),
        })
    }
}

struct Slow;

#[async_trait]
impl ExtractionService for Slow {
    async fn extract(&self, _: &ExtractionRequest) -> Result<String, ParseFailure> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(r#"{"sizes": ["XS"]}"#.to_owned())
    }
}

fn engine_with_timeout(ms: u64) -> Engine {
    let mut config = EngineConfig::default();
    config.parser.assisted_timeout_ms = ms;
    Engine::new(config)
}

#[tokio::test]
async fn assisted_result_is_used_when_available() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let service = Recording::replying(
        r#"{"sizes": ["L", "s", "M"], "colors": ["Kırmızı", "Standart"], "basePrice": 99.5}"#,
    );
    let engine = Engine::default();
    let parser = engine.assisted_parser(Arc::clone(&service));

    let rule_set = parser.resolve(PROMPT).await;
    assert_eq!(rule_set.sizes(), ["S", "M", "L"]);
    assert_eq!(rule_set.colors(), ["Kırmızı"]);
    assert_eq!(rule_set.base_price(), Some(Decimal::new(995, 1)));

    let seen = service.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].prompt, PROMPT);
    assert_eq!(seen[0].instruction, EXTRACTION_INSTRUCTION);
}

#[tokio::test]
async fn unavailable_service_falls_back_to_scan() {
    let engine = Engine::default();
    let rule_set = engine.assisted_parser(QuotaExhausted).resolve(PROMPT).await;
    assert_eq!(rule_set, engine.parse(PROMPT));
    assert_eq!(rule_set.sizes(), ["S", "M", "L"]);
}

#[tokio::test]
async fn malformed_reply_falls_back_to_scan() {
    let engine = Engine::default();
    for reply in ["", "I could not find any sizes.", "```json\n{\"sizes\": 3}\n```"] {
        let parser = engine.assisted_parser(Recording::replying(reply));
        let rule_set = parser.parse(PROMPT).await.unwrap();
        assert_eq!(rule_set, engine.parse(PROMPT), "reply {reply:?}");
    }
}

#[tokio::test]
async fn slow_service_times_out() {
    let engine = engine_with_timeout(50);
    let parser = engine.assisted_parser(Slow);

    let err = parser.primary().parse(PROMPT).await.unwrap_err();
    assert!(matches!(err, ParseFailure::Timeout { after } if after == Duration::from_millis(50)));

    let rule_set = parser.resolve(PROMPT).await;
    assert_eq!(rule_set.sizes(), ["S", "M", "L"]);
}

#[tokio::test]
async fn fallback_output_expands_like_the_deterministic_path() {
    let engine = Engine::default();
    let rule_set = engine.assisted_parser(QuotaExhausted).resolve(PROMPT).await;
    let variants = engine.expand(&rule_set).unwrap();
    assert_eq!(variants.len(), 6);
    assert!(variants.iter().all(|v| v.price == Decimal::from(120)));
}
