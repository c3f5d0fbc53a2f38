//! OpenAI-compatible chat-completions client for assisted extraction.

use async_trait::async_trait;
use serde::Deserialize;

use super::assisted::{ExtractionRequest, ExtractionService};
use super::error::ParseFailure;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// [`ExtractionService`] over HTTP, requesting a JSON-object reply.
#[derive(Clone)]
pub struct HttpExtractor {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for HttpExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExtractor")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

impl HttpExtractor {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Reads `VARIGEN_API_KEY`, and optionally `VARIGEN_ENDPOINT` and
    /// `VARIGEN_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::Unavailable`] when no API key is set.
    pub fn from_env() -> Result<Self, ParseFailure> {
        let api_key = std::env::var("VARIGEN_API_KEY")
            .map_err(|_| ParseFailure::unavailable("VARIGEN_API_KEY is not set"))?;
        let mut extractor = Self::new(api_key);
        if let Ok(endpoint) = std::env::var("VARIGEN_ENDPOINT") {
            extractor = extractor.with_endpoint(endpoint);
        }
        if let Ok(model) = std::env::var("VARIGEN_MODEL") {
            extractor = extractor.with_model(model);
        }
        Ok(extractor)
    }
}

fn transport(err: reqwest::Error) -> ParseFailure {
    ParseFailure::unavailable(err.to_string())
}

#[async_trait]
impl ExtractionService for HttpExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ParseFailure> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": request.instruction},
                {"role": "user", "content": &request.prompt}
            ],
            "temperature": 0,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ParseFailure::unavailable(format!("status {status}: {detail}")));
        }

        let text = response.text().await.map_err(transport)?;
        let completion: CompletionResponse = serde_json::from_str(&text)?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ParseFailure::Empty)
    }
}
