//! HTTP client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use certgen_core::error::GenerationFailure;
use certgen_core::generator::TextGenerator;

use crate::config::GeminiConfig;
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Header carrying the API key, so the key never appears in request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Errors from the Gemini REST layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The body was not a valid `generateContent` response.
    #[error("Malformed Gemini response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response decoded but carried no text.
    #[error("Gemini returned no text{}", block_suffix(.block_reason))]
    EmptyResponse { block_reason: Option<String> },
}

fn block_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {r})"))
        .unwrap_or_default()
}

/// Text generation client bound to one API key and model.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Build a client with the configured transport timeout.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Build a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send `prompt` and return the generated text of the first candidate.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let response = self
            .client
            .post(self.config.generate_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)?;

        parsed.text().ok_or_else(|| GeminiError::EmptyResponse {
            block_reason: parsed.block_reason().map(str::to_string),
        })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or capture the
    /// status and body text as a [`GeminiError::Api`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl From<GeminiError> for GenerationFailure {
    fn from(err: GeminiError) -> Self {
        GenerationFailure::Upstream(err.to_string())
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationFailure> {
        tracing::debug!(model = %self.config.model_name, prompt_len = prompt.len(), "Calling Gemini");
        Ok(self.generate_content(prompt).await?)
    }
}
