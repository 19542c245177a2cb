//! Async client for an Ollama-compatible `/api/generate` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::llm::{GeneratedOutput, GenerationError, OutputKind};

/// Connect timeout for provider requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default system prompt for structured output.
const JSON_ONLY_SYSTEM: &str = "Return JSON only. No explanations.";

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    format: Value,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// One structured generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Output shape.
    pub kind: OutputKind,
    /// User prompt.
    pub prompt: String,
    /// System prompt.
    pub system: String,
    /// Upper bound for list-shaped outputs.
    pub max_items: Option<usize>,
    /// Output token budget; the configured default when `None`.
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature; the configured default when `None`.
    pub temperature: Option<f64>,
    /// Value returned in mock mode and on any failure.
    pub fallback: GeneratedOutput,
}

impl GenerationRequest {
    /// Request the shape of `fallback`.
    #[must_use]
    pub fn new(prompt: impl Into<String>, fallback: GeneratedOutput) -> Self {
        Self {
            kind: fallback.kind(),
            prompt: prompt.into(),
            system: JSON_ONLY_SYSTEM.to_string(),
            max_items: None,
            max_output_tokens: None,
            temperature: None,
            fallback,
        }
    }

    /// Replace the system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Cap list-shaped outputs.
    #[must_use]
    pub const fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Set the output token budget.
    #[must_use]
    pub const fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Structured-output generation with a deterministic fallback.
pub struct GenerationClient {
    client: Client,
    config: LlmConfig,
    mock_mode: bool,
}

impl GenerationClient {
    /// Create a client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: LlmConfig, mock_mode: bool) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            mock_mode,
        })
    }

    /// Whether provider calls are skipped.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        self.mock_mode
    }

    /// Generate output, falling back to the request's fallback value.
    ///
    /// Never fails: mock mode returns the fallback directly and any provider
    /// failure is logged and replaced by the fallback.
    pub async fn generate(&self, request: GenerationRequest) -> GeneratedOutput {
        if self.mock_mode {
            debug!(kind = request.kind.as_str(), "mock generation");
            return request.fallback;
        }

        match self.try_generate(&request).await {
            Ok(output) => output,
            Err(e) => {
                warn!(kind = request.kind.as_str(), error = %e, "generation failed, using fallback");
                request.fallback
            }
        }
    }

    /// Call the provider once and validate its reply.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, empty or
    /// malformed output.
    pub async fn try_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedOutput, GenerationError> {
        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let body = GenerateBody {
            model: &self.config.model,
            prompt: &request.prompt,
            system: &request.system,
            format: request.kind.json_schema(request.max_items),
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature.unwrap_or(self.config.temperature),
                num_predict: request
                    .max_output_tokens
                    .unwrap_or(self.config.max_output_tokens),
            },
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .response
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!(kind = request.kind.as_str(), chars = text.len(), "generation received");
        GeneratedOutput::parse(request.kind, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::TitlesOutput;

    fn fallback() -> GeneratedOutput {
        GeneratedOutput::Titles(TitlesOutput {
            titles: vec!["Fallback title".to_string()],
        })
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("prompt", fallback())
            .with_max_items(3)
            .with_max_output_tokens(256)
            .with_temperature(0.2);
        assert_eq!(request.kind, OutputKind::Titles);
        assert_eq!(request.system, JSON_ONLY_SYSTEM);
        assert_eq!(request.max_items, Some(3));
        assert_eq!(request.max_output_tokens, Some(256));
    }

    #[tokio::test]
    async fn test_mock_returns_fallback() {
        let client = GenerationClient::new(LlmConfig::default(), true).unwrap();
        assert!(client.is_mock());
        let out = client.generate(GenerationRequest::new("p", fallback())).await;
        assert_eq!(out, fallback());
    }

    #[tokio::test]
    async fn test_unreachable_provider_returns_fallback() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..LlmConfig::default()
        };
        let client = GenerationClient::new(config, false).unwrap();
        let request = GenerationRequest::new("p", fallback());
        assert!(client.try_generate(&request).await.is_err());
        assert_eq!(client.generate(request).await, fallback());
    }
}
