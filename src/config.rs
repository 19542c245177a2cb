//! Service configuration.
//!
//! Read once at startup (see [`WorkerConfig::from_env`]) and passed to the
//! clients that need it; nothing below the startup path reads the process
//! environment.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{WorkerError, WorkerResult};
use crate::text::FieldPolicies;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Top-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Return schema examples instead of calling the generation provider.
    pub mock_mode: bool,
    /// Value of `Access-Control-Allow-Origin` (`*` allows any origin).
    pub allowed_origin: String,
    /// HTTP listen port.
    pub port: u16,
    /// Document store settings.
    pub cms: CmsConfig,
    /// Generation provider settings.
    pub llm: LlmConfig,
    /// Event dispatch settings.
    pub events: EventsConfig,
    /// Clamp policies per field kind.
    pub policies: FieldPolicies,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mock_mode: false,
            allowed_origin: "*".to_string(),
            port: DEFAULT_PORT,
            cms: CmsConfig::default(),
            llm: LlmConfig::default(),
            events: EventsConfig::default(),
            policies: FieldPolicies::default(),
        }
    }
}

impl WorkerConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle mock generation.
    #[must_use]
    pub const fn with_mock_mode(mut self, mock_mode: bool) -> Self {
        self.mock_mode = mock_mode;
        self
    }

    /// Set the allowed CORS origin.
    #[must_use]
    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    /// Select the document store backend.
    #[must_use]
    pub const fn with_cms_backend(mut self, backend: CmsBackend) -> Self {
        self.cms.backend = backend;
        self
    }

    /// Select the event dispatch mode.
    #[must_use]
    pub const fn with_event_mode(mut self, mode: EventMode) -> Self {
        self.events.mode = mode;
        self
    }

    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = get("AI_MOCK") {
            config.mock_mode = parse_flag(&v);
        }
        if let Some(v) = get("ALLOWED_ORIGIN") {
            config.allowed_origin = v;
        }
        if let Some(v) = get("PORT") {
            config.port = parse_number("PORT", &v)?;
        }

        if let Some(v) = get("CMS_BACKEND") {
            config.cms.backend = v.parse()?;
        }
        if let Some(v) = get("SANITY_PROJECT_ID") {
            config.cms.project_id = v;
        }
        if let Some(v) = get("SANITY_DATASET") {
            config.cms.dataset = v;
        }
        config.cms.token = get("SANITY_TOKEN");
        if let Some(v) = get("SANITY_API_VERSION") {
            config.cms.api_version = v;
        }
        config.cms.api_host = get("SANITY_API_HOST");

        if let Some(v) = get("EVENT_MODE") {
            config.events.mode = v.parse()?;
        }
        config.events.event_url = get("EVENT_URL");
        if let Some(v) = get("EVENT_KEY") {
            config.events.event_key = v;
        }

        if let Some(v) = get("LLM_BASE_URL") {
            config.llm.base_url = v;
        }
        if let Some(v) = get("LLM_MODEL") {
            config.llm.model = v;
        }
        if let Some(v) = get("LLM_TEMPERATURE") {
            config.llm.temperature = parse_number("LLM_TEMPERATURE", &v)?;
        }
        if let Some(v) = get("LLM_MAX_OUTPUT_TOKENS") {
            config.llm.max_output_tokens = parse_number("LLM_MAX_OUTPUT_TOKENS", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.allowed_origin.trim().is_empty() {
            return Err(WorkerError::Config(
                "allowed_origin must not be empty".to_string(),
            ));
        }

        if self.cms.backend == CmsBackend::Sanity {
            if self.cms.project_id.is_empty() {
                return Err(WorkerError::Config(
                    "cms.project_id is required for the sanity backend".to_string(),
                ));
            }
            if self.cms.dataset.is_empty() {
                return Err(WorkerError::Config(
                    "cms.dataset is required for the sanity backend".to_string(),
                ));
            }
        }

        if let Some(host) = &self.cms.api_host {
            Url::parse(host)?;
        }

        if !self.mock_mode {
            Url::parse(&self.llm.base_url)?;
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(WorkerError::Config(
                "llm.temperature must be within 0.0..=2.0".to_string(),
            ));
        }

        if self.llm.max_output_tokens == 0 {
            return Err(WorkerError::Config(
                "llm.max_output_tokens must be > 0".to_string(),
            ));
        }

        if self.events.mode == EventMode::Http {
            Url::parse(&self.events.url())?;
        }

        Ok(())
    }
}

/// Document store backend selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmsBackend {
    /// Sanity HTTP data API.
    Sanity,
    /// Process-local in-memory documents.
    Memory,
}

impl std::str::FromStr for CmsBackend {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sanity" => Ok(Self::Sanity),
            "memory" => Ok(Self::Memory),
            other => Err(WorkerError::Config(format!("unknown CMS_BACKEND: {other}"))),
        }
    }
}

/// Document store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Which store implementation to use.
    pub backend: CmsBackend,
    /// Sanity project id.
    pub project_id: String,
    /// Sanity dataset.
    pub dataset: String,
    /// API token with write access.
    pub token: Option<String>,
    /// Data API version date.
    pub api_version: String,
    /// Override for `https://<project>.api.sanity.io`.
    pub api_host: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            backend: CmsBackend::Sanity,
            project_id: String::new(),
            dataset: "production".to_string(),
            token: None,
            api_version: "2025-01-01".to_string(),
            api_host: None,
            request_timeout_secs: 30,
        }
    }
}

impl CmsConfig {
    /// Base URL of the data API.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.api_host.as_ref().map_or_else(
            || format!("https://{}.api.sanity.io", self.project_id),
            |host| host.trim_end_matches('/').to_string(),
        )
    }
}

/// Generation provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama-compatible base URL.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Default output token budget.
    pub max_output_tokens: u32,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "ministral-3:8b-instruct-2512-q8_0".to_string(),
            temperature: 0.6,
            max_output_tokens: 1024,
            request_timeout_secs: 120,
        }
    }
}

/// How triggered events reach the job runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    /// Forward to an external event system over HTTP.
    Http,
    /// Run the job on this process' runtime.
    Inline,
}

impl std::str::FromStr for EventMode {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "inline" => Ok(Self::Inline),
            other => Err(WorkerError::Config(format!("unknown EVENT_MODE: {other}"))),
        }
    }
}

/// Event dispatch settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Dispatch mode.
    pub mode: EventMode,
    /// Explicit event endpoint.
    pub event_url: Option<String>,
    /// Event key used to build the default endpoint.
    pub event_key: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            mode: EventMode::Http,
            event_url: None,
            event_key: "dev".to_string(),
        }
    }
}

impl EventsConfig {
    /// Event endpoint, defaulting to a local dev server.
    #[must_use]
    pub fn url(&self) -> String {
        self.event_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:8288/e/{}", self.event_key))
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> WorkerResult<T> {
    value
        .parse()
        .map_err(|_| WorkerError::Config(format!("{key} is not a valid number: {value}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert!(!config.mock_mode);
        assert_eq!(config.allowed_origin, "*");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.events.url(), "http://127.0.0.1:8288/e/dev");
        assert_eq!(config.policies.title.max_chars, 60);
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = WorkerConfig::from_lookup(lookup(&[
            ("AI_MOCK", "1"),
            ("ALLOWED_ORIGIN", "http://localhost:3333"),
            ("PORT", "8080"),
            ("SANITY_PROJECT_ID", "abc123"),
            ("SANITY_DATASET", "staging"),
            ("SANITY_TOKEN", "sk-test"),
            ("EVENT_MODE", "inline"),
        ]))
        .unwrap();

        assert!(config.mock_mode);
        assert_eq!(config.allowed_origin, "http://localhost:3333");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cms.base_url(), "https://abc123.api.sanity.io");
        assert_eq!(config.cms.dataset, "staging");
        assert_eq!(config.cms.token.as_deref(), Some("sk-test"));
        assert_eq!(config.events.mode, EventMode::Inline);
    }

    #[test]
    fn test_sanity_backend_requires_project() {
        let err = WorkerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, WorkerError::Config(_)));
    }

    #[test]
    fn test_memory_backend_needs_no_project() {
        let config = WorkerConfig::from_lookup(lookup(&[("CMS_BACKEND", "memory")])).unwrap();
        assert_eq!(config.cms.backend, CmsBackend::Memory);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(WorkerConfig::from_lookup(lookup(&[("CMS_BACKEND", "memory"), ("PORT", "http")])).is_err());
        assert!(WorkerConfig::from_lookup(lookup(&[("CMS_BACKEND", "mongo")])).is_err());
        assert!(
            WorkerConfig::from_lookup(lookup(&[("CMS_BACKEND", "memory"), ("LLM_TEMPERATURE", "9")]))
                .is_err()
        );
    }
}
