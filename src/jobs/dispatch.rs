//! Handing triggered events to the job runner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::{WorkerError, WorkerResult};
use crate::jobs::{JobKind, JobRunner};

/// Timeout for forwarding an event.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts a named event and arranges for its job to run.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Dispatch `name` with `data`; the returned value is the response body.
    async fn dispatch(&self, name: &str, data: Value) -> WorkerResult<Value>;

    /// Where events go, for diagnostics.
    fn endpoint(&self) -> String;
}

/// Forwards events to an external event system.
pub struct HttpDispatcher {
    client: Client,
    url: String,
}

impl HttpDispatcher {
    /// Create a dispatcher posting to `url`.
    ///
    /// # Errors
    /// Returns an error if `url` is invalid or the client cannot be built.
    pub fn new(url: impl Into<String>) -> WorkerResult<Self> {
        let url = url.into();
        url::Url::parse(&url)?;
        let client = Client::builder()
            .timeout(DISPATCH_TIMEOUT)
            .build()
            .map_err(|e| WorkerError::Dispatch(e.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl EventDispatcher for HttpDispatcher {
    async fn dispatch(&self, name: &str, data: Value) -> WorkerResult<Value> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({"name": name, "data": data}))
            .send()
            .await
            .map_err(|e| WorkerError::Dispatch(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!(event = name, status = status.as_u16(), "event forwarded");

        Ok(json!({
            "ok": status.is_success(),
            "status": status.as_u16(),
            "body": body,
            "eventUrl": self.url,
        }))
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }
}

/// Runs jobs as tasks on the current tokio runtime.
pub struct InlineDispatcher {
    runner: Arc<JobRunner>,
}

impl InlineDispatcher {
    /// Create a dispatcher over `runner`.
    #[must_use]
    pub const fn new(runner: Arc<JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl EventDispatcher for InlineDispatcher {
    async fn dispatch(&self, name: &str, data: Value) -> WorkerResult<Value> {
        let kind: JobKind = name.parse()?;
        let runner = Arc::clone(&self.runner);

        tokio::spawn(async move {
            if let Err(e) = runner.run(kind, data).await {
                error!(event = %kind, error = %e, "inline job failed");
            }
        });

        Ok(json!({"ok": true, "queued": kind.event_name()}))
    }

    fn endpoint(&self) -> String {
        "inline".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cms::MemoryStore;
    use crate::jobs::testing::mock_runner;

    #[test]
    fn test_http_dispatcher_rejects_bad_url() {
        assert!(HttpDispatcher::new("not a url").is_err());
        let ok = HttpDispatcher::new("http://127.0.0.1:8288/e/dev").unwrap();
        assert_eq!(ok.endpoint(), "http://127.0.0.1:8288/e/dev");
    }

    #[tokio::test]
    async fn test_inline_dispatcher_runs_job() {
        let store = Arc::new(MemoryStore::new());
        store.insert(json!({"_id": "p1", "_type": "product", "name": "Wallet"}));
        let dispatcher = InlineDispatcher::new(Arc::new(mock_runner(Arc::clone(&store))));

        let out = dispatcher
            .dispatch("ai/product.title_suggest", json!({"docId": "p1"}))
            .await
            .unwrap();
        assert_eq!(out["queued"], "ai/product.title_suggest");

        for _ in 0..50 {
            if store.snapshot("p1").is_some_and(|d| d.get("aiPreview").is_some()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("inline job did not write a preview");
    }

    #[tokio::test]
    async fn test_inline_dispatcher_unknown_event() {
        let dispatcher = InlineDispatcher::new(Arc::new(mock_runner(Arc::new(MemoryStore::new()))));
        assert!(matches!(
            dispatcher.dispatch("ai/unknown", json!({})).await,
            Err(WorkerError::UnknownEvent(_))
        ));
    }
}
