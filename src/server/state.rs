//! Application state shared across all request handlers.

use std::sync::Arc;

use tracing::info;

use crate::cms::{DocumentStore, MemoryStore, SanityStore};
use crate::config::{CmsBackend, EventMode, WorkerConfig};
use crate::error::WorkerResult;
use crate::ids::{KeyGenerator, UuidKeys};
use crate::jobs::{EventDispatcher, HttpDispatcher, InlineDispatcher, JobRunner};
use crate::llm::GenerationClient;

/// Shared application state.
pub struct AppState {
    /// Effective configuration.
    pub config: WorkerConfig,
    /// CMS access.
    pub store: Arc<dyn DocumentStore>,
    /// Runs jobs synchronously (`/api/jobs`).
    pub runner: Arc<JobRunner>,
    /// Hands triggered events off (`/api/ai/trigger`).
    pub dispatcher: Arc<dyn EventDispatcher>,
    /// Array `_key` source.
    pub keys: Arc<dyn KeyGenerator>,
}

impl AppState {
    /// Build state for `config`, selecting the store backend it names.
    ///
    /// # Errors
    /// Returns an error if a client cannot be created.
    pub fn new(config: WorkerConfig) -> WorkerResult<Arc<Self>> {
        let store: Arc<dyn DocumentStore> = match config.cms.backend {
            CmsBackend::Sanity => Arc::new(SanityStore::new(&config.cms)?),
            CmsBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Self::with_parts(config, store, Arc::new(UuidKeys))
    }

    /// Build state around an existing store and key generator.
    ///
    /// # Errors
    /// Returns an error if a client cannot be created.
    pub fn with_parts(
        config: WorkerConfig,
        store: Arc<dyn DocumentStore>,
        keys: Arc<dyn KeyGenerator>,
    ) -> WorkerResult<Arc<Self>> {
        let generator = Arc::new(GenerationClient::new(config.llm.clone(), config.mock_mode)?);
        let runner = Arc::new(JobRunner::new(
            Arc::clone(&store),
            generator,
            config.policies.clone(),
        ));

        let dispatcher: Arc<dyn EventDispatcher> = match config.events.mode {
            EventMode::Http => Arc::new(HttpDispatcher::new(config.events.url())?),
            EventMode::Inline => Arc::new(InlineDispatcher::new(Arc::clone(&runner))),
        };

        info!(
            backend = ?config.cms.backend,
            events = ?config.events.mode,
            mock = config.mock_mode,
            "application state ready"
        );

        Ok(Arc::new(Self {
            config,
            store,
            runner,
            dispatcher,
            keys,
        }))
    }
}
