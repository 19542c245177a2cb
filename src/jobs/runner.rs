//! Runs jobs by kind against the configured store and generator.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::cms::{CommitResult, DocumentStore};
use crate::error::{WorkerError, WorkerResult};
use crate::ids::DocumentId;
use crate::jobs::{JobData, JobKind, article, product};
use crate::llm::GenerationClient;
use crate::preview::PreviewRecord;
use crate::text::FieldPolicies;

/// Executes jobs. Cheap to share behind an `Arc`.
pub struct JobRunner {
    store: Arc<dyn DocumentStore>,
    generator: Arc<GenerationClient>,
    policies: FieldPolicies,
}

impl JobRunner {
    /// Create a runner.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<GenerationClient>,
        policies: FieldPolicies,
    ) -> Self {
        Self {
            store,
            generator,
            policies,
        }
    }

    /// Run the job registered for `name`.
    ///
    /// # Errors
    /// [`WorkerError::UnknownEvent`] for unregistered names, otherwise the
    /// job's own error.
    pub async fn run_named(&self, name: &str, data: Value) -> WorkerResult<Value> {
        let kind: JobKind = name.parse()?;
        self.run(kind, data).await
    }

    /// Run one job to completion.
    ///
    /// # Errors
    /// Returns the job's error: bad input, missing document or store failure.
    pub async fn run(&self, kind: JobKind, data: Value) -> WorkerResult<Value> {
        let data = JobData::from_value(data)?;
        info!(event = %kind, doc_id = ?data.doc_id, "job started");

        let outcome = match kind {
            JobKind::ProductTitleSuggest => product::title_suggest(self, &data).await,
            JobKind::ProductShortGenerate => product::short_generate(self, &data).await,
            JobKind::ProductImageAltRename => product::image_alt_rename(self, &data).await,
            JobKind::ProductGalleryAltGenerate => product::gallery_alt_generate(self, &data).await,
            JobKind::ArticleTocGenerate => article::toc_generate(self, &data).await,
            JobKind::ArticleFaqGenerate => article::faq_generate(self, &data).await,
            JobKind::ArticleImageAltGenerate => article::image_alt_generate(self, &data).await,
        };

        match &outcome {
            Ok(_) => info!(event = %kind, "job finished"),
            Err(e) => warn!(event = %kind, error = %e, "job failed"),
        }
        outcome
    }

    pub(crate) fn generator(&self) -> &GenerationClient {
        &self.generator
    }

    pub(crate) const fn policies(&self) -> &FieldPolicies {
        &self.policies
    }

    /// Fetch a document that must exist.
    pub(crate) async fn load(&self, id: &DocumentId, what: &str) -> WorkerResult<Value> {
        self.store
            .get_document(id)
            .await?
            .ok_or_else(|| WorkerError::NotFound(format!("{what} not found")))
    }

    /// Replace the document's preview.
    pub(crate) async fn write_preview(
        &self,
        id: &DocumentId,
        record: PreviewRecord,
    ) -> WorkerResult<CommitResult> {
        let event = record.event.clone();
        let result = self.store.commit(record.into_patch(id)).await?;
        info!(id = %id, event = %event, "preview written");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cms::MemoryStore;
    use crate::jobs::testing::mock_runner;

    #[tokio::test]
    async fn test_unknown_event() {
        let runner = mock_runner(Arc::new(MemoryStore::new()));
        let err = runner.run_named("ai/nope", json!({})).await.unwrap_err();
        assert!(matches!(err, WorkerError::UnknownEvent(_)));
    }

    #[tokio::test]
    async fn test_missing_doc_id_is_bad_request() {
        let runner = mock_runner(Arc::new(MemoryStore::new()));
        for kind in JobKind::ALL {
            let err = runner.run(kind, json!({"docId": "drafts."})).await.unwrap_err();
            assert!(matches!(err, WorkerError::BadRequest(_)), "{kind}");
        }
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let runner = mock_runner(Arc::new(MemoryStore::new()));
        let err = runner
            .run(JobKind::ProductShortGenerate, json!({"docId": "ghost"}))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::NotFound(_)));
    }
}
