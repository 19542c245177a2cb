//! Generation jobs and event dispatch.
//!
//! A job reads one document, asks the generator for a suggestion, normalizes
//! it and stores it as the document's preview. Jobs are addressed by event
//! name and reach the [`JobRunner`] either through an external event system
//! ([`HttpDispatcher`]) or directly on this process' runtime
//! ([`InlineDispatcher`]).

pub mod article;
pub mod dispatch;
pub mod product;
pub mod runner;

pub use dispatch::{EventDispatcher, HttpDispatcher, InlineDispatcher};
pub use runner::JobRunner;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WorkerError, WorkerResult};
use crate::ids::DocumentId;

/// Every job the worker knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Suggest product titles.
    ProductTitleSuggest,
    /// Generate product short and meta descriptions.
    ProductShortGenerate,
    /// Suggest the main image alt and file name.
    ProductImageAltRename,
    /// Suggest one alt per gallery image.
    ProductGalleryAltGenerate,
    /// Generate an article table of contents.
    ArticleTocGenerate,
    /// Generate an article FAQ.
    ArticleFaqGenerate,
    /// Derive article featured and body image alts.
    ArticleImageAltGenerate,
}

impl JobKind {
    /// All kinds, in registration order.
    pub const ALL: [Self; 7] = [
        Self::ProductTitleSuggest,
        Self::ProductShortGenerate,
        Self::ProductImageAltRename,
        Self::ProductGalleryAltGenerate,
        Self::ArticleTocGenerate,
        Self::ArticleFaqGenerate,
        Self::ArticleImageAltGenerate,
    ];

    /// Event name that triggers this job.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::ProductTitleSuggest => "ai/product.title_suggest",
            Self::ProductShortGenerate => "ai/product.short_generate",
            Self::ProductImageAltRename => "ai/product.image_alt_rename",
            Self::ProductGalleryAltGenerate => "ai/product.gallery_alt_generate",
            Self::ArticleTocGenerate => "ai/article.toc_generate",
            Self::ArticleFaqGenerate => "ai/article.faq_generate",
            Self::ArticleImageAltGenerate => "ai/article.image_alt_generate",
        }
    }

    /// `event` value written into the preview record.
    #[must_use]
    pub const fn preview_event(self) -> &'static str {
        match self {
            Self::ProductTitleSuggest => "title_suggest",
            Self::ProductShortGenerate => "short_generate",
            Self::ProductImageAltRename => "image_alt_rename",
            Self::ProductGalleryAltGenerate => "gallery_alt_generate",
            Self::ArticleTocGenerate => "toc_generate",
            Self::ArticleFaqGenerate => "faq_generate",
            Self::ArticleImageAltGenerate => "article_image_alt_generate",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

impl FromStr for JobKind {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.event_name() == s)
            .ok_or_else(|| WorkerError::UnknownEvent(s.to_string()))
    }
}

/// Event payload shared by all jobs. Unused fields are ignored per job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    /// Target document (draft or published id).
    #[serde(default)]
    pub doc_id: Option<String>,
    /// Document name, when the caller already has it.
    #[serde(default)]
    pub name: Option<String>,
    /// Upper bound on generated items.
    #[serde(default)]
    pub max: Option<i64>,
    /// Length hint for generated text.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Plain-text body excerpt supplied by the caller.
    #[serde(default)]
    pub body_preview: Option<String>,
    /// Caller metadata (`userId`, `lang`, `tone`, ...).
    #[serde(default)]
    pub meta: Value,
}

impl JobData {
    /// Parse event data; `null` yields empty data.
    ///
    /// # Errors
    /// Returns [`WorkerError::BadRequest`] if the value has the wrong shape.
    pub fn from_value(value: Value) -> WorkerResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| WorkerError::BadRequest(format!("Invalid event data: {e}")))
    }

    /// Published id of the target document.
    ///
    /// # Errors
    /// Returns [`WorkerError::BadRequest`] when missing.
    pub fn document_id(&self) -> WorkerResult<DocumentId> {
        self.doc_id
            .as_deref()
            .and_then(DocumentId::parse)
            .ok_or_else(WorkerError::missing_doc_id)
    }

    /// `max` clamped to `1..=upper`, or `default` when absent.
    #[must_use]
    pub fn max_or(&self, default: usize, upper: usize) -> usize {
        self.max.map_or(default, |m| {
            usize::try_from(m.max(1)).map_or(upper, |m| m.min(upper))
        })
    }

    /// Non-blank string from `meta`.
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::cms::MemoryStore;
    use crate::config::LlmConfig;
    use crate::jobs::JobRunner;
    use crate::llm::GenerationClient;
    use crate::text::FieldPolicies;

    /// Runner over `store` with mock generation.
    pub fn mock_runner(store: Arc<MemoryStore>) -> JobRunner {
        let generator = GenerationClient::new(LlmConfig::default(), true).unwrap();
        JobRunner::new(store, Arc::new(generator), FieldPolicies::default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_names_round_trip() {
        for kind in JobKind::ALL {
            assert_eq!(kind.event_name().parse::<JobKind>().unwrap(), kind);
        }
        assert!(matches!(
            "ai/product.unknown".parse::<JobKind>(),
            Err(WorkerError::UnknownEvent(_))
        ));
    }

    #[test]
    fn test_job_data_parsing() {
        let data = JobData::from_value(json!({
            "docId": "drafts.a1",
            "max": 50,
            "bodyPreview": "text",
            "meta": {"lang": "en", "userId": " "}
        }))
        .unwrap();

        assert_eq!(data.document_id().unwrap().as_str(), "a1");
        assert_eq!(data.max_or(5, 10), 10);
        assert_eq!(data.meta_str("lang"), Some("en"));
        assert_eq!(data.meta_str("userId"), None);
        assert_eq!(data.body_preview.as_deref(), Some("text"));
    }

    #[test]
    fn test_job_data_defaults() {
        let data = JobData::from_value(Value::Null).unwrap();
        assert!(matches!(data.document_id(), Err(WorkerError::BadRequest(_))));
        assert_eq!(data.max_or(3, 10), 3);
        assert!(JobData::from_value(json!({"docId": 5})).is_err());

        let data = JobData::from_value(json!({"max": -4})).unwrap();
        assert_eq!(data.max_or(3, 10), 1);
    }
}
