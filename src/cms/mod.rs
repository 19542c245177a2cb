//! Document store access.
//!
//! The worker only needs four things from the CMS: read one document, commit
//! a partial patch, look up which document owns a slug, and a cheap health
//! probe. [`SanityStore`] talks to the hosted data API; [`MemoryStore`] keeps
//! documents in process for local runs and tests.

pub mod document;
pub mod error;
pub mod memory;
pub mod patch;
pub mod sanity;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use patch::{CommitResult, Patch, keyed};
pub use sanity::SanityStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::ids::DocumentId;

/// Read and patch access to CMS documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by published id.
    async fn get_document(&self, id: &DocumentId) -> Result<Option<Value>, StoreError>;

    /// Commit a partial patch.
    async fn commit(&self, patch: Patch) -> Result<CommitResult, StoreError>;

    /// Another document whose `slug.current` equals `slug`.
    ///
    /// `self_id` and its draft counterpart are never reported as owners.
    async fn find_slug_owner(
        &self,
        slug: &str,
        self_id: Option<&DocumentId>,
    ) -> Result<Option<Value>, StoreError>;

    /// Whether the store is reachable and holds any document.
    async fn ping(&self) -> Result<bool, StoreError>;
}
