//! In-process document store.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::cms::document::str_at;
use crate::cms::{CommitResult, DocumentStore, Patch, StoreError};
use crate::ids::{DocumentId, to_published_id};

/// Documents held in a concurrent map keyed by `_id`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<String, Value>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document. Its `_id` field is used as the key.
    ///
    /// Documents without an `_id` are ignored.
    pub fn insert(&self, doc: Value) {
        let Some(id) = doc.get("_id").and_then(Value::as_str).map(str::to_string) else {
            return;
        };
        self.docs.insert(id, doc);
    }

    /// Clone of a stored document by raw `_id`.
    #[must_use]
    pub fn snapshot(&self, id: &str) -> Option<Value> {
        self.docs.get(id).map(|entry| entry.value().clone())
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, id: &DocumentId) -> Result<Option<Value>, StoreError> {
        Ok(self.snapshot(id.as_str()))
    }

    async fn commit(&self, patch: Patch) -> Result<CommitResult, StoreError> {
        let Some(mut entry) = self.docs.get_mut(&patch.id) else {
            return Err(StoreError::DocumentMissing(patch.id));
        };
        patch.apply_to(entry.value_mut());
        debug!(id = %patch.id, sets = patch.set.len(), "memory store patch applied");

        Ok(CommitResult {
            transaction_id: Some(Uuid::new_v4().to_string()),
            document_id: patch.id,
        })
    }

    async fn find_slug_owner(
        &self,
        slug: &str,
        self_id: Option<&DocumentId>,
    ) -> Result<Option<Value>, StoreError> {
        let self_id = self_id.map(DocumentId::as_str);

        let hit = self.docs.iter().find(|entry| {
            let is_self = self_id.is_some_and(|own| to_published_id(entry.key()) == own);
            !is_self && str_at(entry.value(), "slug.current") == Some(slug)
        });

        Ok(hit.map(|entry| {
            let doc = entry.value();
            json!({
                "_id": entry.key(),
                "_type": doc.get("_type").cloned().unwrap_or(Value::Null),
                "name": doc.get("name").cloned().unwrap_or(Value::Null),
                "title": doc.get("title").cloned().unwrap_or(Value::Null),
            })
        }))
    }

    async fn ping(&self) -> Result<bool, StoreError> {
        Ok(!self.docs.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> DocumentId {
        DocumentId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_commit_applies_patch() {
        let store = MemoryStore::new();
        store.insert(json!({"_id": "p1", "_type": "product"}));

        let result = store
            .commit(Patch::new(&id("p1")).set("name", json!("Wallet")))
            .await
            .unwrap();

        assert_eq!(result.document_id, "p1");
        assert!(result.transaction_id.is_some());
        assert_eq!(store.snapshot("p1").unwrap()["name"], "Wallet");
    }

    #[tokio::test]
    async fn test_commit_missing_document() {
        let store = MemoryStore::new();
        let err = store.commit(Patch::new(&id("nope"))).await.unwrap_err();
        assert!(matches!(err, StoreError::DocumentMissing(_)));
    }

    #[tokio::test]
    async fn test_find_slug_owner_excludes_self_and_draft() {
        let store = MemoryStore::new();
        store.insert(json!({"_id": "p1", "_type": "product", "slug": {"current": "wallet"}}));
        store.insert(json!({"_id": "drafts.p1", "_type": "product", "slug": {"current": "wallet"}}));

        assert!(store.find_slug_owner("wallet", Some(&id("p1"))).await.unwrap().is_none());

        let hit = store.find_slug_owner("wallet", Some(&id("p2"))).await.unwrap().unwrap();
        assert_eq!(hit["_type"], "product");
        assert!(store.find_slug_owner("bag", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ping_reflects_contents() {
        let store = MemoryStore::new();
        assert!(!store.ping().await.unwrap());
        store.insert(json!({"_id": "a1"}));
        assert!(store.ping().await.unwrap());
        assert_eq!(store.len(), 1);
    }
}
