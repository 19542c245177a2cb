//! Slug validation and generation endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use serde_json::json;
use tracing::info;

use crate::cms::{DocumentStore, Patch};
use crate::error::{WorkerError, WorkerResult};
use crate::ids::{DocumentId, KeyGenerator};
use crate::server::AppState;
use crate::server::input::Input;
use crate::server::response::ok;
use crate::text::{fallback_slug_base, is_valid_slug, slugify, with_suffix};

/// Numbered suffixes tried before falling back to a random one.
const MAX_NUMBERED_ATTEMPTS: usize = 50;

/// First of `base`, `base-2`, `base-3`, ... not owned by another document.
///
/// After [`MAX_NUMBERED_ATTEMPTS`] taken candidates, a generated suffix is
/// used instead.
///
/// # Errors
/// Returns a store error if a lookup fails.
pub async fn unique_slug(
    store: &dyn DocumentStore,
    base: &str,
    self_id: &DocumentId,
    keys: &dyn KeyGenerator,
) -> WorkerResult<String> {
    let base = if base.is_empty() { "item" } else { base };
    let mut candidate = base.to_string();

    for n in 2..MAX_NUMBERED_ATTEMPTS + 2 {
        if store.find_slug_owner(&candidate, Some(self_id)).await?.is_none() {
            return Ok(candidate);
        }
        candidate = with_suffix(base, &n.to_string());
    }

    let tail: String = keys
        .next_key()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(6)
        .collect();
    Ok(with_suffix(base, &tail))
}

/// `GET|POST /api/ai/slug-check` with `slug` and optional `id`
pub async fn slug_check(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let slug = input
        .str("slug")
        .ok_or_else(|| WorkerError::BadRequest("Missing slug".to_string()))?;

    if !is_valid_slug(slug) {
        return Ok(ok(json!({"valid": false, "conflict": false, "reason": "format"})));
    }

    let self_id = input.str("id").and_then(DocumentId::parse);
    let hit = state.store.find_slug_owner(slug, self_id.as_ref()).await?;

    Ok(ok(json!({
        "valid": true,
        "conflict": hit.is_some(),
        "hit": hit,
    })))
}

/// `GET|POST /api/ai/slug-generate` with `docId` and `name`
pub async fn slug_generate(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let (Some(id), Some(name)) = (
        input.str("docId").and_then(DocumentId::parse),
        input.str("name"),
    ) else {
        return Err(WorkerError::BadRequest("Missing docId or name".to_string()));
    };

    if state.store.get_document(&id).await?.is_none() {
        return Err(WorkerError::NotFound(
            "Published document not found".to_string(),
        ));
    }

    let mut base = slugify(name);
    if base.is_empty() {
        base = fallback_slug_base(id.as_str(), state.keys.as_ref());
    }

    let slug = unique_slug(state.store.as_ref(), &base, &id, state.keys.as_ref()).await?;
    let patch = Patch::new(&id)
        .set_if_missing("slug", json!({"_type": "slug"}))
        .set("slug.current", json!(slug));
    let result = state.store.commit(patch).await?;
    info!(id = %id, slug = %slug, "slug generated");

    Ok(ok(json!({"slug": slug, "resId": result.document_id})))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cms::MemoryStore;
    use crate::ids::testing::SequentialKeys;

    #[tokio::test]
    async fn test_unique_slug_appends_suffixes() {
        let store = MemoryStore::new();
        store.insert(json!({"_id": "a", "slug": {"current": "wallet"}}));
        store.insert(json!({"_id": "b", "slug": {"current": "wallet-2"}}));
        let me = DocumentId::parse("me").unwrap();
        let keys = SequentialKeys::default();

        assert_eq!(unique_slug(&store, "wallet", &me, &keys).await.unwrap(), "wallet-3");
        assert_eq!(unique_slug(&store, "bag", &me, &keys).await.unwrap(), "bag");
        let own = DocumentId::parse("a").unwrap();
        assert_eq!(unique_slug(&store, "wallet", &own, &keys).await.unwrap(), "wallet");
    }

    #[tokio::test]
    async fn test_unique_slug_stays_within_limit() {
        let store = MemoryStore::new();
        let base = "a".repeat(60);
        store.insert(json!({"_id": "x", "slug": {"current": base}}));
        let me = DocumentId::parse("me").unwrap();

        let slug = unique_slug(&store, &base, &me, &SequentialKeys::default()).await.unwrap();
        assert_eq!(slug.len(), 60);
        assert!(slug.ends_with("-2"));
        assert!(is_valid_slug(&slug));
    }

    #[tokio::test]
    async fn test_unique_slug_falls_back_to_generated_suffix() {
        let store = MemoryStore::new();
        store.insert(json!({"_id": "x0", "slug": {"current": "item"}}));
        for n in 2..MAX_NUMBERED_ATTEMPTS + 2 {
            store.insert(json!({"_id": format!("x{n}"), "slug": {"current": format!("item-{n}")}}));
        }
        let me = DocumentId::parse("me").unwrap();

        let slug = unique_slug(&store, "", &me, &SequentialKeys::default()).await.unwrap();
        assert_eq!(slug, "item-k1");
    }
}
