//! Route handlers.

pub mod article;
pub mod product;
pub mod slug;
pub mod system;

use serde_json::{Value, json};

use crate::error::{WorkerError, WorkerResult};
use crate::ids::DocumentId;
use crate::preview::ApplyPlan;
use crate::server::AppState;

/// Fetch a document that must exist.
async fn load_document(state: &AppState, id: &DocumentId) -> WorkerResult<Value> {
    state
        .store
        .get_document(id)
        .await?
        .ok_or_else(|| WorkerError::NotFound("Document not found".to_string()))
}

/// Commit the plan's patch (if any) and return the response fields.
async fn commit_plan(state: &AppState, plan: ApplyPlan) -> WorkerResult<Value> {
    let mut summary = plan.summary;
    if plan.patch.is_empty() {
        summary["resId"] = json!(plan.patch.id);
        return Ok(summary);
    }

    let result = state.store.commit(plan.patch).await?;
    summary["resId"] = json!(result.document_id);
    summary["transaction"] = json!(result.transaction_id);
    Ok(summary)
}
