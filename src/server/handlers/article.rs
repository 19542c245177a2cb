//! Article preview read and apply endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use serde_json::{Value, json};

use crate::error::WorkerResult;
use crate::preview::{self, read};
use crate::server::AppState;
use crate::server::handlers::{commit_plan, load_document};
use crate::server::input::Input;
use crate::server::response::ok;

/// `GET|POST /api/ai/get-toc`, with `debug` echoing the resolved id.
pub async fn get_toc(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let items = read::toc_entries(&doc);

    let mut body = json!({"count": items.len(), "items": items});
    if input.flag("debug") {
        body["_debug"] = json!({"docId": id.as_str()});
    }
    Ok(ok(body))
}

/// `POST /api/ai/apply-toc`
pub async fn apply_toc(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let plan = preview::plan_toc(&id, &doc, state.keys.as_ref())?;
    Ok(ok(commit_plan(&state, plan).await?))
}

/// `GET|POST /api/ai/get-faq`
pub async fn get_faq(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    Ok(ok(json!({"items": read::faq_entries(&doc)})))
}

/// `POST /api/ai/apply-faq`; an empty preview applies nothing.
pub async fn apply_faq(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let plan = preview::plan_faq(&id, &doc, &state.config.policies, state.keys.as_ref());
    Ok(ok(commit_plan(&state, plan).await?))
}

/// `GET|POST /api/ai/get-article-image-alt`
///
/// `limit` caps body items (0 means all); `debug` adds the raw preview node.
pub async fn get_article_image_alt(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let preview = read::image_alts(&doc).unwrap_or_default();

    let mut items = preview.body;
    if let Some(limit) = input.int("limit").and_then(|l| usize::try_from(l).ok()) {
        if limit > 0 {
            items.truncate(limit);
        }
    }

    let mut body = json!({
        "featured": preview.featured.map(|alt| json!({"alt": alt})),
        "body": {"count": items.len(), "items": items},
    });
    if input.flag("debug") {
        body["raw"] = json!({
            "imageAlts": read::result_field(&doc, "imageAlts").cloned().unwrap_or(Value::Null),
        });
    }
    Ok(ok(body))
}

/// `POST /api/ai/apply-article-image-alt` with `{docId, dryRun?}`
pub async fn apply_article_image_alt(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let plan = preview::plan_article_image_alt(&id, &doc, &state.config.policies)?;
    let counts = plan.summary["counts"].clone();

    if input.flag("dryRun") {
        return Ok(ok(json!({
            "dryRun": true,
            "setOps": plan.patch.set,
            "counts": counts,
            "docId": id.as_str(),
        })));
    }

    let result = state.store.commit(plan.patch).await?;
    Ok(ok(json!({
        "applied": counts,
        "transaction": result.transaction_id,
        "docId": id.as_str(),
    })))
}
