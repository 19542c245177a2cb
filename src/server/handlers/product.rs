//! Product preview read and apply endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use serde_json::json;

use crate::error::WorkerResult;
use crate::preview::{self, read};
use crate::server::AppState;
use crate::server::handlers::{commit_plan, load_document};
use crate::server::input::Input;
use crate::server::response::ok;

/// `GET|POST /api/ai/get-titles`
pub async fn get_titles(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    Ok(ok(json!({"titles": read::titles(&doc)})))
}

/// `POST /api/ai/apply-title` with `{docId, index?}`
pub async fn apply_title(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let index = input.int("index").unwrap_or(0);
    let doc = load_document(&state, &id).await?;
    let plan = preview::plan_title(&id, &doc, index, &state.config.policies)?;
    Ok(ok(commit_plan(&state, plan).await?))
}

/// `GET|POST /api/ai/get-short`
pub async fn get_short(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let (short, meta) = read::short_pair(&doc);
    Ok(ok(json!({"short": short, "meta": meta})))
}

/// `POST /api/ai/apply-short`
pub async fn apply_short(State(state): State<Arc<AppState>>, input: Input) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let plan = preview::plan_short(&id, &doc, &state.config.policies)?;
    Ok(ok(commit_plan(&state, plan).await?))
}

/// `GET|POST /api/ai/get-image-alt`
pub async fn get_image_alt(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let (alt, filename) = read::image_suggestion(&doc);
    Ok(ok(json!({"alt": alt, "filename": filename})))
}

/// `POST /api/ai/apply-image-alt`
pub async fn apply_image_alt(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let plan = preview::plan_image_alt(&id, &doc, &state.config.policies)?;
    Ok(ok(commit_plan(&state, plan).await?))
}

/// `GET|POST /api/ai/get-gallery-alts`
pub async fn get_gallery_alts(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let items = read::gallery_suggestions(&doc);
    Ok(ok(json!({"count": items.len(), "items": items})))
}

/// `POST /api/ai/apply-gallery-alts`
pub async fn apply_gallery_alts(
    State(state): State<Arc<AppState>>,
    input: Input,
) -> WorkerResult<Response> {
    let id = input.doc_id()?;
    let doc = load_document(&state, &id).await?;
    let plan = preview::plan_gallery_alts(&id, &doc, &state.config.policies)?;
    Ok(ok(commit_plan(&state, plan).await?))
}
